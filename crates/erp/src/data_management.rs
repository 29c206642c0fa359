//! D365FO data-management package API.
//!
//! Wraps the two OData actions on `DataManagementDefinitionGroups` used to
//! push a package: `GetAzureWriteUrl` (hands out a writable SAS blob URL) and
//! `ImportFromPackage` (queues the asynchronous import job).

use serde::{Deserialize, Serialize};

use crate::error::ErpApiError;
use crate::identity::AccessToken;

const GET_WRITE_URL_PATH: &str =
    "/data/DataManagementDefinitionGroups/Microsoft.Dynamics.DataEntities.GetAzureWriteUrl";

const IMPORT_FROM_PACKAGE_PATH: &str =
    "/data/DataManagementDefinitionGroups/Microsoft.Dynamics.DataEntities.ImportFromPackage";

/// OData action result envelope: `{ "@odata.context": ..., "value": ... }`.
#[derive(Debug, Deserialize)]
struct ActionResult {
    #[serde(default)]
    value: Option<String>,
}

/// Writable upload destination returned by `GetAzureWriteUrl`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WriteUrl {
    #[serde(rename = "BlobId", default)]
    pub blob_id: Option<String>,
    #[serde(rename = "BlobUrl", default)]
    pub blob_url: String,
}

/// Request body for `ImportFromPackage`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportFromPackage {
    pub package_url: String,
    /// Name of the data project (definition group) describing the package.
    pub definition_group_id: String,
    /// Left empty so the ERP generates one.
    pub execution_id: String,
    pub execute: bool,
    pub overwrite: bool,
    pub legal_entity_id: String,
}

impl ImportFromPackage {
    /// Execute immediately, overwrite existing data, let the ERP assign the
    /// execution id.
    pub fn new(
        package_url: impl Into<String>,
        definition_group_id: impl Into<String>,
        legal_entity_id: impl Into<String>,
    ) -> Self {
        Self {
            package_url: package_url.into(),
            definition_group_id: definition_group_id.into(),
            execution_id: String::new(),
            execute: true,
            overwrite: true,
            legal_entity_id: legal_entity_id.into(),
        }
    }
}

/// HTTP client for one ERP environment.
pub struct DataManagementApi {
    client: reqwest::Client,
    resource_url: String,
}

impl DataManagementApi {
    /// * `resource_url` - environment base URL, e.g.
    ///   `https://contoso.operations.dynamics.com`.
    pub fn new(client: reqwest::Client, resource_url: impl Into<String>) -> Self {
        Self {
            client,
            resource_url: resource_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Ask the ERP for a writable blob URL for `unique_file_name`.
    ///
    /// The action's `value` is itself a JSON document serialized into a
    /// string (`"{\"BlobId\":...,\"BlobUrl\":...}"`). That is the API's
    /// contract, so the body is decoded twice: once for the envelope, once
    /// for the embedded document.
    pub async fn get_azure_write_url(
        &self,
        token: &AccessToken,
        unique_file_name: &str,
    ) -> Result<WriteUrl, ErpApiError> {
        let response = self
            .client
            .post(format!("{}{GET_WRITE_URL_PATH}", self.resource_url))
            .bearer_auth(token.secret())
            .json(&serde_json::json!({ "uniqueFileName": unique_file_name }))
            .send()
            .await?;

        // First pass: the OData envelope.
        let envelope: ActionResult = ErpApiError::parse_json(response, "GetAzureWriteUrl").await?;
        let encoded = envelope
            .value
            .filter(|v| !v.is_empty())
            .ok_or(ErpApiError::EmptyField("value"))?;

        // Second pass: the JSON string carried inside `value`.
        let write_url: WriteUrl =
            serde_json::from_str(&encoded).map_err(|source| ErpApiError::Decode {
                context: "GetAzureWriteUrl value",
                source,
            })?;

        if write_url.blob_url.is_empty() {
            return Err(ErpApiError::EmptyField("BlobUrl"));
        }

        Ok(write_url)
    }

    /// Queue an import of the package at `request.package_url`. Returns the
    /// execution id assigned by the ERP.
    pub async fn import_from_package(
        &self,
        token: &AccessToken,
        request: &ImportFromPackage,
    ) -> Result<String, ErpApiError> {
        let response = self
            .client
            .post(format!("{}{IMPORT_FROM_PACKAGE_PATH}", self.resource_url))
            .bearer_auth(token.secret())
            .json(request)
            .send()
            .await?;

        let result: ActionResult = ErpApiError::parse_json(response, "ImportFromPackage").await?;

        result
            .value
            .filter(|v| !v.is_empty())
            .ok_or(ErpApiError::EmptyField("value"))
    }
}
