//! Minimal Azure Table service client: create-table and insert-entity over
//! the JSON (`odata=nometadata`) REST API with `SharedKeyLite` auth.

use dmf_core::config::TableStorageConfig;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::blob::error_code_header;
use crate::error::StorageError;
use crate::shared_key::{x_ms_date, SharedKeyCredential};
use crate::STORAGE_API_VERSION;

const JSON_NO_METADATA: &str = "application/json;odata=nometadata";

const TABLE_ALREADY_EXISTS: &str = "TableAlreadyExists";
const ENTITY_ALREADY_EXISTS: &str = "EntityAlreadyExists";

/// Longest key the service accepts, in bytes (1 KiB).
const MAX_KEY_LEN: usize = 1024;

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A table entity as sent on the wire.
///
/// Strings and booleans are written plainly; 64-bit integers and timestamps
/// need an `@odata.type` annotation or the service stores them as `Int32` /
/// `String`.
#[derive(Debug, Clone, PartialEq)]
pub struct TableEntity {
    partition_key: String,
    row_key: String,
    properties: Map<String, Value>,
}

impl TableEntity {
    pub fn new(partition_key: impl Into<String>, row_key: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            row_key: row_key.into(),
            properties: Map::new(),
        }
    }

    pub fn partition_key(&self) -> &str {
        &self.partition_key
    }

    pub fn row_key(&self) -> &str {
        &self.row_key
    }

    pub fn string(mut self, name: &str, value: impl Into<String>) -> Self {
        self.properties
            .insert(name.to_string(), Value::String(value.into()));
        self
    }

    /// `Edm.Int64` values travel as decimal strings.
    pub fn int64(mut self, name: &str, value: i64) -> Self {
        self.properties
            .insert(format!("{name}@odata.type"), Value::from("Edm.Int64"));
        self.properties
            .insert(name.to_string(), Value::String(value.to_string()));
        self
    }

    pub fn datetime(mut self, name: &str, value: dmf_core::types::Timestamp) -> Self {
        self.properties
            .insert(format!("{name}@odata.type"), Value::from("Edm.DateTime"));
        self.properties.insert(
            name.to_string(),
            Value::String(value.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)),
        );
        self
    }

    pub fn to_json(&self) -> Value {
        let mut body = Map::with_capacity(self.properties.len() + 2);
        body.insert("PartitionKey".into(), Value::String(self.partition_key.clone()));
        body.insert("RowKey".into(), Value::String(self.row_key.clone()));
        body.extend(self.properties.clone());
        Value::Object(body)
    }
}

/// Reject keys before any request is sent.
///
/// Over 1 KiB, or containing `/`, `\`, `#`, `?` or control characters, the
/// service would refuse the key itself. Empty keys are accepted by the
/// service but refused here: a row without an entity name or event id cannot
/// be told apart from the next one.
pub fn validate_key(field: &'static str, key: &str) -> Result<(), StorageError> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey {
            field,
            reason: "must not be empty",
        });
    }
    if key.len() > MAX_KEY_LEN {
        return Err(StorageError::InvalidKey {
            field,
            reason: "must not exceed 1 KiB",
        });
    }
    if key
        .chars()
        .any(|c| matches!(c, '/' | '\\' | '#' | '?') || c.is_control())
    {
        return Err(StorageError::InvalidKey {
            field,
            reason: "must not contain '/', '\\', '#', '?' or control characters",
        });
    }
    Ok(())
}

/// Table names: 3-63 alphanumeric characters, starting with a letter.
pub fn validate_table_name(name: &str) -> Result<(), StorageError> {
    let valid = (3..=63).contains(&name.len())
        && name.chars().all(|c| c.is_ascii_alphanumeric())
        && name.starts_with(|c: char| c.is_ascii_alphabetic());

    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidTableName(name.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ODataErrorBody {
    #[serde(rename = "odata.error")]
    error: ODataError,
}

#[derive(Debug, Deserialize)]
struct ODataError {
    code: String,
}

/// Client for one storage account's table endpoint.
#[derive(Debug)]
pub struct TableClient {
    client: reqwest::Client,
    credential: SharedKeyCredential,
    /// e.g. `https://acct.table.core.windows.net`, or a path-style emulator
    /// endpoint such as `http://127.0.0.1:10002/devstoreaccount1`.
    endpoint: String,
}

impl TableClient {
    pub fn new(client: reqwest::Client, config: &TableStorageConfig) -> Result<Self, StorageError> {
        Ok(Self {
            client,
            credential: SharedKeyCredential::new(&config.account_name, &config.account_key)?,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
        })
    }

    /// Create `table`. An existing table counts as success, so concurrent
    /// callers may race freely.
    pub async fn create_table_if_not_exists(&self, table: &str) -> Result<(), StorageError> {
        validate_table_name(table)?;

        let body = serde_json::json!({ "TableName": table });
        match self.post("Tables", &body).await {
            Ok(()) => {
                tracing::info!(table, "Created table");
                Ok(())
            }
            Err(StorageError::ApiError {
                status: 409,
                code: Some(ref code),
                ..
            }) if code == TABLE_ALREADY_EXISTS => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Insert `entity` into `table`. Never replaces: an existing entity with
    /// the same keys yields [`StorageError::EntityExists`].
    pub async fn insert_entity(&self, table: &str, entity: &TableEntity) -> Result<(), StorageError> {
        validate_table_name(table)?;
        validate_key("PartitionKey", entity.partition_key())?;
        validate_key("RowKey", entity.row_key())?;

        match self.post(table, &entity.to_json()).await {
            Err(StorageError::ApiError {
                status: 409,
                code: Some(ref code),
                ..
            }) if code == ENTITY_ALREADY_EXISTS => Err(StorageError::EntityExists {
                partition_key: entity.partition_key().to_string(),
                row_key: entity.row_key().to_string(),
            }),
            other => other,
        }
    }

    /// Signed `POST {endpoint}/{resource}` with `Prefer: return-no-content`.
    async fn post(&self, resource: &str, body: &Value) -> Result<(), StorageError> {
        let url = format!("{}/{resource}", self.endpoint);
        let path = reqwest::Url::parse(&url)
            .map(|u| u.path().to_string())
            .unwrap_or_else(|_| format!("/{resource}"));

        let date = x_ms_date();
        let authorization = self.credential.table_authorization(&date, &path);

        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, authorization)
            .header("x-ms-date", &date)
            .header("x-ms-version", STORAGE_API_VERSION)
            .header(ACCEPT, JSON_NO_METADATA)
            .header(CONTENT_TYPE, "application/json")
            .header("Prefer", "return-no-content")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let header_code = error_code_header(&response);
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        let code = header_code.or_else(|| {
            serde_json::from_str::<ODataErrorBody>(&body)
                .ok()
                .map(|e| e.error.code)
        });

        Err(StorageError::ApiError {
            status: status.as_u16(),
            code,
            body,
        })
    }
}
