//! Import of one landed package into the ERP.
//!
//! [`PackageImporter::import`] runs the four calls in order and stops at the
//! first failure:
//!
//! 1. client-credentials token from Azure AD
//! 2. `GetAzureWriteUrl` for the package name
//! 3. block blob upload of the payload to that URL
//! 4. `ImportFromPackage` referencing the uploaded blob
//!
//! Nothing is retried and nothing is rolled back; a half-uploaded blob is
//! left for the ERP to overwrite on the next attempt.
//! [`PackageImporter::run`] is the trigger-facing entry point: it logs the
//! outcome and never returns an error.

use dmf_core::config::ErpConfig;
use dmf_core::import::ImportRequest;
use dmf_erp::{DataManagementApi, ErpApiError, IdentityClient, ImportFromPackage};
use dmf_storage::blob::without_query;
use dmf_storage::{BlockBlobClient, StorageError};

/// Why an import stopped. Each variant names the step that failed.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Unable to get a token, package '{package}' aborted: {source}")]
    Authentication {
        package: String,
        source: ErpApiError,
    },

    #[error("Unable to get a writable destination URL, package '{package}' aborted: {source}")]
    Destination {
        package: String,
        source: ErpApiError,
    },

    #[error("Unable to upload package '{package}': {source}")]
    Upload {
        package: String,
        source: StorageError,
    },

    #[error("Package '{package}' couldn't be loaded: {source}")]
    Import {
        package: String,
        source: ErpApiError,
    },
}

/// Logged result of one trigger invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    Loaded {
        package: String,
        execution_id: String,
    },
    Failed {
        package: String,
        reason: String,
    },
}

impl ImportOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded { .. })
    }
}

/// Drives the import calls. One instance serves every invocation; it holds
/// no per-invocation state.
pub struct PackageImporter {
    client: reqwest::Client,
    identity: IdentityClient,
    blobs: BlockBlobClient,
}

impl PackageImporter {
    pub fn new(client: reqwest::Client, erp: &ErpConfig) -> Self {
        Self {
            identity: IdentityClient::new(client.clone(), erp),
            blobs: BlockBlobClient::new(client.clone()),
            client,
        }
    }

    /// Run the import and return the ERP execution id.
    pub async fn import(&self, request: &ImportRequest) -> Result<String, ImportError> {
        let package = &request.package_name;

        let token = self
            .identity
            .acquire_token()
            .await
            .map_err(|source| ImportError::Authentication {
                package: package.clone(),
                source,
            })?;

        let data_management = DataManagementApi::new(self.client.clone(), &request.resource_url);

        let write_url = data_management
            .get_azure_write_url(&token, package)
            .await
            .map_err(|source| ImportError::Destination {
                package: package.clone(),
                source,
            })?;
        tracing::debug!(
            package = %package,
            destination = %without_query(&write_url.blob_url),
            "Obtained writable destination"
        );

        self.blobs
            .upload(&write_url.blob_url, request.payload.clone())
            .await
            .map_err(|source| ImportError::Upload {
                package: package.clone(),
                source,
            })?;

        let import = ImportFromPackage::new(
            &write_url.blob_url,
            &request.project_name,
            &request.legal_entity,
        );

        data_management
            .import_from_package(&token, &import)
            .await
            .map_err(|source| ImportError::Import {
                package: package.clone(),
                source,
            })
    }

    /// Trigger entry point: import, log, swallow the error.
    pub async fn run(&self, request: ImportRequest) -> ImportOutcome {
        let package = request.package_name.clone();

        match self.import(&request).await {
            Ok(execution_id) => {
                tracing::info!(
                    package = %package,
                    execution_id = %execution_id,
                    "Data package '{package}' loaded (execution id '{execution_id}')"
                );
                ImportOutcome::Loaded {
                    package,
                    execution_id,
                }
            }
            Err(e) => {
                tracing::error!(package = %package, error = %e, "Package import failed");
                ImportOutcome::Failed {
                    package,
                    reason: e.to_string(),
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
