/// Errors from the blob and table REST calls.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The storage service returned a non-2xx status code.
    #[error("Storage API error ({status}, {}): {body}", .code.as_deref().unwrap_or("unknown"))]
    ApiError {
        status: u16,
        /// `x-ms-error-code` or the OData error code, when present.
        code: Option<String>,
        body: String,
    },

    /// An entity with the same `(PartitionKey, RowKey)` already exists.
    #[error("Entity ({partition_key}, {row_key}) already exists")]
    EntityExists {
        partition_key: String,
        row_key: String,
    },

    /// A key the table service would reject; caught before sending.
    #[error("Invalid {field}: {reason}")]
    InvalidKey {
        field: &'static str,
        reason: &'static str,
    },

    #[error("Invalid table name '{0}'")]
    InvalidTableName(String),

    /// The configured account key is not valid base64.
    #[error("Invalid storage account key: {0}")]
    Credential(String),
}

impl StorageError {
    /// Service error code carried by the error, if any.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::ApiError { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}
