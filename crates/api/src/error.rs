use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use dmf_core::error::CoreError;
use dmf_storage::StorageError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Every variant answers with `400 Bad Request`: the caller is the ERP
/// business-event framework, which only distinguishes delivered from
/// rejected. Storage and transport detail is logged, never echoed.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `dmf_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A table storage error from `dmf_storage`.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::Validation(msg) => ("VALIDATION_ERROR", msg.clone()),
                other => ("BAD_REQUEST", other.to_string()),
            },

            // --- Storage errors ---
            AppError::Storage(err) => classify_storage_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => ("BAD_REQUEST", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (StatusCode::BAD_REQUEST, axum::Json(body)).into_response()
    }
}

/// Classify a storage error into an error code and a client-safe message.
///
/// - Duplicate `(PartitionKey, RowKey)` maps to `DUPLICATE_EVENT`.
/// - Keys the table would reject map to `INVALID_KEY`.
/// - Everything else is logged and sanitized.
fn classify_storage_error(err: &StorageError) -> (&'static str, String) {
    match err {
        StorageError::EntityExists {
            partition_key,
            row_key,
        } => (
            "DUPLICATE_EVENT",
            format!("Event '{row_key}' for entity '{partition_key}' was already recorded"),
        ),
        StorageError::InvalidKey { .. } => ("INVALID_KEY", err.to_string()),
        other => {
            tracing::error!(error = %other, code = ?other.code(), "Storage error");
            (
                "STORAGE_ERROR",
                "Unable to store business event".to_string(),
            )
        }
    }
}
