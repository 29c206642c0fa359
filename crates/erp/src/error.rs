/// Errors from the identity and data-management REST calls.
#[derive(Debug, thiserror::Error)]
pub enum ErpApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The endpoint returned a non-2xx status code.
    #[error("ERP API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The response body was not the JSON shape the endpoint documents.
    #[error("Unexpected {context} response: {source}")]
    Decode {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The response decoded but the field carrying the result was absent or
    /// empty.
    #[error("Response field '{0}' is missing or empty")]
    EmptyField(&'static str),
}

impl ErpApiError {
    /// Ensure the response has a success status code. Returns the response
    /// unchanged on success, or an [`ErpApiError::ApiError`] carrying the
    /// status and body text on failure.
    pub(crate) async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ErpApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ErpApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Read a successful response body and decode it as JSON.
    pub(crate) async fn parse_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        context: &'static str,
    ) -> Result<T, ErpApiError> {
        let response = Self::ensure_success(response).await?;
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|source| ErpApiError::Decode { context, source })
    }
}
