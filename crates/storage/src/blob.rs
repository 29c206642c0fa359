//! Block blob upload to a pre-authorized (SAS) URL.
//!
//! The whole payload goes up in a single `Put Blob` call; an existing blob at
//! the same URL is overwritten.

use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;

use crate::error::StorageError;
use crate::STORAGE_API_VERSION;

/// Uploads payloads to SAS URLs handed out by another party.
pub struct BlockBlobClient {
    client: reqwest::Client,
}

impl BlockBlobClient {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// `PUT` `payload` as a block blob at `sas_url`.
    pub async fn upload(&self, sas_url: &str, payload: Bytes) -> Result<(), StorageError> {
        let size = payload.len();

        let response = self
            .client
            .put(sas_url)
            .header("x-ms-blob-type", "BlockBlob")
            .header("x-ms-version", STORAGE_API_VERSION)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let code = error_code_header(&response);
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(StorageError::ApiError {
                status: status.as_u16(),
                code,
                body,
            });
        }

        tracing::debug!(blob = %without_query(sas_url), size, "Uploaded block blob");
        Ok(())
    }
}

/// `x-ms-error-code` response header, if present.
pub(crate) fn error_code_header(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get("x-ms-error-code")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Strip the SAS signature before a URL reaches the logs.
pub fn without_query(url: &str) -> &str {
    url.split_once('?').map_or(url, |(base, _)| base)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use wiremock::matchers::{body_bytes, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn uploads_whole_payload_as_block_blob() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/dmf/Customers"))
            .and(query_param("sig", "abc"))
            .and(header("x-ms-blob-type", "BlockBlob"))
            .and(body_bytes(b"PK\x03\x04package".to_vec()))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = BlockBlobClient::new(reqwest::Client::new());
        let url = format!("{}/dmf/Customers?sig=abc", mock_server.uri());

        client
            .upload(&url, Bytes::from_static(b"PK\x03\x04package"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn rejected_upload_carries_error_code() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PUT"))
            .respond_with(
                ResponseTemplate::new(403)
                    .insert_header("x-ms-error-code", "AuthenticationFailed")
                    .set_body_string("Signature did not match"),
            )
            .mount(&mock_server)
            .await;

        let client = BlockBlobClient::new(reqwest::Client::new());
        let err = client
            .upload(&format!("{}/dmf/x?sig=expired", mock_server.uri()), Bytes::new())
            .await
            .unwrap_err();

        assert_matches!(err, StorageError::ApiError { status: 403, .. });
        assert_eq!(err.code(), Some("AuthenticationFailed"));
    }

    #[test]
    fn without_query_strips_signature() {
        assert_eq!(
            without_query("https://acct.blob.core.windows.net/dmf/a?sv=2020&sig=secret"),
            "https://acct.blob.core.windows.net/dmf/a"
        );
        assert_eq!(without_query("https://host/a"), "https://host/a");
    }
}
