//! OAuth2 client-credentials token acquisition against Azure AD (v1
//! endpoint, `resource` parameter rather than `scope`).
//!
//! Tokens are requested fresh for every import; nothing is cached.

use std::fmt;

use dmf_core::config::ErpConfig;
use serde::Deserialize;

use crate::error::ErpApiError;

/// Opaque bearer token. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
}

/// Client for the tenant's token endpoint.
pub struct IdentityClient {
    client: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    resource: String,
}

impl IdentityClient {
    pub fn new(client: reqwest::Client, config: &ErpConfig) -> Self {
        Self {
            client,
            token_url: config.token_url(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            resource: config.resource.clone(),
        }
    }

    /// POST the client credentials as a form and read `access_token` from
    /// the JSON response. An absent or empty token is an error.
    pub async fn acquire_token(&self) -> Result<AccessToken, ErpApiError> {
        let response = self
            .client
            .post(&self.token_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("resource", self.resource.as_str()),
            ])
            .send()
            .await?;

        let body: TokenResponse = ErpApiError::parse_json(response, "token").await?;

        match body.access_token {
            Some(token) if !token.is_empty() => {
                tracing::debug!(token_url = %self.token_url, "Acquired access token");
                Ok(AccessToken(token))
            }
            _ => Err(ErpApiError::EmptyField("access_token")),
        }
    }
}
