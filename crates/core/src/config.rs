//! Environment-sourced configuration shared by the worker and api binaries.
//!
//! Every struct is built once at process start (`from_env`) and then passed
//! by reference into the handlers. The `from_lookup` constructors take the
//! variable source as a closure so tests never touch the process environment.
//!
//! Variable names follow the function-app settings the ERP side already
//! provisions (`ClientId`, `Resource`, ...), hence the mixed casing.

use std::fmt;
use std::str::FromStr;

/// Default Azure AD authority used for client-credentials tokens.
pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

/// Default timeout for a single outbound HTTP request, in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 100;

/// Errors raised while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

// ---------------------------------------------------------------------------
// Lookup helpers
// ---------------------------------------------------------------------------

/// Read a required variable. Blank values count as missing.
pub fn required<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(name))
}

/// Read an optional variable, falling back to `default` when unset or blank.
pub fn optional_or<F>(lookup: &F, name: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Read and parse an optional variable, falling back to `default`.
pub fn parsed_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match lookup(name).map(|v| v.trim().to_string()) {
        Some(raw) if !raw.is_empty() => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
        _ => Ok(default),
    }
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

// ---------------------------------------------------------------------------
// ERP / identity
// ---------------------------------------------------------------------------

/// Credentials and target coordinates for the D365FO data-management API.
///
/// | Env Var        | Default                              |
/// |----------------|--------------------------------------|
/// | `ClientId`     | required                             |
/// | `ClientSecret` | required                             |
/// | `Tenant`       | required                             |
/// | `Resource`     | required                             |
/// | `LegalEntity`  | required                             |
/// | `ProjectName`  | required                             |
/// | `AuthorityHost`| `https://login.microsoftonline.com`  |
#[derive(Clone)]
pub struct ErpConfig {
    pub client_id: String,
    pub client_secret: String,
    pub tenant: String,
    /// Environment base URL, e.g. `https://contoso.operations.dynamics.com`.
    /// Sent unchanged as the OAuth2 `resource`, which Azure AD matches
    /// verbatim; URL joins trim a trailing `/` themselves.
    pub resource: String,
    pub legal_entity: String,
    /// Data-management definition group the packages are imported into.
    pub project_name: String,
    pub authority_host: String,
}

impl ErpConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            client_id: required(&lookup, "ClientId")?,
            client_secret: required(&lookup, "ClientSecret")?,
            tenant: required(&lookup, "Tenant")?,
            resource: required(&lookup, "Resource")?,
            legal_entity: required(&lookup, "LegalEntity")?,
            project_name: required(&lookup, "ProjectName")?,
            authority_host: optional_or(&lookup, "AuthorityHost", DEFAULT_AUTHORITY_HOST)
                .trim_end_matches('/')
                .to_string(),
        })
    }

    /// `{authority}/{tenant}/oauth2/token`
    pub fn token_url(&self) -> String {
        format!("{}/{}/oauth2/token", self.authority_host, self.tenant)
    }
}

impl fmt::Debug for ErpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErpConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("tenant", &self.tenant)
            .field("resource", &self.resource)
            .field("legal_entity", &self.legal_entity)
            .field("project_name", &self.project_name)
            .field("authority_host", &self.authority_host)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Table storage
// ---------------------------------------------------------------------------

/// Account and table used by the status recorder.
///
/// | Env Var               | Default                                    |
/// |-----------------------|--------------------------------------------|
/// | `StorageAccountName`  | required                                   |
/// | `StorageAccountKey`   | required (base64 account key)              |
/// | `StorageTable`        | required                                   |
/// | `StorageTableEndpoint`| `https://{account}.table.core.windows.net` |
#[derive(Clone)]
pub struct TableStorageConfig {
    pub account_name: String,
    pub account_key: String,
    pub table_name: String,
    pub endpoint: String,
}

impl TableStorageConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let account_name = required(&lookup, "StorageAccountName")?;
        let default_endpoint = format!("https://{account_name}.table.core.windows.net");

        Ok(Self {
            account_key: required(&lookup, "StorageAccountKey")?,
            table_name: required(&lookup, "StorageTable")?,
            endpoint: optional_or(&lookup, "StorageTableEndpoint", &default_endpoint)
                .trim_end_matches('/')
                .to_string(),
            account_name,
        })
    }
}

impl fmt::Debug for TableStorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableStorageConfig")
            .field("account_name", &self.account_name)
            .field("account_key", &"<redacted>")
            .field("table_name", &self.table_name)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Outbound HTTP
// ---------------------------------------------------------------------------

/// Settings for the shared outbound HTTP client.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Per-request timeout in seconds (`HTTP_TIMEOUT_SECS`, default `100`).
    pub timeout_secs: u64,
}

impl HttpClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            timeout_secs: parsed_or(&lookup, "HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?,
        })
    }
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
