use dmf_core::config::{optional_or, parsed_or, ConfigError};

/// Route the status recorder listens on when `STATUS_ROUTE` is unset. Matches
/// the path the ERP business-event endpoints were registered against.
pub const DEFAULT_STATUS_ROUTE: &str = "/api/PackageStatusUpdate";

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `7071`).
    pub port: u16,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Path of the anonymous `POST` endpoint receiving business events.
    pub status_route: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `7071`                     |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `STATUS_ROUTE`         | `/api/PackageStatusUpdate` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key: &str| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let status_route = optional_or(&lookup, "STATUS_ROUTE", DEFAULT_STATUS_ROUTE);
        if !status_route.starts_with('/') || status_route == "/health" {
            return Err(ConfigError::Invalid {
                name: "STATUS_ROUTE",
                reason: format!("'{status_route}' must start with '/' and must not be /health"),
            });
        }

        Ok(Self {
            host: optional_or(&lookup, "HOST", "0.0.0.0"),
            port: parsed_or(&lookup, "PORT", 7071)?,
            request_timeout_secs: parsed_or(&lookup, "REQUEST_TIMEOUT_SECS", 30)?,
            status_route,
        })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn defaults() {
        let config = ServerConfig::from_lookup(|_: &str| None).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 7071);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.status_route, DEFAULT_STATUS_ROUTE);
    }

    #[test]
    fn invalid_port_is_rejected() {
        let result = ServerConfig::from_lookup(|key: &str| (key == "PORT").then(|| "http".into()));
        assert_matches!(result, Err(ConfigError::Invalid { name: "PORT", .. }));
    }

    #[test]
    fn relative_status_route_is_rejected() {
        let result = ServerConfig::from_lookup(|key: &str| {
            (key == "STATUS_ROUTE").then(|| "api/status".into())
        });
        assert_matches!(result, Err(ConfigError::Invalid { name: "STATUS_ROUTE", .. }));
    }
}
