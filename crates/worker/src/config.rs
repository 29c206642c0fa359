use std::path::PathBuf;
use std::time::Duration;

use dmf_core::config::{optional_or, parsed_or, ConfigError};

/// Trigger host configuration.
///
/// | Env Var                      | Default          |
/// |------------------------------|------------------|
/// | `PACKAGE_LANDING_DIR`        | `package-import` |
/// | `PACKAGE_POLL_INTERVAL_SECS` | `10`             |
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Directory packages land in.
    pub landing_dir: PathBuf,
    /// Time between two scans of the landing directory.
    pub poll_interval: Duration,
}

impl WorkerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key: &str| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let poll_interval_secs: u64 = parsed_or(&lookup, "PACKAGE_POLL_INTERVAL_SECS", 10)?;
        if poll_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "PACKAGE_POLL_INTERVAL_SECS",
                reason: "must be greater than zero".into(),
            });
        }

        Ok(Self {
            landing_dir: PathBuf::from(optional_or(&lookup, "PACKAGE_LANDING_DIR", "package-import")),
            poll_interval: Duration::from_secs(poll_interval_secs),
        })
    }
}
