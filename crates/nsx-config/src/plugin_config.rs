//! Plugin configuration file
//!
//! Holds defaults that are not part of a blueprint: fallback NSX
//! credentials and how long to wait for busy edges.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use nsx_core::{ConfigError, Properties, RetryPolicy};

/// Environment variable naming the configuration file
pub const CONFIG_PATH_ENV: &str = "NSX_PLUGIN_CONFIG";

const ENV_PREFIX: &str = "NSX_PLUGIN";

const STANDARD_PATHS: [&str; 2] = ["/etc/nsx-plugin/config.yaml", "./nsx-plugin.yaml"];

/// `NSX_PLUGIN_RETRY_ATTEMPTS`, `NSX_PLUGIN_NSX_AUTH__HOST`, ...
pub(crate) fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginConfig {
    /// Lowest-precedence `nsx_auth` layer
    pub nsx_auth: Properties,
    pub retry_attempts: u32,
    pub retry_delay_secs: u64,
}

impl Default for PluginConfig {
    fn default() -> Self {
        let retry = RetryPolicy::default();
        Self {
            nsx_auth: Properties::new(),
            retry_attempts: retry.attempts,
            retry_delay_secs: retry.delay.as_secs(),
        }
    }
}

impl PluginConfig {
    /// Load configuration from file, with `NSX_PLUGIN_*` environment overrides
    ///
    /// Nested keys use a double underscore: `NSX_PLUGIN_NSX_AUTH__HOST`.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Self::load(path.as_ref(), environment())
    }

    pub(crate) fn load(path: &Path, environment: config::Environment) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.to_path_buf()))
            .add_source(environment)
            .build()
            .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;

        settings
            .try_deserialize()
            .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))
    }

    /// Load from `NSX_PLUGIN_CONFIG` or a standard location, else defaults
    pub fn load_with_defaults() -> Result<Self, ConfigError> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return Self::load_from_file(path);
        }

        let found = STANDARD_PATHS
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists());

        match found {
            Some(path) => Self::load_from_file(path),
            None => {
                log::debug!("No plugin configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry_attempts,
            Duration::from_secs(self.retry_delay_secs),
        )
    }
}
