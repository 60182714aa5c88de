//! # Lifecycle Configuration
//!
//! Policy knobs for the workflow layer. Loaded from an optional YAML file,
//! then overridden by environment variables.
//!
//! ```yaml
//! auto_complete_days: 7
//! ```
//!
//! | Variable | Field |
//! |---|---|
//! | `MARKET_AUTO_COMPLETE_DAYS` | `auto_complete_days` |

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable overriding [`LifecycleConfig::auto_complete_days`].
pub const AUTO_COMPLETE_DAYS_ENV: &str = "MARKET_AUTO_COMPLETE_DAYS";

/// Default grace period before a delivered order auto-completes.
pub const DEFAULT_AUTO_COMPLETE_DAYS: u32 = 7;

/// Errors loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// File that failed.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The config file is not valid YAML for this schema.
    #[error("failed to parse config {path}: {source}")]
    Parse {
        /// File that failed.
        path: String,
        /// Underlying error.
        source: serde_yaml::Error,
    },

    /// An environment override was not a valid value.
    #[error("invalid value for {var}: {value:?}")]
    InvalidEnv {
        /// Variable name.
        var: &'static str,
        /// Offending value.
        value: String,
    },
}

/// Workflow policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LifecycleConfig {
    /// Whole days after delivery before the scheduler may complete an
    /// order the buyer has not acted on.
    pub auto_complete_days: u32,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            auto_complete_days: DEFAULT_AUTO_COMPLETE_DAYS,
        }
    }
}

impl LifecycleConfig {
    /// Load from `path` (if given), then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        base.with_env_overrides(|var| std::env::var(var).ok())
    }

    /// Parse a YAML config file. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Parse YAML text. An empty document yields the defaults.
    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }

    /// Apply overrides from `lookup` (normally the process environment).
    pub fn with_env_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(value) = lookup(AUTO_COMPLETE_DAYS_ENV) {
            self.auto_complete_days =
                value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                    var: AUTO_COMPLETE_DAYS_ENV,
                    value,
                })?;
        }
        Ok(self)
    }
}
