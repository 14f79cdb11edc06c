//! Process-level settings consumed by the core.
//!
//! # Responsibility
//! - Collect logging and store settings from the environment.
//! - Validate values once, at startup, instead of at first use.
//!
//! # Invariants
//! - Unset variables fall back to defaults; set-but-invalid ones are errors.

use crate::db::StoreOptions;
use crate::logging::{default_log_level, normalize_level};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_LOG_LEVEL: &str = "RNAQUANT_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "RNAQUANT_LOG_DIR";
pub const ENV_BUSY_TIMEOUT_MS: &str = "RNAQUANT_BUSY_TIMEOUT_MS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid {} `{}`: {}", self.key, self.value, self.reason)
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub log_level: String,
    /// Absolute directory for rolling log files; `None` disables file logs.
    pub log_dir: Option<PathBuf>,
    pub busy_timeout: Duration,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level().to_string(),
            log_dir: None,
            busy_timeout: StoreOptions::default().busy_timeout,
        }
    }
}

impl CoreConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from `lookup`, which maps variable names to values.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = non_blank(lookup(ENV_LOG_LEVEL)) {
            let level = normalize_level(&value).map_err(|reason| ConfigError {
                key: ENV_LOG_LEVEL,
                value: value.clone(),
                reason,
            })?;
            config.log_level = level.to_string();
        }

        if let Some(value) = non_blank(lookup(ENV_LOG_DIR)) {
            let dir = PathBuf::from(value.trim());
            if !dir.is_absolute() {
                return Err(ConfigError {
                    key: ENV_LOG_DIR,
                    value,
                    reason: "must be an absolute path".to_string(),
                });
            }
            config.log_dir = Some(dir);
        }

        if let Some(value) = non_blank(lookup(ENV_BUSY_TIMEOUT_MS)) {
            let millis = value.trim().parse::<u64>().map_err(|err| ConfigError {
                key: ENV_BUSY_TIMEOUT_MS,
                value: value.clone(),
                reason: err.to_string(),
            })?;
            config.busy_timeout = Duration::from_millis(millis);
        }

        Ok(config)
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            busy_timeout: self.busy_timeout,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|item| !item.trim().is_empty())
}
