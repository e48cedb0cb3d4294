//! Logging configuration

use serde::{Deserialize, Serialize};

use crate::{ConfigError, ConfigResult};

const LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Logging settings for binaries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level; `RUST_LOG` still takes precedence
    #[serde(default = "default_level")]
    pub level: String,
    /// Output format
    #[serde(default)]
    pub format: LogFormat,
}

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LogFormat {
    /// Compact single-line text
    #[serde(rename = "text")]
    #[default]
    Text,
    /// One JSON object per line
    #[serde(rename = "json")]
    Json,
    /// Multi-line human readable
    #[serde(rename = "pretty")]
    Pretty,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::Text,
        }
    }
}

impl LoggingConfig {
    /// Reject levels `tracing` does not understand.
    pub fn validate(&self) -> ConfigResult<()> {
        let level = self.level.to_ascii_lowercase();
        if LEVELS.contains(&level.as_str()) {
            Ok(())
        } else {
            Err(ConfigError::Invalid(format!(
                "logging.level must be one of {}, got '{}'",
                LEVELS.join("/"),
                self.level
            )))
        }
    }
}
