//! Error types for configuration loading

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading the config file failed
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        /// File that could not be read
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// TOML parse errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON parse errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The file extension does not map to a known format
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    /// A value parsed but is not acceptable
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
