//! Loading configuration from disk or strings

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::{ConfigError, ConfigResult, PermitConfig};

/// Serialisation formats understood by the loader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML document
    Toml,
    /// JSON document
    Json,
}

impl ConfigFormat {
    /// Pick a format from a file extension.
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(Self::Toml),
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Self::Json),
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => Err(ConfigError::UnsupportedFormat(format!(
                "{} has no extension",
                path.display()
            ))),
        }
    }
}

/// Entry points for obtaining a [`PermitConfig`]
pub struct ConfigLoader;

impl ConfigLoader {
    /// Default location: `<config_dir>/permit/config.toml`
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("permit")
            .join("config.toml")
    }

    /// Parse and validate a config document.
    pub fn load_from_str(text: &str, format: ConfigFormat) -> ConfigResult<PermitConfig> {
        let config: PermitConfig = match format {
            ConfigFormat::Toml => toml::from_str(text)?,
            ConfigFormat::Json => serde_json::from_str(text)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a config file.
    pub async fn load_from_file(path: impl AsRef<Path>) -> ConfigResult<PermitConfig> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        debug!(path = %path.display(), ?format, "Loaded config file");
        Self::load_from_str(&text, format)
    }

    /// Load `path` if given, else the default path if it exists, else defaults.
    pub async fn load_or_default(path: Option<&Path>) -> ConfigResult<PermitConfig> {
        if let Some(path) = path {
            return Self::load_from_file(path).await;
        }

        let default = Self::default_path();
        if tokio::fs::try_exists(&default).await.unwrap_or(false) {
            Self::load_from_file(&default).await
        } else {
            debug!(path = %default.display(), "No config file, using defaults");
            Ok(PermitConfig::default())
        }
    }
}
