//! # Permit Configuration Library
//!
//! Type-safe configuration for the permission coordinator and the tools
//! built around it.
//!
//! ## Features
//!
//! - TOML and JSON support, selected by file extension
//! - Defaults for every section, so an empty file is a valid config
//! - Validation of values that serde alone cannot check
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use permit_config::ConfigLoader;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigLoader::load_from_file("permit.toml").await?;
//!     println!("log level: {}", config.logging.level);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod components;
mod error;
mod loader;

pub use components::*;
pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigFormat, ConfigLoader};

use serde::{Deserialize, Serialize};

/// Root configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PermitConfig {
    /// Coordination engine behaviour.
    pub coordinator: CoordinatorConfig,
    /// Logging output for binaries.
    pub logging: LoggingConfig,
    /// Simulated host used by the CLI.
    pub simulator: SimulatorConfig,
}

impl PermitConfig {
    /// Check values that cannot be expressed in the type system.
    pub fn validate(&self) -> ConfigResult<()> {
        self.logging.validate()
    }
}
