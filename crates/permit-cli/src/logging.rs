//! Tracing subscriber setup.

use anyhow::{anyhow, Result};
use permit_config::{LogFormat, LoggingConfig};
use tracing_subscriber::EnvFilter;

/// Level for the workspace crates, with `-v` flags overriding the config.
pub fn effective_level(config: &LoggingConfig, verbosity: u8) -> String {
    match verbosity {
        0 => config.level.to_ascii_lowercase(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Install the global subscriber. `RUST_LOG` wins over config and flags.
pub fn init(config: &LoggingConfig, verbosity: u8) -> Result<()> {
    let level = effective_level(config, verbosity);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "permit_core={level},permit_config={level},permit_cli={level}"
        ))
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let installed = match config.format {
        LogFormat::Text => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
    };
    installed.map_err(|e| anyhow!("failed to initialise logging: {e}"))
}
