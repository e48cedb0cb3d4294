use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;

use permit_cli::{
    cli::{Cli, Commands},
    commands, logging,
};
use permit_config::ConfigLoader;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ConfigLoader::load_or_default(cli.config.as_deref())
        .await
        .context("failed to load configuration")?;

    logging::init(&config.logging, cli.verbose)?;
    debug!(config = ?config, "Configuration loaded");

    match cli.command {
        Commands::Check { permissions } => {
            commands::check::execute(config, permissions, cli.json).await?
        }
        Commands::Request {
            permissions,
            callers,
        } => commands::request::execute(config, permissions, callers, cli.json).await?,
        Commands::Batch {
            permissions,
            callers,
        } => commands::batch::execute(config, permissions, callers, cli.json).await?,
    }

    Ok(())
}
