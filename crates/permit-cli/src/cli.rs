use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "permit")]
#[command(about = "permit - drive the permission coordinator against a simulated host")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file path (defaults to ~/.config/permit/config.toml)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Emit machine-readable JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the current status of each permission without prompting
    Check {
        /// Permission keys
        #[arg(required = true)]
        permissions: Vec<String>,
    },

    /// Request each permission from several concurrent callers
    Request {
        /// Permission keys
        #[arg(required = true)]
        permissions: Vec<String>,

        /// Concurrent callers per permission
        #[arg(short = 'n', long, default_value = "1")]
        callers: usize,
    },

    /// Request all permissions through one combined prompt
    Batch {
        /// Permission keys
        #[arg(required = true)]
        permissions: Vec<String>,

        /// Concurrent batch callers
        #[arg(short = 'n', long, default_value = "1")]
        callers: usize,
    },
}
