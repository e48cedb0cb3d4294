//! Library half of the `permit` binary: argument parsing, the simulated
//! host, and the subcommands.

pub mod cli;
pub mod commands;
pub mod host;
pub mod logging;
pub mod output;
