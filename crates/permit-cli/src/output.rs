//! Text and JSON rendering of command results.

use colored::Colorize;
use permit_core::PermitError;
use serde::Serialize;

/// One caller's outcome, flattened for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Granted,
    Denied,
    Cancelled,
    Superseded,
    NotReady,
    HostDetached,
}

impl From<Result<bool, PermitError>> for Outcome {
    fn from(result: Result<bool, PermitError>) -> Self {
        match result {
            Ok(true) => Self::Granted,
            Ok(false) => Self::Denied,
            Err(PermitError::Cancelled) => Self::Cancelled,
            Err(PermitError::Superseded) => Self::Superseded,
            Err(PermitError::NotReady) => Self::NotReady,
            Err(PermitError::HostDetached) => Self::HostDetached,
        }
    }
}

impl Outcome {
    pub fn label(self) -> &'static str {
        match self {
            Self::Granted => "granted",
            Self::Denied => "denied",
            Self::Cancelled => "cancelled",
            Self::Superseded => "superseded",
            Self::NotReady => "not ready",
            Self::HostDetached => "host detached",
        }
    }

    pub fn colored(self) -> String {
        let label = self.label();
        match self {
            Self::Granted => label.green().to_string(),
            Self::Denied => label.red().to_string(),
            _ => label.yellow().to_string(),
        }
    }
}

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
