//! Coordinator configuration

use serde::{Deserialize, Serialize};

/// What a waiter receives when the host drops a reply handle without answering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DroppedReplyPolicy {
    /// Ask the status oracle and deliver whatever it reports now.
    #[default]
    QueryOracle,
    /// Deliver a denial.
    Deny,
}

/// Coordination engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Fill keys missing from a batch result with the oracle's current status
    #[serde(default = "default_true")]
    pub complete_batch_results: bool,
    /// Outcome for a prompt whose reply handle was dropped unanswered
    #[serde(default)]
    pub dropped_reply: DroppedReplyPolicy,
}

fn default_true() -> bool {
    true
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            complete_batch_results: true,
            dropped_reply: DroppedReplyPolicy::QueryOracle,
        }
    }
}
