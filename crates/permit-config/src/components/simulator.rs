//! Simulated host configuration
//!
//! Drives the CLI's in-process host: which permissions start out granted and
//! how the simulated user answers each prompt.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Simulated host settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// Delay before the simulated user answers a prompt
    #[serde(default = "default_response_delay")]
    pub response_delay_ms: u64,
    /// Permissions granted before any prompt is shown
    #[serde(default)]
    pub granted: Vec<String>,
    /// Per-permission answers
    #[serde(default)]
    pub decisions: BTreeMap<String, bool>,
    /// Answer for permissions without an entry in `decisions`
    #[serde(default)]
    pub default_decision: bool,
}

fn default_response_delay() -> u64 {
    50
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            response_delay_ms: default_response_delay(),
            granted: Vec::new(),
            decisions: BTreeMap::new(),
            default_decision: false,
        }
    }
}

impl SimulatorConfig {
    /// How the simulated user answers a prompt for `permission`.
    pub fn decision_for(&self, permission: &str) -> bool {
        self.decisions
            .get(permission)
            .copied()
            .unwrap_or(self.default_decision)
    }
}
