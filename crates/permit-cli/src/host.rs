//! In-process stand-in for a real UI host.
//!
//! The oracle is a grant set; the launcher "shows" a prompt by sleeping for
//! the configured delay and then answering per the simulator config. Granted
//! answers are written back to the oracle, as a real OS would.

use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use permit_config::SimulatorConfig;
use permit_core::{
    BatchReply, HostBinding, HostLifecycle, Permission, PermissionResults, PromptLauncher,
    SingleReply, StatusOracle,
};

#[derive(Debug, Default)]
pub struct SimulatedOracle {
    granted: RwLock<HashSet<Permission>>,
}

impl SimulatedOracle {
    pub fn with_granted<I, S>(granted: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Permission>,
    {
        Self {
            granted: RwLock::new(granted.into_iter().map(Into::into).collect()),
        }
    }

    fn record(&self, permission: &Permission, granted: bool) {
        if granted {
            self.granted.write().insert(permission.clone());
        }
    }
}

impl StatusOracle for SimulatedOracle {
    fn is_granted(&self, permission: &Permission) -> bool {
        self.granted.read().contains(permission)
    }
}

pub struct SimulatedLauncher {
    oracle: Arc<SimulatedOracle>,
    config: SimulatorConfig,
    single_prompts: AtomicUsize,
    batch_prompts: AtomicUsize,
}

impl SimulatedLauncher {
    fn delay(&self) -> Duration {
        Duration::from_millis(self.config.response_delay_ms)
    }

    pub fn single_prompts(&self) -> usize {
        self.single_prompts.load(Ordering::SeqCst)
    }

    pub fn batch_prompts(&self) -> usize {
        self.batch_prompts.load(Ordering::SeqCst)
    }
}

impl PromptLauncher for SimulatedLauncher {
    fn launch_single(&self, permission: &Permission, reply: SingleReply) {
        self.single_prompts.fetch_add(1, Ordering::SeqCst);
        let granted = self.config.decision_for(permission.as_str());
        let oracle = self.oracle.clone();
        let permission = permission.clone();
        let delay = self.delay();

        debug!(permission = %permission, granted, "Simulated prompt shown");
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            oracle.record(&permission, granted);
            reply.resolve(granted);
        });
    }

    fn launch_batch(&self, permissions: &[Permission], reply: BatchReply) {
        self.batch_prompts.fetch_add(1, Ordering::SeqCst);
        let results: PermissionResults = permissions
            .iter()
            .map(|p| (p.clone(), self.config.decision_for(p.as_str())))
            .collect();
        let oracle = self.oracle.clone();
        let delay = self.delay();

        debug!(permissions = ?permissions, "Simulated batch prompt shown");
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            for (permission, granted) in &results {
                oracle.record(permission, *granted);
            }
            reply.resolve(results);
        });
    }
}

/// Oracle, launcher, and lifecycle of one simulated screen.
pub struct SimulatedHost {
    pub oracle: Arc<SimulatedOracle>,
    pub launcher: Arc<SimulatedLauncher>,
    pub lifecycle: HostLifecycle,
}

impl SimulatedHost {
    pub fn new(config: &SimulatorConfig) -> Self {
        let oracle = Arc::new(SimulatedOracle::with_granted(config.granted.iter().cloned()));
        let launcher = Arc::new(SimulatedLauncher {
            oracle: oracle.clone(),
            config: config.clone(),
            single_prompts: AtomicUsize::new(0),
            batch_prompts: AtomicUsize::new(0),
        });
        Self {
            oracle,
            launcher,
            lifecycle: HostLifecycle::new(),
        }
    }
}

impl HostBinding for SimulatedHost {
    fn launcher(&self) -> Arc<dyn PromptLauncher> {
        self.launcher.clone()
    }

    fn lifecycle(&self) -> HostLifecycle {
        self.lifecycle.clone()
    }
}
