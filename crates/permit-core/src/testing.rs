//! Test doubles for the host seams.
//!
//! Available with the `test-utils` feature.

use parking_lot::{Mutex, RwLock};
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::lifecycle::HostLifecycle;
use crate::permission::Permission;
use crate::reply::{BatchReply, SingleReply};
use crate::traits::{HostBinding, PromptLauncher, StatusOracle};

/// Oracle backed by a mutable grant set.
#[derive(Debug, Default)]
pub struct MockOracle {
    granted: RwLock<HashSet<Permission>>,
}

impl MockOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(&self, permission: impl Into<Permission>) {
        self.granted.write().insert(permission.into());
    }

    pub fn revoke(&self, permission: &str) {
        self.granted.write().remove(permission);
    }
}

impl StatusOracle for MockOracle {
    fn is_granted(&self, permission: &Permission) -> bool {
        self.granted.read().contains(permission)
    }
}

/// Launcher that records every launch and parks the reply handles
/// until the test answers them.
#[derive(Debug)]
pub struct RecordingLauncher {
    single_launches: Mutex<Vec<Permission>>,
    batch_launches: Mutex<Vec<Vec<Permission>>>,
    single_replies: Mutex<Vec<SingleReply>>,
    batch_replies: Mutex<VecDeque<BatchReply>>,
    attached: AtomicBool,
}

impl Default for RecordingLauncher {
    fn default() -> Self {
        Self {
            single_launches: Mutex::new(Vec::new()),
            batch_launches: Mutex::new(Vec::new()),
            single_replies: Mutex::new(Vec::new()),
            batch_replies: Mutex::new(VecDeque::new()),
            attached: AtomicBool::new(true),
        }
    }
}

impl RecordingLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_attached(&self, attached: bool) {
        self.attached.store(attached, Ordering::SeqCst);
    }

    /// Every single-permission launch so far, in order.
    pub fn single_launches(&self) -> Vec<Permission> {
        self.single_launches.lock().clone()
    }

    /// Every batch launch so far, in order.
    pub fn batch_launches(&self) -> Vec<Vec<Permission>> {
        self.batch_launches.lock().clone()
    }

    /// Remove the oldest unanswered reply for `permission`.
    pub fn take_single(&self, permission: &str) -> Option<SingleReply> {
        let mut replies = self.single_replies.lock();
        let position = replies
            .iter()
            .position(|r| r.permission().as_str() == permission)?;
        Some(replies.remove(position))
    }

    /// Remove the oldest unanswered batch reply.
    pub fn take_batch(&self) -> Option<BatchReply> {
        self.batch_replies.lock().pop_front()
    }
}

impl PromptLauncher for RecordingLauncher {
    fn launch_single(&self, permission: &Permission, reply: SingleReply) {
        self.single_launches.lock().push(permission.clone());
        self.single_replies.lock().push(reply);
    }

    fn launch_batch(&self, permissions: &[Permission], reply: BatchReply) {
        self.batch_launches.lock().push(permissions.to_vec());
        self.batch_replies.lock().push_back(reply);
    }

    fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }
}

/// A host made of a [`RecordingLauncher`] and a [`HostLifecycle`].
#[derive(Debug, Clone, Default)]
pub struct MockHost {
    pub launcher: Arc<RecordingLauncher>,
    pub lifecycle: HostLifecycle,
}

impl MockHost {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HostBinding for MockHost {
    fn launcher(&self) -> Arc<dyn PromptLauncher> {
        self.launcher.clone()
    }

    fn lifecycle(&self) -> HostLifecycle {
        self.lifecycle.clone()
    }
}
