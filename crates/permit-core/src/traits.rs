//! Host-facing seams: status oracle, prompt launcher, host binding.

use std::sync::Arc;

use crate::lifecycle::HostLifecycle;
use crate::permission::Permission;
use crate::reply::{BatchReply, SingleReply};

/// Synchronous, side-effect-free permission status check.
///
/// Called repeatedly and concurrently, sometimes while the coordinator holds
/// its lock, so implementations must not block or call back into the
/// coordinator.
pub trait StatusOracle: Send + Sync {
    fn is_granted(&self, permission: &Permission) -> bool;
}

impl<F> StatusOracle for F
where
    F: Fn(&Permission) -> bool + Send + Sync,
{
    fn is_granted(&self, permission: &Permission) -> bool {
        self(permission)
    }
}

/// Triggers the host's native prompt UI.
///
/// Launches are fire-and-forget. The host answers later, from any thread,
/// by consuming the reply handle. Dropping a handle unanswered still
/// completes its waiters (see [`crate::DroppedReplyPolicy`]).
pub trait PromptLauncher: Send + Sync {
    /// Show a prompt for one permission.
    fn launch_single(&self, permission: &Permission, reply: SingleReply);

    /// Show one combined prompt covering every permission in `permissions`.
    fn launch_batch(&self, permissions: &[Permission], reply: BatchReply);

    /// Whether the host context needed to show a prompt is currently attached.
    fn is_attached(&self) -> bool {
        true
    }
}

/// A host kind the coordinator can be bound to.
///
/// Each host flavour supplies its launcher and lifecycle; the coordination
/// engine is shared.
pub trait HostBinding {
    fn launcher(&self) -> Arc<dyn PromptLauncher>;

    fn lifecycle(&self) -> HostLifecycle;
}
