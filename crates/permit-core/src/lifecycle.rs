//! Host lifecycle signal.
//!
//! The host owns a [`HostLifecycle`] and calls [`HostLifecycle::destroy`]
//! when the screen or view backing the prompts goes away. A coordinator
//! bound to it (see [`crate::PermissionCoordinator::bind_lifecycle`]) then
//! cancels all outstanding work and refuses new requests.

use tokio_util::sync::CancellationToken;

/// Clonable "tear down now" signal. All clones observe the same destroy.
#[derive(Debug, Clone, Default)]
pub struct HostLifecycle {
    token: CancellationToken,
}

impl HostLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal destruction. Idempotent.
    pub fn destroy(&self) {
        self.token.cancel();
    }

    pub fn is_destroyed(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Completes once [`destroy`](Self::destroy) has been called.
    pub async fn destroyed(&self) {
        self.token.cancelled().await;
    }
}
