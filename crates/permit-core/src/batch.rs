//! The batch slot: at most one combined prompt in flight per coordinator.

use tokio::sync::oneshot;

use crate::permission::{Permission, PermissionResults};

pub(crate) type BatchId = u64;

/// What the waiting batch caller receives.
#[derive(Debug)]
pub(crate) enum BatchOutcome {
    Resolved(PermissionResults),
    Superseded,
}

pub(crate) struct BatchRequest {
    pub(crate) id: BatchId,
    pub(crate) permissions: Vec<Permission>,
    pub(crate) tx: oneshot::Sender<BatchOutcome>,
}

#[derive(Default)]
pub(crate) struct BatchSlot {
    active: Option<BatchRequest>,
}

impl BatchSlot {
    /// Install `request`, returning whichever batch it displaced.
    pub(crate) fn occupy(&mut self, request: BatchRequest) -> Option<BatchRequest> {
        self.active.replace(request)
    }

    pub(crate) fn take(&mut self) -> Option<BatchRequest> {
        self.active.take()
    }

    /// Take the active batch only if it is the one identified by `id`.
    pub(crate) fn take_if(&mut self, id: BatchId) -> Option<BatchRequest> {
        if self.active.as_ref().is_some_and(|r| r.id == id) {
            self.active.take()
        } else {
            None
        }
    }

    pub(crate) fn permissions(&self) -> Option<&[Permission]> {
        self.active.as_ref().map(|r| r.permissions.as_slice())
    }

    pub(crate) fn is_occupied(&self) -> bool {
        self.active.is_some()
    }
}
