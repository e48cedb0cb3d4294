//! Reply handles given to the prompt launcher.
//!
//! Each launch gets exactly one handle. Resolving consumes it, so a launch
//! can answer at most once. A handle dropped without answering still
//! completes its waiters, using the configured [`crate::DroppedReplyPolicy`].

use std::fmt;
use std::sync::Weak;
use tracing::warn;

use crate::batch::BatchId;
use crate::coordinator::Inner;
use crate::ledger::RoundId;
use crate::permission::{Permission, PermissionResults};

/// Answer channel for a single-permission prompt.
///
/// Tied to the prompt round it was launched for. If every waiter of that
/// round has gone and a newer round has opened for the same permission,
/// the answer is discarded rather than delivered to the newer callers.
#[must_use = "dropping a reply resolves the prompt with the dropped-reply policy"]
pub struct SingleReply {
    inner: Weak<Inner>,
    permission: Permission,
    round: RoundId,
    answered: bool,
}

impl SingleReply {
    pub(crate) fn new(inner: Weak<Inner>, permission: Permission, round: RoundId) -> Self {
        Self {
            inner,
            permission,
            round,
            answered: false,
        }
    }

    pub fn permission(&self) -> &Permission {
        &self.permission
    }

    /// Deliver the user's answer to every caller waiting on this permission.
    pub fn resolve(mut self, granted: bool) {
        self.answered = true;
        if let Some(inner) = self.inner.upgrade() {
            inner.resolve_single(self.permission.as_str(), Some(self.round), granted);
        }
    }
}

impl Drop for SingleReply {
    fn drop(&mut self) {
        if self.answered {
            return;
        }
        if let Some(inner) = self.inner.upgrade() {
            let granted = inner.dropped_reply_outcome(&self.permission);
            warn!(
                permission = %self.permission,
                round = self.round,
                granted,
                "Permission prompt reply dropped without an answer"
            );
            inner.resolve_single(self.permission.as_str(), Some(self.round), granted);
        }
    }
}

impl fmt::Debug for SingleReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingleReply")
            .field("permission", &self.permission)
            .field("round", &self.round)
            .finish()
    }
}

/// Answer channel for a combined multi-permission prompt.
///
/// Only resolves the batch it was launched for; if that batch has since been
/// superseded or cancelled the answer is discarded.
#[must_use = "dropping a reply resolves the prompt with the dropped-reply policy"]
pub struct BatchReply {
    inner: Weak<Inner>,
    batch_id: BatchId,
    permissions: Vec<Permission>,
    answered: bool,
}

impl BatchReply {
    pub(crate) fn new(inner: Weak<Inner>, batch_id: BatchId, permissions: Vec<Permission>) -> Self {
        Self {
            inner,
            batch_id,
            permissions,
            answered: false,
        }
    }

    pub fn permissions(&self) -> &[Permission] {
        &self.permissions
    }

    pub fn resolve<I, P>(mut self, results: I)
    where
        I: IntoIterator<Item = (P, bool)>,
        P: Into<Permission>,
    {
        self.answered = true;
        if let Some(inner) = self.inner.upgrade() {
            let results: PermissionResults =
                results.into_iter().map(|(p, g)| (p.into(), g)).collect();
            inner.resolve_batch(Some(self.batch_id), results);
        }
    }
}

impl Drop for BatchReply {
    fn drop(&mut self) {
        if self.answered {
            return;
        }
        if let Some(inner) = self.inner.upgrade() {
            let results: PermissionResults = self
                .permissions
                .iter()
                .map(|p| (p.clone(), inner.dropped_reply_outcome(p)))
                .collect();
            warn!(
                batch_id = self.batch_id,
                "Batch prompt reply dropped without an answer"
            );
            inner.resolve_batch(Some(self.batch_id), results);
        }
    }
}

impl fmt::Debug for BatchReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchReply")
            .field("batch_id", &self.batch_id)
            .field("permissions", &self.permissions)
            .finish()
    }
}
