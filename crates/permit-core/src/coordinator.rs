//! The permission request coordinator.
//!
//! All mutation of the single-flight ledger and the batch slot happens under
//! one mutex, held only for map lookups and inserts. Prompts are launched
//! after the lock is released, and callers await their result with no lock
//! held.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use permit_core::testing::{MockHost, MockOracle};
//! use permit_core::{CoordinatorConfig, PermissionCoordinator};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let host = MockHost::new();
//! let oracle = Arc::new(MockOracle::new());
//! let coordinator = PermissionCoordinator::for_host(oracle, &host, CoordinatorConfig::default());
//!
//! // Concurrent callers share one prompt
//! let (a, b, ()) = tokio::join!(
//!     coordinator.request("camera"),
//!     coordinator.request("camera"),
//!     async {
//!         tokio::task::yield_now().await;
//!         host.launcher.take_single("camera").unwrap().resolve(true);
//!     },
//! );
//! assert_eq!(a, Ok(true));
//! assert_eq!(b, Ok(true));
//! assert_eq!(host.launcher.single_launches().len(), 1);
//! # }
//! ```

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use permit_config::{CoordinatorConfig, DroppedReplyPolicy};

use crate::batch::{BatchId, BatchOutcome, BatchRequest, BatchSlot};
use crate::error::{PermitError, Result};
use crate::ledger::{self, Admission, RoundId, SingleFlightLedger, Waiter, WaiterId};
use crate::lifecycle::HostLifecycle;
use crate::permission::{dedup, Permission, PermissionResults};
use crate::reply::{BatchReply, SingleReply};
use crate::traits::{HostBinding, PromptLauncher, StatusOracle};

/// Mutable coordination state, guarded by [`Inner::state`].
#[derive(Default)]
struct CoordinatorState {
    ledger: SingleFlightLedger,
    batch: BatchSlot,
    next_id: u64,
}

impl CoordinatorState {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

pub(crate) struct Inner {
    oracle: Arc<dyn StatusOracle>,
    launcher: RwLock<Option<Arc<dyn PromptLauncher>>>,
    state: Mutex<CoordinatorState>,
    torn_down: AtomicBool,
    lifecycle_watch: Mutex<Option<JoinHandle<()>>>,
    config: CoordinatorConfig,
}

impl Inner {
    fn is_torn_down(&self) -> bool {
        self.torn_down.load(Ordering::Acquire)
    }

    fn ready_launcher(&self) -> Result<Arc<dyn PromptLauncher>> {
        if self.is_torn_down() {
            return Err(PermitError::NotReady);
        }
        let launcher = self.launcher.read().clone().ok_or(PermitError::NotReady)?;
        if !launcher.is_attached() {
            return Err(PermitError::HostDetached);
        }
        Ok(launcher)
    }

    fn statuses(&self, permissions: &[Permission]) -> PermissionResults {
        permissions
            .iter()
            .map(|p| (p.clone(), self.oracle.is_granted(p)))
            .collect()
    }

    /// Resolve the open round for `permission`, or only `round` when given.
    pub(crate) fn resolve_single(
        &self,
        permission: &str,
        round: Option<RoundId>,
        granted: bool,
    ) -> usize {
        let waiters = {
            let mut state = self.state.lock();
            match round {
                Some(round) => state.ledger.take_if(permission, round),
                None => state.ledger.take(permission),
            }
        };
        let Some(waiters) = waiters else {
            debug!(
                permission = %permission,
                round = ?round,
                "No waiters for permission result, discarding"
            );
            return 0;
        };

        let delivered = ledger::deliver(waiters, granted);
        debug!(
            permission = %permission,
            granted,
            delivered,
            "Resolved permission prompt"
        );
        delivered
    }

    /// Resolve the batch identified by `id`, or whichever batch is active when `None`.
    pub(crate) fn resolve_batch(&self, id: Option<BatchId>, results: PermissionResults) -> bool {
        let request = {
            let mut state = self.state.lock();
            match id {
                Some(id) => state.batch.take_if(id),
                None => state.batch.take(),
            }
        };
        let Some(request) = request else {
            debug!(batch_id = ?id, "No matching batch for result, discarding");
            return false;
        };

        let results = self.complete_batch(&request.permissions, results);
        debug!(batch_id = request.id, results = ?results, "Resolved batch prompt");
        request.tx.send(BatchOutcome::Resolved(results)).is_ok()
    }

    fn complete_batch(
        &self,
        permissions: &[Permission],
        mut results: PermissionResults,
    ) -> PermissionResults {
        if self.config.complete_batch_results {
            for permission in permissions {
                if !results.contains_key(permission) {
                    let granted = self.oracle.is_granted(permission);
                    results.insert(permission.clone(), granted);
                }
            }
        }
        results
    }

    /// Outcome used when a reply handle is dropped unanswered.
    pub(crate) fn dropped_reply_outcome(&self, permission: &Permission) -> bool {
        match self.config.dropped_reply {
            DroppedReplyPolicy::QueryOracle => self.oracle.is_granted(permission),
            DroppedReplyPolicy::Deny => false,
        }
    }

    fn withdraw_waiter(&self, permission: &Permission, id: WaiterId) {
        let remaining = self.state.lock().ledger.withdraw(permission.as_str(), id);
        match remaining {
            Some(0) => debug!(
                permission = %permission,
                "Last waiter cancelled, closing in-flight entry"
            ),
            Some(remaining) => debug!(permission = %permission, remaining, "Waiter cancelled"),
            None => {}
        }
    }

    fn withdraw_batch(&self, id: BatchId) {
        if self.state.lock().batch.take_if(id).is_some() {
            debug!(batch_id = id, "Batch request cancelled");
        }
    }

    pub(crate) fn teardown(&self) {
        if self.torn_down.swap(true, Ordering::AcqRel) {
            return;
        }

        let launcher = self.launcher.write().take();
        let (waiters, batch) = {
            let mut state = self.state.lock();
            (state.ledger.drain(), state.batch.take())
        };
        let cancelled = waiters.len();
        let had_batch = batch.is_some();

        // Dropping the senders wakes every waiter with a cancellation.
        drop(waiters);
        drop(batch);

        if let Some(watch) = self.lifecycle_watch.lock().take() {
            watch.abort();
        }
        drop(launcher);

        info!(
            cancelled_waiters = cancelled,
            cancelled_batch = had_batch,
            "Permission coordinator torn down"
        );
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(watch) = self.lifecycle_watch.get_mut().take() {
            watch.abort();
        }
    }
}

/// Removes a waiter from the ledger if its caller stops waiting.
struct WaiterGuard<'a> {
    inner: &'a Inner,
    permission: Permission,
    id: WaiterId,
    armed: bool,
}

impl WaiterGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for WaiterGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.inner.withdraw_waiter(&self.permission, self.id);
        }
    }
}

/// Clears the batch slot if its caller stops waiting.
struct BatchGuard<'a> {
    inner: &'a Inner,
    id: BatchId,
    armed: bool,
}

impl BatchGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for BatchGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.inner.withdraw_batch(self.id);
        }
    }
}

/// Point-in-time view of outstanding work.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PendingSnapshot {
    /// Waiter count per permission with an open prompt.
    pub singles: BTreeMap<Permission, usize>,
    /// Permissions covered by the active batch, if any.
    pub batch: Option<Vec<Permission>>,
    pub torn_down: bool,
}

impl PendingSnapshot {
    pub fn is_idle(&self) -> bool {
        self.singles.is_empty() && self.batch.is_none()
    }
}

/// Coordinates permission prompts for one host.
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct PermissionCoordinator {
    inner: Arc<Inner>,
}

impl PermissionCoordinator {
    /// Create an unwired coordinator. Requests fail with
    /// [`PermitError::NotReady`] until a launcher is attached.
    pub fn new(oracle: Arc<dyn StatusOracle>) -> Self {
        Self::builder(oracle).build()
    }

    pub fn builder(oracle: Arc<dyn StatusOracle>) -> CoordinatorBuilder {
        CoordinatorBuilder {
            oracle,
            launcher: None,
            lifecycle: None,
            config: CoordinatorConfig::default(),
        }
    }

    /// Build a coordinator wired to `host`'s launcher and bound to its lifecycle.
    ///
    /// Must be called within a Tokio runtime.
    pub fn for_host<H: HostBinding + ?Sized>(
        oracle: Arc<dyn StatusOracle>,
        host: &H,
        config: CoordinatorConfig,
    ) -> Self {
        Self::builder(oracle)
            .launcher(host.launcher())
            .lifecycle(host.lifecycle())
            .config(config)
            .build()
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.inner.config
    }

    /// Wire the prompt launcher. Rejected once torn down.
    pub fn attach_launcher(&self, launcher: Arc<dyn PromptLauncher>) -> Result<()> {
        if self.inner.is_torn_down() {
            return Err(PermitError::NotReady);
        }
        *self.inner.launcher.write() = Some(launcher);
        debug!("Prompt launcher attached");
        Ok(())
    }

    /// Unwire the launcher. Prompts already in flight still resolve.
    pub fn detach_launcher(&self) -> Option<Arc<dyn PromptLauncher>> {
        let launcher = self.inner.launcher.write().take();
        if launcher.is_some() {
            debug!("Prompt launcher detached");
        }
        launcher
    }

    pub fn is_ready(&self) -> bool {
        self.inner.ready_launcher().is_ok()
    }

    /// Tear down when `lifecycle` is destroyed.
    ///
    /// Replaces any previous binding. Must be called within a Tokio runtime.
    pub fn bind_lifecycle(&self, lifecycle: &HostLifecycle) {
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let destroyed = lifecycle.clone();
        let watch = tokio::spawn(async move {
            destroyed.destroyed().await;
            if let Some(inner) = weak.upgrade() {
                debug!("Host lifecycle destroyed");
                inner.teardown();
            }
        });

        if let Some(previous) = self.inner.lifecycle_watch.lock().replace(watch) {
            previous.abort();
        }
    }

    /// Current oracle status. No locking, no side effects.
    pub fn is_granted(&self, permission: &str) -> bool {
        self.inner.oracle.is_granted(&Permission::from(permission))
    }

    /// Oracle status for each distinct key in `permissions`.
    pub fn are_granted<I, P>(&self, permissions: I) -> PermissionResults
    where
        I: IntoIterator<Item = P>,
        P: Into<Permission>,
    {
        permissions
            .into_iter()
            .map(|p| {
                let p: Permission = p.into();
                let granted = self.inner.oracle.is_granted(&p);
                (p, granted)
            })
            .collect()
    }

    /// Request one permission, sharing any prompt already in flight for it.
    ///
    /// Returns `Ok(true)` without prompting if already granted. Dropping the
    /// returned future withdraws this caller only.
    pub async fn request(&self, permission: impl Into<Permission>) -> Result<bool> {
        let permission = permission.into();
        let launcher = self.inner.ready_launcher()?;

        if self.inner.oracle.is_granted(&permission) {
            debug!(permission = %permission, "Permission already granted");
            return Ok(true);
        }

        let (rx, guard, admission) = {
            let mut state = self.inner.state.lock();
            if self.inner.is_torn_down() {
                return Err(PermitError::NotReady);
            }
            if self.inner.oracle.is_granted(&permission) {
                debug!(permission = %permission, "Permission granted while acquiring lock");
                return Ok(true);
            }

            let id = state.next_id();
            let (tx, rx) = oneshot::channel();
            let admission = state.ledger.admit(&permission, Waiter::new(id, tx));
            let guard = WaiterGuard {
                inner: &self.inner,
                permission: permission.clone(),
                id,
                armed: true,
            };
            (rx, guard, admission)
        };

        match admission {
            Admission::Opened { round } if self.inner.is_torn_down() => {
                debug!(permission = %permission, round, "Torn down before launch, skipping prompt");
            }
            Admission::Opened { round } => {
                info!(permission = %permission, round, "Launching permission prompt");
                let reply =
                    SingleReply::new(Arc::downgrade(&self.inner), permission.clone(), round);
                launcher.launch_single(&permission, reply);
            }
            Admission::Joined { waiters } => {
                debug!(permission = %permission, waiters, "Joined in-flight permission prompt");
            }
        }
        drop(launcher);

        let outcome = rx.await;
        guard.disarm();
        outcome.map_err(|_| PermitError::Cancelled)
    }

    /// Request several permissions through one combined prompt.
    ///
    /// Batches do not share prompts with single requests or with each other.
    /// A newer batch displaces a pending one, which then fails with
    /// [`PermitError::Superseded`].
    pub async fn request_batch<I, P>(&self, permissions: I) -> Result<PermissionResults>
    where
        I: IntoIterator<Item = P>,
        P: Into<Permission>,
    {
        let permissions = dedup(permissions);
        if permissions.is_empty() {
            return Ok(PermissionResults::new());
        }

        let launcher = self.inner.ready_launcher()?;
        let statuses = self.inner.statuses(&permissions);
        if statuses.values().all(|granted| *granted) {
            debug!(permissions = ?permissions, "All batch permissions already granted");
            return Ok(statuses);
        }

        let (rx, guard, id) = {
            let mut state = self.inner.state.lock();
            if self.inner.is_torn_down() {
                return Err(PermitError::NotReady);
            }
            let statuses = self.inner.statuses(&permissions);
            if statuses.values().all(|granted| *granted) {
                return Ok(statuses);
            }

            let id = state.next_id();
            let (tx, rx) = oneshot::channel();
            let displaced = state.batch.occupy(BatchRequest {
                id,
                permissions: permissions.clone(),
                tx,
            });
            if let Some(displaced) = displaced {
                warn!(
                    batch_id = displaced.id,
                    superseded_by = id,
                    "Pending batch request superseded"
                );
                let _ = displaced.tx.send(BatchOutcome::Superseded);
            }

            let guard = BatchGuard {
                inner: &self.inner,
                id,
                armed: true,
            };
            (rx, guard, id)
        };

        if self.inner.is_torn_down() {
            debug!(batch_id = id, "Torn down before launch, skipping batch prompt");
        } else {
            info!(batch_id = id, permissions = ?permissions, "Launching batch permission prompt");
            let reply = BatchReply::new(Arc::downgrade(&self.inner), id, permissions.clone());
            launcher.launch_batch(&permissions, reply);
        }
        drop(launcher);

        let outcome = rx.await;
        guard.disarm();
        match outcome {
            Ok(BatchOutcome::Resolved(results)) => Ok(results),
            Ok(BatchOutcome::Superseded) => Err(PermitError::Superseded),
            Err(_) => Err(PermitError::Cancelled),
        }
    }

    /// Deliver a result for `permission` to every waiter sharing its prompt.
    ///
    /// Returns how many waiters received it; zero means the result was
    /// orphaned and discarded.
    /// Hosts holding a [`SingleReply`] should answer through it instead; this
    /// resolves whichever round is open for the key.
    pub fn resolve_single(&self, permission: &str, granted: bool) -> usize {
        self.inner.resolve_single(permission, None, granted)
    }

    /// Deliver results to whichever batch is active. Returns `false` if none was.
    pub fn resolve_batch<I, P>(&self, results: I) -> bool
    where
        I: IntoIterator<Item = (P, bool)>,
        P: Into<Permission>,
    {
        let results: PermissionResults = results.into_iter().map(|(p, g)| (p.into(), g)).collect();
        self.inner.resolve_batch(None, results)
    }

    /// Cancel all outstanding work and refuse further requests.
    ///
    /// Idempotent. Invoked automatically when a bound lifecycle is destroyed.
    pub fn teardown(&self) {
        self.inner.teardown();
    }

    pub fn is_torn_down(&self) -> bool {
        self.inner.is_torn_down()
    }

    pub fn waiter_count(&self, permission: &str) -> usize {
        self.inner.state.lock().ledger.waiter_count(permission)
    }

    pub fn pending_permissions(&self) -> Vec<Permission> {
        let state = self.inner.state.lock();
        let mut pending: Vec<Permission> = state
            .ledger
            .iter_counts()
            .map(|(p, _)| p.clone())
            .collect();
        pending.sort();
        pending
    }

    pub fn has_pending_batch(&self) -> bool {
        self.inner.state.lock().batch.is_occupied()
    }

    pub fn snapshot(&self) -> PendingSnapshot {
        let state = self.inner.state.lock();
        PendingSnapshot {
            singles: state
                .ledger
                .iter_counts()
                .map(|(p, n)| (p.clone(), n))
                .collect(),
            batch: state.batch.permissions().map(<[Permission]>::to_vec),
            torn_down: self.inner.is_torn_down(),
        }
    }
}

impl std::fmt::Debug for PermissionCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionCoordinator")
            .field("ready", &self.is_ready())
            .field("pending", &self.snapshot())
            .finish()
    }
}

/// Explicit construction of a [`PermissionCoordinator`].
pub struct CoordinatorBuilder {
    oracle: Arc<dyn StatusOracle>,
    launcher: Option<Arc<dyn PromptLauncher>>,
    lifecycle: Option<HostLifecycle>,
    config: CoordinatorConfig,
}

impl CoordinatorBuilder {
    pub fn launcher(mut self, launcher: Arc<dyn PromptLauncher>) -> Self {
        self.launcher = Some(launcher);
        self
    }

    /// Bind to a host lifecycle. `build` then requires a Tokio runtime.
    pub fn lifecycle(mut self, lifecycle: HostLifecycle) -> Self {
        self.lifecycle = Some(lifecycle);
        self
    }

    pub fn config(mut self, config: CoordinatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> PermissionCoordinator {
        let coordinator = PermissionCoordinator {
            inner: Arc::new(Inner {
                oracle: self.oracle,
                launcher: RwLock::new(self.launcher),
                state: Mutex::new(CoordinatorState::default()),
                torn_down: AtomicBool::new(false),
                lifecycle_watch: Mutex::new(None),
                config: self.config,
            }),
        };

        if let Some(lifecycle) = &self.lifecycle {
            coordinator.bind_lifecycle(lifecycle);
        }
        coordinator
    }
}
