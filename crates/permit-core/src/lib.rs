//! Coordination engine for host-mediated runtime permission prompts.
//!
//! The host owns the actual dialog; this crate decides *when* a dialog is
//! launched and who gets the answer. Concurrent callers asking for the same
//! permission share one in-flight prompt, callers suspend until the host
//! replies, and cancellation of one caller never disturbs the others.
//!
//! # Pieces
//!
//! - [`StatusOracle`] - synchronous "is this already granted?" check
//! - [`PromptLauncher`] - fire-and-forget prompt launch, answered later
//!   through a [`SingleReply`] or [`BatchReply`]
//! - [`PermissionCoordinator`] - the engine callers talk to
//! - [`HostLifecycle`] - teardown signal from the host
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use permit_core::testing::{MockOracle, RecordingLauncher};
//! use permit_core::PermissionCoordinator;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let oracle = Arc::new(MockOracle::new());
//! let launcher = Arc::new(RecordingLauncher::new());
//! let coordinator = PermissionCoordinator::builder(oracle.clone())
//!     .launcher(launcher.clone())
//!     .build();
//!
//! oracle.grant("camera");
//! assert!(coordinator.request("camera").await.unwrap());
//! assert!(launcher.single_launches().is_empty());
//! # }
//! ```

mod batch;
pub mod coordinator;
pub mod error;
mod ledger;
pub mod lifecycle;
pub mod permission;
pub mod reply;
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;
pub mod traits;

pub use coordinator::{CoordinatorBuilder, PendingSnapshot, PermissionCoordinator};
pub use error::{PermitError, Result};
pub use lifecycle::HostLifecycle;
pub use permission::{Permission, PermissionResults};
pub use reply::{BatchReply, SingleReply};
pub use traits::{HostBinding, PromptLauncher, StatusOracle};

pub use permit_config::{CoordinatorConfig, DroppedReplyPolicy};
