//! Error types for permission coordination

use thiserror::Error;

/// Result type alias for coordinator operations
pub type Result<T> = std::result::Result<T, PermitError>;

/// Errors surfaced to callers of the coordinator.
///
/// None of these is a permission outcome. A denied permission is `Ok(false)`;
/// these mean the caller never got an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PermitError {
    /// No prompt launcher is wired, or the coordinator was torn down
    #[error("Permission coordinator is not ready: no prompt launcher attached")]
    NotReady,

    /// The waiting caller was cancelled before a result arrived
    #[error("Permission request was cancelled")]
    Cancelled,

    /// The launcher exists but its host is not currently attached
    #[error("Permission host is detached")]
    HostDetached,

    /// A newer batch request took over the batch slot
    #[error("Batch permission request was superseded by a newer batch")]
    Superseded,
}

impl PermitError {
    /// True for outcomes that mean "the caller stopped waiting".
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Superseded)
    }
}
