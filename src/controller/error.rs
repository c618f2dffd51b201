// ABOUTME: Controller error types with SNAFU pattern.
// ABOUTME: Only failures that prevent reporting status or tracking deferrals escape a dispatch.

use snafu::Snafu;

use crate::platform::PlatformError;
use crate::store::StoreError;

/// Failures the controller cannot turn into a status.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ControllerError {
    #[snafu(display("failed to report status: {source}"))]
    Status { source: PlatformError },

    #[snafu(display("failed to access deferred events: {source}"))]
    Queue { source: StoreError },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerErrorKind {
    /// The platform status API rejected a write.
    StatusUnavailable,
    /// Persisted state could not be read or written.
    StateUnavailable,
}

impl ControllerError {
    pub fn kind(&self) -> ControllerErrorKind {
        match self {
            ControllerError::Status { .. } => ControllerErrorKind::StatusUnavailable,
            ControllerError::Queue { .. } => ControllerErrorKind::StateUnavailable,
        }
    }
}
