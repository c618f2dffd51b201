// ABOUTME: Reconciliation controller for platform lifecycle events.
// ABOUTME: Decides statuses, spec submissions, and deferrals from freshly observed state.

mod dispatcher;
mod error;
mod event;
mod handlers;
mod reconciliation;

pub use dispatcher::{DispatchReport, Dispatcher};
pub use error::{ControllerError, ControllerErrorKind};
pub use event::{Event, EventKind, HandlerPath};
pub use handlers::Controller;
pub use reconciliation::{Outcome, Reconciliation, Submission};
