// ABOUTME: Delivers events to the controller, replaying previously deferred ones first.
// ABOUTME: Keeps the persisted deferred queue in sync with handler outcomes.

use serde::Serialize;
use snafu::ResultExt;

use crate::diagnostics::{Diagnostics, Warning};
use crate::platform::Platform;
use crate::probe::ReadinessProbe;
use crate::store::{DeferredEvent, StateStore};

use super::error::{ControllerError, QueueSnafu};
use super::event::{Event, EventKind};
use super::handlers::Controller;
use super::reconciliation::Reconciliation;

/// Result of one dispatch: every handler run, in order, and what remains
/// queued for the next one.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchReport {
    pub handled: Vec<Reconciliation>,
    pub pending: Vec<EventKind>,
}

impl DispatchReport {
    /// The reconciliation of the event that triggered this dispatch.
    pub fn current(&self) -> Option<&Reconciliation> {
        self.handled.last()
    }
}

/// Runs one event per process invocation the way the platform does:
/// deferred events go first, then the newly delivered one.
///
/// A queued event is dropped when the incoming event runs the same
/// handler, since that run observes the same state. An unreadable queue
/// does not stop the incoming event: it runs alone, and the queue error is
/// returned only if rewriting the queue fails too.
#[derive(Debug)]
pub struct Dispatcher<P, S, R> {
    controller: Controller<P, S, R>,
}

impl<P, S, R> Dispatcher<P, S, R>
where
    P: Platform,
    S: StateStore,
    R: ReadinessProbe,
{
    pub fn new(controller: Controller<P, S, R>) -> Self {
        Self { controller }
    }

    pub fn controller(&self) -> &Controller<P, S, R> {
        &self.controller
    }

    pub async fn dispatch(&mut self, event: Event) -> Result<DispatchReport, ControllerError> {
        let incoming = event.kind();
        let mut diagnostics = Diagnostics::default();
        let (queued, queue_readable) = match self.controller.store().deferred().await {
            Ok(queued) => (queued, true),
            Err(e) => {
                diagnostics.warn(Warning::deferred_queue_unreadable(format!(
                    "cannot read deferred events, handling {incoming} alone: {e}"
                )));
                (Vec::new(), false)
            }
        };
        let original = queued.clone();

        let mut handled = Vec::new();
        let mut still_deferred: Vec<DeferredEvent> = Vec::new();

        for entry in queued {
            if entry.kind.path() == incoming.path() {
                tracing::debug!("Dropping deferred {}, superseded by {}", entry.kind, incoming);
                continue;
            }

            tracing::debug!("Replaying deferred {} from {}", entry.kind, entry.deferred_at);
            let replay = Event::from_kind(entry.kind, self.controller.config().clone());
            let reconciliation = self.controller.handle(replay).await?;
            if reconciliation.is_deferred() {
                still_deferred.push(entry);
            }
            handled.push(reconciliation);
        }

        let mut reconciliation = self.controller.handle(event).await?;
        if reconciliation.is_deferred() {
            tracing::debug!("Deferring {}", incoming);
            still_deferred.push(DeferredEvent::now(incoming));
        }
        reconciliation.warnings.extend(diagnostics.into_warnings());
        handled.push(reconciliation);

        if !queue_readable || still_deferred != original {
            self.controller
                .store()
                .set_deferred(still_deferred.clone())
                .await
                .context(QueueSnafu)?;
        }

        Ok(DispatchReport {
            handled,
            pending: still_deferred.iter().map(|entry| entry.kind).collect(),
        })
    }
}
