// ABOUTME: The explicit result of handling one event.
// ABOUTME: Carries the final statuses, what happened to the pod spec, and whether to defer.

use serde::Serialize;

use crate::diagnostics::{Diagnostics, Warning};
use crate::status::Status;

use super::EventKind;

/// Whether the handler finished or asks for the event to be redelivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Done,
    Deferred,
}

/// What happened to the rendered deployment spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Submission {
    /// The handler stopped before rendering a spec.
    #[default]
    NotAttempted,
    /// The rendered spec equals the last applied one; nothing was sent.
    Unchanged,
    /// The spec was sent to the platform.
    Submitted,
}

/// Everything a handler decided for one event.
///
/// The unit status is always present, so no invocation can leave a stale
/// status behind. Application status is only ever set by the leader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    pub event: EventKind,
    pub unit: Status,
    pub app: Option<Status>,
    pub submission: Submission,
    /// True when this invocation flipped the initialization flag.
    pub initialized_now: bool,
    pub outcome: Outcome,
    pub warnings: Vec<Warning>,
}

impl Reconciliation {
    pub fn is_deferred(&self) -> bool {
        self.outcome == Outcome::Deferred
    }
}

/// A reconciliation under construction. It can only be completed by
/// supplying the final unit status.
#[derive(Debug)]
pub(super) struct Draft {
    event: EventKind,
    pub(super) app: Option<Status>,
    pub(super) submission: Submission,
    pub(super) initialized_now: bool,
    pub(super) diagnostics: Diagnostics,
}

impl Draft {
    pub(super) fn new(event: EventKind) -> Self {
        Self {
            event,
            app: None,
            submission: Submission::NotAttempted,
            initialized_now: false,
            diagnostics: Diagnostics::default(),
        }
    }

    pub(super) fn done(self, unit: Status) -> Reconciliation {
        self.complete(unit, Outcome::Done)
    }

    pub(super) fn defer(self, unit: Status) -> Reconciliation {
        self.complete(unit, Outcome::Deferred)
    }

    fn complete(self, unit: Status, outcome: Outcome) -> Reconciliation {
        Reconciliation {
            event: self.event,
            unit,
            app: self.app,
            submission: self.submission,
            initialized_now: self.initialized_now,
            outcome,
            warnings: self.diagnostics.into_warnings(),
        }
    }
}
