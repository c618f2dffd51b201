// ABOUTME: Diagnostics accumulator for non-fatal warnings during reconciliation.
// ABOUTME: Collects degraded-but-handled conditions so callers can surface them.

use serde::Serialize;

/// Collects non-fatal warnings while handling one event.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{}", warning.message);
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }
}

/// A non-fatal warning collected during reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// Leadership could not be determined; the unit acted as a non-leader.
    pub fn leadership_unknown(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::LeadershipUnknown,
            message: message.into(),
        }
    }

    /// The last applied spec could not be read; the pod spec is resubmitted.
    pub fn last_applied_unreadable(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::LastAppliedUnreadable,
            message: message.into(),
        }
    }

    /// A submitted spec could not be recorded as last applied.
    pub fn last_applied_not_saved(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::LastAppliedNotSaved,
            message: message.into(),
        }
    }

    /// The deferred queue could not be read; only the incoming event ran.
    pub fn deferred_queue_unreadable(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::DeferredQueueUnreadable,
            message: message.into(),
        }
    }
}

/// Categories of warnings that can occur during reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WarningKind {
    LeadershipUnknown,
    LastAppliedUnreadable,
    LastAppliedNotSaved,
    DeferredQueueUnreadable,
}
