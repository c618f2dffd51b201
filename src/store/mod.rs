// ABOUTME: Persisted controller state that survives process restarts.
// ABOUTME: Holds the initialization flag, last applied pod spec, and deferred events.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::controller::EventKind;
use crate::podspec::{DeploymentSpec, ResourceSpec};

/// Errors from reading or writing persisted state.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read state from {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write state to {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("state file {path} is corrupted: {source}")]
    Corrupted {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to encode state: {0}")]
    Encode(#[from] serde_json::Error),
}

impl StoreError {
    pub fn is_corrupted(&self) -> bool {
        matches!(self, StoreError::Corrupted { .. })
    }
}

/// The descriptors most recently accepted by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedSpec {
    pub spec: DeploymentSpec,
    pub resources: ResourceSpec,
}

/// An event whose handler asked to run again later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeferredEvent {
    pub kind: EventKind,
    pub deferred_at: DateTime<Utc>,
}

impl DeferredEvent {
    pub fn now(kind: EventKind) -> Self {
        Self {
            kind,
            deferred_at: Utc::now(),
        }
    }
}

/// Snapshot of everything the controller persists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredState {
    #[serde(default)]
    initialized: bool,
    #[serde(default)]
    pub last_applied: Option<AppliedSpec>,
    #[serde(default)]
    pub deferred: Vec<DeferredEvent>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl StoredState {
    pub fn initialized(&self) -> bool {
        self.initialized
    }

    /// Set the initialization flag. It is never cleared.
    pub fn mark_initialized(&mut self) {
        self.initialized = true;
    }

    /// Fold the flag of an older snapshot into this one, so that saving a
    /// stale snapshot cannot reset it.
    pub(crate) fn keep_initialized_from(&mut self, previous: &StoredState) {
        self.initialized |= previous.initialized;
    }
}

/// Durable key-value storage scoped to this controller instance.
///
/// Implementations provide `load` and `save`; the typed accessors are
/// built on them. `save` must never clear the initialization flag.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn load(&self) -> Result<StoredState, StoreError>;

    async fn save(&self, state: StoredState) -> Result<(), StoreError>;

    /// Load the state a setter starts from. A corrupted snapshot is
    /// replaced by defaults so the next save can overwrite it.
    async fn load_for_update(&self) -> Result<StoredState, StoreError> {
        match self.load().await {
            Err(e) if e.is_corrupted() => {
                tracing::warn!("Discarding unreadable controller state: {}", e);
                Ok(StoredState::default())
            }
            other => other,
        }
    }

    async fn initialized(&self) -> Result<bool, StoreError> {
        Ok(self.load().await?.initialized())
    }

    /// Set the initialization flag. Returns whether this call flipped it.
    async fn mark_initialized(&self) -> Result<bool, StoreError> {
        let mut state = self.load_for_update().await?;
        if state.initialized() {
            return Ok(false);
        }
        state.mark_initialized();
        self.save(state).await?;
        Ok(true)
    }

    async fn last_applied(&self) -> Result<Option<AppliedSpec>, StoreError> {
        Ok(self.load().await?.last_applied)
    }

    async fn set_last_applied(&self, applied: AppliedSpec) -> Result<(), StoreError> {
        let mut state = self.load_for_update().await?;
        state.last_applied = Some(applied);
        self.save(state).await
    }

    async fn deferred(&self) -> Result<Vec<DeferredEvent>, StoreError> {
        Ok(self.load().await?.deferred)
    }

    async fn set_deferred(&self, events: Vec<DeferredEvent>) -> Result<(), StoreError> {
        let mut state = self.load_for_update().await?;
        state.deferred = events;
        self.save(state).await
    }
}
