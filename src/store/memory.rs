// ABOUTME: In-memory state store for tests and dry runs.
// ABOUTME: Shares one snapshot behind a mutex; nothing survives the process.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::sync::Arc;

use super::{StateStore, StoreError, StoredState};

/// State store backed by process memory. Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<StoredState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing snapshot.
    pub fn with_state(state: StoredState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn snapshot(&self) -> StoredState {
        self.state.lock().clone()
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn load(&self) -> Result<StoredState, StoreError> {
        Ok(self.state.lock().clone())
    }

    async fn save(&self, mut state: StoredState) -> Result<(), StoreError> {
        let mut current = self.state.lock();
        state.keep_initialized_from(&current);
        state.updated_at = Some(Utc::now());
        *current = state;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::EventKind;
    use crate::store::DeferredEvent;

    #[tokio::test]
    async fn starts_uninitialized() {
        let store = MemoryStore::new();
        assert!(!store.initialized().await.unwrap());
        assert!(store.last_applied().await.unwrap().is_none());
        assert!(store.deferred().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn mark_initialized_flips_once() {
        let store = MemoryStore::new();
        assert!(store.mark_initialized().await.unwrap());
        assert!(!store.mark_initialized().await.unwrap());
        assert!(store.initialized().await.unwrap());
    }

    #[tokio::test]
    async fn saving_stale_snapshot_keeps_flag() {
        let store = MemoryStore::new();
        let stale = store.load().await.unwrap();
        store.mark_initialized().await.unwrap();

        store.save(stale).await.unwrap();
        assert!(store.initialized().await.unwrap());
    }

    #[tokio::test]
    async fn clones_share_state() {
        let store = MemoryStore::new();
        let other = store.clone();
        other
            .set_deferred(vec![DeferredEvent::now(EventKind::Start)])
            .await
            .unwrap();

        assert_eq!(store.snapshot().deferred.len(), 1);
    }
}
