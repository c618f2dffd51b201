// ABOUTME: JSON file state store for the controller process.
// ABOUTME: Writes go to a temp file in the same directory and are renamed into place.

use async_trait::async_trait;
use chrono::Utc;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::{StateStore, StoreError, StoredState};

/// State store persisted as a JSON document on disk.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(contents)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}

#[async_trait]
impl StateStore for FileStore {
    async fn load(&self) -> Result<StoredState, StoreError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(StoredState::default());
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        serde_json::from_str(&content).map_err(|source| StoreError::Corrupted {
            path: self.path.clone(),
            source,
        })
    }

    async fn save(&self, mut state: StoredState) -> Result<(), StoreError> {
        match self.load().await {
            Ok(current) => state.keep_initialized_from(&current),
            Err(e) if e.is_corrupted() => {
                tracing::warn!("Overwriting corrupted state file {}", self.path.display());
            }
            Err(e) => return Err(e),
        }
        state.updated_at = Some(Utc::now());

        let json = serde_json::to_vec_pretty(&state)?;
        let path = self.path.clone();
        let written = tokio::task::spawn_blocking(move || Self::write_atomic(&path, &json))
            .await
            .map_err(|e| std::io::Error::other(e.to_string()))
            .and_then(|result| result);

        written.map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })?;

        tracing::debug!("Saved controller state to {}", self.path.display());
        Ok(())
    }
}
