//! Local filesystem storage implementation.
//!
//! Used by the CLI for development runs. Production deployments publish to S3
//! and keep state in DynamoDB.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::{SnapshotPayload, StormState};
use crate::storage::{SnapshotPublisher, StateStore};

const STATE_FILE: &str = "state.json";

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
    snapshot_key: String,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>, snapshot_key: impl Into<String>) -> Self {
        Self {
            root_dir: root_dir.into(),
            snapshot_key: snapshot_key.into(),
        }
    }

    /// Get the full path for a relative key.
    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.path(&self.snapshot_key)
    }

    pub fn state_path(&self) -> PathBuf {
        self.path(STATE_FILE)
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(key);
        self.ensure_dir(&path).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(key, &bytes).await
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.read_bytes(key).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Load the last published snapshot, if any.
    pub async fn load_snapshot(&self) -> Result<Option<SnapshotPayload>> {
        self.read_json(&self.snapshot_key).await
    }
}

#[async_trait]
impl SnapshotPublisher for LocalStorage {
    async fn publish(&self, payload: &SnapshotPayload) -> Result<()> {
        self.write_json(&self.snapshot_key, payload)
            .await
            .map_err(AppError::publish)?;
        log::info!(
            "Wrote {} entries to {}",
            payload.entries.len(),
            self.snapshot_path().display()
        );
        Ok(())
    }
}

#[async_trait]
impl StateStore for LocalStorage {
    async fn load(&self) -> Result<Option<StormState>> {
        self.read_json(STATE_FILE).await.map_err(AppError::state)
    }

    async fn save(&self, state: &StormState) -> Result<()> {
        self.write_json(STATE_FILE, state)
            .await
            .map_err(AppError::state)
    }
}
