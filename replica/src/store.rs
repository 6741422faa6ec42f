//! Snapshot storage seam.
//!
//! Long-term storage is an external collaborator; the replica only needs a
//! place to put snapshot bytes and get them back. `FileStore` covers the
//! standalone process, `MemoryStore` covers tests and embedding. Write
//! failures propagate to the caller — the in-memory board is never affected
//! and the next eligible trigger retries.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;

/// Error returned by snapshot store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The underlying I/O failed.
    #[error("snapshot store I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Where snapshot bytes live between runs.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Persist one complete snapshot, replacing any previous one.
    async fn write(&self, bytes: &[u8]) -> Result<(), StoreError>;

    /// Read back the most recent snapshot, or `None` if none was ever written.
    async fn read(&self) -> Result<Option<Vec<u8>>, StoreError>;
}

/// File-backed store for the standalone replica process.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SnapshotStore for FileStore {
    async fn write(&self, bytes: &[u8]) -> Result<(), StoreError> {
        // Write-then-rename so a crash mid-write never truncates the only copy.
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    async fn read(&self) -> Result<Option<Vec<u8>>, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory store for tests and embedded use.
#[derive(Default)]
pub struct MemoryStore {
    bytes: Mutex<Option<Vec<u8>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn write(&self, bytes: &[u8]) -> Result<(), StoreError> {
        let mut slot = self.bytes.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        *slot = Some(bytes.to_vec());
        Ok(())
    }

    async fn read(&self) -> Result<Option<Vec<u8>>, StoreError> {
        let slot = self.bytes.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(slot.clone())
    }
}
