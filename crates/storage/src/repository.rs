use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Opaque key-value persistence for serialized snapshots.
///
/// Adapters never inspect the blob; decoding lives in [`crate::snapshot`].
#[async_trait]
pub trait SnapshotRepository: Send + Sync {
    /// Fetch the blob stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read. A missing key is
    /// `Ok(None)`, not an error.
    async fn load_snapshot(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `blob` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the blob cannot be written.
    async fn save_snapshot(&self, key: &str, blob: &str) -> Result<(), StorageError>;

    /// Remove the blob under `key`. Removing a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn delete_snapshot(&self, key: &str) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    blobs: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            blobs: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl SnapshotRepository for InMemoryRepository {
    async fn load_snapshot(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .blobs
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn save_snapshot(&self, key: &str, blob: &str) -> Result<(), StorageError> {
        let mut guard = self
            .blobs
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_string(), blob.to_string());
        Ok(())
    }

    async fn delete_snapshot(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self
            .blobs
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(key);
        Ok(())
    }
}

/// Repository handle behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub snapshots: Arc<dyn SnapshotRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let snapshots: Arc<dyn SnapshotRepository> = Arc::new(InMemoryRepository::new());
        Self { snapshots }
    }
}
