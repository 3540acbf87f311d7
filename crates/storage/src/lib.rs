#![forbid(unsafe_code)]

pub mod repository;
pub mod snapshot;
pub mod sqlite;

pub use repository::{InMemoryRepository, SnapshotRepository, Storage, StorageError};
pub use snapshot::{RestoredState, SnapshotError, SnapshotRecord};
