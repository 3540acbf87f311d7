use std::sync::Arc;

use storage::repository::Storage;
use workout_core::Clock;
use workout_core::model::ExerciseCatalog;

use crate::error::WorkoutServicesError;
use crate::notify::{NoopNotifier, Notifier};
use crate::persistence::SnapshotService;
use crate::workout::{WorkoutRuntime, WorkoutSession};

/// Assembles the catalog, persistence and notifier behind a session.
#[derive(Clone)]
pub struct WorkoutServices {
    catalog: Arc<ExerciseCatalog>,
    snapshots: SnapshotService,
    notifier: Arc<dyn Notifier>,
}

impl WorkoutServices {
    /// Services over the built-in program with in-memory storage.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_storage(&Storage::in_memory())
    }

    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `WorkoutServicesError` if storage initialization fails.
    pub async fn sqlite(db_url: &str) -> Result<Self, WorkoutServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage))
    }

    #[must_use]
    pub fn from_storage(storage: &Storage) -> Self {
        Self {
            catalog: Arc::new(ExerciseCatalog::default_program()),
            snapshots: SnapshotService::new(Arc::clone(&storage.snapshots)),
            notifier: Arc::new(NoopNotifier),
        }
    }

    #[must_use]
    pub fn with_catalog(mut self, catalog: ExerciseCatalog) -> Self {
        self.catalog = Arc::new(catalog);
        self
    }

    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.snapshots = self.snapshots.with_clock(clock);
        self
    }

    #[must_use]
    pub fn with_snapshot_key(mut self, key: impl Into<String>) -> Self {
        self.snapshots = self.snapshots.with_key(key);
        self
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<ExerciseCatalog> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn snapshots(&self) -> &SnapshotService {
        &self.snapshots
    }

    /// Load the persisted state into a new session.
    pub async fn open_session(&self) -> WorkoutSession {
        WorkoutSession::open(
            Arc::clone(&self.catalog),
            self.snapshots.clone(),
            Arc::clone(&self.notifier),
        )
        .await
    }

    /// Load a session and wrap it in a one-second clock runtime.
    pub async fn start_runtime(&self) -> WorkoutRuntime {
        WorkoutRuntime::new(self.open_session().await)
    }
}
