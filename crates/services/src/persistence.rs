use std::sync::Arc;

use log::{info, warn};
use storage::repository::SnapshotRepository;
use storage::snapshot::{RestoredState, SnapshotRecord};
use workout_core::{Clock, Sequencer};
use workout_core::model::{DayNumber, ExerciseCatalog, ProgressStore};

pub const DEFAULT_SNAPSHOT_KEY: &str = "workout-tracker";

/// Mirrors session state into one blob under one storage key.
///
/// The in-memory stores are the source of truth; this service never fails
/// the caller. Missing or malformed blobs load as fresh state and failed
/// writes are logged.
#[derive(Clone)]
pub struct SnapshotService {
    repo: Arc<dyn SnapshotRepository>,
    key: String,
    clock: Clock,
}

impl SnapshotService {
    #[must_use]
    pub fn new(repo: Arc<dyn SnapshotRepository>) -> Self {
        Self {
            repo,
            key: DEFAULT_SNAPSHOT_KEY.to_string(),
            clock: Clock::default(),
        }
    }

    /// Stamp saved snapshots from `clock` instead of system time.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load persisted state, falling back to fresh state on any failure.
    pub async fn load(&self, catalog: &Arc<ExerciseCatalog>) -> RestoredState {
        let blob = match self.repo.load_snapshot(&self.key).await {
            Ok(Some(blob)) => blob,
            Ok(None) => {
                info!("no snapshot under {:?}, starting fresh", self.key);
                return RestoredState::fresh(catalog);
            }
            Err(err) => {
                warn!("snapshot load failed, starting fresh: {err}");
                return RestoredState::fresh(catalog);
            }
        };

        match SnapshotRecord::decode(&blob).and_then(|record| record.restore(catalog)) {
            Ok(state) => {
                info!("restored snapshot {:?} saved at {:?}", self.key, state.saved_at);
                state
            }
            Err(err) => {
                warn!("discarding snapshot {:?}: {err}", self.key);
                RestoredState::fresh(catalog)
            }
        }
    }

    /// Write the current state. Failures are logged, never returned.
    pub async fn save(&self, progress: &ProgressStore, sequencer: &Sequencer, selected_day: DayNumber) {
        let record = SnapshotRecord::capture(progress, sequencer, selected_day, self.clock.now());
        let blob = match record.encode() {
            Ok(blob) => blob,
            Err(err) => {
                warn!("snapshot encode failed: {err}");
                return;
            }
        };
        if let Err(err) = self.repo.save_snapshot(&self.key, &blob).await {
            warn!("snapshot save failed: {err}");
        }
    }

    /// Remove the persisted blob.
    pub async fn clear(&self) {
        if let Err(err) = self.repo.delete_snapshot(&self.key).await {
            warn!("snapshot delete failed: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use storage::repository::{InMemoryRepository, StorageError};

    struct UnavailableRepository;

    #[async_trait]
    impl SnapshotRepository for UnavailableRepository {
        async fn load_snapshot(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Connection("storage disabled".into()))
        }

        async fn save_snapshot(&self, _key: &str, _blob: &str) -> Result<(), StorageError> {
            Err(StorageError::Connection("quota exceeded".into()))
        }

        async fn delete_snapshot(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Connection("storage disabled".into()))
        }
    }

    #[tokio::test]
    async fn unavailable_storage_never_fails_the_caller() {
        let service = SnapshotService::new(Arc::new(UnavailableRepository));
        let catalog = Arc::new(ExerciseCatalog::default_program());

        let mut state = service.load(&catalog).await;
        assert_eq!(state.progress.records().count(), 0);

        state
            .progress
            .toggle_complete(DayNumber::FIRST, "Plank")
            .unwrap();
        service
            .save(&state.progress, &state.sequencer, DayNumber::FIRST)
            .await;
        service.clear().await;
        assert!(state.progress.is_complete(DayNumber::FIRST, "Plank"));
    }

    #[tokio::test]
    async fn malformed_blob_loads_fresh_state() {
        let repo = InMemoryRepository::new();
        repo.save_snapshot(DEFAULT_SNAPSHOT_KEY, "{ nope").await.unwrap();
        let service = SnapshotService::new(Arc::new(repo));
        let catalog = Arc::new(ExerciseCatalog::default_program());

        let state = service.load(&catalog).await;
        assert_eq!(state.progress.records().count(), 0);
        assert_eq!(state.selected_day, DayNumber::FIRST);
    }

    #[tokio::test]
    async fn saved_at_comes_from_the_injected_clock() {
        let at = DateTime::<Utc>::from_timestamp(1_735_715_400, 0).unwrap();
        let service =
            SnapshotService::new(Arc::new(InMemoryRepository::new())).with_clock(Clock::fixed(at));
        let catalog = Arc::new(ExerciseCatalog::default_program());

        let state = RestoredState::fresh(&catalog);
        service
            .save(&state.progress, &state.sequencer, DayNumber::FIRST)
            .await;

        let loaded = service.load(&catalog).await;
        assert_eq!(loaded.saved_at, Some(at));
    }

    #[tokio::test]
    async fn save_then_load_under_custom_key() {
        let repo = InMemoryRepository::new();
        let service = SnapshotService::new(Arc::new(repo.clone())).with_key("profile-2");
        let catalog = Arc::new(ExerciseCatalog::default_program());
        let day = DayNumber::new(11).unwrap();

        let mut state = RestoredState::fresh(&catalog);
        state.progress.toggle_complete(day, "Burpees").unwrap();
        service.save(&state.progress, &state.sequencer, day).await;

        assert!(repo.load_snapshot(DEFAULT_SNAPSHOT_KEY).await.unwrap().is_none());
        let loaded = service.load(&catalog).await;
        assert!(loaded.progress.is_complete(day, "Burpees"));
        assert_eq!(loaded.selected_day, day);

        service.clear().await;
        assert!(repo.load_snapshot("profile-2").await.unwrap().is_none());
    }
}
