//! Shared error types for the services crate.

use thiserror::Error;

use storage::sqlite::SqliteInitError;
use workout_core::SequencerError;
use workout_core::model::{ProgressError, SettingsError};

/// Errors emitted by `WorkoutSession` for caller contract violations.
///
/// Persistence and notification failures never surface here; they are
/// logged and swallowed.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WorkoutError {
    #[error(transparent)]
    Progress(#[from] ProgressError),
    #[error(transparent)]
    Sequencer(#[from] SequencerError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// Errors emitted while bootstrapping workout services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WorkoutServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
