use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use workout_core::Sequencer;
use workout_core::model::{
    DayNumber, ExerciseCatalog, ProgressStore, SettingsError, WorkoutSettings,
    WorkoutSettingsDraft,
};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SnapshotError {
    #[error("malformed snapshot: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("invalid settings in snapshot: {0}")]
    InvalidSettings(#[from] SettingsError),
}

/// Persisted shape of the whole tracker state, stored as one JSON blob.
///
/// This mirrors the in-memory stores so the domain layer never sees the
/// serialized form. Fields added after the first release carry defaults so
/// older blobs still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotRecord {
    #[serde(default)]
    pub completions: BTreeMap<i64, BTreeMap<String, bool>>,
    #[serde(default)]
    pub elapsed: BTreeMap<String, u32>,
    #[serde(default)]
    pub running: BTreeMap<String, bool>,
    #[serde(default = "defaults::auto_rest_enabled")]
    pub auto_rest_enabled: bool,
    #[serde(rename = "restDurationSeconds", default = "defaults::rest_duration_secs")]
    pub rest_duration_secs: u32,
    #[serde(default = "defaults::completion_cue")]
    pub completion_cue: bool,
    #[serde(rename = "periodicCueSeconds", default = "defaults::periodic_cue_secs")]
    pub periodic_cue_secs: Option<u32>,
    #[serde(default = "defaults::selected_day")]
    pub selected_day: i64,
    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,
}

mod defaults {
    use workout_core::model::{DayNumber, WorkoutSettings};

    pub(super) fn auto_rest_enabled() -> bool {
        WorkoutSettings::default().auto_rest_enabled()
    }

    pub(super) fn rest_duration_secs() -> u32 {
        WorkoutSettings::default().rest_duration_secs()
    }

    pub(super) fn completion_cue() -> bool {
        WorkoutSettings::default().completion_cue()
    }

    pub(super) fn periodic_cue_secs() -> Option<u32> {
        WorkoutSettings::default().periodic_cue_secs()
    }

    pub(super) fn selected_day() -> i64 {
        i64::from(DayNumber::FIRST.value())
    }
}

/// Domain state rebuilt from a snapshot.
#[derive(Debug, Clone)]
pub struct RestoredState {
    pub progress: ProgressStore,
    pub sequencer: Sequencer,
    pub selected_day: DayNumber,
    pub saved_at: Option<DateTime<Utc>>,
}

impl RestoredState {
    /// Empty progress, zeroed timers and default settings.
    #[must_use]
    pub fn fresh(catalog: &Arc<ExerciseCatalog>) -> Self {
        Self {
            progress: ProgressStore::new(Arc::clone(catalog)),
            sequencer: Sequencer::new(Arc::clone(catalog), WorkoutSettings::default()),
            selected_day: DayNumber::FIRST,
            saved_at: None,
        }
    }
}

impl SnapshotRecord {
    #[must_use]
    pub fn capture(
        progress: &ProgressStore,
        sequencer: &Sequencer,
        selected_day: DayNumber,
        saved_at: DateTime<Utc>,
    ) -> Self {
        let completions = progress
            .records()
            .map(|(day, record)| {
                let flags = record
                    .entries()
                    .map(|(name, done)| (name.to_string(), done))
                    .collect();
                (i64::from(day.value()), flags)
            })
            .collect();
        let elapsed = sequencer
            .timers()
            .map(|(name, timer)| (name.to_string(), timer.elapsed_secs()))
            .collect();
        let running = sequencer
            .timers()
            .map(|(name, timer)| (name.to_string(), timer.is_running()))
            .collect();
        let settings = sequencer.settings();

        Self {
            completions,
            elapsed,
            running,
            auto_rest_enabled: settings.auto_rest_enabled(),
            rest_duration_secs: settings.rest_duration_secs(),
            completion_cue: settings.completion_cue(),
            periodic_cue_secs: settings.periodic_cue_secs(),
            selected_day: i64::from(selected_day.value()),
            saved_at: Some(saved_at),
        }
    }

    /// # Errors
    ///
    /// Returns `SnapshotError::Malformed` if serialization fails.
    pub fn encode(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(self)?)
    }

    /// # Errors
    ///
    /// Returns `SnapshotError::Malformed` if the blob is not a snapshot.
    pub fn decode(blob: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(blob)?)
    }

    /// Rebuild domain state against the current catalog.
    ///
    /// Unknown exercises and out-of-range days are dropped. Clocks never
    /// survive a reload, so every timer comes back paused.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError::InvalidSettings` if the stored configuration
    /// does not validate.
    pub fn restore(self, catalog: &Arc<ExerciseCatalog>) -> Result<RestoredState, SnapshotError> {
        let settings = WorkoutSettingsDraft {
            auto_rest_enabled: self.auto_rest_enabled,
            rest_duration_secs: self.rest_duration_secs,
            completion_cue: self.completion_cue,
            periodic_cue_secs: self.periodic_cue_secs,
        }
        .validate()?;

        let mut progress = ProgressStore::new(Arc::clone(catalog));
        for (raw_day, flags) in self.completions {
            let day = match DayNumber::try_from(raw_day) {
                Ok(day) => day,
                Err(err) => {
                    debug!("snapshot: dropping completions: {err}");
                    continue;
                }
            };
            for (name, done) in flags {
                if let Err(err) = progress.set_complete(day, &name, done) {
                    debug!("snapshot: dropping completion on day {day}: {err}");
                }
            }
        }

        for (name, _) in self.running.iter().filter(|(_, running)| **running) {
            debug!("snapshot: {name} was running when saved, restoring paused");
        }

        let sequencer = Sequencer::restore(
            Arc::clone(catalog),
            settings,
            self.elapsed.iter().map(|(name, secs)| (name.as_str(), *secs)),
        );

        Ok(RestoredState {
            progress,
            sequencer,
            selected_day: DayNumber::try_from(self.selected_day).unwrap_or_default(),
            saved_at: self.saved_at,
        })
    }
}
