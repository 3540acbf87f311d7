use thiserror::Error;

pub const DEFAULT_REST_SECS: u32 = 20;
pub const DEFAULT_PERIODIC_CUE_SECS: u32 = 30;

/// Sequencer configuration, persisted with the snapshot.
///
/// The completion cue and the periodic cue are independent rules: the first
/// fires when a timed exercise reaches its duration, the second every
/// `periodic_cue_secs` on free-running timers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorkoutSettings {
    auto_rest_enabled: bool,
    rest_duration_secs: u32,
    completion_cue: bool,
    periodic_cue_secs: Option<u32>,
}

#[derive(Clone, Copy, Debug)]
pub struct WorkoutSettingsDraft {
    pub auto_rest_enabled: bool,
    pub rest_duration_secs: u32,
    pub completion_cue: bool,
    pub periodic_cue_secs: Option<u32>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("rest duration must be > 0 seconds")]
    InvalidRestDuration,

    #[error("periodic cue interval must be > 0 seconds")]
    InvalidPeriodicCue,
}

impl Default for WorkoutSettingsDraft {
    fn default() -> Self {
        Self {
            auto_rest_enabled: true,
            rest_duration_secs: DEFAULT_REST_SECS,
            completion_cue: true,
            periodic_cue_secs: Some(DEFAULT_PERIODIC_CUE_SECS),
        }
    }
}

impl WorkoutSettingsDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the draft into settings.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` for a zero rest duration or a zero cue interval.
    pub fn validate(self) -> Result<WorkoutSettings, SettingsError> {
        if self.rest_duration_secs == 0 {
            return Err(SettingsError::InvalidRestDuration);
        }
        if self.periodic_cue_secs == Some(0) {
            return Err(SettingsError::InvalidPeriodicCue);
        }
        Ok(WorkoutSettings {
            auto_rest_enabled: self.auto_rest_enabled,
            rest_duration_secs: self.rest_duration_secs,
            completion_cue: self.completion_cue,
            periodic_cue_secs: self.periodic_cue_secs,
        })
    }
}

impl WorkoutSettings {
    #[must_use]
    pub fn auto_rest_enabled(&self) -> bool {
        self.auto_rest_enabled
    }

    #[must_use]
    pub fn rest_duration_secs(&self) -> u32 {
        self.rest_duration_secs
    }

    #[must_use]
    pub fn completion_cue(&self) -> bool {
        self.completion_cue
    }

    #[must_use]
    pub fn periodic_cue_secs(&self) -> Option<u32> {
        self.periodic_cue_secs
    }

    /// Copy the settings back into an editable draft.
    #[must_use]
    pub fn to_draft(&self) -> WorkoutSettingsDraft {
        WorkoutSettingsDraft {
            auto_rest_enabled: self.auto_rest_enabled,
            rest_duration_secs: self.rest_duration_secs,
            completion_cue: self.completion_cue,
            periodic_cue_secs: self.periodic_cue_secs,
        }
    }

    #[must_use]
    pub fn with_auto_rest(mut self, enabled: bool) -> Self {
        self.auto_rest_enabled = enabled;
        self
    }

    /// # Errors
    ///
    /// Returns `SettingsError::InvalidRestDuration` for zero.
    pub fn with_rest_duration(mut self, secs: u32) -> Result<Self, SettingsError> {
        if secs == 0 {
            return Err(SettingsError::InvalidRestDuration);
        }
        self.rest_duration_secs = secs;
        Ok(self)
    }
}

impl Default for WorkoutSettings {
    fn default() -> Self {
        Self {
            auto_rest_enabled: true,
            rest_duration_secs: DEFAULT_REST_SECS,
            completion_cue: true,
            periodic_cue_secs: Some(DEFAULT_PERIODIC_CUE_SECS),
        }
    }
}
