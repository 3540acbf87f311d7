use std::sync::Arc;

use log::{debug, warn};
use workout_core::model::{
    DayNumber, ExerciseCatalog, ExerciseName, ProgressStore, WorkoutSettings,
};
use workout_core::{Sequencer, SequencerCommand, SequencerEffect};

use crate::error::WorkoutError;
use crate::notify::Notifier;
use crate::persistence::SnapshotService;

/// Every user or clock input the session accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkoutCommand {
    ToggleComplete { day: DayNumber, exercise: ExerciseName },
    ClearDay(DayNumber),
    SelectDay(DayNumber),
    UpdateSettings(WorkoutSettings),
    SetAutoRest(bool),
    SetRestDuration(u32),
    Sequencer(SequencerCommand),
}

impl From<SequencerCommand> for WorkoutCommand {
    fn from(command: SequencerCommand) -> Self {
        Self::Sequencer(command)
    }
}

/// Single writer over the progress store and the sequencer.
///
/// Each dispatched command is applied, its cues delivered, and the full
/// state mirrored to storage before the call returns.
pub struct WorkoutSession {
    catalog: Arc<ExerciseCatalog>,
    progress: ProgressStore,
    sequencer: Sequencer,
    selected_day: DayNumber,
    snapshots: SnapshotService,
    notifier: Arc<dyn Notifier>,
}

impl WorkoutSession {
    /// Open a session from the persisted snapshot, or fresh state if none.
    pub async fn open(
        catalog: Arc<ExerciseCatalog>,
        snapshots: SnapshotService,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let restored = snapshots.load(&catalog).await;
        Self {
            catalog,
            progress: restored.progress,
            sequencer: restored.sequencer,
            selected_day: restored.selected_day,
            snapshots,
            notifier,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &ExerciseCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn progress(&self) -> &ProgressStore {
        &self.progress
    }

    #[must_use]
    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    #[must_use]
    pub fn selected_day(&self) -> DayNumber {
        self.selected_day
    }

    #[must_use]
    pub fn settings(&self) -> WorkoutSettings {
        self.sequencer.settings()
    }

    /// Apply one command and persist the result.
    ///
    /// # Errors
    ///
    /// Returns `WorkoutError` when the command names an unknown exercise or
    /// carries invalid settings. Nothing is changed or persisted then.
    pub async fn dispatch(
        &mut self,
        command: WorkoutCommand,
    ) -> Result<Vec<SequencerEffect>, WorkoutError> {
        let effects = self.apply(command)?;
        self.deliver_cues(&effects);
        self.snapshots
            .save(&self.progress, &self.sequencer, self.selected_day)
            .await;
        Ok(effects)
    }

    fn apply(&mut self, command: WorkoutCommand) -> Result<Vec<SequencerEffect>, WorkoutError> {
        match command {
            WorkoutCommand::ToggleComplete { day, exercise } => {
                let done = self.progress.toggle_complete(day, exercise.as_str())?;
                debug!("day {day}: {exercise} marked {done}");
            }
            WorkoutCommand::ClearDay(day) => {
                if self.progress.clear_day(day) {
                    debug!("day {day}: cleared");
                }
            }
            WorkoutCommand::SelectDay(day) => self.selected_day = day,
            WorkoutCommand::UpdateSettings(settings) => self.sequencer.set_settings(settings),
            WorkoutCommand::SetAutoRest(enabled) => {
                let settings = self.sequencer.settings().with_auto_rest(enabled);
                self.sequencer.set_settings(settings);
            }
            WorkoutCommand::SetRestDuration(secs) => {
                let settings = self.sequencer.settings().with_rest_duration(secs)?;
                self.sequencer.set_settings(settings);
            }
            WorkoutCommand::Sequencer(command) => {
                let effects =
                    self.sequencer
                        .apply(&command, &mut self.progress, self.selected_day)?;
                log_effects(&effects);
                return Ok(effects);
            }
        }
        Ok(Vec::new())
    }

    fn deliver_cues(&self, effects: &[SequencerEffect]) {
        for effect in effects {
            if let SequencerEffect::Notify(cue) = effect {
                if let Err(err) = self.notifier.notify(*cue) {
                    warn!("{cue:?} cue failed: {err}");
                }
            }
        }
    }
}

fn log_effects(effects: &[SequencerEffect]) {
    for effect in effects {
        match effect {
            SequencerEffect::ClockStarted(name) => debug!("clock started: {name}"),
            SequencerEffect::ClockStopped(name) => debug!("clock stopped: {name}"),
            SequencerEffect::RestStarted { secs } => debug!("rest started: {secs}s"),
            SequencerEffect::RestEnded => debug!("rest ended"),
            SequencerEffect::MarkedComplete(name) => debug!("{name} completed"),
            SequencerEffect::Advanced { from, to } => debug!("moved from #{from} to #{to}"),
            SequencerEffect::AllClocksCancelled => debug!("all clocks cancelled"),
            SequencerEffect::Notify(_) => {}
        }
    }
}
