//! Guided workout state machine.
//!
//! The sequencer owns the exercise cursor, one [`TimerState`] per catalog
//! entry and the rest countdown. Every input, including the once-per-second
//! clock ticks, goes through [`Sequencer::apply`], which returns the side
//! effects the caller must carry out (scheduling clocks, playing cues).

use std::sync::Arc;

use thiserror::Error;

use crate::model::{
    DayNumber, ExerciseCatalog, ExerciseName, ProgressError, ProgressStore, TimerState,
    WorkoutSettings,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SequencerError {
    #[error("unknown exercise: {name}")]
    UnknownExercise { name: String },
    #[error(transparent)]
    Progress(#[from] ProgressError),
}

/// Phase of the exercise under the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Paused,
    Running,
    Resting { remaining_secs: u32 },
}

/// Audio/haptic cue kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cue {
    /// A timed exercise reached its duration.
    Completed,
    /// A free-running timer crossed another cue interval.
    Periodic,
    /// A timer was reset.
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequencerCommand {
    Start(ExerciseName),
    Pause(ExerciseName),
    Reset(ExerciseName),
    Next,
    Previous,
    GoTo(usize),
    SkipRest,
    ExitGuided,
    /// One second elapsed on the named exercise clock.
    Tick(ExerciseName),
    /// One second elapsed on the rest clock.
    RestTick,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequencerEffect {
    ClockStarted(ExerciseName),
    ClockStopped(ExerciseName),
    RestStarted { secs: u32 },
    RestEnded,
    Notify(Cue),
    MarkedComplete(ExerciseName),
    Advanced { from: usize, to: usize },
    AllClocksCancelled,
}

#[derive(Debug, Clone)]
pub struct Sequencer {
    catalog: Arc<ExerciseCatalog>,
    settings: WorkoutSettings,
    timers: Vec<TimerState>,
    current: usize,
    phase: SessionPhase,
}

impl Sequencer {
    #[must_use]
    pub fn new(catalog: Arc<ExerciseCatalog>, settings: WorkoutSettings) -> Self {
        let timers = vec![TimerState::default(); catalog.len()];
        Self {
            catalog,
            settings,
            timers,
            current: 0,
            phase: SessionPhase::Paused,
        }
    }

    /// Rehydrate stopped timers from persisted elapsed times.
    ///
    /// Names missing from the catalog are ignored.
    #[must_use]
    pub fn restore<'a>(
        catalog: Arc<ExerciseCatalog>,
        settings: WorkoutSettings,
        elapsed: impl IntoIterator<Item = (&'a str, u32)>,
    ) -> Self {
        let mut sequencer = Self::new(catalog, settings);
        for (name, secs) in elapsed {
            if let Some(index) = sequencer.catalog.index_of(name) {
                sequencer.timers[index] = TimerState::restored(secs);
            }
        }
        sequencer
    }

    #[must_use]
    pub fn catalog(&self) -> &ExerciseCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn settings(&self) -> WorkoutSettings {
        self.settings
    }

    pub fn set_settings(&mut self, settings: WorkoutSettings) {
        self.settings = settings;
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn is_resting(&self) -> bool {
        matches!(self.phase, SessionPhase::Resting { .. })
    }

    #[must_use]
    pub fn rest_remaining_secs(&self) -> Option<u32> {
        match self.phase {
            SessionPhase::Resting { remaining_secs } => Some(remaining_secs),
            _ => None,
        }
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_name(&self) -> &ExerciseName {
        self.name_at(self.current)
    }

    #[must_use]
    pub fn timer(&self, name: &str) -> Option<&TimerState> {
        self.catalog.index_of(name).map(|index| &self.timers[index])
    }

    /// Every exercise with its timer, in catalog order.
    pub fn timers(&self) -> impl Iterator<Item = (&ExerciseName, &TimerState)> {
        self.catalog.names().zip(self.timers.iter())
    }

    /// Names of exercises whose clock is currently running.
    pub fn running(&self) -> impl Iterator<Item = &ExerciseName> {
        self.timers()
            .filter(|(_, timer)| timer.is_running())
            .map(|(name, _)| name)
    }

    fn name_at(&self, index: usize) -> &ExerciseName {
        self.catalog.as_slice()[index].name()
    }

    fn index_of(&self, name: &ExerciseName) -> Result<usize, SequencerError> {
        self.catalog
            .index_of(name.as_str())
            .ok_or_else(|| SequencerError::UnknownExercise {
                name: name.to_string(),
            })
    }

    /// Apply one command. Completions are recorded against `day`.
    ///
    /// # Errors
    ///
    /// Returns `SequencerError::UnknownExercise` if a command names an
    /// exercise outside the catalog. State is unchanged in that case.
    pub fn apply(
        &mut self,
        command: &SequencerCommand,
        progress: &mut ProgressStore,
        day: DayNumber,
    ) -> Result<Vec<SequencerEffect>, SequencerError> {
        let mut effects = Vec::new();
        match command {
            SequencerCommand::Start(name) => {
                let index = self.index_of(name)?;
                self.start(index, &mut effects);
            }
            SequencerCommand::Pause(name) => {
                let index = self.index_of(name)?;
                self.stop_clock(index, &mut effects);
                self.settle_phase();
            }
            SequencerCommand::Reset(name) => {
                let index = self.index_of(name)?;
                self.stop_clock(index, &mut effects);
                self.timers[index].reset();
                effects.push(SequencerEffect::Notify(Cue::Reset));
                self.settle_phase();
            }
            SequencerCommand::Next => self.navigate(self.current.saturating_add(1), &mut effects),
            SequencerCommand::Previous => {
                self.navigate(self.current.saturating_sub(1), &mut effects);
            }
            SequencerCommand::GoTo(index) => self.navigate(*index, &mut effects),
            SequencerCommand::SkipRest => {
                if self.is_resting() {
                    self.finish_rest(&mut effects);
                }
            }
            SequencerCommand::ExitGuided => self.exit_guided(&mut effects),
            SequencerCommand::Tick(name) => {
                let index = self.index_of(name)?;
                self.tick(index, progress, day, &mut effects)?;
            }
            SequencerCommand::RestTick => self.rest_tick(&mut effects),
        }
        Ok(effects)
    }

    fn start(&mut self, index: usize, effects: &mut Vec<SequencerEffect>) {
        self.cancel_rest(effects);
        let duration = self.catalog.as_slice()[index].duration_secs();
        let timer = &mut self.timers[index];
        if !timer.is_running() {
            if timer.is_finished(duration) {
                timer.reset();
            }
            timer.start();
            effects.push(SequencerEffect::ClockStarted(self.name_at(index).clone()));
        }
        self.settle_phase();
    }

    fn stop_clock(&mut self, index: usize, effects: &mut Vec<SequencerEffect>) {
        if self.timers[index].stop() {
            effects.push(SequencerEffect::ClockStopped(self.name_at(index).clone()));
        }
    }

    fn cancel_rest(&mut self, effects: &mut Vec<SequencerEffect>) {
        if self.is_resting() {
            self.phase = SessionPhase::Paused;
            effects.push(SequencerEffect::RestEnded);
        }
    }

    /// Recompute Paused/Running for the cursor. Resting is left alone.
    fn settle_phase(&mut self) {
        if self.is_resting() {
            return;
        }
        self.phase = if self.timers[self.current].is_running() {
            SessionPhase::Running
        } else {
            SessionPhase::Paused
        };
    }

    fn navigate(&mut self, target: usize, effects: &mut Vec<SequencerEffect>) {
        self.stop_clock(self.current, effects);
        self.cancel_rest(effects);
        let from = self.current;
        self.current = target.min(self.catalog.last_index());
        if from != self.current {
            effects.push(SequencerEffect::Advanced {
                from,
                to: self.current,
            });
        }
        self.settle_phase();
    }

    fn exit_guided(&mut self, effects: &mut Vec<SequencerEffect>) {
        for index in 0..self.timers.len() {
            self.stop_clock(index, effects);
        }
        self.cancel_rest(effects);
        self.phase = SessionPhase::Paused;
        effects.push(SequencerEffect::AllClocksCancelled);
    }

    fn tick(
        &mut self,
        index: usize,
        progress: &mut ProgressStore,
        day: DayNumber,
        effects: &mut Vec<SequencerEffect>,
    ) -> Result<(), SequencerError> {
        // Late ticks from a clock that was already stopped are dropped.
        if !self.timers[index].is_running() {
            return Ok(());
        }
        let duration = self.catalog.as_slice()[index].duration_secs();
        let completes = duration
            .is_some_and(|duration| self.timers[index].elapsed_secs().saturating_add(1) >= duration);
        // Completion writes to `progress`; reject before touching the timer.
        let name = self.name_at(index);
        if completes && !progress.catalog().contains(name.as_str()) {
            return Err(ProgressError::UnknownExercise {
                name: name.to_string(),
            }
            .into());
        }
        let elapsed = self.timers[index].advance();
        match duration {
            Some(duration) if elapsed >= duration => self.finish(index, progress, day, effects)?,
            Some(_) => {}
            None => {
                if let Some(every) = self.settings.periodic_cue_secs() {
                    if elapsed % every == 0 {
                        effects.push(SequencerEffect::Notify(Cue::Periodic));
                    }
                }
            }
        }
        Ok(())
    }

    fn finish(
        &mut self,
        index: usize,
        progress: &mut ProgressStore,
        day: DayNumber,
        effects: &mut Vec<SequencerEffect>,
    ) -> Result<(), SequencerError> {
        let name = self.name_at(index).clone();
        progress.set_complete(day, name.as_str(), true)?;
        self.stop_clock(index, effects);
        if self.settings.completion_cue() {
            effects.push(SequencerEffect::Notify(Cue::Completed));
        }
        effects.push(SequencerEffect::MarkedComplete(name));

        if index != self.current {
            return Ok(());
        }
        let last = self.catalog.last_index();
        if index == last {
            self.phase = SessionPhase::Paused;
        } else if self.settings.auto_rest_enabled() {
            let secs = self.settings.rest_duration_secs();
            self.phase = SessionPhase::Resting {
                remaining_secs: secs,
            };
            effects.push(SequencerEffect::RestStarted { secs });
        } else {
            self.current = index + 1;
            effects.push(SequencerEffect::Advanced {
                from: index,
                to: self.current,
            });
            self.settle_phase();
        }
        Ok(())
    }

    fn rest_tick(&mut self, effects: &mut Vec<SequencerEffect>) {
        let SessionPhase::Resting { remaining_secs } = self.phase else {
            return;
        };
        let remaining_secs = remaining_secs.saturating_sub(1);
        if remaining_secs > 0 {
            self.phase = SessionPhase::Resting { remaining_secs };
        } else {
            self.finish_rest(effects);
        }
    }

    fn finish_rest(&mut self, effects: &mut Vec<SequencerEffect>) {
        self.phase = SessionPhase::Paused;
        effects.push(SequencerEffect::RestEnded);

        let from = self.current;
        self.current = (from + 1).min(self.catalog.last_index());
        if from != self.current {
            effects.push(SequencerEffect::Advanced {
                from,
                to: self.current,
            });
        }

        let timer = &mut self.timers[self.current];
        timer.reset();
        timer.start();
        effects.push(SequencerEffect::ClockStarted(self.current_name().clone()));
        self.phase = SessionPhase::Running;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Exercise, WorkoutSettingsDraft};

    fn name(raw: &str) -> ExerciseName {
        ExerciseName::new(raw).unwrap()
    }

    fn day() -> DayNumber {
        DayNumber::new(4).unwrap()
    }

    fn catalog() -> Arc<ExerciseCatalog> {
        Arc::new(
            ExerciseCatalog::new(vec![
                Exercise::new("Squats", "", Some(30)).unwrap(),
                Exercise::new("Plank", "", Some(10)).unwrap(),
                Exercise::new("Stretch", "", None).unwrap(),
            ])
            .unwrap(),
        )
    }

    fn settings(auto_rest: bool) -> WorkoutSettings {
        WorkoutSettingsDraft {
            auto_rest_enabled: auto_rest,
            rest_duration_secs: 20,
            ..WorkoutSettingsDraft::default()
        }
        .validate()
        .unwrap()
    }

    struct Harness {
        sequencer: Sequencer,
        progress: ProgressStore,
    }

    impl Harness {
        fn new(auto_rest: bool) -> Self {
            let catalog = catalog();
            Self {
                sequencer: Sequencer::new(Arc::clone(&catalog), settings(auto_rest)),
                progress: ProgressStore::new(catalog),
            }
        }

        fn apply(&mut self, command: SequencerCommand) -> Vec<SequencerEffect> {
            self.sequencer
                .apply(&command, &mut self.progress, day())
                .unwrap()
        }

        fn tick_n(&mut self, command: &SequencerCommand, n: u32) -> Vec<SequencerEffect> {
            let mut all = Vec::new();
            for _ in 0..n {
                all.extend(self.apply(command.clone()));
            }
            all
        }
    }

    #[test]
    fn completion_against_foreign_progress_store_leaves_timer_untouched() {
        let mut h = Harness::new(true);
        h.progress = ProgressStore::new(Arc::new(
            ExerciseCatalog::new(vec![Exercise::new("Plank", "", Some(10)).unwrap()]).unwrap(),
        ));
        let squats = SequencerCommand::Tick(name("Squats"));
        h.apply(SequencerCommand::Start(name("Squats")));
        h.tick_n(&squats, 29);

        let err = h
            .sequencer
            .apply(&squats, &mut h.progress, day())
            .unwrap_err();
        assert!(matches!(
            err,
            SequencerError::Progress(ProgressError::UnknownExercise { .. })
        ));
        let timer = h.sequencer.timer("Squats").unwrap();
        assert_eq!(timer.elapsed_secs(), 29);
        assert!(timer.is_running());
        assert_eq!(h.sequencer.phase(), SessionPhase::Running);
    }

    #[test]
    fn timed_exercise_rests_then_starts_next() {
        let mut h = Harness::new(true);
        let effects = h.apply(SequencerCommand::Start(name("Squats")));
        assert_eq!(effects, vec![SequencerEffect::ClockStarted(name("Squats"))]);
        assert_eq!(h.sequencer.phase(), SessionPhase::Running);

        let effects = h.tick_n(&SequencerCommand::Tick(name("Squats")), 30);
        assert_eq!(
            h.sequencer.phase(),
            SessionPhase::Resting { remaining_secs: 20 }
        );
        assert!(effects.contains(&SequencerEffect::Notify(Cue::Completed)));
        assert!(effects.contains(&SequencerEffect::RestStarted { secs: 20 }));
        assert!(h.progress.is_complete(day(), "Squats"));
        assert!(!h.sequencer.timer("Squats").unwrap().is_running());
        assert_eq!(h.sequencer.current_index(), 0);

        let effects = h.tick_n(&SequencerCommand::RestTick, 20);
        assert_eq!(h.sequencer.phase(), SessionPhase::Running);
        assert_eq!(h.sequencer.current_index(), 1);
        let plank = h.sequencer.timer("Plank").unwrap();
        assert!(plank.is_running());
        assert_eq!(plank.elapsed_secs(), 0);
        assert_eq!(
            effects,
            vec![
                SequencerEffect::RestEnded,
                SequencerEffect::Advanced { from: 0, to: 1 },
                SequencerEffect::ClockStarted(name("Plank")),
            ]
        );
    }

    #[test]
    fn without_auto_rest_advances_paused() {
        let mut h = Harness::new(false);
        h.apply(SequencerCommand::Start(name("Squats")));
        h.tick_n(&SequencerCommand::Tick(name("Squats")), 30);
        assert_eq!(h.sequencer.phase(), SessionPhase::Paused);
        assert_eq!(h.sequencer.current_index(), 1);
        assert!(!h.sequencer.timer("Plank").unwrap().is_running());
    }

    #[test]
    fn last_exercise_completes_without_advance() {
        let catalog = Arc::new(
            ExerciseCatalog::new(vec![
                Exercise::new("Squats", "", Some(30)).unwrap(),
                Exercise::new("Plank", "", Some(10)).unwrap(),
            ])
            .unwrap(),
        );
        let mut sequencer = Sequencer::new(Arc::clone(&catalog), settings(true));
        let mut progress = ProgressStore::new(catalog);
        sequencer
            .apply(&SequencerCommand::GoTo(1), &mut progress, day())
            .unwrap();
        sequencer
            .apply(&SequencerCommand::Start(name("Plank")), &mut progress, day())
            .unwrap();
        for _ in 0..10 {
            sequencer
                .apply(&SequencerCommand::Tick(name("Plank")), &mut progress, day())
                .unwrap();
        }
        assert_eq!(sequencer.phase(), SessionPhase::Paused);
        assert_eq!(sequencer.current_index(), 1);
        assert!(progress.is_complete(day(), "Plank"));
    }

    #[test]
    fn navigation_stops_clock_and_keeps_elapsed() {
        let mut h = Harness::new(true);
        h.apply(SequencerCommand::Start(name("Squats")));
        h.tick_n(&SequencerCommand::Tick(name("Squats")), 7);

        let effects = h.apply(SequencerCommand::Next);
        assert_eq!(
            effects,
            vec![
                SequencerEffect::ClockStopped(name("Squats")),
                SequencerEffect::Advanced { from: 0, to: 1 },
            ]
        );
        let squats = h.sequencer.timer("Squats").unwrap();
        assert!(!squats.is_running());
        assert_eq!(squats.elapsed_secs(), 7);
        assert!(!h.sequencer.timer("Plank").unwrap().is_running());
        assert_eq!(h.sequencer.phase(), SessionPhase::Paused);
    }

    #[test]
    fn navigation_clamps_without_wraparound() {
        let mut h = Harness::new(true);
        assert!(h.apply(SequencerCommand::Previous).is_empty());
        assert_eq!(h.sequencer.current_index(), 0);

        h.apply(SequencerCommand::GoTo(99));
        assert_eq!(h.sequencer.current_index(), 2);
        h.apply(SequencerCommand::Next);
        assert_eq!(h.sequencer.current_index(), 2);
    }

    #[test]
    fn start_restarts_finished_timer() {
        let mut h = Harness::new(false);
        h.apply(SequencerCommand::GoTo(1));
        h.apply(SequencerCommand::Start(name("Plank")));
        h.tick_n(&SequencerCommand::Tick(name("Plank")), 10);
        assert_eq!(h.sequencer.timer("Plank").unwrap().elapsed_secs(), 10);

        h.apply(SequencerCommand::Start(name("Plank")));
        let plank = h.sequencer.timer("Plank").unwrap();
        assert_eq!(plank.elapsed_secs(), 0);
        assert!(plank.is_running());
    }

    #[test]
    fn reset_stops_clock_and_notifies() {
        let mut h = Harness::new(true);
        h.apply(SequencerCommand::Start(name("Squats")));
        h.tick_n(&SequencerCommand::Tick(name("Squats")), 5);

        let effects = h.apply(SequencerCommand::Reset(name("Squats")));
        assert_eq!(
            effects,
            vec![
                SequencerEffect::ClockStopped(name("Squats")),
                SequencerEffect::Notify(Cue::Reset),
            ]
        );
        assert_eq!(h.sequencer.timer("Squats").unwrap().elapsed_secs(), 0);
        assert_eq!(h.sequencer.phase(), SessionPhase::Paused);
    }

    #[test]
    fn free_running_timer_cues_periodically_and_never_completes() {
        let mut h = Harness::new(true);
        h.apply(SequencerCommand::GoTo(2));
        h.apply(SequencerCommand::Start(name("Stretch")));
        let effects = h.tick_n(&SequencerCommand::Tick(name("Stretch")), 95);

        let periodic = effects
            .iter()
            .filter(|e| **e == SequencerEffect::Notify(Cue::Periodic))
            .count();
        assert_eq!(periodic, 3);
        assert_eq!(h.sequencer.phase(), SessionPhase::Running);
        assert!(!h.progress.is_complete(day(), "Stretch"));
    }

    #[test]
    fn stale_ticks_are_ignored() {
        let mut h = Harness::new(true);
        let effects = h.apply(SequencerCommand::Tick(name("Squats")));
        assert!(effects.is_empty());
        assert_eq!(h.sequencer.timer("Squats").unwrap().elapsed_secs(), 0);
        assert!(h.apply(SequencerCommand::RestTick).is_empty());
    }

    #[test]
    fn exit_guided_stops_everything() {
        let mut h = Harness::new(true);
        h.apply(SequencerCommand::Start(name("Squats")));
        h.tick_n(&SequencerCommand::Tick(name("Squats")), 30);
        h.apply(SequencerCommand::Start(name("Stretch")));
        assert!(!h.sequencer.is_resting());

        let effects = h.apply(SequencerCommand::ExitGuided);
        assert_eq!(h.sequencer.running().count(), 0);
        assert_eq!(h.sequencer.phase(), SessionPhase::Paused);
        assert_eq!(effects.last(), Some(&SequencerEffect::AllClocksCancelled));

        let again = h.apply(SequencerCommand::ExitGuided);
        assert_eq!(again, vec![SequencerEffect::AllClocksCancelled]);
    }

    #[test]
    fn skip_rest_starts_next_exercise() {
        let mut h = Harness::new(true);
        h.apply(SequencerCommand::Start(name("Squats")));
        h.tick_n(&SequencerCommand::Tick(name("Squats")), 30);
        h.tick_n(&SequencerCommand::RestTick, 5);

        h.apply(SequencerCommand::SkipRest);
        assert_eq!(h.sequencer.current_index(), 1);
        assert_eq!(h.sequencer.phase(), SessionPhase::Running);
    }

    #[test]
    fn unknown_exercise_is_rejected() {
        let mut h = Harness::new(true);
        let err = h
            .sequencer
            .apply(
                &SequencerCommand::Start(name("Deadlift")),
                &mut h.progress,
                day(),
            )
            .unwrap_err();
        assert_eq!(
            err,
            SequencerError::UnknownExercise {
                name: "Deadlift".into()
            }
        );
    }

    #[test]
    fn restore_ignores_unknown_names() {
        let sequencer = Sequencer::restore(
            catalog(),
            WorkoutSettings::default(),
            [("Plank", 8), ("Deadlift", 3)],
        );
        assert_eq!(sequencer.timer("Plank").unwrap().elapsed_secs(), 8);
        assert_eq!(sequencer.running().count(), 0);
    }
}
