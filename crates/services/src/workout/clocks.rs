use std::collections::HashMap;
use std::time::Duration;

use log::debug;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use workout_core::SequencerEffect;
use workout_core::model::ExerciseName;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClockSource {
    Exercise(ExerciseName),
    Rest,
}

/// One period elapsed on a scheduled clock.
///
/// `generation` identifies the task that produced the tick, so ticks still
/// queued from a cancelled task can be told apart from the live one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockTick {
    pub source: ClockSource,
    pub generation: u64,
}

struct ScheduledClock {
    generation: u64,
    handle: JoinHandle<()>,
}

/// Owns the recurring clock tasks: one per running exercise plus the rest clock.
///
/// Stopping is unconditional and idempotent. Dropping the scheduler aborts
/// every task.
pub struct ClockScheduler {
    period: Duration,
    tx: mpsc::UnboundedSender<ClockTick>,
    exercises: HashMap<ExerciseName, ScheduledClock>,
    rest: Option<ScheduledClock>,
    next_generation: u64,
}

impl ClockScheduler {
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn new(period: Duration) -> (Self, mpsc::UnboundedReceiver<ClockTick>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let scheduler = Self {
            period,
            tx,
            exercises: HashMap::new(),
            rest: None,
            next_generation: 0,
        };
        (scheduler, rx)
    }

    fn spawn(&mut self, source: ClockSource) -> ScheduledClock {
        self.next_generation += 1;
        let generation = self.next_generation;
        let tx = self.tx.clone();
        let period = self.period;
        let handle = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let tick = ClockTick {
                    source: source.clone(),
                    generation,
                };
                if tx.send(tick).is_err() {
                    break;
                }
            }
        });
        ScheduledClock { generation, handle }
    }

    /// Start (or restart) the clock for `name`, cancelling any previous task.
    pub fn start_exercise(&mut self, name: &ExerciseName) {
        self.stop_exercise(name.as_str());
        let clock = self.spawn(ClockSource::Exercise(name.clone()));
        self.exercises.insert(name.clone(), clock);
    }

    /// Returns whether a task was cancelled.
    pub fn stop_exercise(&mut self, name: &str) -> bool {
        match self.exercises.remove(name) {
            Some(clock) => {
                clock.handle.abort();
                true
            }
            None => false,
        }
    }

    pub fn start_rest(&mut self) {
        self.stop_rest();
        self.rest = Some(self.spawn(ClockSource::Rest));
    }

    pub fn stop_rest(&mut self) -> bool {
        match self.rest.take() {
            Some(clock) => {
                clock.handle.abort();
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&mut self) {
        for (_, clock) in self.exercises.drain() {
            clock.handle.abort();
        }
        self.stop_rest();
    }

    #[must_use]
    pub fn is_exercise_active(&self, name: &str) -> bool {
        self.exercises.contains_key(name)
    }

    #[must_use]
    pub fn is_rest_active(&self) -> bool {
        self.rest.is_some()
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.exercises.len() + usize::from(self.rest.is_some())
    }

    /// True if the tick came from the task currently scheduled for its source.
    #[must_use]
    pub fn is_current(&self, tick: &ClockTick) -> bool {
        let clock = match &tick.source {
            ClockSource::Exercise(name) => self.exercises.get(name.as_str()),
            ClockSource::Rest => self.rest.as_ref(),
        };
        clock.is_some_and(|clock| clock.generation == tick.generation)
    }

    /// Bring the scheduled tasks in line with the sequencer's effects.
    pub fn apply_effects(&mut self, effects: &[SequencerEffect]) {
        for effect in effects {
            match effect {
                SequencerEffect::ClockStarted(name) => self.start_exercise(name),
                SequencerEffect::ClockStopped(name) => {
                    self.stop_exercise(name.as_str());
                }
                SequencerEffect::RestStarted { .. } => self.start_rest(),
                SequencerEffect::RestEnded => {
                    self.stop_rest();
                }
                SequencerEffect::AllClocksCancelled => {
                    self.cancel_all();
                    debug!("clock scheduler: all tasks aborted");
                }
                SequencerEffect::Notify(_)
                | SequencerEffect::MarkedComplete(_)
                | SequencerEffect::Advanced { .. } => {}
            }
        }
    }
}

impl Drop for ClockScheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
