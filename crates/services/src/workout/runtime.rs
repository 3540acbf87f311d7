use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::mpsc;
use workout_core::{SequencerCommand, SequencerEffect};

use super::clocks::{ClockScheduler, ClockSource, ClockTick};
use super::session::{WorkoutCommand, WorkoutSession};
use crate::error::WorkoutError;

/// Event loop for a guided workout.
///
/// Commands and clock ticks are applied one at a time against the session,
/// and the clock tasks are rescheduled from the resulting effects, so a tick
/// is always a complete transition.
pub struct WorkoutRuntime {
    session: WorkoutSession,
    clocks: ClockScheduler,
    ticks: mpsc::UnboundedReceiver<ClockTick>,
}

impl WorkoutRuntime {
    pub const TICK_PERIOD: Duration = Duration::from_secs(1);

    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn new(session: WorkoutSession) -> Self {
        Self::with_tick_period(session, Self::TICK_PERIOD)
    }

    #[must_use]
    pub fn with_tick_period(session: WorkoutSession, period: Duration) -> Self {
        let (clocks, ticks) = ClockScheduler::new(period);
        Self {
            session,
            clocks,
            ticks,
        }
    }

    #[must_use]
    pub fn session(&self) -> &WorkoutSession {
        &self.session
    }

    #[must_use]
    pub fn clocks(&self) -> &ClockScheduler {
        &self.clocks
    }

    /// Apply a command and reschedule clocks accordingly.
    ///
    /// # Errors
    ///
    /// Returns `WorkoutError` if the session rejects the command; clocks are
    /// left untouched in that case.
    pub async fn dispatch(
        &mut self,
        command: WorkoutCommand,
    ) -> Result<Vec<SequencerEffect>, WorkoutError> {
        let effects = self.session.dispatch(command).await?;
        self.clocks.apply_effects(&effects);
        Ok(effects)
    }

    /// Wait for the next live clock tick and apply it.
    ///
    /// Returns `None` immediately when no clock is scheduled.
    pub async fn process_next_tick(&mut self) -> Option<Vec<SequencerEffect>> {
        while self.clocks.active_count() > 0 {
            let tick = self.ticks.recv().await?;
            if let Some(effects) = self.handle_tick(tick).await {
                return Some(effects);
            }
        }
        None
    }

    async fn handle_tick(&mut self, tick: ClockTick) -> Option<Vec<SequencerEffect>> {
        if !self.clocks.is_current(&tick) {
            debug!("dropping stale tick from {:?}", tick.source);
            return None;
        }
        let command = match tick.source {
            ClockSource::Exercise(name) => SequencerCommand::Tick(name),
            ClockSource::Rest => SequencerCommand::RestTick,
        };
        match self.dispatch(command.into()).await {
            Ok(effects) => Some(effects),
            Err(err) => {
                warn!("tick rejected: {err}");
                None
            }
        }
    }

    /// Stop every exercise clock and the rest clock, whatever their state.
    pub async fn exit_guided(&mut self) {
        if let Err(err) = self.dispatch(SequencerCommand::ExitGuided.into()).await {
            warn!("exit rejected: {err}");
        }
        self.clocks.cancel_all();
    }

    /// Drive the session until the command channel closes, then exit guided
    /// mode and hand the session back.
    pub async fn run(mut self, mut commands: mpsc::Receiver<WorkoutCommand>) -> WorkoutSession {
        info!("workout runtime started");
        loop {
            tokio::select! {
                biased;
                command = commands.recv() => match command {
                    Some(command) => {
                        if let Err(err) = self.dispatch(command).await {
                            warn!("command rejected: {err}");
                        }
                    }
                    None => break,
                },
                Some(tick) = self.ticks.recv() => {
                    let _ = self.handle_tick(tick).await;
                }
            }
        }
        self.exit_guided().await;
        info!("workout runtime stopped");
        self.into_session()
    }

    /// Cancel all clocks and return the session.
    #[must_use]
    pub fn into_session(self) -> WorkoutSession {
        let Self {
            session,
            mut clocks,
            ..
        } = self;
        clocks.cancel_all();
        session
    }
}
