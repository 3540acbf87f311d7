/// Per-exercise clock state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimerState {
    elapsed_secs: u32,
    is_running: bool,
}

impl TimerState {
    /// Rehydrate a stopped timer with previously accumulated time.
    #[must_use]
    pub fn restored(elapsed_secs: u32) -> Self {
        Self {
            elapsed_secs,
            is_running: false,
        }
    }

    #[must_use]
    pub fn elapsed_secs(&self) -> u32 {
        self.elapsed_secs
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.is_running
    }

    /// True once the elapsed time has reached the given duration.
    ///
    /// Free-running timers (`None`) never finish.
    #[must_use]
    pub fn is_finished(&self, duration_secs: Option<u32>) -> bool {
        duration_secs.is_some_and(|d| self.elapsed_secs >= d)
    }

    pub(crate) fn start(&mut self) {
        self.is_running = true;
    }

    /// Returns whether the timer was running.
    pub(crate) fn stop(&mut self) -> bool {
        std::mem::replace(&mut self.is_running, false)
    }

    pub(crate) fn reset(&mut self) {
        self.elapsed_secs = 0;
    }

    pub(crate) fn advance(&mut self) -> u32 {
        self.elapsed_secs = self.elapsed_secs.saturating_add(1);
        self.elapsed_secs
    }
}
