use thiserror::Error;
use workout_core::Cue;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum NotifyError {
    #[error("playback rejected: {0}")]
    Playback(String),
}

/// Fire-and-forget audio/haptic feedback.
///
/// Errors are reported for logging only; callers never propagate them.
pub trait Notifier: Send + Sync {
    /// # Errors
    ///
    /// Returns `NotifyError` if the cue could not be played.
    fn notify(&self, cue: Cue) -> Result<(), NotifyError>;
}

/// Notifier for headless use.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _cue: Cue) -> Result<(), NotifyError> {
        Ok(())
    }
}
