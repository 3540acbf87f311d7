use chrono::{DateTime, Duration, Utc};

/// Source of wall-clock timestamps for snapshot stamping.
///
/// Session timers do not read this; they count ticks. Only the `savedAt`
/// field of a persisted snapshot comes from here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Clock {
    #[default]
    System,
    Fixed(DateTime<Utc>),
}

impl Clock {
    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(at) => *at,
        }
    }

    /// Move a fixed clock forward. No effect on the system clock.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Fixed(at) = self {
            *at += delta;
        }
    }

    #[must_use]
    pub fn is_fixed(&self) -> bool {
        matches!(self, Clock::Fixed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn morning() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_735_715_400, 0).unwrap()
    }

    #[test]
    fn fixed_clock_only_moves_when_advanced() {
        let mut clock = Clock::fixed(morning());
        assert_eq!(clock.now(), morning());
        assert_eq!(clock.now(), morning());

        clock.advance(Duration::seconds(90));
        assert_eq!(clock.now(), morning() + Duration::seconds(90));
        assert!(clock.is_fixed());
    }

    #[test]
    fn system_clock_ignores_advance() {
        let mut clock = Clock::default();
        clock.advance(Duration::days(1));
        assert_eq!(clock, Clock::System);
        assert!(!clock.is_fixed());
    }
}
