use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of day slots in the program.
pub const PROGRAM_DAYS: u8 = 30;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DayError {
    #[error("day {day} is outside 1..=30")]
    OutOfRange { day: i64 },

    #[error("failed to parse day number from {input:?}")]
    Parse { input: String },
}

/// One of the 30 ordinal program slots. Not a calendar date.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DayNumber(u8);

impl DayNumber {
    pub const FIRST: Self = Self(1);
    pub const LAST: Self = Self(PROGRAM_DAYS);

    /// Creates a `DayNumber`.
    ///
    /// # Errors
    ///
    /// Returns `DayError::OutOfRange` unless `1 <= day <= 30`.
    pub fn new(day: u8) -> Result<Self, DayError> {
        if (1..=PROGRAM_DAYS).contains(&day) {
            Ok(Self(day))
        } else {
            Err(DayError::OutOfRange {
                day: i64::from(day),
            })
        }
    }

    #[must_use]
    pub fn value(&self) -> u8 {
        self.0
    }

    /// The day before this one, or `None` on day 1.
    #[must_use]
    pub fn previous(&self) -> Option<Self> {
        (self.0 > 1).then(|| Self(self.0 - 1))
    }

    /// All program days in ascending order.
    pub fn all() -> impl DoubleEndedIterator<Item = DayNumber> {
        (1..=PROGRAM_DAYS).map(Self)
    }
}

impl Default for DayNumber {
    fn default() -> Self {
        Self::FIRST
    }
}

impl TryFrom<u8> for DayNumber {
    type Error = DayError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<i64> for DayNumber {
    type Error = DayError;

    fn try_from(day: i64) -> Result<Self, Self::Error> {
        u8::try_from(day)
            .map_err(|_| DayError::OutOfRange { day })
            .and_then(Self::new)
    }
}

impl From<DayNumber> for u8 {
    fn from(day: DayNumber) -> Self {
        day.0
    }
}

impl fmt::Debug for DayNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Day({})", self.0)
    }
}

impl fmt::Display for DayNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DayNumber {
    type Err = DayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let day = s.trim().parse::<i64>().map_err(|_| DayError::Parse {
            input: s.to_string(),
        })?;
        Self::try_from(day)
    }
}

//
// ─── WEEKS ─────────────────────────────────────────────────────────────────────
//

/// A fixed window of program days used for the weekly chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekWindow {
    pub label: &'static str,
    pub first: u8,
    pub last: u8,
}

impl WeekWindow {
    #[must_use]
    pub fn contains(&self, day: DayNumber) -> bool {
        (self.first..=self.last).contains(&day.value())
    }

    pub fn days(&self) -> impl Iterator<Item = DayNumber> {
        (self.first..=self.last).map(DayNumber)
    }

    #[must_use]
    pub fn day_count(&self) -> u32 {
        u32::from(self.last - self.first + 1)
    }
}

/// The last window absorbs the remainder of the 30 days.
pub const WEEK_WINDOWS: [WeekWindow; 4] = [
    WeekWindow {
        label: "W1",
        first: 1,
        last: 7,
    },
    WeekWindow {
        label: "W2",
        first: 8,
        last: 14,
    },
    WeekWindow {
        label: "W3",
        first: 15,
        last: 21,
    },
    WeekWindow {
        label: "W4",
        first: 22,
        last: PROGRAM_DAYS,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_days_outside_program() {
        assert!(DayNumber::new(0).is_err());
        assert!(DayNumber::new(31).is_err());
        assert_eq!(DayNumber::new(30).unwrap(), DayNumber::LAST);
    }

    #[test]
    fn previous_stops_at_first_day() {
        assert_eq!(DayNumber::FIRST.previous(), None);
        assert_eq!(DayNumber::new(5).unwrap().previous(), DayNumber::new(4).ok());
    }

    #[test]
    fn parses_from_str() {
        let day: DayNumber = " 12 ".parse().unwrap();
        assert_eq!(day.value(), 12);
        assert!(matches!(
            "-3".parse::<DayNumber>(),
            Err(DayError::OutOfRange { day: -3 })
        ));
        assert!(matches!(
            "twelve".parse::<DayNumber>(),
            Err(DayError::Parse { .. })
        ));
    }

    #[test]
    fn wide_integers_outside_program_are_rejected() {
        assert_eq!(DayNumber::try_from(7_i64).unwrap().value(), 7);
        assert_eq!(
            DayNumber::try_from(300_i64),
            Err(DayError::OutOfRange { day: 300 })
        );
        assert_eq!(
            DayNumber::try_from(-1_i64),
            Err(DayError::OutOfRange { day: -1 })
        );
    }

    #[test]
    fn week_windows_cover_every_day_once() {
        for day in DayNumber::all() {
            let hits = WEEK_WINDOWS.iter().filter(|w| w.contains(day)).count();
            assert_eq!(hits, 1, "day {day} covered {hits} times");
        }
        assert_eq!(WEEK_WINDOWS[3].day_count(), 9);
    }
}
