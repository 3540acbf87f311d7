use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;

use crate::model::day::{DayNumber, WEEK_WINDOWS};
use crate::model::exercise::{ExerciseCatalog, ExerciseName};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("unknown exercise: {name}")]
    UnknownExercise { name: String },
}

/// Completion flags for one program day.
///
/// A day without a record is equivalent to all-incomplete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayRecord {
    flags: BTreeMap<ExerciseName, bool>,
}

impl DayRecord {
    #[must_use]
    pub fn is_complete(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }

    #[must_use]
    pub fn completed_count(&self) -> u32 {
        let count = self.flags.values().filter(|done| **done).count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&ExerciseName, bool)> {
        self.flags.iter().map(|(name, done)| (name, *done))
    }
}

/// Weekly chart bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekRollup {
    pub label: &'static str,
    pub days_with_any_completion: u32,
    pub days_in_window: u32,
}

/// One cell of the 30-day history grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayStatus {
    pub day: DayNumber,
    pub completed: u32,
    pub percent: u8,
    pub fully_complete: bool,
}

/// Per-day, per-exercise completion tracking and derived statistics.
#[derive(Debug, Clone)]
pub struct ProgressStore {
    catalog: Arc<ExerciseCatalog>,
    days: BTreeMap<DayNumber, DayRecord>,
}

impl ProgressStore {
    #[must_use]
    pub fn new(catalog: Arc<ExerciseCatalog>) -> Self {
        Self {
            catalog,
            days: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &ExerciseCatalog {
        &self.catalog
    }

    fn known_name(&self, name: &str) -> Result<ExerciseName, ProgressError> {
        self.catalog
            .find(name)
            .map(|exercise| exercise.name().clone())
            .ok_or_else(|| ProgressError::UnknownExercise {
                name: name.to_string(),
            })
    }

    /// Flip the completion flag, creating the day record if absent.
    ///
    /// Returns the new value.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::UnknownExercise` if the name is not in the catalog.
    pub fn toggle_complete(&mut self, day: DayNumber, name: &str) -> Result<bool, ProgressError> {
        let name = self.known_name(name)?;
        let flag = self
            .days
            .entry(day)
            .or_default()
            .flags
            .entry(name)
            .or_insert(false);
        *flag = !*flag;
        Ok(*flag)
    }

    /// Force the completion flag. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::UnknownExercise` if the name is not in the catalog.
    pub fn set_complete(
        &mut self,
        day: DayNumber,
        name: &str,
        value: bool,
    ) -> Result<(), ProgressError> {
        let name = self.known_name(name)?;
        self.days.entry(day).or_default().flags.insert(name, value);
        Ok(())
    }

    /// Remove the whole day record. Returns whether a record existed.
    pub fn clear_day(&mut self, day: DayNumber) -> bool {
        self.days.remove(&day).is_some()
    }

    #[must_use]
    pub fn day_record(&self, day: DayNumber) -> Option<&DayRecord> {
        self.days.get(&day)
    }

    /// Days with a record, ascending.
    pub fn records(&self) -> impl Iterator<Item = (DayNumber, &DayRecord)> {
        self.days.iter().map(|(day, record)| (*day, record))
    }

    #[must_use]
    pub fn is_complete(&self, day: DayNumber, name: &str) -> bool {
        self.days
            .get(&day)
            .is_some_and(|record| record.is_complete(name))
    }

    #[must_use]
    pub fn completion_count(&self, day: DayNumber) -> u32 {
        self.days
            .get(&day)
            .map_or(0, DayRecord::completed_count)
            .min(self.catalog.size())
    }

    /// `round(100 * count / catalog_size)`, halves rounded up.
    #[must_use]
    pub fn completion_percent(&self, day: DayNumber) -> u8 {
        let size = u64::from(self.catalog.size().max(1));
        let count = u64::from(self.completion_count(day));
        let percent = (200 * count + size) / (2 * size);
        u8::try_from(percent.min(100)).unwrap_or(100)
    }

    #[must_use]
    pub fn is_day_fully_complete(&self, day: DayNumber) -> bool {
        self.completion_count(day) == self.catalog.size()
    }

    /// Consecutive fully complete days walking backward from `reference`.
    #[must_use]
    pub fn current_streak(&self, reference: DayNumber) -> u32 {
        let mut streak = 0;
        let mut cursor = Some(reference);
        while let Some(day) = cursor {
            if !self.is_day_fully_complete(day) {
                break;
            }
            streak += 1;
            cursor = day.previous();
        }
        streak
    }

    /// Longest run of consecutive fully complete days anywhere in the program.
    #[must_use]
    pub fn longest_streak(&self) -> u32 {
        let mut best = 0;
        let mut run = 0;
        for day in DayNumber::all() {
            if self.is_day_fully_complete(day) {
                run += 1;
                best = best.max(run);
            } else {
                run = 0;
            }
        }
        best
    }

    /// Per week window, the number of days with at least one completion.
    #[must_use]
    pub fn weekly_rollup(&self) -> Vec<WeekRollup> {
        WEEK_WINDOWS
            .iter()
            .map(|window| {
                let active = window
                    .days()
                    .filter(|day| self.completion_count(*day) > 0)
                    .count();
                WeekRollup {
                    label: window.label,
                    days_with_any_completion: u32::try_from(active).unwrap_or(u32::MAX),
                    days_in_window: window.day_count(),
                }
            })
            .collect()
    }

    #[must_use]
    pub fn fully_completed_day_count(&self) -> u32 {
        let count = DayNumber::all()
            .filter(|day| self.is_day_fully_complete(*day))
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    #[must_use]
    pub fn total_completions(&self) -> u32 {
        DayNumber::all().map(|day| self.completion_count(day)).sum()
    }

    /// The 30-day grid, one entry per program day.
    #[must_use]
    pub fn history(&self) -> Vec<DayStatus> {
        DayNumber::all()
            .map(|day| DayStatus {
                day,
                completed: self.completion_count(day),
                percent: self.completion_percent(day),
                fully_complete: self.is_day_fully_complete(day),
            })
            .collect()
    }
}
