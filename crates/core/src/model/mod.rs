mod day;
mod exercise;
mod progress;
mod settings;
mod timer;

pub use day::{DayError, DayNumber, PROGRAM_DAYS, WEEK_WINDOWS, WeekWindow};
pub use exercise::{CatalogError, Exercise, ExerciseCatalog, ExerciseError, ExerciseName};
pub use progress::{DayRecord, DayStatus, ProgressError, ProgressStore, WeekRollup};
pub use settings::{SettingsError, WorkoutSettings, WorkoutSettingsDraft};
pub use timer::TimerState;
