use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExerciseError {
    #[error("exercise name cannot be empty")]
    EmptyName,

    #[error("exercise duration must be > 0 seconds")]
    InvalidDuration,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("exercise catalog cannot be empty")]
    Empty,

    #[error("duplicate exercise name: {name}")]
    DuplicateName { name: String },
}

//
// ─── NAME ──────────────────────────────────────────────────────────────────────
//

/// Stable identifier of an exercise within a catalog.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExerciseName(String);

impl ExerciseName {
    /// Creates a trimmed, non-empty exercise name.
    ///
    /// # Errors
    ///
    /// Returns `ExerciseError::EmptyName` if the name is blank.
    pub fn new(name: impl Into<String>) -> Result<Self, ExerciseError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ExerciseError::EmptyName);
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ExerciseName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ExerciseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExerciseName({:?})", self.0)
    }
}

impl fmt::Display for ExerciseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

//
// ─── EXERCISE ──────────────────────────────────────────────────────────────────
//

/// A single entry in the program.
///
/// Exercises without a duration run a free count-up timer that never
/// completes on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exercise {
    name: ExerciseName,
    instructions: String,
    duration_secs: Option<u32>,
}

impl Exercise {
    /// Creates an exercise.
    ///
    /// # Errors
    ///
    /// Returns `ExerciseError::EmptyName` for a blank name and
    /// `ExerciseError::InvalidDuration` for a zero duration.
    pub fn new(
        name: impl Into<String>,
        instructions: impl Into<String>,
        duration_secs: Option<u32>,
    ) -> Result<Self, ExerciseError> {
        if duration_secs == Some(0) {
            return Err(ExerciseError::InvalidDuration);
        }
        Ok(Self {
            name: ExerciseName::new(name)?,
            instructions: instructions.into(),
            duration_secs,
        })
    }

    #[must_use]
    pub fn name(&self) -> &ExerciseName {
        &self.name
    }

    #[must_use]
    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    #[must_use]
    pub fn duration_secs(&self) -> Option<u32> {
        self.duration_secs
    }

    #[must_use]
    pub fn is_timed(&self) -> bool {
        self.duration_secs.is_some()
    }
}

//
// ─── CATALOG ───────────────────────────────────────────────────────────────────
//

/// Ordered, non-empty list of exercises with unique names.
///
/// Order defines the navigation sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExerciseCatalog {
    exercises: Vec<Exercise>,
}

impl ExerciseCatalog {
    /// Creates a catalog from an ordered list.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Empty` for an empty list and
    /// `CatalogError::DuplicateName` if two exercises share a name.
    pub fn new(exercises: Vec<Exercise>) -> Result<Self, CatalogError> {
        if exercises.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::with_capacity(exercises.len());
        for exercise in &exercises {
            if !seen.insert(exercise.name.as_str()) {
                return Err(CatalogError::DuplicateName {
                    name: exercise.name.to_string(),
                });
            }
        }
        Ok(Self { exercises })
    }

    /// The built-in 18 exercise program.
    #[must_use]
    pub fn default_program() -> Self {
        let exercises = DEFAULT_PROGRAM
            .iter()
            .map(|(name, instructions, duration_secs)| Exercise {
                name: ExerciseName((*name).to_string()),
                instructions: (*instructions).to_string(),
                duration_secs: *duration_secs,
            })
            .collect();
        Self { exercises }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    /// Always false; catalogs are validated non-empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    /// Catalog size as used by completion statistics.
    #[must_use]
    pub fn size(&self) -> u32 {
        u32::try_from(self.exercises.len()).unwrap_or(u32::MAX)
    }

    #[must_use]
    pub fn last_index(&self) -> usize {
        self.exercises.len().saturating_sub(1)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Exercise] {
        &self.exercises
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Exercise> {
        self.exercises.get(index)
    }

    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.exercises.iter().position(|e| e.name.as_str() == name)
    }

    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Exercise> {
        self.exercises.iter().find(|e| e.name.as_str() == name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Exercise> {
        self.exercises.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &ExerciseName> {
        self.exercises.iter().map(Exercise::name)
    }
}

const DEFAULT_PROGRAM: &[(&str, &str, Option<u32>)] = &[
    (
        "Jumping Jacks",
        "Jump feet apart while raising arms overhead, then return.",
        Some(60),
    ),
    (
        "Bodyweight Squats",
        "Feet shoulder-width apart, sit back until thighs are parallel.",
        Some(45),
    ),
    (
        "Push-ups",
        "Hands under shoulders, lower chest to the floor, keep a straight line.",
        Some(45),
    ),
    (
        "Plank",
        "Forearms on the floor, hold a straight line from head to heels.",
        Some(60),
    ),
    (
        "Alternating Lunges",
        "Step forward and lower the back knee, alternate legs.",
        Some(45),
    ),
    (
        "Glute Bridges",
        "Lie on your back, drive hips up and squeeze at the top.",
        Some(45),
    ),
    (
        "Mountain Climbers",
        "From a high plank, drive knees to chest in quick succession.",
        Some(30),
    ),
    (
        "Superman Hold",
        "Lie face down, lift arms and legs off the floor and hold.",
        Some(30),
    ),
    (
        "Side Plank Left",
        "Prop on the left forearm, lift hips and hold.",
        Some(30),
    ),
    (
        "Side Plank Right",
        "Prop on the right forearm, lift hips and hold.",
        Some(30),
    ),
    (
        "Burpees",
        "Squat, kick back to plank, return and jump.",
        Some(30),
    ),
    (
        "Wall Sit",
        "Back against a wall, knees at ninety degrees, hold.",
        Some(45),
    ),
    (
        "Tricep Dips",
        "Hands on a chair edge behind you, lower and press up.",
        Some(30),
    ),
    (
        "High Knees",
        "Run in place driving knees up to hip height.",
        Some(30),
    ),
    (
        "Bicycle Crunches",
        "Alternate elbow to opposite knee with a slow twist.",
        Some(45),
    ),
    (
        "Calf Raises",
        "Rise onto the balls of the feet, lower slowly.",
        Some(45),
    ),
    (
        "Bird Dog",
        "On all fours, extend opposite arm and leg, alternate sides.",
        Some(45),
    ),
    (
        "Cool-down Stretch",
        "Stretch at your own pace. Pause the timer when finished.",
        None,
    ),
];
