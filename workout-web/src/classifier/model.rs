//! Exercise labels

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Exercise type labels (order is the classifier's tie-break order)
pub const EXERCISE_TYPES: [&str; 5] = ["push_up", "squat", "plank", "jumping_jack", "none"];

/// Exercise type enum for type-safe handling
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseType {
    PushUp,
    Squat,
    Plank,
    JumpingJack,
    /// Nothing recognised
    #[default]
    None,
}

impl ExerciseType {
    /// Every recognisable exercise (excludes `None`)
    pub const ACTIVE: [ExerciseType; 4] = [
        ExerciseType::PushUp,
        ExerciseType::Squat,
        ExerciseType::Plank,
        ExerciseType::JumpingJack,
    ];

    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => ExerciseType::PushUp,
            1 => ExerciseType::Squat,
            2 => ExerciseType::Plank,
            3 => ExerciseType::JumpingJack,
            _ => ExerciseType::None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExerciseType::PushUp => "push_up",
            ExerciseType::Squat => "squat",
            ExerciseType::Plank => "plank",
            ExerciseType::JumpingJack => "jumping_jack",
            ExerciseType::None => "none",
        }
    }

    pub fn is_detected(&self) -> bool {
        *self != ExerciseType::None
    }
}

impl fmt::Display for ExerciseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExerciseType {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EXERCISE_TYPES
            .iter()
            .position(|name| *name == s.trim())
            .map(ExerciseType::from_index)
            .ok_or_else(|| AnalysisError::UnknownExercise(s.to_string()))
    }
}
