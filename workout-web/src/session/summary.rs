//! End-of-session summary handed to persistence

use serde::{Deserialize, Serialize};

use crate::classifier::ExerciseType;

/// Work credited to one exercise
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExerciseTally {
    pub exercise: ExerciseType,
    pub reps: u32,
    pub hold_seconds: f64,
    pub calories: f64,
}

impl ExerciseTally {
    pub fn new(exercise: ExerciseType) -> Self {
        Self {
            exercise,
            reps: 0,
            hold_seconds: 0.0,
            calories: 0.0,
        }
    }

    pub fn has_work(&self) -> bool {
        self.reps > 0 || self.hold_seconds > 0.0
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Exercise with the most reps, else the longest hold. `None` if no
    /// work was credited.
    pub exercise_type: ExerciseType,
    /// Totals over every exercise
    pub reps: u32,
    pub hold_seconds: f64,
    /// First to last accepted frame
    pub duration_seconds: f64,
    /// Mean per-frame form score over scored frames, 0 if none
    pub form_score: f32,
    pub calories: f64,
    pub frames: u64,
    /// Per-exercise breakdown, in `ExerciseType` order
    pub exercises: Vec<ExerciseTally>,
}

impl SessionSummary {
    /// JSON body for the persistence backend
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
