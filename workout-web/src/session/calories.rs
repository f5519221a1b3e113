//! Calorie estimation from completed reps or held seconds

use crate::classifier::ExerciseType;
use crate::config::{AnalyzerConfig, Tracking};

/// kcal for `reps` just completed or `seconds` just held, per the
/// exercise's tracking mode. Unknown exercises burn nothing.
pub fn estimate(exercise: ExerciseType, reps: u32, seconds: f64, config: &AnalyzerConfig) -> f64 {
    config
        .profile(exercise)
        .map_or(0.0, |p| estimate_for(&p.tracking, reps, seconds))
}

pub fn estimate_for(tracking: &Tracking, reps: u32, seconds: f64) -> f64 {
    let kcal = match *tracking {
        Tracking::Reps { kcal_per_rep, .. } => kcal_per_rep * f64::from(reps),
        Tracking::Hold { kcal_per_second, .. } => kcal_per_second * seconds,
    };
    kcal.max(0.0)
}
