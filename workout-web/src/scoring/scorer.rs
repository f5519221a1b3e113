//! Form scorer - compares features against each criterion's ideal range
//!
//! Pure function of (exercise, angles, config). Criteria whose feature is
//! missing are skipped entirely, so tracking loss never lowers the score.

use crate::classifier::{ExerciseType, Features};
use crate::config::{AnalyzerConfig, Criterion};
use crate::physics::JointAngles;

use super::assessment::{FeedbackEntry, FormAssessment, Severity};

/// Distance from `[min, max]` divided by `tolerance`, clamped to [0, 1]
pub fn normalized_deviation(value: f32, criterion: &Criterion) -> f32 {
    let distance = if value < criterion.ideal_min {
        criterion.ideal_min - value
    } else if value > criterion.ideal_max {
        value - criterion.ideal_max
    } else {
        0.0
    };
    (distance / criterion.tolerance).clamp(0.0, 1.0)
}

/// Score an exercise from joint angles
pub fn score(exercise: ExerciseType, angles: &JointAngles, config: &AnalyzerConfig) -> FormAssessment {
    score_features(exercise, &Features::extract(angles), config)
}

/// Score an exercise from already extracted features
pub fn score_features(exercise: ExerciseType, features: &Features, config: &AnalyzerConfig) -> FormAssessment {
    let Some(profile) = config.profile(exercise) else {
        return FormAssessment::empty();
    };

    let thresholds = config.feedback;
    let mut feedback = Vec::with_capacity(profile.criteria.len());
    let mut total = 0.0;

    for criterion in &profile.criteria {
        let Some(value) = features.get(criterion.feature) else {
            continue;
        };

        let deviation = normalized_deviation(value, criterion);
        total += deviation;

        let (severity, message) = if deviation > thresholds.error_threshold {
            (Severity::Error, &criterion.error)
        } else if deviation > thresholds.warning_threshold {
            (Severity::Warning, &criterion.warning)
        } else {
            (Severity::Good, &criterion.good)
        };
        feedback.push(FeedbackEntry {
            criterion: criterion.name.clone(),
            message: message.clone(),
            severity,
        });
    }

    let evaluated = feedback.len();
    if evaluated == 0 {
        return FormAssessment::empty();
    }

    FormAssessment {
        score: (1.0 - total / evaluated as f32).clamp(0.0, 1.0),
        feedback,
        evaluated,
    }
}
