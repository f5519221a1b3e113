//! Signature matching - picks the exercise whose profile best explains the
//! current features, with hysteresis against flicker.

use log::debug;

use crate::config::{AnalyzerConfig, ExerciseProfile};
use crate::physics::{BandPosition, HysteresisBand, JointAngles};

use super::features::{Feature, Features};
use super::model::ExerciseType;

/// Result of classifying one frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Classification {
    pub exercise: ExerciseType,
    /// Deviation of the chosen exercise's signature, if it could be computed
    pub deviation: Option<f32>,
    /// True when a manual override bypassed the classifier
    pub overridden: bool,
}

impl Classification {
    fn none() -> Self {
        Self {
            exercise: ExerciseType::None,
            deviation: None,
            overridden: false,
        }
    }
}

/// Sum of squared distances (deg²) from each valid signature feature to its
/// range, 0 inside. `None` if fewer than `min_valid` features are present.
pub fn signature_deviation(profile: &ExerciseProfile, features: &Features) -> Option<f32> {
    deviation_skipping(profile, features, None)
}

/// Deviation of the current exercise, ignoring the feature its tracking
/// follows. That feature sweeps the whole cycle (arms down in a jumping
/// jack, standing tall between squats) and must not end the exercise.
pub fn retention_deviation(profile: &ExerciseProfile, features: &Features) -> Option<f32> {
    deviation_skipping(profile, features, Some(profile.tracking.feature()))
}

fn deviation_skipping(profile: &ExerciseProfile, features: &Features, skip: Option<Feature>) -> Option<f32> {
    let mut valid = 0;
    let mut total = 0.0;

    for range in &profile.signature {
        let Some(value) = features.get(range.feature) else {
            continue;
        };
        valid += 1;
        if Some(range.feature) == skip {
            continue;
        }
        let distance = if value < range.min {
            range.min - value
        } else if value > range.max {
            value - range.max
        } else {
            0.0
        };
        total += distance * distance;
    }

    (valid >= profile.min_valid).then_some(total)
}

/// Classify from joint angles
pub fn classify(
    angles: &JointAngles,
    previous: ExerciseType,
    manual_override: Option<ExerciseType>,
    config: &AnalyzerConfig,
) -> Classification {
    classify_features(&Features::extract(angles), previous, manual_override, config)
}

/// Classify from already extracted features. `previous` is the last
/// exercise actually detected; it is judged by [`retention_deviation`].
pub fn classify_features(
    features: &Features,
    previous: ExerciseType,
    manual_override: Option<ExerciseType>,
    config: &AnalyzerConfig,
) -> Classification {
    if let Some(exercise) = manual_override {
        return Classification {
            exercise,
            deviation: config
                .profile(exercise)
                .and_then(|p| signature_deviation(p, features)),
            overridden: true,
        };
    }

    let max_deviation = config.classifier.max_deviation;
    let candidates: Vec<(ExerciseType, f32)> = config
        .exercises
        .iter()
        .filter_map(|p| {
            let deviation = if p.exercise == previous {
                retention_deviation(p, features)
            } else {
                signature_deviation(p, features)
            };
            deviation
                .filter(|d| *d <= max_deviation)
                .map(|d| (p.exercise, d))
        })
        .collect();

    // First minimum wins, so profile order breaks ties.
    let Some(&(best, best_deviation)) = candidates.iter().min_by(|a, b| a.1.total_cmp(&b.1)) else {
        return Classification::none();
    };

    if best != previous {
        if let Some(&(_, previous_deviation)) = candidates.iter().find(|(e, _)| *e == previous) {
            let band = HysteresisBand::around(previous_deviation, config.classifier.hysteresis_margin);
            if band.position(best_deviation) != BandPosition::Below {
                return Classification {
                    exercise: previous,
                    deviation: Some(previous_deviation),
                    overridden: false,
                };
            }
        }
        debug!(
            "classifier: {} -> {} (deviation {:.1})",
            previous, best, best_deviation
        );
    }

    Classification {
        exercise: best,
        deviation: Some(best_deviation),
        overridden: false,
    }
}
