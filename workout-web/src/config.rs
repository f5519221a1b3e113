//! Analyzer configuration - tuning constants and the exercise profile table
//!
//! Every per-exercise number (classifier signature, stage thresholds, form
//! criteria, calorie rate) lives in an `ExerciseProfile` so a new exercise
//! is a new table entry rather than new branching in the pipeline.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::classifier::{ExerciseType, Feature};
use crate::error::ConfigError;
use crate::physics::{DEFAULT_ALPHA, DEFAULT_CONFIDENCE};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Keypoints below this score are excluded from smoothing and angles
    pub confidence_threshold: f32,
    /// History weight of the keypoint smoother
    pub smoothing_alpha: f32,
    /// Minimum seconds between accepted stage transitions
    pub debounce_seconds: f64,
    /// Upper bound on the time credited between two consecutive frames
    pub max_frame_gap_seconds: f64,
    pub classifier: ClassifierConfig,
    pub feedback: FeedbackConfig,
    pub exercises: Vec<ExerciseProfile>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Candidates with a larger summed squared deviation (deg²) are rejected
    pub max_deviation: f32,
    /// A new candidate must beat the current exercise by this much (deg²)
    pub hysteresis_margin: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    /// Normalized deviation above which a criterion emits a warning
    pub warning_threshold: f32,
    /// Normalized deviation above which a criterion emits an error
    pub error_threshold: f32,
}

/// Everything the pipeline knows about one exercise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseProfile {
    pub exercise: ExerciseType,
    /// Fewer valid signature features than this and the exercise is not a candidate
    pub min_valid: usize,
    pub tracking: Tracking,
    /// Target ranges that identify the exercise. Once detected, the range on
    /// the tracked feature no longer decides whether it continues.
    pub signature: Vec<SignatureRange>,
    /// Form criteria, in feedback order
    pub criteria: Vec<Criterion>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignatureRange {
    pub feature: Feature,
    pub min: f32,
    pub max: f32,
}

/// How progress is measured for an exercise
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Tracking {
    /// Down/up cycles on `feature`
    Reps {
        feature: Feature,
        lower: f32,
        upper: f32,
        kcal_per_rep: f64,
    },
    /// Static hold while `feature` stays at or above `min_angle`
    Hold {
        feature: Feature,
        min_angle: f32,
        kcal_per_second: f64,
    },
}

impl Tracking {
    pub fn feature(&self) -> Feature {
        match self {
            Tracking::Reps { feature, .. } | Tracking::Hold { feature, .. } => *feature,
        }
    }
}

/// One form rule: ideal range with a tolerance for normalizing deviation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    pub name: String,
    pub feature: Feature,
    pub ideal_min: f32,
    pub ideal_max: f32,
    /// Degrees outside the ideal range that count as full deviation
    pub tolerance: f32,
    pub good: String,
    pub warning: String,
    pub error: String,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE,
            smoothing_alpha: DEFAULT_ALPHA,
            debounce_seconds: 0.3,
            max_frame_gap_seconds: 2.0,
            classifier: ClassifierConfig::default(),
            feedback: FeedbackConfig::default(),
            exercises: default_profiles(),
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            max_deviation: 900.0,
            hysteresis_margin: 400.0,
        }
    }
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            warning_threshold: 0.3,
            error_threshold: 0.7,
        }
    }
}

impl AnalyzerConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn profile(&self, exercise: ExerciseType) -> Option<&ExerciseProfile> {
        self.exercises.iter().find(|p| p.exercise == exercise)
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return invalid(format!("confidence_threshold {} outside [0, 1]", self.confidence_threshold));
        }
        if !(0.0..1.0).contains(&self.smoothing_alpha) {
            return invalid(format!("smoothing_alpha {} outside [0, 1)", self.smoothing_alpha));
        }
        if !(self.debounce_seconds >= 0.0) {
            return invalid(format!("debounce_seconds {} is negative", self.debounce_seconds));
        }
        if !(self.max_frame_gap_seconds > 0.0) {
            return invalid(format!("max_frame_gap_seconds {} must be positive", self.max_frame_gap_seconds));
        }
        if !(self.classifier.max_deviation >= 0.0 && self.classifier.hysteresis_margin >= 0.0) {
            return invalid("classifier deviation and margin must be non-negative".into());
        }
        let fb = self.feedback;
        if !(0.0 < fb.warning_threshold && fb.warning_threshold < fb.error_threshold && fb.error_threshold <= 1.0) {
            return invalid(format!(
                "feedback thresholds must satisfy 0 < warning ({}) < error ({}) <= 1",
                fb.warning_threshold, fb.error_threshold
            ));
        }

        for (i, profile) in self.exercises.iter().enumerate() {
            let name = profile.exercise;
            if name == ExerciseType::None {
                return invalid("profile for exercise 'none'".into());
            }
            if self.exercises[..i].iter().any(|p| p.exercise == name) {
                return invalid(format!("duplicate profile for {name}"));
            }
            if profile.min_valid == 0 || profile.min_valid > profile.signature.len() {
                return invalid(format!(
                    "{name}: min_valid {} must be within 1..={}",
                    profile.min_valid,
                    profile.signature.len()
                ));
            }
            if let Some(r) = profile.signature.iter().find(|r| !(r.min <= r.max)) {
                return invalid(format!("{name}: signature range for {:?} is inverted", r.feature));
            }
            match profile.tracking {
                Tracking::Reps { lower, upper, kcal_per_rep, .. } => {
                    if !(lower < upper) {
                        return invalid(format!("{name}: stage lower {lower} must be below upper {upper}"));
                    }
                    if !(kcal_per_rep >= 0.0) {
                        return invalid(format!("{name}: negative calorie rate"));
                    }
                }
                Tracking::Hold { min_angle, kcal_per_second, .. } => {
                    if !(0.0..=180.0).contains(&min_angle) {
                        return invalid(format!("{name}: hold angle {min_angle} outside [0, 180]"));
                    }
                    if !(kcal_per_second >= 0.0) {
                        return invalid(format!("{name}: negative calorie rate"));
                    }
                }
            }
            for c in &profile.criteria {
                if !(c.ideal_min <= c.ideal_max) || !(c.tolerance > 0.0) {
                    return invalid(format!("{name}: criterion '{}' has an empty range or tolerance", c.name));
                }
            }
        }

        Ok(())
    }
}

// ============================================================================
// DEFAULT PROFILES
// ============================================================================

fn range(feature: Feature, min: f32, max: f32) -> SignatureRange {
    SignatureRange { feature, min, max }
}

fn criterion(
    name: &str,
    feature: Feature,
    ideal: (f32, f32),
    tolerance: f32,
    good: &str,
    warning: &str,
    error: &str,
) -> Criterion {
    Criterion {
        name: name.to_string(),
        feature,
        ideal_min: ideal.0,
        ideal_max: ideal.1,
        tolerance,
        good: good.to_string(),
        warning: warning.to_string(),
        error: error.to_string(),
    }
}

/// Built-in table for the four supported exercises
pub fn default_profiles() -> Vec<ExerciseProfile> {
    use Feature::*;

    vec![
        ExerciseProfile {
            exercise: ExerciseType::PushUp,
            min_valid: 2,
            tracking: Tracking::Reps {
                feature: Elbow,
                lower: 100.0,
                upper: 160.0,
                kcal_per_rep: 0.5,
            },
            signature: vec![
                range(TorsoLean, 55.0, 125.0),
                range(Elbow, 50.0, 160.0),
                range(Torso, 140.0, 180.0),
            ],
            criteria: vec![
                criterion(
                    "body_line",
                    Torso,
                    (160.0, 180.0),
                    25.0,
                    "Straight line from shoulders to heels",
                    "Keep your hips in line with your shoulders",
                    "Hips are sagging or piked - hold a straight line from head to heels",
                ),
                criterion(
                    "leg_line",
                    Knee,
                    (160.0, 180.0),
                    25.0,
                    "Legs straight and locked",
                    "Straighten your legs",
                    "Knees are bent - keep your legs straight for a full push-up",
                ),
                criterion(
                    "arm_symmetry",
                    ElbowAsymmetry,
                    (0.0, 15.0),
                    30.0,
                    "Both arms working evenly",
                    "Lower evenly on both arms",
                    "One arm is doing most of the work - keep your elbows matched",
                ),
            ],
        },
        ExerciseProfile {
            exercise: ExerciseType::Squat,
            min_valid: 2,
            tracking: Tracking::Reps {
                feature: Knee,
                lower: 120.0,
                upper: 160.0,
                kcal_per_rep: 0.32,
            },
            signature: vec![
                range(Knee, 60.0, 145.0),
                range(TorsoLean, 0.0, 50.0),
                range(Shoulder, 0.0, 110.0),
            ],
            criteria: vec![
                criterion(
                    "chest_up",
                    TorsoLean,
                    (0.0, 45.0),
                    30.0,
                    "Chest up, back upright",
                    "Keep your chest up",
                    "Leaning too far forward - keep your back more upright",
                ),
                criterion(
                    "knee_range",
                    Knee,
                    (60.0, 180.0),
                    25.0,
                    "Controlled squat depth",
                    "You're squatting very deep - stay in control",
                    "Too deep - be careful with your knees",
                ),
                criterion(
                    "knee_tracking",
                    KneeAsymmetry,
                    (0.0, 15.0),
                    25.0,
                    "Knees tracking evenly",
                    "Keep your knees tracking evenly over your toes",
                    "Knees are uneven - don't let one cave inward",
                ),
            ],
        },
        ExerciseProfile {
            exercise: ExerciseType::Plank,
            min_valid: 2,
            tracking: Tracking::Hold {
                feature: Torso,
                min_angle: 150.0,
                kcal_per_second: 0.07,
            },
            signature: vec![
                range(TorsoLean, 55.0, 125.0),
                range(Elbow, 150.0, 180.0),
                range(Torso, 155.0, 180.0),
            ],
            criteria: vec![
                criterion(
                    "hip_line",
                    Torso,
                    (165.0, 180.0),
                    20.0,
                    "Great plank - body in a straight line",
                    "Bring your hips in line with your body",
                    "Hips are sagging or raised - form a straight line",
                ),
                criterion(
                    "leg_line",
                    Knee,
                    (160.0, 180.0),
                    20.0,
                    "Legs straight",
                    "Straighten your legs",
                    "Keep your legs straight and in line with your body",
                ),
                criterion(
                    "shoulder_stack",
                    Shoulder,
                    (70.0, 110.0),
                    25.0,
                    "Shoulders stacked over your hands",
                    "Move your hands closer to under your shoulders",
                    "Position your arms directly under your shoulders",
                ),
            ],
        },
        ExerciseProfile {
            exercise: ExerciseType::JumpingJack,
            min_valid: 2,
            tracking: Tracking::Reps {
                feature: Shoulder,
                lower: 35.0,
                upper: 100.0,
                kcal_per_rep: 0.2,
            },
            signature: vec![
                range(TorsoLean, 0.0, 25.0),
                range(Knee, 150.0, 180.0),
                range(Shoulder, 125.0, 180.0),
            ],
            criteria: vec![
                criterion(
                    "arm_extension",
                    Elbow,
                    (150.0, 180.0),
                    30.0,
                    "Arms long and extended",
                    "Keep your arms straighter",
                    "Arms are bent - extend them fully",
                ),
                criterion(
                    "upright",
                    TorsoLean,
                    (0.0, 15.0),
                    20.0,
                    "Upright and balanced",
                    "Stay a little more upright",
                    "You're leaning - keep your torso upright",
                ),
                criterion(
                    "leg_line",
                    Knee,
                    (150.0, 180.0),
                    25.0,
                    "Good control on the landing",
                    "Land softly but keep your legs extended",
                    "Knees are buckling - keep your legs extended",
                ),
            ],
        },
    ]
}
