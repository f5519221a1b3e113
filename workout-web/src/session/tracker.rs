//! Workout session - the per-frame analysis pipeline
//!
//! raw keypoints -> validated pose -> smoothed pose -> joint angles ->
//! exercise -> stage/rep or hold -> form score -> calories
//!
//! Each session owns its state; callers hold one `WorkoutSession` per
//! tracked person and feed it frames in timestamp order.

use std::collections::BTreeMap;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::classifier::{classify_features, ExerciseType, Features};
use crate::config::{AnalyzerConfig, Tracking};
use crate::error::{AnalysisError, ConfigError, FrameResult};
use crate::physics::{compute_angles, HysteresisBand, JointName, KeypointSmoother, SmoothingState};
use crate::pose::{Keypoint, Pose};
use crate::scoring::{score_features, FeedbackEntry};

use super::calories;
use super::stage::Stage;
use super::state::SessionState;
use super::summary::SessionSummary;

// ============================================================================
// FRAME IN / RESULT OUT
// ============================================================================

/// One pose-estimator output with its capture time
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// 17 keypoints in MoveNet order
    pub keypoints: Vec<Keypoint>,
    /// Capture time in seconds, caller's clock
    pub timestamp: f64,
    /// Skip classification and track this exercise
    #[serde(default)]
    pub exercise_override: Option<ExerciseType>,
}

impl Frame {
    pub fn new(keypoints: Vec<Keypoint>, timestamp: f64) -> Self {
        Self {
            keypoints,
            timestamp,
            exercise_override: None,
        }
    }

    pub fn with_override(mut self, exercise: ExerciseType) -> Self {
        self.exercise_override = Some(exercise);
        self
    }

    /// Build from a flat `[x, y, score] * 17` buffer and an optional
    /// exercise name. An empty name means no override.
    pub fn from_flat(data: &[f32], timestamp: f64, exercise_override: Option<&str>) -> FrameResult<Self> {
        if data.len() % 3 != 0 {
            return Err(AnalysisError::InvalidFlatLength { len: data.len() });
        }
        let exercise_override = match exercise_override.map(str::trim) {
            None | Some("") => None,
            Some(name) => Some(name.parse::<ExerciseType>()?),
        };
        Ok(Self {
            keypoints: data.chunks_exact(3).map(|c| Keypoint::new(c[0], c[1], c[2])).collect(),
            timestamp,
            exercise_override,
        })
    }
}

/// Everything the UI needs after one frame
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub exercise_detected: bool,
    pub exercise_type: ExerciseType,
    pub form_score: f32,
    pub feedback: Vec<FeedbackEntry>,
    /// Valid joints only, degrees
    pub joint_angles: BTreeMap<JointName, f32>,
    pub stage: Stage,
    pub rep_count: u32,
    pub hold_seconds: f64,
    pub calories: f64,
}

// ============================================================================
// SESSION
// ============================================================================

pub struct WorkoutSession {
    config: AnalyzerConfig,
    smoother: KeypointSmoother,
    smoothing: SmoothingState,
    state: SessionState,
}

impl WorkoutSession {
    /// Start a session. The config is validated first, so a session never
    /// runs with settings `AnalyzerConfig::load` would have refused.
    pub fn new(config: AnalyzerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: AnalyzerConfig) -> Self {
        Self {
            smoother: KeypointSmoother::new(config.smoothing_alpha, config.confidence_threshold),
            smoothing: SmoothingState::new(),
            state: SessionState::new(config.debounce_seconds),
            config,
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn summary(&self) -> SessionSummary {
        self.state.summary()
    }

    /// Finish the session and hand back its summary
    pub fn end(self) -> SessionSummary {
        let summary = self.state.summary();
        debug!(
            "session: ended after {} frames, {} reps, {:.1}s held, {:.2} kcal",
            summary.frames, summary.reps, summary.hold_seconds, summary.calories
        );
        summary
    }

    /// Run one frame through the pipeline. A rejected frame leaves the
    /// session exactly as it was.
    pub fn analyze(&mut self, frame: &Frame) -> FrameResult<AnalysisResult> {
        let now = frame.timestamp;
        let pose = self.validate(frame).map_err(|e| {
            warn!("session: frame at {now}s rejected: {e}");
            e
        })?;

        let elapsed = self
            .state
            .last_frame_at
            .map_or(0.0, |last| (now - last).min(self.config.max_frame_gap_seconds));

        let smoothed = self.smoother.smooth(&pose, &mut self.smoothing);
        let angles = compute_angles(&smoothed, self.config.confidence_threshold);
        let features = Features::extract(&angles);

        let classification = classify_features(
            &features,
            self.state.last_detected,
            frame.exercise_override,
            &self.config,
        );
        let exercise = classification.exercise;
        self.switch_exercise(exercise);
        self.track(exercise, &features, now, elapsed);

        let assessment = score_features(exercise, &features, &self.config);
        if exercise.is_detected() && assessment.evaluated > 0 {
            self.state.record_form(assessment.score);
        }

        self.state.frames += 1;
        self.state.started_at.get_or_insert(now);
        self.state.last_frame_at = Some(now);

        Ok(AnalysisResult {
            exercise_detected: exercise.is_detected(),
            exercise_type: exercise,
            form_score: assessment.score,
            feedback: assessment.feedback,
            joint_angles: angles.valid(),
            stage: self.state.stage(),
            rep_count: self.state.rep_count(),
            hold_seconds: self.state.hold_seconds(),
            calories: self.state.calories,
        })
    }

    fn validate(&self, frame: &Frame) -> FrameResult<Pose> {
        let now = frame.timestamp;
        if !now.is_finite() {
            return Err(AnalysisError::InvalidTimestamp(now));
        }
        if let Some(last) = self.state.last_frame_at {
            if now < last {
                return Err(AnalysisError::StaleFrame { timestamp: now, last });
            }
        }
        Pose::from_keypoints(&frame.keypoints)
    }

    /// A newly detected exercise starts from neutral. Losing the exercise
    /// freezes the machine instead.
    fn switch_exercise(&mut self, exercise: ExerciseType) {
        self.state.exercise = exercise;
        if !exercise.is_detected() || exercise == self.state.last_detected {
            return;
        }
        debug!("session: exercise {} -> {}", self.state.last_detected, exercise);
        self.state.stage.reset_stage();
        self.state.hold.pause();
        self.state.last_detected = exercise;
    }

    fn track(&mut self, exercise: ExerciseType, features: &Features, now: f64, elapsed: f64) {
        let Some(tracking) = self.config.profile(exercise).map(|p| p.tracking) else {
            self.state.hold.pause();
            return;
        };

        match tracking {
            Tracking::Reps { feature, lower, upper, .. } => {
                self.state.hold.pause();
                let Some(value) = features.get(feature) else {
                    return;
                };
                let update = self.state.stage.update(HysteresisBand::new(lower, upper), value, now);
                if update.rep_completed {
                    let kcal = calories::estimate(exercise, 1, 0.0, &self.config);
                    self.state.record_rep(exercise, kcal);
                }
            }
            Tracking::Hold { feature, min_angle, .. } => {
                let qualifies = features.get(feature).is_some_and(|v| v >= min_angle);
                let credited = self.state.hold.update(qualifies, elapsed);
                let kcal = calories::estimate(exercise, 0, credited, &self.config);
                self.state.record_hold(exercise, credited, kcal);
            }
        }
    }
}

impl Default for WorkoutSession {
    fn default() -> Self {
        Self::with_valid_config(AnalyzerConfig::default())
    }
}
