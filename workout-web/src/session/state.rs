//! Per-session mutable state
//!
//! Owned by exactly one `WorkoutSession`; nothing here is global.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::classifier::ExerciseType;

use super::stage::{HoldTimer, Stage, StageMachine};
use super::summary::{ExerciseTally, SessionSummary};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SessionState {
    /// Exercise classified on the latest frame
    pub(crate) exercise: ExerciseType,
    /// Most recent exercise other than `None`
    pub(crate) last_detected: ExerciseType,
    pub(crate) stage: StageMachine,
    pub(crate) hold: HoldTimer,
    pub(crate) calories: f64,
    /// Work per exercise that earned any
    pub(crate) tallies: BTreeMap<ExerciseType, ExerciseTally>,
    pub(crate) frames: u64,
    /// Sum and count of per-frame form scores that were actually measured
    pub(crate) form_total: f64,
    pub(crate) form_frames: u64,
    /// Timestamps (seconds) of the first and latest accepted frames
    pub(crate) started_at: Option<f64>,
    pub(crate) last_frame_at: Option<f64>,
}

impl SessionState {
    pub fn new(debounce_seconds: f64) -> Self {
        Self {
            exercise: ExerciseType::None,
            last_detected: ExerciseType::None,
            stage: StageMachine::new(debounce_seconds),
            hold: HoldTimer::new(),
            calories: 0.0,
            tallies: BTreeMap::new(),
            frames: 0,
            form_total: 0.0,
            form_frames: 0,
            started_at: None,
            last_frame_at: None,
        }
    }

    pub fn exercise(&self) -> ExerciseType {
        self.exercise
    }

    pub fn stage(&self) -> Stage {
        self.stage.stage()
    }

    pub fn previous_stage(&self) -> Stage {
        self.stage.previous()
    }

    pub fn rep_count(&self) -> u32 {
        self.stage.rep_count()
    }

    pub fn last_transition(&self) -> Option<f64> {
        self.stage.last_transition()
    }

    pub fn hold_seconds(&self) -> f64 {
        self.hold.accumulated()
    }

    pub fn calories(&self) -> f64 {
        self.calories
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn last_frame_at(&self) -> Option<f64> {
        self.last_frame_at
    }

    /// Mean measured form score, 0 before anything was scored
    pub fn form_score(&self) -> f32 {
        if self.form_frames == 0 {
            0.0
        } else {
            (self.form_total / self.form_frames as f64) as f32
        }
    }

    pub fn tally(&self, exercise: ExerciseType) -> Option<&ExerciseTally> {
        self.tallies.get(&exercise)
    }

    pub(crate) fn record_rep(&mut self, exercise: ExerciseType, kcal: f64) {
        let tally = self.tally_mut(exercise);
        tally.reps += 1;
        tally.calories += kcal;
        self.calories += kcal;
    }

    pub(crate) fn record_hold(&mut self, exercise: ExerciseType, seconds: f64, kcal: f64) {
        if seconds <= 0.0 {
            return;
        }
        let tally = self.tally_mut(exercise);
        tally.hold_seconds += seconds;
        tally.calories += kcal;
        self.calories += kcal;
    }

    fn tally_mut(&mut self, exercise: ExerciseType) -> &mut ExerciseTally {
        self.tallies
            .entry(exercise)
            .or_insert_with(|| ExerciseTally::new(exercise))
    }

    /// Most reps wins, then longest hold. Frames without credited work
    /// never decide.
    pub fn main_exercise(&self) -> ExerciseType {
        self.tallies
            .values()
            .filter(|t| t.has_work())
            .max_by(|a, b| a.reps.cmp(&b.reps).then(a.hold_seconds.total_cmp(&b.hold_seconds)))
            .map_or(ExerciseType::None, |t| t.exercise)
    }

    pub(crate) fn record_form(&mut self, score: f32) {
        self.form_total += f64::from(score);
        self.form_frames += 1;
    }

    pub fn summary(&self) -> SessionSummary {
        let duration = match (self.started_at, self.last_frame_at) {
            (Some(start), Some(last)) => (last - start).max(0.0),
            _ => 0.0,
        };
        SessionSummary {
            exercise_type: self.main_exercise(),
            reps: self.rep_count(),
            hold_seconds: self.hold_seconds(),
            duration_seconds: duration,
            form_score: self.form_score(),
            calories: self.calories,
            frames: self.frames,
            exercises: self.tallies.values().copied().collect(),
        }
    }
}
