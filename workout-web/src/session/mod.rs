//! Session module - stage tracking, hold timing, calories and the
//! per-frame pipeline.
//!
//! Re-exports only. All logic in submodules.

pub mod calories;
mod stage;
mod state;
mod summary;
mod tracker;

pub use stage::{HoldTimer, Stage, StageMachine, StageUpdate};
pub use state::SessionState;
pub use summary::{ExerciseTally, SessionSummary};
pub use tracker::{AnalysisResult, Frame, WorkoutSession};
