//! Scoring module - form quality and feedback
//!
//! Re-exports only. All logic in submodules.

mod assessment;
mod scorer;

pub use assessment::{FeedbackEntry, FormAssessment, Severity};
pub use scorer::{normalized_deviation, score, score_features};
