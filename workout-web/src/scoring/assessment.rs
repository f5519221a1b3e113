//! Form assessment data structures

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Good,
    Warning,
    Error,
}

/// One line of feedback from one criterion
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub criterion: String,
    pub message: String,
    pub severity: Severity,
}

/// Form score in [0, 1] with feedback in criterion order
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FormAssessment {
    pub score: f32,
    pub feedback: Vec<FeedbackEntry>,
    /// Criteria that had a valid reading this frame
    pub evaluated: usize,
}

impl FormAssessment {
    /// Nothing measured: score 0, no feedback
    pub fn empty() -> Self {
        Self::default()
    }
}
