//! Error types for frame analysis and configuration loading
//!
//! Low-confidence tracking, "no exercise" and debounced transitions are
//! normal outcomes and never show up here.

use std::path::PathBuf;

/// Reasons a frame is refused. A refused frame leaves the session untouched.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnalysisError {
    #[error("expected {expected} keypoints, got {found}")]
    InvalidKeypointCount { expected: usize, found: usize },

    #[error("flat keypoint buffer has {len} values, expected a multiple of 3")]
    InvalidFlatLength { len: usize },

    #[error("keypoint {index} has a non-finite coordinate or score")]
    NonFiniteKeypoint { index: usize },

    #[error("keypoint {index} score {score} outside [0, 1]")]
    ScoreOutOfRange { index: usize, score: f32 },

    #[error("unknown exercise type: {0}")]
    UnknownExercise(String),

    #[error("frame timestamp must be finite, got {0}")]
    InvalidTimestamp(f64),

    #[error("stale frame at {timestamp}s, last frame was at {last}s")]
    StaleFrame { timestamp: f64, last: f64 },

    #[error("session already finished")]
    SessionEnded,
}

/// Failures while loading or validating an [`AnalyzerConfig`](crate::config::AnalyzerConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

pub type FrameResult<T> = Result<T, AnalysisError>;
