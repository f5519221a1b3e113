//! Classifier module - exercise recognition from joint-angle signatures
//!
//! Features are merged from left/right joint readings, then matched against
//! each exercise profile's signature ranges.

mod features;
mod matcher;
mod model;

pub use features::{Feature, Features, FEATURE_COUNT};
pub use matcher::{classify, classify_features, signature_deviation, Classification};
pub use model::{ExerciseType, EXERCISE_TYPES};
