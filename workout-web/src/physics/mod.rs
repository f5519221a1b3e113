//! Physics module - keypoint smoothing, joint geometry and hysteresis
//!
//! Re-exports only. All logic in submodules.

mod angles;
mod hysteresis;
mod smoothing;

pub use angles::{calculate_angle, compute_angles, JointAngle, JointAngles, JointName};
pub use hysteresis::{BandPosition, Debounce, HysteresisBand};
pub use smoothing::{blend, KeypointSmoother, SmoothingState, DEFAULT_ALPHA, DEFAULT_CONFIDENCE};
