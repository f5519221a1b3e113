//! Pose module - keypoint data model
//!
//! Re-exports only. All logic in submodules.

mod keypoint;

pub use keypoint::{BodyPart, Keypoint, Pose, KEYPOINT_COUNT, FLAT_KEYPOINT_LEN};
