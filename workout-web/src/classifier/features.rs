//! Feature extraction for exercise classification and scoring
//!
//! Merges left/right joint readings into side-independent signals. A side
//! that is `Invalid` is simply left out; with both sides gone the feature is
//! absent.

use serde::{Deserialize, Serialize};

use crate::physics::{JointAngles, JointName};

/// Number of features per frame
pub const FEATURE_COUNT: usize = 8;

/// Diagnostic signals derived from joint angles (degrees)
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    /// Mean elbow flexion
    Elbow,
    /// Mean shoulder abduction (elbow-shoulder-hip)
    Shoulder,
    /// Mean hip angle (shoulder-hip-knee)
    Hip,
    /// Mean knee flexion
    Knee,
    /// Shoulder/hip/knee body line
    Torso,
    /// Trunk lean from vertical
    TorsoLean,
    /// |left elbow - right elbow|
    ElbowAsymmetry,
    /// |left knee - right knee|
    KneeAsymmetry,
}

impl Feature {
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::Elbow,
        Feature::Shoulder,
        Feature::Hip,
        Feature::Knee,
        Feature::Torso,
        Feature::TorsoLean,
        Feature::ElbowAsymmetry,
        Feature::KneeAsymmetry,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// One frame of features
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Features {
    values: [Option<f32>; FEATURE_COUNT],
}

impl Features {
    /// Extract all features from a frame's joint angles
    pub fn extract(angles: &JointAngles) -> Self {
        let pair = |l: JointName, r: JointName| (angles.degrees(l), angles.degrees(r));

        let elbows = pair(JointName::LeftElbow, JointName::RightElbow);
        let shoulders = pair(JointName::LeftShoulder, JointName::RightShoulder);
        let hips = pair(JointName::LeftHip, JointName::RightHip);
        let knees = pair(JointName::LeftKnee, JointName::RightKnee);

        let mut features = Features::default();
        features.set(Feature::Elbow, bilateral(elbows));
        features.set(Feature::Shoulder, bilateral(shoulders));
        features.set(Feature::Hip, bilateral(hips));
        features.set(Feature::Knee, bilateral(knees));
        features.set(Feature::Torso, angles.degrees(JointName::Torso));
        features.set(Feature::TorsoLean, angles.degrees(JointName::TorsoLean));
        features.set(Feature::ElbowAsymmetry, asymmetry(elbows));
        features.set(Feature::KneeAsymmetry, asymmetry(knees));
        features
    }

    pub fn get(&self, feature: Feature) -> Option<f32> {
        self.values[feature.index()]
    }

    pub fn set(&mut self, feature: Feature, value: Option<f32>) {
        self.values[feature.index()] = value;
    }

    /// Builder used by tests and callers that already have feature values
    pub fn with(mut self, feature: Feature, value: f32) -> Self {
        self.set(feature, Some(value));
        self
    }

}

/// Mean of the valid sides
fn bilateral((left, right): (Option<f32>, Option<f32>)) -> Option<f32> {
    match (left, right) {
        (Some(l), Some(r)) => Some((l + r) / 2.0),
        (Some(v), None) | (None, Some(v)) => Some(v),
        (None, None) => None,
    }
}

/// Needs both sides
fn asymmetry((left, right): (Option<f32>, Option<f32>)) -> Option<f32> {
    Some((left? - right?).abs())
}
