//! Joint angle calculation using dot product
//!
//! Every joint is a triplet of anchors; the angle is measured at the middle
//! anchor between the vectors to the two outer anchors, in the image plane.
//! A joint whose anchors are not all confident is `Invalid` and never
//! replaced by a default reading.

use std::collections::BTreeMap;

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::pose::{BodyPart, Keypoint, Pose};

/// Vectors shorter than this (pixels) are treated as degenerate
const MIN_SEGMENT_LENGTH: f32 = 1e-4;

// ============================================================================
// JOINT TABLE
// ============================================================================

/// Named joint angles derived from a pose
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JointName {
    LeftElbow,
    RightElbow,
    LeftShoulder,
    RightShoulder,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    /// Shoulder midpoint / hip midpoint / knee midpoint (180 = straight body line)
    Torso,
    /// Lean of the trunk from image vertical (0 = upright, 90 = horizontal)
    TorsoLean,
}

/// One corner of a joint triplet
#[derive(Clone, Copy, Debug)]
enum Anchor {
    Part(BodyPart),
    Mid(BodyPart, BodyPart),
    /// Fixed point straight above the vertex (image y grows downwards)
    Up,
}

impl JointName {
    pub const ALL: [JointName; 10] = [
        JointName::LeftElbow,
        JointName::RightElbow,
        JointName::LeftShoulder,
        JointName::RightShoulder,
        JointName::LeftHip,
        JointName::RightHip,
        JointName::LeftKnee,
        JointName::RightKnee,
        JointName::Torso,
        JointName::TorsoLean,
    ];

    /// (first, vertex, last)
    fn triplet(self) -> (Anchor, Anchor, Anchor) {
        use Anchor::{Mid, Part, Up};
        use BodyPart::*;

        match self {
            JointName::LeftElbow => (Part(LeftShoulder), Part(LeftElbow), Part(LeftWrist)),
            JointName::RightElbow => (Part(RightShoulder), Part(RightElbow), Part(RightWrist)),
            JointName::LeftShoulder => (Part(LeftElbow), Part(LeftShoulder), Part(LeftHip)),
            JointName::RightShoulder => (Part(RightElbow), Part(RightShoulder), Part(RightHip)),
            JointName::LeftHip => (Part(LeftShoulder), Part(LeftHip), Part(LeftKnee)),
            JointName::RightHip => (Part(RightShoulder), Part(RightHip), Part(RightKnee)),
            JointName::LeftKnee => (Part(LeftHip), Part(LeftKnee), Part(LeftAnkle)),
            JointName::RightKnee => (Part(RightHip), Part(RightKnee), Part(RightAnkle)),
            JointName::Torso => (
                Mid(LeftShoulder, RightShoulder),
                Mid(LeftHip, RightHip),
                Mid(LeftKnee, RightKnee),
            ),
            JointName::TorsoLean => (Up, Mid(LeftHip, RightHip), Mid(LeftShoulder, RightShoulder)),
        }
    }
}

impl Anchor {
    fn resolve(self, pose: &Pose, vertex: Option<&Keypoint>) -> Keypoint {
        match self {
            Anchor::Part(part) => *pose.get(part),
            Anchor::Mid(a, b) => pose.midpoint(a, b),
            Anchor::Up => {
                // Only ever used as an outer anchor, so the vertex is known.
                let v = vertex.copied().unwrap_or_default();
                Keypoint::new(v.x, v.y - 1.0, 1.0)
            }
        }
    }
}

// ============================================================================
// ANGLES
// ============================================================================

/// A joint reading: degrees in [0, 180] or excluded
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JointAngle {
    Valid(f32),
    Invalid,
}

impl JointAngle {
    pub fn degrees(&self) -> Option<f32> {
        match self {
            JointAngle::Valid(d) => Some(*d),
            JointAngle::Invalid => None,
        }
    }
}

/// All joint readings for one frame, in `JointName` order
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct JointAngles {
    angles: BTreeMap<JointName, JointAngle>,
}

impl JointAngles {
    pub fn get(&self, joint: JointName) -> JointAngle {
        self.angles.get(&joint).copied().unwrap_or(JointAngle::Invalid)
    }

    pub fn degrees(&self, joint: JointName) -> Option<f32> {
        self.get(joint).degrees()
    }

    pub fn insert(&mut self, joint: JointName, angle: JointAngle) {
        self.angles.insert(joint, angle);
    }

    /// Valid readings only
    pub fn valid(&self) -> BTreeMap<JointName, f32> {
        self.angles
            .iter()
            .filter_map(|(j, a)| a.degrees().map(|d| (*j, d)))
            .collect()
    }
}

impl FromIterator<(JointName, f32)> for JointAngles {
    fn from_iter<I: IntoIterator<Item = (JointName, f32)>>(iter: I) -> Self {
        let mut angles = JointAngles::default();
        for (joint, degrees) in iter {
            angles.insert(joint, JointAngle::Valid(degrees));
        }
        angles
    }
}

/// Calculate the angle at `vertex` in degrees
///
/// Uses dot product formula: cos(θ) = (v1 · v2) / (|v1| × |v2|)
///
/// Returns `None` when either segment has no length.
pub fn calculate_angle(first: Vector2<f32>, vertex: Vector2<f32>, last: Vector2<f32>) -> Option<f32> {
    let v1 = first - vertex;
    let v2 = last - vertex;

    let mag1 = v1.norm();
    let mag2 = v2.norm();
    if mag1 < MIN_SEGMENT_LENGTH || mag2 < MIN_SEGMENT_LENGTH {
        return None;
    }

    let cos_angle = (v1.dot(&v2) / (mag1 * mag2)).clamp(-1.0, 1.0);
    let degrees = cos_angle.acos().to_degrees();
    degrees.is_finite().then(|| degrees.clamp(0.0, 180.0))
}

/// Compute every joint in the table. Joints touching a keypoint below
/// `threshold` are `Invalid`.
pub fn compute_angles(pose: &Pose, threshold: f32) -> JointAngles {
    let mut angles = JointAngles::default();

    for joint in JointName::ALL {
        let (first, vertex, last) = joint.triplet();
        let v = vertex.resolve(pose, None);
        let a = first.resolve(pose, Some(&v));
        let c = last.resolve(pose, Some(&v));

        let confident = [a, v, c].iter().all(|k| k.is_confident(threshold));
        let angle = if confident {
            calculate_angle(a.position(), v.position(), c.position())
                .map_or(JointAngle::Invalid, JointAngle::Valid)
        } else {
            JointAngle::Invalid
        };
        angles.insert(joint, angle);
    }

    angles
}
