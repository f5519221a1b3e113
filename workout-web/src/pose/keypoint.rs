//! Keypoint storage and validation
//!
//! Receives raw keypoints from the pose-estimation model (17 body parts,
//! MoveNet order) and turns them into a validated `Pose`.

use std::ops::Index;

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, FrameResult};

// ============================================================================
// BODY PARTS (MoveNet - 17 total)
// ============================================================================

pub const KEYPOINT_COUNT: usize = 17;

/// Length of a flat `[x, y, score] * 17` buffer coming from JavaScript
pub const FLAT_KEYPOINT_LEN: usize = KEYPOINT_COUNT * 3;

/// Canonical body parts. The discriminant is the index into a `Pose`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum BodyPart {
    Nose = 0,
    LeftEye = 1,
    RightEye = 2,
    LeftEar = 3,
    RightEar = 4,
    LeftShoulder = 5,
    RightShoulder = 6,
    LeftElbow = 7,
    RightElbow = 8,
    LeftWrist = 9,
    RightWrist = 10,
    LeftHip = 11,
    RightHip = 12,
    LeftKnee = 13,
    RightKnee = 14,
    LeftAnkle = 15,
    RightAnkle = 16,
}

impl BodyPart {
    pub const ALL: [BodyPart; KEYPOINT_COUNT] = [
        BodyPart::Nose,
        BodyPart::LeftEye,
        BodyPart::RightEye,
        BodyPart::LeftEar,
        BodyPart::RightEar,
        BodyPart::LeftShoulder,
        BodyPart::RightShoulder,
        BodyPart::LeftElbow,
        BodyPart::RightElbow,
        BodyPart::LeftWrist,
        BodyPart::RightWrist,
        BodyPart::LeftHip,
        BodyPart::RightHip,
        BodyPart::LeftKnee,
        BodyPart::RightKnee,
        BodyPart::LeftAnkle,
        BodyPart::RightAnkle,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

}

// ============================================================================
// KEYPOINT
// ============================================================================

/// A single 2D keypoint in pixel coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    /// Detection confidence [0, 1]
    pub score: f32,
}

impl Keypoint {
    pub fn new(x: f32, y: f32, score: f32) -> Self {
        Self { x, y, score }
    }

    pub fn is_confident(&self, threshold: f32) -> bool {
        self.score >= threshold
    }

    pub fn position(&self) -> Vector2<f32> {
        Vector2::new(self.x, self.y)
    }

    fn check(&self, index: usize) -> FrameResult<()> {
        if !(self.x.is_finite() && self.y.is_finite() && self.score.is_finite()) {
            return Err(AnalysisError::NonFiniteKeypoint { index });
        }
        if !(0.0..=1.0).contains(&self.score) {
            return Err(AnalysisError::ScoreOutOfRange { index, score: self.score });
        }
        Ok(())
    }
}

// ============================================================================
// POSE
// ============================================================================

/// Exactly 17 keypoints for one frame, in `BodyPart` order
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Pose {
    keypoints: [Keypoint; KEYPOINT_COUNT],
}

impl Pose {
    /// Validate raw model output. Fails on wrong length, NaN/inf values or
    /// scores outside [0, 1].
    pub fn from_keypoints(keypoints: &[Keypoint]) -> FrameResult<Self> {
        if keypoints.len() != KEYPOINT_COUNT {
            return Err(AnalysisError::InvalidKeypointCount {
                expected: KEYPOINT_COUNT,
                found: keypoints.len(),
            });
        }

        let mut out = [Keypoint::default(); KEYPOINT_COUNT];
        for (i, kp) in keypoints.iter().enumerate() {
            kp.check(i)?;
            out[i] = *kp;
        }
        Ok(Self { keypoints: out })
    }

    pub fn keypoints(&self) -> &[Keypoint; KEYPOINT_COUNT] {
        &self.keypoints
    }

    pub fn get(&self, part: BodyPart) -> &Keypoint {
        &self.keypoints[part.index()]
    }

    /// Midpoint of two parts. Confidence is the weaker of the two.
    pub fn midpoint(&self, a: BodyPart, b: BodyPart) -> Keypoint {
        let (a, b) = (self.get(a), self.get(b));
        Keypoint::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0, a.score.min(b.score))
    }

    /// Build a new pose by mapping each keypoint with its index
    pub(crate) fn map_with<F>(&self, mut f: F) -> Self
    where
        F: FnMut(usize, &Keypoint) -> Keypoint,
    {
        Self {
            keypoints: std::array::from_fn(|i| f(i, &self.keypoints[i])),
        }
    }
}

impl Index<BodyPart> for Pose {
    type Output = Keypoint;

    fn index(&self, part: BodyPart) -> &Keypoint {
        self.get(part)
    }
}
