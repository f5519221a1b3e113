//! Keypoint smoothing - exponential blend gated by confidence
//!
//! Heavy weight on history at rest keeps raw estimator jitter out of the
//! angles. A keypoint is only blended when both the new reading and the
//! previous smoothed value are confident, so a tracking loss/recovery
//! boundary is never smoothed across.

use crate::pose::{Keypoint, Pose};

/// Default history weight
pub const DEFAULT_ALPHA: f32 = 0.7;

/// Default minimum confidence for a keypoint to take part in blending
pub const DEFAULT_CONFIDENCE: f32 = 0.3;

/// Last accepted smoothed pose for one tracking session
#[derive(Clone, Debug, Default)]
pub struct SmoothingState {
    previous: Option<Pose>,
}

impl SmoothingState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget history (next frame passes through unchanged)
    pub fn reset(&mut self) {
        self.previous = None;
    }
}

/// Per-keypoint exponential smoother
#[derive(Clone, Copy, Debug)]
pub struct KeypointSmoother {
    /// Weight of the previous smoothed value (0 = no smoothing)
    alpha: f32,
    /// Minimum score on both sides of a blend
    threshold: f32,
}

impl KeypointSmoother {
    pub fn new(alpha: f32, threshold: f32) -> Self {
        Self { alpha, threshold }
    }

    /// Smooth `current` against the session history and store the result
    /// as the new history.
    pub fn smooth(&self, current: &Pose, state: &mut SmoothingState) -> Pose {
        let smoothed = match state.previous.as_ref() {
            None => current.clone(),
            Some(previous) => current.map_with(|i, kp| {
                let prev = &previous.keypoints()[i];
                if kp.is_confident(self.threshold) && prev.is_confident(self.threshold) {
                    blend(kp, prev, self.alpha)
                } else {
                    *kp
                }
            }),
        };

        state.previous = Some(smoothed.clone());
        smoothed
    }
}

impl Default for KeypointSmoother {
    fn default() -> Self {
        Self::new(DEFAULT_ALPHA, DEFAULT_CONFIDENCE)
    }
}

/// `(1 - alpha) * current + alpha * previous` on position. Score is the
/// current reading's.
pub fn blend(current: &Keypoint, previous: &Keypoint, alpha: f32) -> Keypoint {
    let p = current.position() * (1.0 - alpha) + previous.position() * alpha;
    Keypoint::new(p.x, p.y, current.score)
}
