//! Stage / rep state machine and plank hold timer
//!
//! Rep exercises share one machine: a primary feature below the lower
//! threshold targets `Down`, above the upper threshold targets `Up`, and
//! readings in between keep the current stage. A rep is counted on an
//! accepted `Down -> Up` transition only.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::physics::{BandPosition, Debounce, HysteresisBand};

/// Movement phase within one repetition cycle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    Neutral,
    Down,
    Up,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Neutral => "neutral",
            Stage::Down => "down",
            Stage::Up => "up",
        }
    }
}

/// Outcome of feeding one reading to the machine
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StageUpdate {
    pub transitioned: bool,
    pub rep_completed: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StageMachine {
    stage: Stage,
    previous: Stage,
    rep_count: u32,
    debounce: Debounce,
}

impl StageMachine {
    pub fn new(debounce_seconds: f64) -> Self {
        Self {
            stage: Stage::Neutral,
            previous: Stage::Neutral,
            rep_count: 0,
            debounce: Debounce::new(debounce_seconds),
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn previous(&self) -> Stage {
        self.previous
    }

    pub fn rep_count(&self) -> u32 {
        self.rep_count
    }

    /// Timestamp of the last accepted transition
    pub fn last_transition(&self) -> Option<f64> {
        self.debounce.last_accepted()
    }

    /// Feed the primary feature `value` observed at `now` (seconds)
    pub fn update(&mut self, band: HysteresisBand, value: f32, now: f64) -> StageUpdate {
        let target = match band.position(value) {
            BandPosition::Below => Stage::Down,
            BandPosition::Above => Stage::Up,
            BandPosition::Within => return StageUpdate::default(),
        };

        // A cycle starts by descending
        if target == self.stage || (self.stage == Stage::Neutral && target == Stage::Up) {
            return StageUpdate::default();
        }

        if !self.debounce.try_accept(now) {
            debug!("stage: {} -> {} debounced at {:.3}s", self.stage.as_str(), target.as_str(), now);
            return StageUpdate::default();
        }

        self.previous = self.stage;
        self.stage = target;
        let rep_completed = self.previous == Stage::Down && self.stage == Stage::Up;
        if rep_completed {
            self.rep_count += 1;
            debug!("stage: rep {} completed at {:.3}s", self.rep_count, now);
        } else {
            debug!("stage: {} -> {} at {:.3}s", self.previous.as_str(), self.stage.as_str(), now);
        }

        StageUpdate {
            transitioned: true,
            rep_completed,
        }
    }

    /// Back to neutral with a fresh debounce. The rep count is kept.
    pub fn reset_stage(&mut self) {
        self.previous = self.stage;
        self.stage = Stage::Neutral;
        self.debounce.reset();
    }
}

// ============================================================================
// HOLD TIMER
// ============================================================================

/// Accumulates time between consecutive qualifying frames
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct HoldTimer {
    /// Total credited seconds
    accumulated: f64,
    /// Whether the last frame qualified
    holding: bool,
}

impl HoldTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accumulated(&self) -> f64 {
        self.accumulated
    }

    /// Returns the seconds credited for this frame. `elapsed` is only
    /// credited when this frame and the one before both qualify.
    pub fn update(&mut self, qualifies: bool, elapsed: f64) -> f64 {
        let credited = if qualifies && self.holding { elapsed.max(0.0) } else { 0.0 };
        if self.holding && !qualifies {
            debug!("hold: paused at {:.2}s", self.accumulated);
        }
        self.holding = qualifies;
        self.accumulated += credited;
        credited
    }

    pub fn pause(&mut self) {
        self.holding = false;
    }
}
