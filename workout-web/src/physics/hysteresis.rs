//! Hysteresis band and time debounce
//!
//! Both resist rapid state flips near a decision boundary: the band gives a
//! dead zone in value, the debounce a dead zone in time. The stage machine
//! uses both; the exercise classifier uses the band around the current
//! exercise's deviation.

use serde::Serialize;

/// Where a value falls relative to a band
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BandPosition {
    Below,
    Within,
    Above,
}

/// Dead zone `[lower, upper]` in which no transition is forced
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HysteresisBand {
    lower: f32,
    upper: f32,
}

impl HysteresisBand {
    pub fn new(lower: f32, upper: f32) -> Self {
        debug_assert!(lower <= upper, "band lower {lower} above upper {upper}");
        Self { lower, upper }
    }

    /// Symmetric band of half-width `margin` around `center`
    pub fn around(center: f32, margin: f32) -> Self {
        Self::new(center - margin, center + margin)
    }

    /// Strictly below `lower` / strictly above `upper` / otherwise within
    pub fn position(&self, value: f32) -> BandPosition {
        if value < self.lower {
            BandPosition::Below
        } else if value > self.upper {
            BandPosition::Above
        } else {
            BandPosition::Within
        }
    }
}

/// Minimum time between accepted transitions
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Debounce {
    /// Seconds that must pass after an accepted transition
    interval: f64,
    /// Timestamp (seconds) of the last accepted transition
    last_accepted: Option<f64>,
}

impl Debounce {
    pub fn new(interval: f64) -> Self {
        Self {
            interval,
            last_accepted: None,
        }
    }

    /// True if a transition at `now` would be accepted
    pub fn ready(&self, now: f64) -> bool {
        match self.last_accepted {
            None => true,
            Some(last) => now - last >= self.interval,
        }
    }

    /// Accept a transition at `now` if the interval has elapsed
    pub fn try_accept(&mut self, now: f64) -> bool {
        if self.ready(now) {
            self.last_accepted = Some(now);
            true
        } else {
            false
        }
    }

    pub fn last_accepted(&self) -> Option<f64> {
        self.last_accepted
    }

    pub fn reset(&mut self) {
        self.last_accepted = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_positions() {
        let band = HysteresisBand::new(100.0, 160.0);
        assert_eq!(band.position(99.9), BandPosition::Below);
        assert_eq!(band.position(100.0), BandPosition::Within);
        assert_eq!(band.position(130.0), BandPosition::Within);
        assert_eq!(band.position(160.0), BandPosition::Within);
        assert_eq!(band.position(160.1), BandPosition::Above);
    }

    #[test]
    fn test_band_around() {
        let band = HysteresisBand::around(500.0, 200.0);
        assert_eq!(band, HysteresisBand::new(300.0, 700.0));
        assert_eq!(band.position(299.0), BandPosition::Below);
    }

    #[test]
    fn test_debounce_first_transition_always_accepted() {
        let mut debounce = Debounce::new(0.3);
        assert!(debounce.try_accept(0.0));
        assert_eq!(debounce.last_accepted(), Some(0.0));
    }

    #[test]
    fn test_debounce_rejects_fast_transition() {
        let mut debounce = Debounce::new(0.3);
        assert!(debounce.try_accept(1.0));
        assert!(!debounce.try_accept(1.2));
        // rejected attempts do not move the reference point
        assert_eq!(debounce.last_accepted(), Some(1.0));
        assert!(debounce.try_accept(1.3));
    }

    #[test]
    fn test_debounce_reset() {
        let mut debounce = Debounce::new(0.3);
        debounce.try_accept(5.0);
        debounce.reset();
        assert!(debounce.ready(5.01));
    }
}
