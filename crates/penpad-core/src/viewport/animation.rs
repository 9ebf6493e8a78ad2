//! Time-sampled viewport transitions.

use super::ViewportState;
use crate::easing::Easing;
use std::time::Duration;

// Use web_time for WASM compatibility
#[cfg(target_arch = "wasm32")]
use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

/// An eased interpolation between two viewport states, sampled on each tick.
#[derive(Debug, Clone)]
pub struct Transition {
    from: ViewportState,
    to: ViewportState,
    start: Instant,
    duration: Duration,
    easing: Easing,
}

impl Transition {
    pub fn new(
        from: ViewportState,
        to: ViewportState,
        start: Instant,
        duration: Duration,
        easing: Easing,
    ) -> Self {
        Self {
            from,
            to,
            start,
            duration,
            easing,
        }
    }

    /// Linear progress in `[0, 1]`.
    pub fn progress(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.start);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        self.progress(now) >= 1.0
    }

    /// State at time `now`. Returns the exact target once finished.
    pub fn sample(&self, now: Instant) -> ViewportState {
        let progress = self.progress(now);
        if progress >= 1.0 {
            return self.to;
        }
        self.from.lerp(&self.to, self.easing.apply(progress))
    }

    pub fn target(&self) -> ViewportState {
        self.to
    }
}
