//! Easing curves.

use serde::{Deserialize, Serialize};

/// Easing curve mapping normalized progress `t ∈ [0, 1]` to eased progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    #[default]
    EaseInOutQuad,
    EaseOutCubic,
    EaseOutSine,
}

impl Easing {
    /// Apply the curve. Input is clamped to `[0, 1]`.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Easing::EaseOutSine => (t * std::f64::consts::FRAC_PI_2).sin(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_are_fixed() {
        for easing in [
            Easing::Linear,
            Easing::EaseInOutQuad,
            Easing::EaseOutCubic,
            Easing::EaseOutSine,
        ] {
            assert!(easing.apply(0.0).abs() < 1e-12);
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_clamps_input() {
        assert!((Easing::Linear.apply(2.0) - 1.0).abs() < f64::EPSILON);
        assert!(Easing::EaseOutCubic.apply(-1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_in_out_quad_midpoint() {
        assert!((Easing::EaseInOutQuad.apply(0.5) - 0.5).abs() < 1e-12);
    }
}
