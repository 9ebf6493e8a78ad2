//! Small geometric helpers shared by the stroke pipeline and the viewport.

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
    ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt()
}

/// Midpoint of the segment `a`-`b`.
pub fn midpoint(a: Point, b: Point) -> Point {
    Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

/// Linear interpolation between two scalars.
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Linear interpolation between two points.
pub fn lerp_point(a: Point, b: Point, t: f64) -> Point {
    Point::new(lerp(a.x, b.x, t), lerp(a.y, b.y, t))
}

/// Axis-aligned bounding box of a point set, or `None` when empty.
pub fn bounds(points: impl IntoIterator<Item = Point>) -> Option<Rect> {
    let mut iter = points.into_iter();
    let first = iter.next()?;

    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for point in iter {
        min_x = min_x.min(point.x);
        min_y = min_y.min(point.y);
        max_x = max_x.max(point.x);
        max_y = max_y.max(point.y);
    }

    Some(Rect::new(min_x, min_y, max_x, max_y))
}

/// Maps drawing speed onto simulated pen pressure.
///
/// Fast movement yields low pressure (thin line), slow movement yields high
/// pressure (thick line).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PressureMapping {
    /// Pressure reported at or above the velocity ceiling.
    pub min_pressure: f64,
    /// Pressure reported for a stationary pointer.
    pub max_pressure: f64,
    /// Velocity (units per millisecond) at which pressure bottoms out.
    pub velocity_ceiling: f64,
}

impl Default for PressureMapping {
    fn default() -> Self {
        Self {
            min_pressure: 0.2,
            max_pressure: 1.0,
            velocity_ceiling: 100.0,
        }
    }
}

impl PressureMapping {
    /// Minimum time delta used for velocity, in milliseconds.
    pub const MIN_DELTA_MS: f64 = 1.0;

    /// Velocity in units per millisecond for a movement of `dist` over `delta_ms`.
    pub fn velocity(dist: f64, delta_ms: f64) -> f64 {
        dist / delta_ms.max(Self::MIN_DELTA_MS)
    }

    /// Pressure for the given velocity.
    pub fn pressure_for_velocity(&self, velocity: f64) -> f64 {
        let normalized = (velocity / self.velocity_ceiling).min(1.0);
        self.max_pressure - normalized * (self.max_pressure - self.min_pressure)
    }

    /// Pressure for a movement of `dist` units over `delta_ms` milliseconds.
    pub fn pressure(&self, dist: f64, delta_ms: f64) -> f64 {
        self.pressure_for_velocity(Self::velocity(dist, delta_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        let d = distance(Point::new(0.0, 0.0), Point::new(3.0, 4.0));
        assert!((d - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_midpoint_and_lerp() {
        let m = midpoint(Point::new(0.0, 0.0), Point::new(10.0, -4.0));
        assert_eq!(m, Point::new(5.0, -2.0));

        let p = lerp_point(Point::new(0.0, 0.0), Point::new(10.0, 10.0), 0.25);
        assert!((p.x - 2.5).abs() < f64::EPSILON);
        assert!((lerp(2.0, 4.0, 0.5) - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_bounds() {
        assert!(bounds(Vec::<Point>::new()).is_none());

        let b = bounds([
            Point::new(0.0, 10.0),
            Point::new(-5.0, 2.0),
            Point::new(7.0, 3.0),
        ])
        .unwrap();
        assert_eq!(b, Rect::new(-5.0, 2.0, 7.0, 10.0));
    }

    #[test]
    fn test_pressure_decreases_with_speed() {
        let mapping = PressureMapping::default();

        let still = mapping.pressure(0.0, 16.0);
        assert!((still - 1.0).abs() < f64::EPSILON);

        let slow = mapping.pressure(100.0, 16.0);
        let fast = mapping.pressure(1000.0, 16.0);
        assert!(slow > fast);

        // Saturates at the minimum.
        let extreme = mapping.pressure(1_000_000.0, 1.0);
        assert!((extreme - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_velocity_clamps_time_delta() {
        // A zero time delta is treated as one millisecond.
        assert!((PressureMapping::velocity(50.0, 0.0) - 50.0).abs() < f64::EPSILON);
        let p = PressureMapping::default().pressure(50.0, 0.0);
        assert!((p - 0.6).abs() < 1e-12);
    }
}
