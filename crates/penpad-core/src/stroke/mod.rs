//! Freehand stroke capture.
//!
//! A stroke travels through this module in three stages:
//! - [`StrokeBuilder`] accumulates pointer samples for one pointer session,
//! - an [`OutlineGenerator`] turns the samples into a closed outline polygon,
//! - [`path_data`] smooths the polygon into a filled path description.
//!
//! The finished result is an immutable [`StrokePath`].

mod builder;
mod outline;
pub mod path_data;
mod simplify;

pub use builder::{DOT_EPSILON, StrokeBuilder};
pub use outline::{OutlineGenerator, OutlineOptions, PressureOutline};
pub use path_data::{outline_to_bez_path, outline_to_path_data};
pub use simplify::simplify;

use crate::color::SerializableColor;
use crate::geometry;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier of a committed path.
pub type PathId = Uuid;

/// A single pointer sample in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokePoint {
    pub x: f64,
    pub y: f64,
    /// Pen pressure in `[0, 1]`. Derived from velocity when the device reports none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f64>,
}

impl StrokePoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            pressure: None,
        }
    }

    pub fn with_pressure(x: f64, y: f64, pressure: f64) -> Self {
        Self {
            x,
            y,
            pressure: Some(pressure),
        }
    }

    pub fn from_point(point: Point, pressure: Option<f64>) -> Self {
        Self {
            x: point.x,
            y: point.y,
            pressure,
        }
    }

    /// Position without pressure.
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn distance_to(&self, other: &StrokePoint) -> f64 {
        geometry::distance(self.position(), other.position())
    }
}

/// A committed stroke. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrokePath {
    pub id: PathId,
    /// Final (simplified) point sequence.
    pub points: Vec<StrokePoint>,
    /// Closed path description, see [`path_data`].
    pub path_data: String,
    pub color: SerializableColor,
    pub stroke_width: f64,
    pub opacity: f64,
    pub completed: bool,
}

impl StrokePath {
    /// Bounding box of the stroke's points.
    pub fn bounds(&self) -> Rect {
        geometry::bounds(self.points.iter().map(StrokePoint::position)).unwrap_or(Rect::ZERO)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stroke_path_bounds() {
        let path = StrokePath {
            id: Uuid::new_v4(),
            points: vec![
                StrokePoint::new(0.0, 0.0),
                StrokePoint::new(100.0, 50.0),
                StrokePoint::new(50.0, 100.0),
            ],
            path_data: String::new(),
            color: SerializableColor::black(),
            stroke_width: 4.0,
            opacity: 1.0,
            completed: true,
        };

        let bounds = path.bounds();
        assert!((bounds.x0).abs() < f64::EPSILON);
        assert!((bounds.x1 - 100.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 100.0).abs() < f64::EPSILON);
        assert_eq!(path.len(), 3);
    }

    #[test]
    fn test_point_serialization_omits_missing_pressure() {
        let json = serde_json::to_string(&StrokePoint::new(1.0, 2.0)).unwrap();
        assert_eq!(json, r#"{"x":1.0,"y":2.0}"#);

        let back: StrokePoint = serde_json::from_str(r#"{"x":1,"y":2,"pressure":0.5}"#).unwrap();
        assert_eq!(back, StrokePoint::with_pressure(1.0, 2.0, 0.5));
    }
}
