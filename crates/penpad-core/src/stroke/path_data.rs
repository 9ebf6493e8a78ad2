//! Outline polygon to closed-curve conversion.
//!
//! The polygon is smoothed with the quadratic-through-midpoints construction:
//! move to the first vertex, then for every consecutive vertex pair (wrapping
//! around to the first vertex) emit a quadratic curve whose control point is
//! the first vertex of the pair and whose end point is the pair's midpoint.
//!
//! The string form is `M x0 y0 Q x0 y0 m0x m0y x1 y1 m1x m1y ... Z`, with all
//! tokens separated by single spaces. Repeated coordinate quadruples after the
//! single `Q` continue the quadratic command.

use crate::geometry::midpoint;
use kurbo::{BezPath, Point};
use std::fmt::Write;

/// Iterate `(control, end)` pairs of the smoothed outline.
fn quad_segments(outline: &[Point]) -> impl Iterator<Item = (Point, Point)> + '_ {
    outline.iter().enumerate().map(move |(i, &vertex)| {
        let next = outline[(i + 1) % outline.len()];
        (vertex, midpoint(vertex, next))
    })
}

/// Convert an outline polygon into a path description string.
///
/// An empty outline yields an empty string.
pub fn outline_to_path_data(outline: &[Point]) -> String {
    let Some(first) = outline.first() else {
        return String::new();
    };

    let mut data = String::with_capacity(outline.len() * 32);
    // Writing into a String cannot fail.
    let _ = write!(data, "M {} {} Q", first.x, first.y);
    for (control, end) in quad_segments(outline) {
        let _ = write!(data, " {} {} {} {}", control.x, control.y, end.x, end.y);
    }
    data.push_str(" Z");
    data
}

/// Convert an outline polygon into a structured [`BezPath`] for renderers.
pub fn outline_to_bez_path(outline: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    let Some(&first) = outline.first() else {
        return path;
    };

    path.move_to(first);
    for (control, end) in quad_segments(outline) {
        path.quad_to(control, end);
    }
    path.close_path();
    path
}
