//! Greedy distance-based point reduction.

use super::StrokePoint;

/// Reduce a point sequence with a single forward pass.
///
/// The first and last points are always kept. An interior point is kept only
/// if it lies at least `tolerance` away from the last kept point. This is a
/// cheap approximation, not a Ramer-Douglas-Peucker reduction.
pub fn simplify(points: &[StrokePoint], tolerance: f64) -> Vec<StrokePoint> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let last_index = points.len() - 1;
    let mut kept = Vec::with_capacity(points.len());
    kept.push(points[0]);

    for point in &points[1..last_index] {
        // kept is never empty here
        if let Some(last_kept) = kept.last() {
            if point.distance_to(last_kept) >= tolerance {
                kept.push(*point);
            }
        }
    }

    kept.push(points[last_index]);
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(coords: &[(f64, f64)]) -> Vec<StrokePoint> {
        coords.iter().map(|&(x, y)| StrokePoint::new(x, y)).collect()
    }

    #[test]
    fn test_large_tolerance_keeps_endpoints_only() {
        let simplified = simplify(&pts(&[(0.0, 0.0), (5.0, 5.0), (10.0, 10.0)]), 100.0);
        assert_eq!(simplified, pts(&[(0.0, 0.0), (10.0, 10.0)]));
    }

    #[test]
    fn test_short_inputs_unchanged() {
        assert!(simplify(&[], 1.0).is_empty());
        let two = pts(&[(0.0, 0.0), (0.0, 0.0)]);
        assert_eq!(simplify(&two, 10.0), two);
    }

    #[test]
    fn test_interior_points_respect_tolerance() {
        let input = pts(&[
            (0.0, 0.0),
            (1.0, 0.0),
            (2.5, 0.0),
            (3.0, 0.0),
            (6.0, 0.0),
            (6.5, 0.0),
            (7.0, 0.0),
        ]);
        let tolerance = 2.0;
        let simplified = simplify(&input, tolerance);

        assert_eq!(simplified.first(), input.first());
        assert_eq!(simplified.last(), input.last());
        assert_eq!(simplified, pts(&[(0.0, 0.0), (2.5, 0.0), (6.0, 0.0), (7.0, 0.0)]));

        // Every retained interior point is at least `tolerance` from its predecessor.
        for pair in simplified[..simplified.len() - 1].windows(2) {
            assert!(pair[1].distance_to(&pair[0]) >= tolerance);
        }
    }

    #[test]
    fn test_pressure_is_preserved() {
        let input = vec![
            StrokePoint::with_pressure(0.0, 0.0, 0.3),
            StrokePoint::with_pressure(10.0, 0.0, 0.6),
            StrokePoint::with_pressure(20.0, 0.0, 0.9),
        ];
        assert_eq!(simplify(&input, 1.0), input);
    }
}
