//! Outline generation: point list + stroke options → closed polygon.

use super::StrokePoint;
use crate::easing::Easing;
use crate::geometry::{distance, lerp, lerp_point};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Options passed to an [`OutlineGenerator`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlineOptions {
    /// Base diameter of the stroke.
    pub size: f64,
    /// How strongly pressure affects the width, `[0, 1]`.
    pub thinning: f64,
    /// Fraction of `size` below which consecutive samples are merged, `[0, 1]`.
    pub smoothing: f64,
    /// How far each sample is pulled toward the previous one, `[0, 1]`.
    pub streamline: f64,
    /// Curve applied to pressure before computing the radius.
    pub easing: Easing,
    /// Ignore device pressure and derive it from point spacing instead.
    pub simulate_pressure: bool,
    /// Length over which the start of the stroke tapers (0 = no taper).
    pub taper_start: f64,
    /// Length over which the end of the stroke tapers (0 = no taper).
    pub taper_end: f64,
    /// Round cap at the start when not tapered.
    pub cap_start: bool,
    /// Round cap at the end when not tapered.
    pub cap_end: bool,
}

impl Default for OutlineOptions {
    fn default() -> Self {
        Self {
            size: 8.0,
            thinning: 0.5,
            smoothing: 0.5,
            streamline: 0.5,
            easing: Easing::Linear,
            simulate_pressure: false,
            taper_start: 0.0,
            taper_end: 0.0,
            cap_start: true,
            cap_end: true,
        }
    }
}

/// Converts an ordered point list into a closed outline polygon.
///
/// Implementations receive at least two points and return the polygon's
/// vertices in order. An empty result is allowed and produces an empty path.
pub trait OutlineGenerator {
    fn outline(&self, points: &[StrokePoint], options: &OutlineOptions) -> Vec<Point>;
}

/// Basic variable-width outline built from offset normals.
#[derive(Debug, Clone, Copy, Default)]
pub struct PressureOutline;

impl PressureOutline {
    /// Pressure assumed for samples without device pressure.
    pub const DEFAULT_PRESSURE: f64 = 0.5;
    /// Number of segments used for each round cap.
    const CAP_SEGMENTS: usize = 8;
    /// Rate at which simulated pressure follows the spacing signal.
    const PRESSURE_RATE: f64 = 0.275;
    const MIN_RADIUS: f64 = 0.01;

    fn radius(options: &OutlineOptions, pressure: f64) -> f64 {
        let t = 0.5 - options.thinning * (0.5 - pressure);
        (options.size * options.easing.apply(t)).max(Self::MIN_RADIUS)
    }

    /// Streamline the input and drop samples closer than the smoothing distance.
    fn filtered(points: &[StrokePoint], options: &OutlineOptions) -> Vec<StrokePoint> {
        let t = 0.15 + (1.0 - options.streamline.clamp(0.0, 1.0)) * 0.85;
        let min_spacing = options.size * options.smoothing.clamp(0.0, 1.0) * 0.25;
        let last_index = points.len() - 1;

        let mut out: Vec<StrokePoint> = Vec::with_capacity(points.len());
        out.push(points[0]);
        for (i, point) in points.iter().enumerate().skip(1) {
            // out always holds the first sample
            let Some(prev) = out.last().copied() else { break };
            let position = if i == last_index {
                point.position()
            } else {
                lerp_point(prev.position(), point.position(), t)
            };
            let spacing = distance(prev.position(), position);
            if i == last_index {
                if spacing <= f64::EPSILON && out.len() > 1 {
                    out.pop();
                }
                out.push(StrokePoint::from_point(position, point.pressure));
            } else if spacing >= min_spacing && spacing > f64::EPSILON {
                out.push(StrokePoint::from_point(position, point.pressure));
            }
        }
        out
    }

    fn pressures(points: &[StrokePoint], options: &OutlineOptions) -> Vec<f64> {
        if !options.simulate_pressure {
            return points
                .iter()
                .map(|p| p.pressure.unwrap_or(Self::DEFAULT_PRESSURE).clamp(0.0, 1.0))
                .collect();
        }

        let mut pressure = Self::DEFAULT_PRESSURE;
        let mut out = Vec::with_capacity(points.len());
        out.push(pressure);
        for pair in points.windows(2) {
            let spacing = (pair[0].distance_to(&pair[1]) / options.size.max(f64::EPSILON)).min(1.0);
            let target = 1.0 - spacing;
            pressure = lerp(pressure, target, spacing * Self::PRESSURE_RATE).clamp(0.0, 1.0);
            out.push(pressure);
        }
        out
    }

    fn direction(points: &[StrokePoint], i: usize, fallback: Vec2) -> Vec2 {
        let prev = points[i.saturating_sub(1)].position();
        let next = points[(i + 1).min(points.len() - 1)].position();
        let d = next - prev;
        let len = d.hypot();
        if len <= f64::EPSILON { fallback } else { d / len }
    }

    fn rotate(v: Vec2, angle: f64) -> Vec2 {
        let (sin, cos) = angle.sin_cos();
        Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
    }

    /// Half circle around `center`, starting at `from` (exclusive of both ends),
    /// turning clockwise.
    fn arc(center: Point, from: Vec2, out: &mut Vec<Point>) {
        for k in 1..Self::CAP_SEGMENTS {
            let angle = -std::f64::consts::PI * k as f64 / Self::CAP_SEGMENTS as f64;
            out.push(center + Self::rotate(from, angle));
        }
    }
}

impl OutlineGenerator for PressureOutline {
    fn outline(&self, points: &[StrokePoint], options: &OutlineOptions) -> Vec<Point> {
        if points.len() < 2 {
            return Vec::new();
        }

        let samples = Self::filtered(points, options);
        if samples.len() < 2 {
            return Vec::new();
        }
        let pressures = Self::pressures(&samples, options);

        let mut running = Vec::with_capacity(samples.len());
        let mut total = 0.0;
        running.push(0.0);
        for pair in samples.windows(2) {
            total += pair[0].distance_to(&pair[1]);
            running.push(total);
        }

        let mut left = Vec::with_capacity(samples.len());
        let mut right = Vec::with_capacity(samples.len());
        let mut radii = Vec::with_capacity(samples.len());
        let mut normals = Vec::with_capacity(samples.len());
        let mut dir = Vec2::new(1.0, 0.0);

        for (i, sample) in samples.iter().enumerate() {
            let mut radius = Self::radius(options, pressures[i]);
            if options.taper_start > 0.0 {
                radius *= (running[i] / options.taper_start).min(1.0);
            }
            if options.taper_end > 0.0 {
                radius *= ((total - running[i]) / options.taper_end).min(1.0);
            }
            let radius = radius.max(Self::MIN_RADIUS);

            dir = Self::direction(&samples, i, dir);
            let normal = Vec2::new(-dir.y, dir.x);
            let center = sample.position();
            left.push(center + normal * radius);
            right.push(center - normal * radius);
            radii.push(radius);
            normals.push(normal);
        }

        let last = samples.len() - 1;
        let mut outline = Vec::with_capacity(left.len() + right.len() + 2 * Self::CAP_SEGMENTS);
        outline.extend(left.iter().copied());
        if options.cap_end && options.taper_end <= 0.0 {
            Self::arc(samples[last].position(), normals[last] * radii[last], &mut outline);
        }
        outline.extend(right.iter().rev().copied());
        if options.cap_start && options.taper_start <= 0.0 {
            Self::arc(samples[0].position(), -normals[0] * radii[0], &mut outline);
        }
        outline
    }
}
