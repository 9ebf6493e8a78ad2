//! Incremental stroke accumulation for a single pointer session.

use super::path_data::outline_to_path_data;
use super::{OutlineGenerator, PressureOutline, StrokePath, StrokePoint, simplify};
use crate::config::StrokeConfig;
use std::fmt;
use uuid::Uuid;

// Use web_time for WASM compatibility
#[cfg(target_arch = "wasm32")]
use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

/// Offset of the synthesized second point for single-tap strokes.
pub const DOT_EPSILON: f64 = 0.1;

/// Samples collected since `begin`.
#[derive(Debug, Clone)]
struct ActiveStroke {
    points: Vec<StrokePoint>,
    last_sample: Instant,
    preview: Option<String>,
}

/// Accumulates one pointer-down → pointer-up session into a [`StrokePath`].
pub struct StrokeBuilder {
    config: StrokeConfig,
    generator: Box<dyn OutlineGenerator + Send + Sync>,
    active: Option<ActiveStroke>,
}

impl fmt::Debug for StrokeBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrokeBuilder")
            .field("config", &self.config)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

impl Default for StrokeBuilder {
    fn default() -> Self {
        Self::new(StrokeConfig::default())
    }
}

impl StrokeBuilder {
    /// Create a builder using the built-in [`PressureOutline`] generator.
    pub fn new(config: StrokeConfig) -> Self {
        Self::with_generator(config, Box::new(PressureOutline))
    }

    /// Create a builder with a custom outline generator.
    pub fn with_generator(
        config: StrokeConfig,
        generator: Box<dyn OutlineGenerator + Send + Sync>,
    ) -> Self {
        Self {
            config,
            generator,
            active: None,
        }
    }

    pub fn config(&self) -> &StrokeConfig {
        &self.config
    }

    /// Replace the stroke configuration. Applies from the next stroke on.
    pub fn set_config(&mut self, config: StrokeConfig) {
        self.config = config;
    }

    /// Whether a pointer session is in progress.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Points accepted so far in the current session.
    pub fn points(&self) -> &[StrokePoint] {
        self.active.as_ref().map(|a| a.points.as_slice()).unwrap_or(&[])
    }

    /// Live path description of the in-progress stroke (needs two points).
    pub fn preview(&self) -> Option<&str> {
        self.active.as_ref().and_then(|a| a.preview.as_deref())
    }

    /// Start a new session. No-op if one is already active.
    pub fn begin(&mut self, point: StrokePoint, now: Instant) -> bool {
        if self.active.is_some() {
            return false;
        }
        self.active = Some(ActiveStroke {
            points: vec![point],
            last_sample: now,
            preview: None,
        });
        true
    }

    /// Append a sample. Returns whether the sample was accepted.
    ///
    /// Samples closer than `min_distance` to the last accepted point are
    /// dropped. Missing pressure is derived from the pointer's velocity.
    pub fn extend(&mut self, point: StrokePoint, now: Instant) -> bool {
        let Self {
            config,
            generator,
            active,
        } = self;
        let Some(active) = active.as_mut() else {
            return false;
        };
        let Some(last) = active.points.last() else {
            return false;
        };

        let dist = point.distance_to(last);
        if dist < config.min_distance {
            return false;
        }

        let pressure = point.pressure.unwrap_or_else(|| {
            let delta_ms = now.saturating_duration_since(active.last_sample).as_secs_f64() * 1000.0;
            config.pressure.pressure(dist, delta_ms)
        });
        active.points.push(StrokePoint {
            pressure: Some(pressure),
            ..point
        });
        active.last_sample = now;

        if active.points.len() >= 2 {
            let outline = generator.outline(&active.points, &config.outline_options());
            active.preview = Some(outline_to_path_data(&outline));
        }
        true
    }

    /// Finish the session and produce the committed path.
    ///
    /// Returns `None` when no session is active or no points were collected.
    pub fn end(&mut self) -> Option<StrokePath> {
        let active = self.active.take()?;
        let mut points = active.points;

        match points.len() {
            0 => {
                log::debug!("Discarding empty stroke");
                return None;
            }
            1 => {
                let dot = points[0];
                points.push(StrokePoint {
                    x: dot.x + DOT_EPSILON,
                    y: dot.y + DOT_EPSILON,
                    pressure: dot.pressure,
                });
            }
            _ => {}
        }

        if self.config.simplify {
            points = simplify(&points, self.config.tolerance);
        }

        let outline = self
            .generator
            .outline(&points, &self.config.outline_options());
        let path_data = outline_to_path_data(&outline);

        Some(StrokePath {
            id: Uuid::new_v4(),
            points,
            path_data,
            color: self.config.color,
            stroke_width: self.config.width,
            opacity: self.config.opacity,
            completed: true,
        })
    }

    /// Drop the in-progress stroke without committing it.
    pub fn abandon(&mut self) -> bool {
        self.active.take().is_some()
    }
}
