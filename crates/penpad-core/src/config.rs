//! Configuration for a drawing session.
//!
//! Every section deserializes with defaults, so a config file only needs to
//! name the values it overrides:
//!
//! ```json
//! { "viewport": { "min_scale": 0.25, "max_scale": 8.0 }, "history": { "max_size": 100 } }
//! ```

use crate::color::SerializableColor;
use crate::geometry::PressureMapping;
use crate::stroke::OutlineOptions;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Configuration errors. Raised at construction time, never mid-session.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid scale range: min {min} / max {max}")]
    InvalidScaleRange { min: f64, max: f64 },
    #[error("History size must be at least 1")]
    InvalidHistorySize,
    #[error("Value out of range for {field}: {value}")]
    OutOfRange { field: &'static str, value: f64 },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type for configuration.
pub type ConfigResult<T> = Result<T, ConfigError>;

fn check_unit(field: &'static str, value: f64) -> ConfigResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, value })
    }
}

fn check_non_negative(field: &'static str, value: f64) -> ConfigResult<()> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, value })
    }
}

fn check_positive(field: &'static str, value: f64) -> ConfigResult<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, value })
    }
}

/// Stroke capture and styling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrokeConfig {
    pub color: SerializableColor,
    /// Stroke width; used as the outline size.
    pub width: f64,
    pub opacity: f64,
    /// Minimum spacing between accepted samples.
    pub min_distance: f64,
    /// Reduce the point list on commit.
    pub simplify: bool,
    /// Minimum spacing between retained points when simplifying.
    pub tolerance: f64,
    pub pressure: PressureMapping,
    /// Outline options. `size` is overridden by `width`.
    pub outline: OutlineOptions,
}

impl Default for StrokeConfig {
    fn default() -> Self {
        Self {
            color: SerializableColor::black(),
            width: 8.0,
            opacity: 1.0,
            min_distance: 0.01,
            simplify: true,
            tolerance: 1.0,
            pressure: PressureMapping::default(),
            outline: OutlineOptions::default(),
        }
    }
}

impl StrokeConfig {
    /// Outline options with the configured width applied.
    pub fn outline_options(&self) -> OutlineOptions {
        OutlineOptions {
            size: self.width,
            ..self.outline.clone()
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        check_positive("stroke.width", self.width)?;
        check_unit("stroke.opacity", self.opacity)?;
        check_non_negative("stroke.min_distance", self.min_distance)?;
        check_non_negative("stroke.tolerance", self.tolerance)?;
        check_unit("stroke.pressure.min_pressure", self.pressure.min_pressure)?;
        check_unit("stroke.pressure.max_pressure", self.pressure.max_pressure)?;
        if self.pressure.min_pressure > self.pressure.max_pressure {
            return Err(ConfigError::OutOfRange {
                field: "stroke.pressure.min_pressure",
                value: self.pressure.min_pressure,
            });
        }
        check_positive("stroke.pressure.velocity_ceiling", self.pressure.velocity_ceiling)?;
        check_unit("stroke.outline.thinning", self.outline.thinning)?;
        check_unit("stroke.outline.smoothing", self.outline.smoothing)?;
        check_unit("stroke.outline.streamline", self.outline.streamline)?;
        Ok(())
    }
}

/// Viewport limits and gesture tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub min_scale: f64,
    pub max_scale: f64,
    /// Canvas size in screen units; its center is the default zoom anchor.
    pub width: f64,
    pub height: f64,
    /// Focal movement treated as a finger-lift jump.
    pub jump_threshold: f64,
    /// How long suppression stays engaged after a jump.
    pub recovery_window_ms: u64,
    /// Largest focal movement accepted during the recovery window.
    pub recovery_delta: f64,
    /// Scale factor change under which the pinch counts as stable.
    pub scale_stable_epsilon: f64,
    /// Minimum interval between change notifications during a gesture.
    pub notify_interval_ms: u64,
    /// Duration of animated `set_scale`.
    pub animation_ms: u64,
    /// Duration of `reset_zoom`.
    pub reset_ms: u64,
    /// Scale deviation from 1.0 at which a two-finger touch becomes a pinch.
    pub pinch_claim_ratio: f64,
    /// Focal travel at which a two-finger touch becomes a pan.
    pub pan_claim_distance: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.5,
            max_scale: 3.0,
            width: 1024.0,
            height: 768.0,
            jump_threshold: 40.0,
            recovery_window_ms: 200,
            recovery_delta: 20.0,
            scale_stable_epsilon: 0.01,
            notify_interval_ms: 16,
            animation_ms: 200,
            reset_ms: 300,
            pinch_claim_ratio: 0.05,
            pan_claim_distance: 5.0,
        }
    }
}

impl ViewportConfig {
    pub fn recovery_window(&self) -> Duration {
        Duration::from_millis(self.recovery_window_ms)
    }

    pub fn notify_interval(&self) -> Duration {
        Duration::from_millis(self.notify_interval_ms)
    }

    pub fn animation_duration(&self) -> Duration {
        Duration::from_millis(self.animation_ms)
    }

    pub fn reset_duration(&self) -> Duration {
        Duration::from_millis(self.reset_ms)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.min_scale > 0.0 && self.min_scale <= self.max_scale && self.max_scale.is_finite()) {
            return Err(ConfigError::InvalidScaleRange {
                min: self.min_scale,
                max: self.max_scale,
            });
        }
        check_non_negative("viewport.width", self.width)?;
        check_non_negative("viewport.height", self.height)?;
        check_non_negative("viewport.jump_threshold", self.jump_threshold)?;
        check_non_negative("viewport.recovery_delta", self.recovery_delta)?;
        check_non_negative("viewport.scale_stable_epsilon", self.scale_stable_epsilon)?;
        check_non_negative("viewport.pinch_claim_ratio", self.pinch_claim_ratio)?;
        check_non_negative("viewport.pan_claim_distance", self.pan_claim_distance)?;
        Ok(())
    }
}

/// Gesture arbitration tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Window after a viewport gesture during which new strokes are refused.
    pub cooldown_ms: u64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self { cooldown_ms: 100 }
    }
}

impl GestureConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

/// Undo history bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub max_size: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { max_size: 50 }
    }
}

/// Export document settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub width: f64,
    pub height: f64,
    pub background: SerializableColor,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            width: 1024.0,
            height: 768.0,
            background: SerializableColor::white(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PenpadConfig {
    pub stroke: StrokeConfig,
    pub viewport: ViewportConfig,
    pub gesture: GestureConfig,
    pub history: HistoryConfig,
    pub export: ExportConfig,
}

impl PenpadConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        log::debug!("Loaded config: {:?}", config);
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.stroke.validate()?;
        self.viewport.validate()?;
        if self.history.max_size == 0 {
            return Err(ConfigError::InvalidHistorySize);
        }
        check_non_negative("export.width", self.export.width)?;
        check_non_negative("export.height", self.export.height)?;
        Ok(())
    }
}
