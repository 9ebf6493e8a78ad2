//! Viewport transform management: pan, pinch-zoom and programmatic zoom.
//!
//! The viewport maps world coordinates to screen coordinates with
//! `screen = world * scale + translation`. During a pinch the world point
//! that was under the focal point at gesture start stays under the current
//! focal point.

mod animation;

pub use animation::Transition;

use crate::config::{ConfigResult, ViewportConfig};
use crate::easing::Easing;
use crate::geometry::{distance, lerp};
use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};
use std::time::Duration;

// Use web_time for WASM compatibility
#[cfg(target_arch = "wasm32")]
use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

/// Scale and translation of the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportState {
    pub scale: f64,
    pub translation: Vec2,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            scale: 1.0,
            translation: Vec2::ZERO,
        }
    }
}

impl ViewportState {
    /// World → screen transform.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.translation) * Affine::scale(self.scale)
    }

    /// Screen → world transform.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.scale) * Affine::translate(-self.translation)
    }

    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        Point::new(
            (screen_point.x - self.translation.x) / self.scale,
            (screen_point.y - self.translation.y) / self.scale,
        )
    }

    pub fn world_to_screen(&self, world_point: Point) -> Point {
        Point::new(
            world_point.x * self.scale + self.translation.x,
            world_point.y * self.scale + self.translation.y,
        )
    }

    /// Component-wise interpolation toward `other`.
    pub fn lerp(&self, other: &ViewportState, t: f64) -> ViewportState {
        ViewportState {
            scale: lerp(self.scale, other.scale, t),
            translation: Vec2::new(
                lerp(self.translation.x, other.translation.x, t),
                lerp(self.translation.y, other.translation.y, t),
            ),
        }
    }
}

/// Change notification, drained by the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewportEvent {
    ScaleChanged(f64),
    TranslationChanged(Vec2),
}

/// State captured when a pinch begins.
#[derive(Debug, Clone)]
struct PinchSession {
    scale_start: f64,
    /// World point under the focal point at gesture start.
    anchor: Point,
    last_focal: Point,
    last_multiplier: f64,
    /// Time of the most recent detected focal jump.
    jump_at: Option<Instant>,
}

/// State captured when a two-finger pan begins.
#[derive(Debug, Clone)]
struct PanSession {
    translation_start: Vec2,
    start_offset: Point,
}

/// Owns the viewport state and arbitrates pinch, pan and animated zoom.
#[derive(Debug, Clone)]
pub struct ViewportTransform {
    config: ViewportConfig,
    state: ViewportState,
    pinch: Option<PinchSession>,
    pan: Option<PanSession>,
    animation: Option<Transition>,
    events: Vec<ViewportEvent>,
    last_notified: ViewportState,
    last_notify_at: Option<Instant>,
}

impl Default for ViewportTransform {
    fn default() -> Self {
        Self::from_valid_config(ViewportConfig::default())
    }
}

impl ViewportTransform {
    /// Create a viewport at identity scale and zero translation.
    pub fn new(config: ViewportConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: ViewportConfig) -> Self {
        Self {
            config,
            state: ViewportState::default(),
            pinch: None,
            pan: None,
            animation: None,
            events: Vec::new(),
            last_notified: ViewportState::default(),
            last_notify_at: None,
        }
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    pub fn state(&self) -> ViewportState {
        self.state
    }

    pub fn scale(&self) -> f64 {
        self.state.scale
    }

    pub fn translation(&self) -> Vec2 {
        self.state.translation
    }

    pub fn transform(&self) -> Affine {
        self.state.transform()
    }

    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        self.state.screen_to_world(screen_point)
    }

    pub fn world_to_screen(&self, world_point: Point) -> Point {
        self.state.world_to_screen(world_point)
    }

    pub fn is_pinching(&self) -> bool {
        self.pinch.is_some()
    }

    pub fn is_panning(&self) -> bool {
        self.pan.is_some()
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Center of the canvas in screen coordinates.
    pub fn canvas_center(&self) -> Point {
        Point::new(self.config.width / 2.0, self.config.height / 2.0)
    }

    fn clamp_scale(&self, scale: f64) -> f64 {
        scale.clamp(self.config.min_scale, self.config.max_scale)
    }

    /// Take all pending change notifications.
    pub fn drain_events(&mut self) -> Vec<ViewportEvent> {
        std::mem::take(&mut self.events)
    }

    /// Queue `event`, replacing an undrained event of the same kind.
    fn queue(&mut self, event: ViewportEvent) {
        let slot = self
            .events
            .iter_mut()
            .find(|queued| std::mem::discriminant(*queued) == std::mem::discriminant(&event));
        match slot {
            Some(queued) => *queued = event,
            None => self.events.push(event),
        }
    }

    /// Queue change notifications.
    ///
    /// Throttled to one batch per notify interval unless `force` is set;
    /// forced batches carry both values regardless of change.
    fn notify(&mut self, now: Instant, force: bool) {
        let due = self.last_notify_at.is_none_or(|last| {
            now.saturating_duration_since(last) >= self.config.notify_interval()
        });
        if !force && !due {
            return;
        }

        if force || self.state.scale != self.last_notified.scale {
            self.queue(ViewportEvent::ScaleChanged(self.state.scale));
        }
        if force || self.state.translation != self.last_notified.translation {
            self.queue(ViewportEvent::TranslationChanged(self.state.translation));
        }
        self.last_notified = self.state;
        self.last_notify_at = Some(now);
    }

    /// Start a pinch around `focal` (screen coordinates).
    ///
    /// A pinch takes over translation from any running pan or animation.
    pub fn begin_pinch(&mut self, focal: Point, _now: Instant) {
        self.animation = None;
        self.pan = None;
        self.pinch = Some(PinchSession {
            scale_start: self.state.scale,
            anchor: self.state.screen_to_world(focal),
            last_focal: focal,
            last_multiplier: 1.0,
            jump_at: None,
        });
    }

    /// Apply a pinch update. `multiplier` is relative to the scale at gesture start.
    ///
    /// Returns the focal point actually used, which differs from `focal` when a
    /// finger-lift jump was suppressed. Ignored when no pinch is active.
    pub fn update_pinch(&mut self, focal: Point, multiplier: f64, now: Instant) -> Option<Point> {
        let (min_scale, max_scale) = (self.config.min_scale, self.config.max_scale);
        let jump_threshold = self.config.jump_threshold;
        let recovery_delta = self.config.recovery_delta;
        let recovery_window = self.config.recovery_window();
        let stable_epsilon = self.config.scale_stable_epsilon;

        let session = self.pinch.as_mut()?;

        let raw_scale = session.scale_start * multiplier;
        let pinned = raw_scale <= min_scale || raw_scale >= max_scale;
        let scale_stable = (multiplier - session.last_multiplier).abs() < stable_epsilon;
        let delta = distance(focal, session.last_focal);
        let in_recovery = session
            .jump_at
            .is_some_and(|at| now.saturating_duration_since(at) < recovery_window);

        let accepted = if in_recovery {
            if delta < recovery_delta {
                focal
            } else {
                session.last_focal
            }
        } else if delta > jump_threshold && (scale_stable || pinned) {
            log::debug!(
                "Suppressing focal jump of {:.1} (scale stable: {}, pinned: {})",
                delta,
                scale_stable,
                pinned
            );
            session.jump_at = Some(now);
            session.last_focal
        } else {
            focal
        };

        session.last_focal = accepted;
        session.last_multiplier = multiplier;
        let anchor = session.anchor;

        let scale = raw_scale.clamp(min_scale, max_scale);
        // A live pinch owns the transform; drop any programmatic zoom in flight.
        self.animation = None;
        self.state = ViewportState {
            scale,
            translation: accepted.to_vec2() - anchor.to_vec2() * scale,
        };
        self.notify(now, false);
        Some(accepted)
    }

    /// Finish the pinch and flush the final state.
    pub fn end_pinch(&mut self, now: Instant) {
        if self.pinch.take().is_some() {
            self.notify(now, true);
        }
    }

    /// Start a two-finger pan at `offset` (screen coordinates).
    pub fn begin_pan(&mut self, offset: Point, _now: Instant) {
        self.animation = None;
        self.pan = Some(PanSession {
            translation_start: self.state.translation,
            start_offset: offset,
        });
    }

    /// Apply a pan update. Ignored while a pinch owns the translation.
    pub fn update_pan(&mut self, offset: Point, now: Instant) -> bool {
        if self.pinch.is_some() {
            return false;
        }
        let Some(pan) = &self.pan else {
            return false;
        };

        self.animation = None;
        self.state.translation = pan.translation_start + (offset - pan.start_offset);
        self.notify(now, false);
        true
    }

    /// Finish the pan and flush the final state.
    pub fn end_pan(&mut self, now: Instant) {
        if self.pan.take().is_some() {
            self.notify(now, true);
        }
    }

    /// Finish whichever viewport gesture is active.
    pub fn end_gesture(&mut self, now: Instant) {
        let had_gesture = self.pinch.take().is_some() | self.pan.take().is_some();
        if had_gesture {
            self.notify(now, true);
        }
    }

    /// Zoom to `target`, keeping `anchor` (screen coordinates, canvas center
    /// by default) fixed. Out-of-range targets are clamped.
    pub fn set_scale(&mut self, target: f64, animated: bool, anchor: Option<Point>, now: Instant) {
        let scale = self.clamp_scale(target);
        let anchor = anchor.unwrap_or_else(|| self.canvas_center());
        let world = self.state.screen_to_world(anchor);
        let to = ViewportState {
            scale,
            translation: anchor.to_vec2() - world.to_vec2() * scale,
        };

        let duration = if animated {
            self.config.animation_duration()
        } else {
            Duration::ZERO
        };
        self.transition_to(to, duration, now);
    }

    /// Ease back to identity scale and zero translation over `duration`.
    pub fn reset(&mut self, duration: Duration, now: Instant) {
        self.pinch = None;
        self.pan = None;
        self.transition_to(ViewportState::default(), duration, now);
    }

    fn transition_to(&mut self, to: ViewportState, duration: Duration, now: Instant) {
        if duration.is_zero() {
            self.animation = None;
            self.state = to;
            self.notify(now, true);
        } else {
            self.animation = Some(Transition::new(
                self.state,
                to,
                now,
                duration,
                Easing::EaseInOutQuad,
            ));
        }
    }

    /// Advance a running animation. Returns `true` while it is still running.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(animation) = &self.animation else {
            return false;
        };

        self.state = animation.sample(now);
        if animation.is_finished(now) {
            self.animation = None;
            self.notify(now, true);
            false
        } else {
            self.notify(now, false);
            true
        }
    }
}
