//! Pointer classification: single-finger drawing vs. multi-finger viewport manipulation.

use crate::config::GestureConfig;
use crate::geometry::{distance, midpoint};
use crate::stroke::{StrokeBuilder, StrokePath, StrokePoint};
use crate::viewport::ViewportTransform;
use kurbo::Point;
use serde::{Deserialize, Serialize};

// Use web_time for WASM compatibility
#[cfg(target_arch = "wasm32")]
use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

/// Identifier assigned by the platform to one contact.
pub type PointerId = u64;

/// Pointer lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
}

/// A single pointer sample in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub id: PointerId,
    pub phase: PointerPhase,
    pub position: Point,
    /// Device pressure in `[0, 1]`, if the hardware reports it.
    pub pressure: Option<f64>,
    pub time: Instant,
}

impl PointerEvent {
    pub fn new(id: PointerId, phase: PointerPhase, position: Point, time: Instant) -> Self {
        Self {
            id,
            phase,
            position,
            pressure: None,
            time,
        }
    }

    pub fn with_pressure(mut self, pressure: f64) -> Self {
        self.pressure = Some(pressure);
        self
    }
}

/// The active gesture. At most one is non-idle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureState {
    #[default]
    Idle,
    Drawing,
    /// Two or more pointers down without a scale signal.
    Panning,
    Pinching,
}

/// What handling one event did.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureOutcome {
    /// Nothing changed.
    Ignored,
    /// A draw start was refused during the post-gesture cooldown.
    Suppressed,
    StrokeStarted,
    /// The stroke received a sample; `false` if it was filtered out.
    StrokeExtended(bool),
    StrokeCommitted(StrokePath),
    /// The in-flight stroke was discarded without committing.
    StrokeAbandoned,
    ViewportStarted,
    ViewportUpdated,
    ViewportEnded,
}

/// Two-finger session bookkeeping.
#[derive(Debug, Clone)]
struct MultiTouch {
    ids: [PointerId; 2],
    start_focal: Point,
    start_distance: f64,
    pan_claimed: bool,
    pinching: bool,
}

#[derive(Debug, Clone, Default)]
enum Mode {
    #[default]
    Idle,
    Drawing(PointerId),
    Multi(MultiTouch),
    /// Pointers left over from a finished or refused gesture; ignored until all lift.
    Draining,
}

/// Owns the gesture state machine and routes each pointer event to the
/// stroke builder or the viewport.
#[derive(Debug, Clone, Default)]
pub struct GestureArbiter {
    config: GestureConfig,
    mode: Mode,
    /// Active pointers in arrival order, screen coordinates.
    pointers: Vec<(PointerId, Point)>,
    cooldown_until: Option<Instant>,
}

impl GestureArbiter {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    pub fn state(&self) -> GestureState {
        match &self.mode {
            Mode::Idle | Mode::Draining => GestureState::Idle,
            Mode::Drawing(_) => GestureState::Drawing,
            Mode::Multi(multi) if multi.pinching => GestureState::Pinching,
            Mode::Multi(_) => GestureState::Panning,
        }
    }

    /// Number of pointers currently down.
    pub fn pointer_count(&self) -> usize {
        self.pointers.len()
    }

    /// Whether new strokes are refused at `now`.
    pub fn in_cooldown(&self, now: Instant) -> bool {
        self.cooldown_until.is_some_and(|until| now < until)
    }

    /// Forget all pointers and return to idle.
    pub fn reset(&mut self) {
        self.mode = Mode::Idle;
        self.pointers.clear();
        self.cooldown_until = None;
    }

    fn position_of(&self, id: PointerId) -> Option<Point> {
        self.pointers.iter().find(|(p, _)| *p == id).map(|(_, pos)| *pos)
    }

    fn to_world(viewport: &ViewportTransform, event: &PointerEvent) -> StrokePoint {
        StrokePoint::from_point(viewport.screen_to_world(event.position), event.pressure)
    }

    /// Handle one pointer event.
    pub fn handle(
        &mut self,
        event: PointerEvent,
        builder: &mut StrokeBuilder,
        viewport: &mut ViewportTransform,
    ) -> GestureOutcome {
        match event.phase {
            PointerPhase::Down => self.pointer_down(event, builder, viewport),
            PointerPhase::Move => self.pointer_move(event, builder, viewport),
            PointerPhase::Up | PointerPhase::Cancel => self.pointer_up(event, builder, viewport),
        }
    }

    fn pointer_down(
        &mut self,
        event: PointerEvent,
        builder: &mut StrokeBuilder,
        viewport: &mut ViewportTransform,
    ) -> GestureOutcome {
        if self.position_of(event.id).is_some() {
            return GestureOutcome::Ignored;
        }
        self.pointers.push((event.id, event.position));

        match &self.mode {
            Mode::Idle => {
                if self.pointers.len() >= 2 {
                    self.start_multi(viewport, event.time);
                    return GestureOutcome::ViewportStarted;
                }
                if self.in_cooldown(event.time) {
                    log::debug!("Suppressing stroke start during gesture cooldown");
                    self.mode = Mode::Draining;
                    return GestureOutcome::Suppressed;
                }
                builder.begin(Self::to_world(viewport, &event), event.time);
                self.mode = Mode::Drawing(event.id);
                GestureOutcome::StrokeStarted
            }
            Mode::Drawing(_) => {
                if builder.abandon() {
                    log::debug!("Second pointer down, abandoning in-flight stroke");
                }
                self.start_multi(viewport, event.time);
                GestureOutcome::StrokeAbandoned
            }
            Mode::Draining if self.pointers.len() >= 2 => {
                self.start_multi(viewport, event.time);
                GestureOutcome::ViewportStarted
            }
            Mode::Multi(_) | Mode::Draining => GestureOutcome::Ignored,
        }
    }

    fn start_multi(&mut self, viewport: &mut ViewportTransform, now: Instant) {
        let (a, pa) = self.pointers[0];
        let (b, pb) = self.pointers[1];
        let focal = midpoint(pa, pb);
        viewport.begin_pan(focal, now);
        self.mode = Mode::Multi(MultiTouch {
            ids: [a, b],
            start_focal: focal,
            start_distance: distance(pa, pb),
            pan_claimed: false,
            pinching: false,
        });
    }

    fn pointer_move(
        &mut self,
        event: PointerEvent,
        builder: &mut StrokeBuilder,
        viewport: &mut ViewportTransform,
    ) -> GestureOutcome {
        let Some(slot) = self.pointers.iter_mut().find(|(p, _)| *p == event.id) else {
            return GestureOutcome::Ignored;
        };
        slot.1 = event.position;

        match &self.mode {
            Mode::Drawing(id) if *id == event.id => {
                GestureOutcome::StrokeExtended(builder.extend(Self::to_world(viewport, &event), event.time))
            }
            Mode::Multi(multi) if multi.ids.contains(&event.id) => {
                let ids = multi.ids;
                let (Some(pa), Some(pb)) = (self.position_of(ids[0]), self.position_of(ids[1])) else {
                    return GestureOutcome::Ignored;
                };
                self.update_multi(pa, pb, viewport, event.time)
            }
            _ => GestureOutcome::Ignored,
        }
    }

    /// Claim pan or pinch on the first real signal, then drive the viewport.
    fn update_multi(
        &mut self,
        pa: Point,
        pb: Point,
        viewport: &mut ViewportTransform,
        now: Instant,
    ) -> GestureOutcome {
        let Mode::Multi(multi) = &mut self.mode else {
            return GestureOutcome::Ignored;
        };
        let focal = midpoint(pa, pb);
        let ratio = if multi.start_distance > f64::EPSILON {
            distance(pa, pb) / multi.start_distance
        } else {
            1.0
        };

        if !multi.pinching && (ratio - 1.0).abs() > viewport.config().pinch_claim_ratio {
            // Before a pan claim the translation is untouched, so the start focal
            // still names the right anchor.
            let base = if multi.pan_claimed { focal } else { multi.start_focal };
            viewport.begin_pinch(base, now);
            multi.pinching = true;
            log::debug!("Two-finger gesture claimed as pinch (ratio {:.3})", ratio);
        }

        if multi.pinching {
            viewport.update_pinch(focal, ratio, now);
            return GestureOutcome::ViewportUpdated;
        }

        if !multi.pan_claimed && distance(focal, multi.start_focal) > viewport.config().pan_claim_distance {
            multi.pan_claimed = true;
            log::debug!("Two-finger gesture claimed as pan");
        }
        if multi.pan_claimed && viewport.update_pan(focal, now) {
            GestureOutcome::ViewportUpdated
        } else {
            GestureOutcome::Ignored
        }
    }

    fn pointer_up(
        &mut self,
        event: PointerEvent,
        builder: &mut StrokeBuilder,
        viewport: &mut ViewportTransform,
    ) -> GestureOutcome {
        let Some(index) = self.pointers.iter().position(|(p, _)| *p == event.id) else {
            return GestureOutcome::Ignored;
        };
        self.pointers.remove(index);

        let outcome = match std::mem::take(&mut self.mode) {
            Mode::Drawing(id) if id == event.id => {
                if event.phase == PointerPhase::Cancel {
                    builder.abandon();
                    log::debug!("Pointer cancelled, abandoning stroke");
                    GestureOutcome::StrokeAbandoned
                } else {
                    // The lift position is the stroke's final sample.
                    builder.extend(Self::to_world(viewport, &event), event.time);
                    match builder.end() {
                        Some(path) => GestureOutcome::StrokeCommitted(path),
                        None => GestureOutcome::Ignored,
                    }
                }
            }
            Mode::Multi(multi) if multi.ids.contains(&event.id) => {
                viewport.end_gesture(event.time);
                self.cooldown_until = Some(event.time + self.config.cooldown());
                self.mode = Mode::Draining;
                GestureOutcome::ViewportEnded
            }
            other => {
                self.mode = other;
                GestureOutcome::Ignored
            }
        };

        if self.pointers.is_empty() {
            self.mode = Mode::Idle;
        }
        outcome
    }
}
