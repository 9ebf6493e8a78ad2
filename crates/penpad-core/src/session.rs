//! Drawing session: wires the gesture arbiter, stroke builder, viewport and
//! history together and exposes the control surface a UI shell drives.

use crate::config::{ConfigResult, PenpadConfig, StrokeConfig};
use crate::export;
use crate::gesture::{GestureArbiter, GestureOutcome, GestureState, PointerEvent};
use crate::history::{History, PathList};
use crate::stroke::{OutlineGenerator, StrokeBuilder, StrokePath};
use crate::viewport::{ViewportEvent, ViewportState, ViewportTransform};
use std::sync::Arc;
use std::time::Duration;

// Use web_time for WASM compatibility
#[cfg(target_arch = "wasm32")]
use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

/// One interactive drawing session.
#[derive(Debug)]
pub struct Session {
    config: PenpadConfig,
    /// Committed paths in drawing order.
    paths: PathList,
    history: History,
    builder: StrokeBuilder,
    viewport: ViewportTransform,
    arbiter: GestureArbiter,
}

impl Session {
    /// Create a session. Fails fast on invalid configuration.
    pub fn new(config: PenpadConfig) -> ConfigResult<Self> {
        let builder = StrokeBuilder::new(config.stroke.clone());
        Self::with_builder(config, builder)
    }

    /// Create a session with a custom outline generator.
    pub fn with_generator(
        config: PenpadConfig,
        generator: Box<dyn OutlineGenerator + Send + Sync>,
    ) -> ConfigResult<Self> {
        let builder = StrokeBuilder::with_generator(config.stroke.clone(), generator);
        Self::with_builder(config, builder)
    }

    fn with_builder(config: PenpadConfig, builder: StrokeBuilder) -> ConfigResult<Self> {
        config.validate()?;
        let mut history = History::new(config.history.max_size)?;
        let viewport = ViewportTransform::new(config.viewport.clone())?;
        let arbiter = GestureArbiter::new(config.gesture.clone());

        // The empty canvas is the first undo target.
        history.push(&[], Instant::now());

        Ok(Self {
            config,
            paths: Vec::new(),
            history,
            builder,
            viewport,
            arbiter,
        })
    }

    pub fn config(&self) -> &PenpadConfig {
        &self.config
    }

    /// Change stroke styling for subsequent strokes.
    pub fn set_stroke_config(&mut self, stroke: StrokeConfig) -> ConfigResult<()> {
        stroke.validate()?;
        self.builder.set_config(stroke.clone());
        self.config.stroke = stroke;
        Ok(())
    }

    /// Route a pointer event and commit any finished stroke.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> GestureOutcome {
        let outcome = self.arbiter.handle(event, &mut self.builder, &mut self.viewport);
        if let GestureOutcome::StrokeCommitted(path) = &outcome {
            self.commit(path.clone(), event.time);
        }
        outcome
    }

    fn commit(&mut self, path: StrokePath, now: Instant) {
        log::info!("Committed stroke {} with {} points", path.id, path.points.len());
        self.paths.push(Arc::new(path));
        self.history.push(&self.paths, now);
    }

    pub fn gesture_state(&self) -> GestureState {
        self.arbiter.state()
    }

    /// Live path description of the stroke being drawn.
    pub fn preview(&self) -> Option<&str> {
        self.builder.preview()
    }

    /// Animate the zoom to `value` around the canvas center.
    pub fn set_zoom(&mut self, value: f64, now: Instant) {
        self.viewport.set_scale(value, true, None, now);
    }

    /// Animate back to the identity viewport.
    pub fn reset_zoom(&mut self, now: Instant) {
        let duration = self.config.viewport.reset_duration();
        self.viewport.reset(duration, now);
    }

    pub fn viewport(&self) -> ViewportState {
        self.viewport.state()
    }

    pub fn viewport_transform(&self) -> &ViewportTransform {
        &self.viewport
    }

    /// Advance viewport animations. Returns `true` while one is running.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.viewport.tick(now)
    }

    pub fn drain_viewport_events(&mut self) -> Vec<ViewportEvent> {
        self.viewport.drain_events()
    }

    /// Step back up to `steps` entries. Returns how many were taken.
    pub fn undo(&mut self, steps: usize) -> usize {
        let mut taken = 0;
        while taken < steps {
            let Some(paths) = self.history.undo() else {
                break;
            };
            self.paths = paths;
            taken += 1;
        }
        taken
    }

    /// Step forward up to `steps` entries. Returns how many were taken.
    pub fn redo(&mut self, steps: usize) -> usize {
        let mut taken = 0;
        while taken < steps {
            let Some(paths) = self.history.redo() else {
                break;
            };
            self.paths = paths;
            taken += 1;
        }
        taken
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Remove all paths. Undoable. Returns `false` if there was nothing to clear.
    pub fn clear(&mut self, now: Instant) -> bool {
        if self.paths.is_empty() {
            return false;
        }
        self.paths.clear();
        self.history.push(&self.paths, now);
        true
    }

    /// Drop all paths and history, abandon any in-flight stroke and snap the
    /// viewport back to identity.
    pub fn reset(&mut self, now: Instant) {
        self.builder.abandon();
        self.arbiter.reset();
        self.paths.clear();
        self.history.clear();
        self.history.push(&self.paths, now);
        self.viewport.reset(Duration::ZERO, now);
        log::info!("Session reset");
    }

    pub fn paths(&self) -> &[Arc<StrokePath>] {
        &self.paths
    }

    /// Replace the path collection. Undoable.
    pub fn set_paths(&mut self, paths: Vec<StrokePath>, now: Instant) {
        self.paths = paths.into_iter().map(Arc::new).collect();
        self.history.push(&self.paths, now);
    }

    /// Render the current paths as an SVG document.
    pub fn export_svg(&self) -> String {
        export::to_svg(&self.paths, &self.config.export)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HistoryConfig;
    use crate::gesture::{PointerId, PointerPhase};
    use crate::stroke::{OutlineOptions, StrokePoint};
    use kurbo::Point;

    struct Clock(Instant);

    impl Clock {
        fn at(&self, ms: u64) -> Instant {
            self.0 + Duration::from_millis(ms)
        }
    }

    fn session() -> (Session, Clock) {
        (Session::new(PenpadConfig::default()).unwrap(), Clock(Instant::now()))
    }

    fn pointer(id: PointerId, phase: PointerPhase, x: f64, y: f64, at: Instant) -> PointerEvent {
        PointerEvent::new(id, phase, Point::new(x, y), at)
    }

    /// Draw a straight stroke starting at `ms`.
    fn draw(session: &mut Session, clock: &Clock, ms: u64, y: f64) {
        session.handle_pointer(pointer(1, PointerPhase::Down, 0.0, y, clock.at(ms)));
        session.handle_pointer(pointer(1, PointerPhase::Move, 20.0, y, clock.at(ms + 10)));
        session.handle_pointer(pointer(1, PointerPhase::Move, 40.0, y, clock.at(ms + 20)));
        session.handle_pointer(pointer(1, PointerPhase::Up, 40.0, y, clock.at(ms + 30)));
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let config = PenpadConfig {
            history: HistoryConfig { max_size: 0 },
            ..PenpadConfig::default()
        };
        assert!(Session::new(config).is_err());
    }

    #[test]
    fn test_draw_commits_path() {
        let (mut session, clock) = session();
        assert!(!session.can_undo());

        draw(&mut session, &clock, 0, 10.0);
        assert_eq!(session.paths().len(), 1);
        assert!(session.paths()[0].completed);
        assert!(session.paths()[0].path_data.starts_with("M "));
        assert!(session.can_undo());
        assert!(session.preview().is_none());
    }

    #[test]
    fn test_undo_redo_steps() {
        let (mut session, clock) = session();
        draw(&mut session, &clock, 0, 0.0);
        draw(&mut session, &clock, 100, 50.0);
        draw(&mut session, &clock, 200, 100.0);
        let all: Vec<_> = session.paths().to_vec();

        assert_eq!(session.undo(2), 2);
        assert_eq!(session.paths().len(), 1);
        assert_eq!(session.paths()[0], all[0]);

        // Only one step back to the empty canvas remains.
        assert_eq!(session.undo(5), 1);
        assert!(session.paths().is_empty());
        assert_eq!(session.undo(1), 0);

        assert_eq!(session.redo(10), 3);
        assert_eq!(session.paths(), all.as_slice());
        assert!(!session.can_redo());
    }

    #[test]
    fn test_new_stroke_discards_redo() {
        let (mut session, clock) = session();
        draw(&mut session, &clock, 0, 0.0);
        draw(&mut session, &clock, 100, 50.0);
        session.undo(1);
        draw(&mut session, &clock, 200, 100.0);
        assert!(!session.can_redo());
        assert_eq!(session.paths().len(), 2);
        assert_eq!(session.redo(1), 0);
    }

    #[test]
    fn test_clear_is_undoable() {
        let (mut session, clock) = session();
        assert!(!session.clear(clock.at(0)));

        draw(&mut session, &clock, 0, 0.0);
        assert!(session.clear(clock.at(100)));
        assert!(session.paths().is_empty());

        assert_eq!(session.undo(1), 1);
        assert_eq!(session.paths().len(), 1);
    }

    #[test]
    fn test_reset_wipes_history_and_viewport() {
        let (mut session, clock) = session();
        draw(&mut session, &clock, 0, 0.0);
        session.set_zoom(2.0, clock.at(50));
        session.tick(clock.at(500));
        assert!((session.viewport().scale - 2.0).abs() < 1e-9);

        session.reset(clock.at(600));
        assert!(session.paths().is_empty());
        assert!(!session.can_undo());
        assert!(!session.can_redo());
        assert_eq!(session.viewport(), ViewportState::default());
    }

    #[test]
    fn test_set_zoom_clamps_and_notifies() {
        let (mut session, clock) = session();
        session.set_zoom(10.0, clock.at(0));
        assert!(session.tick(clock.at(100)));
        assert!(!session.tick(clock.at(200)));
        assert!((session.viewport().scale - 3.0).abs() < 1e-9);

        let events = session.drain_viewport_events();
        assert!(events.contains(&ViewportEvent::ScaleChanged(3.0)));
        assert!(session.drain_viewport_events().is_empty());
    }

    #[test]
    fn test_reset_zoom_animates() {
        let (mut session, clock) = session();
        session.set_zoom(2.0, clock.at(0));
        session.tick(clock.at(300));
        session.reset_zoom(clock.at(300));
        assert!(session.tick(clock.at(400)));
        assert!(!session.tick(clock.at(700)));
        assert_eq!(session.viewport(), ViewportState::default());
    }

    #[test]
    fn test_set_paths() {
        let (mut session, clock) = session();
        let path = StrokePath {
            id: uuid::Uuid::new_v4(),
            points: vec![StrokePoint::new(0.0, 0.0), StrokePoint::new(1.0, 1.0)],
            path_data: "M 0 0 Z".to_string(),
            color: crate::color::SerializableColor::black(),
            stroke_width: 2.0,
            opacity: 1.0,
            completed: true,
        };
        session.set_paths(vec![path.clone()], clock.at(0));
        assert_eq!(*session.paths()[0], path);
        assert_eq!(session.undo(1), 1);
        assert!(session.paths().is_empty());
    }

    #[test]
    fn test_pinch_does_not_commit() {
        let (mut session, clock) = session();
        session.handle_pointer(pointer(1, PointerPhase::Down, 100.0, 100.0, clock.at(0)));
        session.handle_pointer(pointer(1, PointerPhase::Move, 110.0, 100.0, clock.at(5)));
        session.handle_pointer(pointer(2, PointerPhase::Down, 200.0, 100.0, clock.at(10)));
        session.handle_pointer(pointer(2, PointerPhase::Move, 300.0, 100.0, clock.at(20)));
        assert_eq!(session.gesture_state(), GestureState::Pinching);
        session.handle_pointer(pointer(1, PointerPhase::Up, 110.0, 100.0, clock.at(30)));
        session.handle_pointer(pointer(2, PointerPhase::Up, 300.0, 100.0, clock.at(40)));

        assert!(session.paths().is_empty());
        assert!(session.viewport().scale > 1.0);
    }

    #[test]
    fn test_custom_generator() {
        struct Square;

        impl OutlineGenerator for Square {
            fn outline(&self, _points: &[StrokePoint], _options: &OutlineOptions) -> Vec<Point> {
                vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0), Point::new(0.0, 10.0)]
            }
        }

        let mut session = Session::with_generator(PenpadConfig::default(), Box::new(Square)).unwrap();
        let clock = Clock(Instant::now());
        draw(&mut session, &clock, 0, 0.0);
        assert_eq!(
            session.paths()[0].path_data,
            "M 0 0 Q 0 0 5 0 10 0 10 5 10 10 5 10 0 10 0 5 Z"
        );
        assert!(session.export_svg().contains(&session.paths()[0].path_data));
    }
}
