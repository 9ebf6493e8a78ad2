//! Recorded input scripts and their replay through a [`Session`].
//!
//! A script is a JSON array of steps, each tagged by `type`. Times are
//! milliseconds from the start of the replay:
//!
//! ```json
//! [
//!   { "type": "pointer", "id": 1, "phase": "down", "x": 10, "y": 10, "t": 0 },
//!   { "type": "pointer", "id": 1, "phase": "move", "x": 60, "y": 40, "t": 16 },
//!   { "type": "pointer", "id": 1, "phase": "up", "x": 60, "y": 40, "t": 32 },
//!   { "type": "set_zoom", "value": 2.0, "t": 100 },
//!   { "type": "tick", "t": 400 },
//!   { "type": "undo" }
//! ]
//! ```

use kurbo::Point;
use penpad_core::{GestureOutcome, PointerEvent, PointerId, PointerPhase, Session};
use serde::Deserialize;
use std::time::{Duration, Instant};

fn one() -> usize {
    1
}

/// One scripted input.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Step {
    Pointer {
        id: PointerId,
        phase: PointerPhase,
        x: f64,
        y: f64,
        #[serde(default)]
        pressure: Option<f64>,
        t: u64,
    },
    Undo {
        #[serde(default = "one")]
        steps: usize,
    },
    Redo {
        #[serde(default = "one")]
        steps: usize,
    },
    Clear {
        #[serde(default)]
        t: u64,
    },
    Reset {
        #[serde(default)]
        t: u64,
    },
    SetZoom {
        value: f64,
        #[serde(default)]
        t: u64,
    },
    ResetZoom {
        #[serde(default)]
        t: u64,
    },
    Tick {
        t: u64,
    },
}

/// Parse a JSON script.
pub fn parse(json: &str) -> Result<Vec<Step>, serde_json::Error> {
    serde_json::from_str(json)
}

/// Counters collected during a replay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub steps: usize,
    pub committed: usize,
    pub abandoned: usize,
    pub suppressed: usize,
    pub undone: usize,
    pub redone: usize,
    pub viewport_events: usize,
}

/// Feed every step into `session`, with step times offset from `origin`.
pub fn replay(session: &mut Session, steps: &[Step], origin: Instant) -> ReplaySummary {
    let at = |t: u64| origin + Duration::from_millis(t);
    let mut summary = ReplaySummary::default();

    for step in steps {
        match *step {
            Step::Pointer {
                id,
                phase,
                x,
                y,
                pressure,
                t,
            } => {
                let event = PointerEvent {
                    id,
                    phase,
                    position: Point::new(x, y),
                    pressure,
                    time: at(t),
                };
                match session.handle_pointer(event) {
                    GestureOutcome::StrokeCommitted(_) => summary.committed += 1,
                    GestureOutcome::StrokeAbandoned => summary.abandoned += 1,
                    GestureOutcome::Suppressed => summary.suppressed += 1,
                    _ => {}
                }
            }
            Step::Undo { steps } => summary.undone += session.undo(steps),
            Step::Redo { steps } => summary.redone += session.redo(steps),
            Step::Clear { t } => {
                session.clear(at(t));
            }
            Step::Reset { t } => session.reset(at(t)),
            Step::SetZoom { value, t } => session.set_zoom(value, at(t)),
            Step::ResetZoom { t } => session.reset_zoom(at(t)),
            Step::Tick { t } => {
                session.tick(at(t));
            }
        }
        summary.steps += 1;

        for event in session.drain_viewport_events() {
            log::debug!("Viewport event: {:?}", event);
            summary.viewport_events += 1;
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use penpad_core::PenpadConfig;

    const DRAW_AND_ZOOM: &str = r#"[
        { "type": "pointer", "id": 1, "phase": "down", "x": 10, "y": 10, "t": 0 },
        { "type": "pointer", "id": 1, "phase": "move", "x": 40, "y": 20, "t": 16 },
        { "type": "pointer", "id": 1, "phase": "move", "x": 80, "y": 30, "pressure": 0.4, "t": 32 },
        { "type": "pointer", "id": 1, "phase": "up", "x": 80, "y": 30, "t": 48 },
        { "type": "set_zoom", "value": 2.0, "t": 100 },
        { "type": "tick", "t": 200 },
        { "type": "tick", "t": 400 }
    ]"#;

    fn session() -> Session {
        Session::new(PenpadConfig::default()).unwrap()
    }

    #[test]
    fn test_parse_steps() {
        let steps = parse(
            r#"[
                { "type": "pointer", "id": 3, "phase": "cancel", "x": 1.5, "y": 2, "t": 7 },
                { "type": "undo" },
                { "type": "redo", "steps": 4 },
                { "type": "reset_zoom", "t": 9 }
            ]"#,
        )
        .unwrap();

        assert_eq!(
            steps,
            vec![
                Step::Pointer {
                    id: 3,
                    phase: PointerPhase::Cancel,
                    x: 1.5,
                    y: 2.0,
                    pressure: None,
                    t: 7
                },
                Step::Undo { steps: 1 },
                Step::Redo { steps: 4 },
                Step::ResetZoom { t: 9 },
            ]
        );
    }

    #[test]
    fn test_parse_rejects_unknown_step() {
        assert!(parse(r#"[{ "type": "teleport" }]"#).is_err());
        assert!(parse(r#"[{ "type": "pointer", "id": 1, "phase": "hover", "x": 0, "y": 0, "t": 0 }]"#).is_err());
    }

    #[test]
    fn test_replay_draw_and_zoom() {
        let mut session = session();
        let steps = parse(DRAW_AND_ZOOM).unwrap();
        let summary = replay(&mut session, &steps, Instant::now());

        assert_eq!(summary.steps, 7);
        assert_eq!(summary.committed, 1);
        assert_eq!(session.paths().len(), 1);
        assert!((session.viewport().scale - 2.0).abs() < 1e-9);
        assert!(summary.viewport_events > 0);
    }

    #[test]
    fn test_replay_undo_redo() {
        let mut session = session();
        let mut steps = parse(DRAW_AND_ZOOM).unwrap();
        steps.extend(parse(r#"[{ "type": "undo", "steps": 3 }, { "type": "redo" }]"#).unwrap());
        let summary = replay(&mut session, &steps, Instant::now());

        // Only the stroke itself can be undone.
        assert_eq!(summary.undone, 1);
        assert_eq!(summary.redone, 1);
        assert_eq!(session.paths().len(), 1);
    }

    #[test]
    fn test_replay_pinch_abandons_stroke() {
        let mut session = session();
        let steps = parse(
            r#"[
                { "type": "pointer", "id": 1, "phase": "down", "x": 100, "y": 100, "t": 0 },
                { "type": "pointer", "id": 1, "phase": "move", "x": 110, "y": 100, "t": 10 },
                { "type": "pointer", "id": 2, "phase": "down", "x": 210, "y": 100, "t": 20 },
                { "type": "pointer", "id": 1, "phase": "up", "x": 110, "y": 100, "t": 30 },
                { "type": "pointer", "id": 2, "phase": "up", "x": 210, "y": 100, "t": 40 },
                { "type": "pointer", "id": 3, "phase": "down", "x": 210, "y": 100, "t": 60 },
                { "type": "pointer", "id": 3, "phase": "up", "x": 210, "y": 100, "t": 70 }
            ]"#,
        )
        .unwrap();
        let summary = replay(&mut session, &steps, Instant::now());

        assert_eq!(summary.abandoned, 1);
        assert_eq!(summary.suppressed, 1);
        assert_eq!(summary.committed, 0);
        assert!(session.paths().is_empty());
    }

    #[test]
    fn test_replay_clear_and_reset() {
        let mut session = session();
        let mut steps = parse(DRAW_AND_ZOOM).unwrap();
        steps.push(Step::Clear { t: 500 });
        replay(&mut session, &steps, Instant::now());
        assert!(session.paths().is_empty());
        assert!(session.can_undo());

        replay(&mut session, &[Step::Reset { t: 600 }], Instant::now());
        assert!(!session.can_undo());
        assert!((session.viewport().scale - 1.0).abs() < 1e-9);
    }
}
