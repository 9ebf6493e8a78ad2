//! Penpad Core Library
//!
//! Platform-agnostic freehand drawing core: stroke capture and outline
//! generation, pan/pinch viewport handling, gesture arbitration and
//! bounded undo/redo.

pub mod color;
pub mod config;
pub mod easing;
pub mod export;
pub mod geometry;
pub mod gesture;
pub mod history;
pub mod session;
pub mod stroke;
pub mod viewport;

pub use color::SerializableColor;
pub use config::{ConfigError, ConfigResult, PenpadConfig};
pub use easing::Easing;
pub use export::{ExportError, ExportResult};
pub use gesture::{GestureArbiter, GestureOutcome, GestureState, PointerEvent, PointerId, PointerPhase};
pub use history::{History, PathList};
pub use session::Session;
pub use stroke::{OutlineGenerator, OutlineOptions, PressureOutline, StrokeBuilder, StrokePath, StrokePoint};
pub use viewport::{ViewportEvent, ViewportState, ViewportTransform};
