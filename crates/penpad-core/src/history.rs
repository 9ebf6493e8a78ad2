//! Bounded undo/redo history of path-collection snapshots.
//!
//! Snapshots share committed paths through `Arc`. Paths are immutable once
//! committed, so sharing them between entries and the live collection cannot
//! leak mutations in either direction: every push and every read hands out
//! its own `Vec`.

use crate::config::{ConfigError, ConfigResult};
use crate::stroke::StrokePath;
use std::sync::Arc;

// Use web_time for WASM compatibility
#[cfg(target_arch = "wasm32")]
use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

/// The durable drawing state: committed paths in drawing order.
pub type PathList = Vec<Arc<StrokePath>>;

/// Default maximum number of history entries.
pub const MAX_HISTORY: usize = 50;

/// A snapshot of the path collection.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    paths: PathList,
    pub timestamp: Instant,
}

impl HistoryEntry {
    pub fn paths(&self) -> &[Arc<StrokePath>] {
        &self.paths
    }
}

/// Index-addressed history with redo truncation and oldest-first eviction.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<HistoryEntry>,
    /// `None` while the history is empty.
    current: Option<usize>,
    max_size: usize,
}

impl Default for History {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            current: None,
            max_size: MAX_HISTORY,
        }
    }
}

impl History {
    /// Create a history holding at most `max_size` entries.
    pub fn new(max_size: usize) -> ConfigResult<Self> {
        if max_size == 0 {
            return Err(ConfigError::InvalidHistorySize);
        }
        Ok(Self {
            entries: Vec::with_capacity(max_size.min(MAX_HISTORY)),
            current: None,
            max_size,
        })
    }

    /// Record a snapshot of `paths`, discarding any redo entries.
    pub fn push(&mut self, paths: &[Arc<StrokePath>], now: Instant) {
        let keep = self.current.map_or(0, |i| i + 1);
        self.entries.truncate(keep);

        self.entries.push(HistoryEntry {
            paths: paths.to_vec(),
            timestamp: now,
        });

        if self.entries.len() > self.max_size {
            self.entries.remove(0);
            log::debug!("History full, evicted oldest entry");
        }
        self.current = Some(self.entries.len() - 1);
    }

    /// Step back one entry. Returns the restored snapshot, or `None` if at the start.
    pub fn undo(&mut self) -> Option<PathList> {
        match self.current {
            Some(i) if i > 0 => {
                self.current = Some(i - 1);
                Some(self.entries[i - 1].paths.clone())
            }
            _ => None,
        }
    }

    /// Step forward one entry. Returns the restored snapshot, or `None` if at the end.
    pub fn redo(&mut self) -> Option<PathList> {
        match self.current {
            Some(i) if i + 1 < self.entries.len() => {
                self.current = Some(i + 1);
                Some(self.entries[i + 1].paths.clone())
            }
            _ => None,
        }
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.current = None;
    }

    pub fn can_undo(&self) -> bool {
        matches!(self.current, Some(i) if i > 0)
    }

    pub fn can_redo(&self) -> bool {
        matches!(self.current, Some(i) if i + 1 < self.entries.len())
    }

    /// Snapshot at the current index.
    pub fn current(&self) -> Option<&HistoryEntry> {
        self.current.map(|i| &self.entries[i])
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::SerializableColor;
    use crate::stroke::StrokePoint;
    use uuid::Uuid;

    fn path(x: f64) -> Arc<StrokePath> {
        Arc::new(StrokePath {
            id: Uuid::new_v4(),
            points: vec![StrokePoint::new(x, 0.0), StrokePoint::new(x + 1.0, 0.0)],
            path_data: format!("M {x} 0 Z"),
            color: SerializableColor::black(),
            stroke_width: 2.0,
            opacity: 1.0,
            completed: true,
        })
    }

    #[test]
    fn test_zero_size_rejected() {
        assert!(matches!(History::new(0), Err(ConfigError::InvalidHistorySize)));
    }

    #[test]
    fn test_empty_history() {
        let mut history = History::new(10).unwrap();
        assert!(history.is_empty());
        assert_eq!(history.current_index(), None);
        assert!(history.undo().is_none());
        assert!(history.redo().is_none());
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_undo_redo_scenario() {
        let now = Instant::now();
        let mut history = History::new(10).unwrap();
        let a = vec![path(0.0)];
        let b = vec![path(0.0), path(1.0)];
        let c = vec![path(0.0), path(1.0), path(2.0)];
        let d = vec![path(9.0)];

        history.push(&a, now);
        history.push(&b, now);
        history.push(&c, now);

        assert_eq!(history.undo(), Some(b.clone()));
        assert_eq!(history.redo(), Some(c.clone()));
        assert!(history.redo().is_none());

        // Pushing after an undo discards the redo branch.
        assert_eq!(history.undo(), Some(b.clone()));
        history.push(&d, now);
        assert!(!history.can_redo());
        assert!(history.redo().is_none());
        assert_eq!(history.len(), 3);
        assert_eq!(history.undo(), Some(b));
        assert_eq!(history.undo(), Some(a));
        assert!(history.undo().is_none());
    }

    #[test]
    fn test_undo_then_redo_restores_equal_collection() {
        let now = Instant::now();
        let mut history = History::new(5).unwrap();
        let first = vec![path(0.0)];
        let second = vec![path(0.0), path(5.0)];
        history.push(&first, now);
        history.push(&second, now);

        history.undo();
        let restored = history.redo().unwrap();
        assert_eq!(restored, second);
    }

    #[test]
    fn test_bounded_size_keeps_newest() {
        let now = Instant::now();
        let mut history = History::new(3).unwrap();
        let snapshots: Vec<PathList> = (0..5).map(|i| vec![path(i as f64)]).collect();
        for snapshot in &snapshots {
            history.push(snapshot, now);
            assert!(history.len() <= 3);
        }

        assert_eq!(history.len(), 3);
        assert_eq!(history.current_index(), Some(2));
        let kept: Vec<&[Arc<StrokePath>]> = history.entries().iter().map(HistoryEntry::paths).collect();
        assert_eq!(kept[0], snapshots[2].as_slice());
        assert_eq!(kept[1], snapshots[3].as_slice());
        assert_eq!(kept[2], snapshots[4].as_slice());
    }

    #[test]
    fn test_live_mutation_does_not_touch_history() {
        let now = Instant::now();
        let mut history = History::new(5).unwrap();
        let mut live = vec![path(0.0)];
        history.push(&live, now);

        live.push(path(1.0));
        live.clear();

        assert_eq!(history.current().unwrap().paths().len(), 1);

        history.push(&[path(2.0)], now);
        let mut restored = history.undo().unwrap();
        restored.push(path(3.0));
        // Mutating the returned snapshot leaves the stored entry intact.
        assert_eq!(history.current().unwrap().paths().len(), 1);
    }

    #[test]
    fn test_clear() {
        let now = Instant::now();
        let mut history = History::new(5).unwrap();
        history.push(&[path(0.0)], now);
        history.push(&[path(1.0)], now);
        history.clear();
        assert!(history.is_empty());
        assert_eq!(history.current_index(), None);
        assert!(history.undo().is_none());
    }
}
