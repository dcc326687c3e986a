use std::collections::VecDeque;

mod record;

pub use record::ShapeRecord;

use crate::document::Document;
use crate::raster::Raster;

/// Default number of snapshots kept
pub const DEFAULT_MAX_HISTORY: usize = 20;

/// One snapshot of the document: a deep copy of the raster plus records of the
/// tracked shapes.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    raster: Raster,
    shapes: Vec<ShapeRecord>,
}

impl HistoryEntry {
    pub fn capture(document: &Document) -> Self {
        Self {
            raster: document.raster().clone(),
            shapes: document.shapes().iter().filter_map(ShapeRecord::capture).collect(),
        }
    }

    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    pub fn shapes(&self) -> &[ShapeRecord] {
        &self.shapes
    }

    /// Replaces the raster and the tracked shapes of `document` with this entry.
    ///
    /// Untracked shapes stay where they are; their count is returned.
    pub fn restore_into(&self, document: &mut Document) -> usize {
        document.retain_shapes(|item| !ShapeRecord::is_tracked(item.kind()));
        let untracked = document.shapes().len();
        document.set_raster(self.raster.clone());
        for record in &self.shapes {
            document.add_shape(record.restore());
        }
        untracked
    }
}

/// Bounded linear undo/redo over document snapshots.
///
/// The entry at the current index always matches the live document right after a
/// commit; undo and redo move the index and hand back the entry to restore.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
    current: usize,
    max_size: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}

impl History {
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            current: 0,
            max_size: max_size.max(1),
        }
    }

    /// Captures `document` and appends it.
    pub fn snapshot(&mut self, document: &Document) {
        self.push(HistoryEntry::capture(document));
    }

    /// Drops everything after the current entry, appends `entry` and evicts the oldest
    /// entry when over capacity.
    pub fn push(&mut self, entry: HistoryEntry) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.current + 1);
        }
        self.entries.push_back(entry);
        while self.entries.len() > self.max_size {
            self.entries.pop_front();
        }
        self.current = self.entries.len() - 1;
        log::debug!(
            "History saved: index={}, len={}, can_undo={}, can_redo={}",
            self.current,
            self.entries.len(),
            self.can_undo(),
            self.can_redo()
        );
    }

    pub fn reset(&mut self) {
        self.entries.clear();
        self.current = 0;
    }

    /// Steps back. `None` (and nothing changes) when already at the oldest entry.
    pub fn undo(&mut self) -> Option<&HistoryEntry> {
        if !self.can_undo() {
            return None;
        }
        self.current -= 1;
        self.entries.get(self.current)
    }

    /// Steps forward. `None` (and nothing changes) when already at the newest entry.
    pub fn redo(&mut self) -> Option<&HistoryEntry> {
        if !self.can_redo() {
            return None;
        }
        self.current += 1;
        self.entries.get(self.current)
    }

    pub fn can_undo(&self) -> bool {
        !self.entries.is_empty() && self.current > 0
    }

    pub fn can_redo(&self) -> bool {
        !self.entries.is_empty() && self.current + 1 < self.entries.len()
    }

    pub fn current(&self) -> Option<&HistoryEntry> {
        self.entries.get(self.current)
    }

    /// `None` while the history is empty.
    pub fn current_index(&self) -> Option<usize> {
        (!self.entries.is_empty()).then_some(self.current)
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

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn entry(value: u8) -> HistoryEntry {
        HistoryEntry::capture(&Document::new(Raster::from_pixel(2, 2, Rgb([value; 3]))))
    }

    fn marker(entry: &HistoryEntry) -> u8 {
        entry.raster().get_pixel(0, 0).0[0]
    }

    #[test]
    fn length_is_bounded() {
        let mut history = History::new(20);
        for i in 0..25 {
            history.push(entry(i));
        }
        assert_eq!(history.len(), 20);
        assert_eq!(history.current_index(), Some(19));
        assert_eq!(history.current().map(marker), Some(24));
        assert_eq!(history.entries().next().map(marker), Some(5));
    }

    #[test]
    fn push_prunes_redo_branch() {
        let mut history = History::new(20);
        for i in 0..5 {
            history.push(entry(i));
        }
        history.undo();
        history.undo();
        assert_eq!(history.current_index(), Some(2));
        assert!(history.can_redo());

        history.push(entry(99));
        assert_eq!(history.len(), 4);
        assert_eq!(history.current_index(), Some(3));
        assert!(!history.can_redo());
        assert_eq!(history.current().map(marker), Some(99));
    }

    #[test]
    fn undo_and_redo_stop_at_the_ends() {
        let mut history = History::new(3);
        assert!(history.undo().is_none());
        assert!(history.redo().is_none());
        assert_eq!(history.current_index(), None);

        history.push(entry(1));
        assert!(!history.can_undo());
        assert!(history.undo().is_none());

        history.push(entry(2));
        assert_eq!(history.undo().map(marker), Some(1));
        assert!(history.undo().is_none());
        assert_eq!(history.redo().map(marker), Some(2));
        assert!(history.redo().is_none());
    }

    #[test]
    fn zero_capacity_keeps_one_entry() {
        let mut history = History::new(0);
        history.push(entry(1));
        history.push(entry(2));
        assert_eq!(history.len(), 1);
        assert_eq!(history.current().map(marker), Some(2));
    }
}
