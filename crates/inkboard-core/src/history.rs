//! Bounded undo/redo log over full document snapshots.
//!
//! The log always holds the state the canvas currently shows at `cursor`.
//! Committing drops any redo entries beyond the cursor before appending.

use crate::document::CanvasDocument;
use std::collections::VecDeque;

/// Maximum number of history entries to keep.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Cursor-based snapshot history.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<CanvasDocument>,
    cursor: usize,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(CanvasDocument::new(), DEFAULT_HISTORY_CAPACITY)
    }
}

impl History {
    /// Create a history whose only entry is `initial`.
    pub fn new(initial: CanvasDocument, capacity: usize) -> Self {
        let mut entries = VecDeque::with_capacity(capacity.max(1) + 1);
        entries.push_back(initial);
        Self {
            entries,
            cursor: 0,
            capacity: capacity.max(1),
        }
    }

    /// Record a new state after a mutation.
    pub fn commit(&mut self, snapshot: CanvasDocument) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push_back(snapshot);
        self.cursor = self.entries.len() - 1;

        // Limit history size
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
            self.cursor = self.cursor.saturating_sub(1);
        }
        log::debug!("history commit: {} entries, cursor {}", self.entries.len(), self.cursor);
    }

    /// Step back one entry. Returns the state to restore, or `None` at the oldest entry.
    pub fn undo(&mut self) -> Option<&CanvasDocument> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor)
    }

    /// Step forward one entry. Returns the state to restore, or `None` at the newest entry.
    pub fn redo(&mut self) -> Option<&CanvasDocument> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor)
    }

    /// Drop all entries and start over from `initial`.
    pub fn reset(&mut self, initial: CanvasDocument) {
        self.entries.clear();
        self.entries.push_back(initial);
        self.cursor = 0;
    }

    /// The entry at the cursor.
    pub fn current(&self) -> Option<&CanvasDocument> {
        self.entries.get(self.cursor)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
