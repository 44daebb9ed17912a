//! Snapshot-based undo/redo.
//!
//! Every committed edit stores a full copy of the composition and selection.
//! Undo and redo move a cursor and hand back the snapshot to restore, so they
//! are correct for any edit regardless of how complicated it was.
//!
//! The list is a bounded ring: once `capacity` entries exist the oldest is
//! evicted.

use std::collections::VecDeque;

use crate::composition::Composition;
use crate::selection::Selection;

/// Full editable state at one point in history.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub composition: Composition,
    pub selection: Selection,
}

#[derive(Debug, Clone)]
struct HistoryEntry {
    /// Action that produced this state ("Split element", ...).
    label: String,
    snapshot: Snapshot,
}

/// Linear history with a cursor at the live state.
#[derive(Debug)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
    cursor: usize,
    capacity: usize,
}

impl History {
    /// Start a history whose first entry is `initial`.
    pub fn new(capacity: usize, initial: Snapshot) -> Self {
        let mut history = Self {
            entries: VecDeque::with_capacity(capacity.max(1)),
            cursor: 0,
            capacity: capacity.max(1),
        };
        history.reset(initial);
        history
    }

    /// Drop everything and start over from `initial`.
    pub fn reset(&mut self, initial: Snapshot) {
        self.entries.clear();
        self.entries.push_back(HistoryEntry {
            label: "Initial state".to_string(),
            snapshot: initial,
        });
        self.cursor = 0;
        tracing::debug!("History reset");
    }

    /// Record the state after a committed edit.
    ///
    /// Any redo entries past the cursor are discarded.
    pub fn push(&mut self, label: &str, snapshot: Snapshot) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push_back(HistoryEntry {
            label: label.to_string(),
            snapshot,
        });
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        self.cursor = self.entries.len() - 1;

        tracing::debug!(label, depth = self.entries.len(), "History entry pushed");
    }

    /// Step back. Returns the snapshot to restore.
    pub fn undo(&mut self) -> Option<&Snapshot> {
        if self.cursor == 0 {
            return None;
        }
        tracing::debug!(label = %self.entries[self.cursor].label, "Undo");
        self.cursor -= 1;
        Some(&self.entries[self.cursor].snapshot)
    }

    /// Step forward. Returns the snapshot to restore.
    pub fn redo(&mut self) -> Option<&Snapshot> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        tracing::debug!(label = %self.entries[self.cursor].label, "Redo");
        Some(&self.entries[self.cursor].snapshot)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Label of the edit the next undo reverts.
    pub fn undo_label(&self) -> Option<&str> {
        self.can_undo()
            .then(|| self.entries[self.cursor].label.as_str())
    }

    /// Label of the edit the next redo re-applies.
    pub fn redo_label(&self) -> Option<&str> {
        self.entries
            .get(self.cursor + 1)
            .map(|e| e.label.as_str())
    }

    /// The snapshot at the cursor.
    pub fn current(&self) -> &Snapshot {
        &self.entries[self.cursor].snapshot
    }

    /// Number of stored snapshots, including the live one.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
