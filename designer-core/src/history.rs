//! Snapshot-based undo/redo history over the document.

use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::page::Page;

/// An immutable deep copy of the document's pages (elements plus page
/// details) at a committed instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pages: Vec<Page>,
}

impl Snapshot {
    /// Capture the current state of a document.
    #[must_use]
    pub fn capture(document: &Document) -> Self {
        Self {
            pages: document.pages.clone(),
        }
    }

    /// Replace a document's pages with this snapshot's state.
    ///
    /// The current page index is clamped so it stays valid.
    pub fn restore_into(&self, document: &mut Document) {
        document.set_pages(self.pages.clone());
    }
}

/// Linear history of snapshots with a cursor.
///
/// The history owns snapshots only, never the live document. A new
/// commit after an undo truncates the stale redo branch; there is no
/// branching history.
#[derive(Debug, Clone)]
pub struct History {
    snapshots: Vec<Snapshot>,
    cursor: usize,
}

impl History {
    /// Create a history seeded with the document's initial state.
    ///
    /// The seed sits at index 0 so the very first edit can be undone.
    #[must_use]
    pub fn new(document: &Document) -> Self {
        Self {
            snapshots: vec![Snapshot::capture(document)],
            cursor: 0,
        }
    }

    /// Append a snapshot of the current live state.
    ///
    /// Any snapshots beyond the cursor (an undone-but-not-redone branch)
    /// are discarded first; the cursor then advances to the new tail.
    pub fn commit(&mut self, document: &Document) {
        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push(Snapshot::capture(document));
        self.cursor = self.snapshots.len() - 1;
        tracing::debug!("Committed snapshot {} of {}", self.cursor, self.snapshots.len());
    }

    /// Step the cursor back and return the snapshot to restore.
    ///
    /// Returns `None` (a no-op) when the cursor is already at index 0.
    pub fn undo(&mut self) -> Option<&Snapshot> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(&self.snapshots[self.cursor])
    }

    /// Step the cursor forward and return the snapshot to restore.
    ///
    /// Returns `None` (a no-op) when the cursor is already at the tail.
    pub fn redo(&mut self) -> Option<&Snapshot> {
        if self.cursor + 1 >= self.snapshots.len() {
            return None;
        }
        self.cursor += 1;
        Some(&self.snapshots[self.cursor])
    }

    /// Whether an undo step is available.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Whether a redo step is available.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    /// Number of stored snapshots (including the seed state).
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Always false: the history keeps at least the seed snapshot.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
