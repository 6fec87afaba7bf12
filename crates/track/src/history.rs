use serde::{Deserialize, Serialize};

use crate::edit::{EditResult, Splice};
use crate::markers::Cursor;
use crate::ops::Operation;
use crate::track::Track;

/// One committed edit.
///
/// The splice holds the exact positions removed and inserted, so applying
/// and inverting never re-run the transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UndoEntry {
    pub label: String,
    pub operation: Operation,
    pub splice: Splice,
    pub cursor_before: Cursor,
    pub cursor_after: Cursor,
}

impl UndoEntry {
    /// Replays the edit over the track as it was before the commit.
    pub fn apply(&self, track: &Track) -> EditResult {
        self.splice.forward(track.points(), track.frame())
    }

    /// Reverts the edit over the track as it was after the commit.
    pub fn invert(&self, track: &Track) -> EditResult {
        self.splice.backward(track.points(), track.frame())
    }
}

/// Undo and redo labels, most recent first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryLabels {
    pub undo: Vec<String>,
    pub redo: Vec<String>,
}

/// Linear undo/redo log.
///
/// A new entry discards everything that was undone. With a limit, the oldest
/// entries fall off the bottom of the undo stack.
#[derive(Debug, Clone, Default)]
pub struct History {
    undo_stack: Vec<UndoEntry>,
    redo_stack: Vec<UndoEntry>,
    limit: Option<usize>,
}

impl History {
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            limit,
        }
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn undo_label(&self) -> Option<&str> {
        self.undo_stack.last().map(|e| e.label.as_str())
    }

    pub fn redo_label(&self) -> Option<&str> {
        self.redo_stack.last().map(|e| e.label.as_str())
    }

    pub fn labels(&self) -> HistoryLabels {
        HistoryLabels {
            undo: self.undo_stack.iter().rev().map(|e| e.label.clone()).collect(),
            redo: self.redo_stack.iter().rev().map(|e| e.label.clone()).collect(),
        }
    }

    /// Records a fresh commit.
    pub fn push(&mut self, entry: UndoEntry) {
        self.redo_stack.clear();
        if let Some(limit) = self.limit {
            if limit == 0 {
                return;
            }
            while self.undo_stack.len() >= limit {
                self.undo_stack.remove(0);
            }
        }
        self.undo_stack.push(entry);
    }

    /// Moves the latest entry onto the redo stack and returns it.
    pub fn undo(&mut self) -> Option<&UndoEntry> {
        let entry = self.undo_stack.pop()?;
        self.redo_stack.push(entry);
        self.redo_stack.last()
    }

    /// Moves the latest undone entry back onto the undo stack and returns it.
    pub fn redo(&mut self) -> Option<&UndoEntry> {
        let entry = self.redo_stack.pop()?;
        self.undo_stack.push(entry);
        self.undo_stack.last()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
