use std::collections::VecDeque;

use strata_types::ProjectDocument;

/// Whole-document snapshots. Each entry is the document as it was before one
/// committed mutation.
pub struct UndoHistory {
    undo_stack: VecDeque<ProjectDocument>,
    redo_stack: VecDeque<ProjectDocument>,
    max_depth: usize,
}

impl UndoHistory {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            max_depth: max_depth.max(1),
        }
    }

    /// Record the pre-mutation document. Clears redo.
    pub fn push(&mut self, snapshot: ProjectDocument) {
        if self.undo_stack.len() >= self.max_depth {
            self.undo_stack.pop_front();
        }
        self.undo_stack.push_back(snapshot);
        self.redo_stack.clear();
    }

    /// Swap `current` with the most recent snapshot. No-op on an empty stack.
    pub fn undo(&mut self, current: &mut ProjectDocument) -> bool {
        let Some(previous) = self.undo_stack.pop_back() else {
            return false;
        };
        let undone = std::mem::replace(current, previous);
        self.redo_stack.push_back(undone);
        true
    }

    pub fn redo(&mut self, current: &mut ProjectDocument) -> bool {
        let Some(next) = self.redo_stack.pop_back() else {
            return false;
        };
        let redone = std::mem::replace(current, next);
        if self.undo_stack.len() >= self.max_depth {
            self.undo_stack.pop_front();
        }
        self.undo_stack.push_back(redone);
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
