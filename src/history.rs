//! Undo/Redo history for sketch edits.
//!
//! Each undoable step is stored as a snapshot of the session taken right
//! before the step. Undoing swaps the current state for the snapshot and
//! keeps the current state around for redo.

use crate::sketch::SketchSnapshot;

/// Configuration for the history stack
#[derive(Debug, Clone)]
pub struct HistoryConfig {
    /// Maximum number of snapshots to keep
    pub max_history: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_history: crate::constants::DEFAULT_MAX_HISTORY,
        }
    }
}

/// The undo/redo snapshot stacks.
///
/// When a new step is recorded the redo stack is cleared.
#[derive(Debug, Clone, Default)]
pub struct SketchHistory {
    /// Snapshots that can be restored by undo (most recent at the end)
    undo_stack: Vec<SketchSnapshot>,
    /// Snapshots that can be restored by redo (most recent at the end)
    redo_stack: Vec<SketchSnapshot>,
    config: HistoryConfig,
}

impl SketchHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: HistoryConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Record the state from before a step.
    pub fn push(&mut self, before: SketchSnapshot) {
        self.undo_stack.push(before);
        self.redo_stack.clear();

        while self.undo_stack.len() > self.config.max_history {
            self.undo_stack.remove(0);
        }
        log::trace!("📝 History: {} undo steps", self.undo_stack.len());
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Step back. `current` moves to the redo stack; the returned snapshot
    /// should be restored.
    pub fn undo(&mut self, current: SketchSnapshot) -> Option<SketchSnapshot> {
        let snapshot = self.undo_stack.pop()?;
        self.redo_stack.push(current);
        log::debug!("⏪ Undo ({} left)", self.undo_stack.len());
        Some(snapshot)
    }

    /// Step forward again after an undo.
    pub fn redo(&mut self, current: SketchSnapshot) -> Option<SketchSnapshot> {
        let snapshot = self.redo_stack.pop()?;
        self.undo_stack.push(current);
        log::debug!("⏩ Redo ({} left)", self.redo_stack.len());
        Some(snapshot)
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// Clear all history
    pub fn clear(&mut self) {
        if self.can_undo() || self.can_redo() {
            log::debug!("🗑️ History cleared");
        }
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
