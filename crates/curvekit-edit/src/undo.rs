//! Command history with merging of interactive edits.

use curvekit_core::EditContext;
use tracing::debug;

use crate::commands::EditCommand;
use crate::config::EditorConfig;

/// Undo/redo stack of applied commands.
#[derive(Debug)]
pub struct UndoStack {
    /// Commands that have been executed (most recent last).
    undo: Vec<EditCommand>,
    /// Commands that have been undone (most recent last).
    redo: Vec<EditCommand>,
    /// Maximum history depth.
    max_depth: usize,
    merge: bool,
    /// Whether the top command may still absorb the next push.
    open: bool,
}

impl UndoStack {
    /// Create a new undo stack with the given maximum depth.
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo: Vec::new(),
            redo: Vec::new(),
            max_depth: max_depth.max(1),
            merge: true,
            open: false,
        }
    }

    pub fn from_config(config: &EditorConfig) -> Self {
        Self {
            merge: config.merge_interactive_edits,
            ..Self::new(config.undo_depth)
        }
    }

    /// Apply `command` and record it. Clears the redo stack.
    ///
    /// When the top entry is still open and accepts the command as a
    /// continuation, the two collapse into one entry. Returns true in that
    /// case.
    pub fn push(&mut self, cx: &EditContext, mut command: EditCommand) -> bool {
        command.redo(cx);
        self.redo.clear();

        if self.merge && self.open {
            if let Some(top) = self.undo.last_mut() {
                let id = top.compression_id();
                if id.is_some() && id == command.compression_id() && top.try_merge(&command) {
                    debug!(command = top.description(), "merged into previous edit");
                    return true;
                }
            }
        }

        self.undo.push(command);
        self.open = true;
        if self.undo.len() > self.max_depth {
            self.undo.remove(0);
        }
        false
    }

    /// Undo the most recent command. Returns false when there is none.
    pub fn undo(&mut self, cx: &EditContext) -> bool {
        let Some(mut cmd) = self.undo.pop() else {
            return false;
        };
        cmd.undo(cx);
        self.redo.push(cmd);
        self.open = false;
        true
    }

    /// Redo the most recently undone command. Returns false when there is
    /// none.
    pub fn redo(&mut self, cx: &EditContext) -> bool {
        let Some(mut cmd) = self.redo.pop() else {
            return false;
        };
        cmd.redo(cx);
        self.undo.push(cmd);
        self.open = false;
        true
    }

    /// Stop the top entry from absorbing further commands, e.g. at the end
    /// of a drag.
    pub fn seal(&mut self) {
        self.open = false;
    }

    /// Check if undo is available.
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    /// Check if redo is available.
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Description of the command `undo` would revert.
    pub fn undo_text(&self) -> Option<&'static str> {
        self.undo.last().map(EditCommand::description)
    }

    /// Description of the command `redo` would apply.
    pub fn redo_text(&self) -> Option<&'static str> {
        self.redo.last().map(EditCommand::description)
    }

    /// Clear all history.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
        self.open = false;
    }

    /// Number of undo steps available.
    pub fn undo_count(&self) -> usize {
        self.undo.len()
    }

    /// Number of redo steps available.
    pub fn redo_count(&self) -> usize {
        self.redo.len()
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::from_config(&EditorConfig::default())
    }
}

// ── Tests ───────────────────────────────────────────────────────
