//! Undoable curve edits.
//!
//! Every edit is one variant of [`EditCommand`]. A command is applied
//! forward with `redo` and backward with `undo`; both may run any number of
//! times. Undo never re-derives the previous state: it puts back what the
//! command captured before editing.
//!
//! Per-key failures never abort a command. The item is skipped with a
//! warning and the rest of the selection is processed.

mod add_remove;
mod interpolation;
mod move_keys;
mod tangent;
mod transform;

use std::fmt;

use curvekit_core::{EditContext, Keyframe};
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::bezier::round_time;
use crate::binding::{CurveBinding, StateOwner};
use crate::error::{EditError, EditResult};

pub use add_remove::{AddKeysCommand, RemoveKeysCommand};
pub use interpolation::SetKeysInterpolationCommand;
pub use move_keys::MoveKeysCommand;
pub use tangent::{MoveTangentCommand, TANGENT_DX_EPSILON};
pub use transform::TransformKeysCommand;

/// Which way a command is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Redo,
    Undo,
}

/// Merge key. Two commands can only merge when their ids are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompressionId {
    MoveKeys,
    MoveTangent,
    TransformKeys,
}

/// A reversible curve edit.
pub enum EditCommand {
    AddKeys(AddKeysCommand),
    RemoveKeys(RemoveKeysCommand),
    MoveKeys(MoveKeysCommand),
    SetInterpolation(SetKeysInterpolationCommand),
    MoveTangent(MoveTangentCommand),
    TransformKeys(TransformKeysCommand),
}

impl EditCommand {
    /// Apply the command in `direction`.
    pub fn apply(&mut self, cx: &EditContext, direction: Direction) {
        debug!(command = self.description(), ?direction, "applying");
        match self {
            Self::AddKeys(cmd) => cmd.apply(cx, direction),
            Self::RemoveKeys(cmd) => cmd.apply(cx, direction),
            Self::MoveKeys(cmd) => cmd.apply(cx, direction),
            Self::SetInterpolation(cmd) => cmd.apply(cx, direction),
            Self::MoveTangent(cmd) => cmd.apply(cx, direction),
            Self::TransformKeys(cmd) => cmd.apply(cx, direction),
        }
    }

    pub fn redo(&mut self, cx: &EditContext) {
        self.apply(cx, Direction::Redo);
    }

    pub fn undo(&mut self, cx: &EditContext) {
        self.apply(cx, Direction::Undo);
    }

    /// Absorb `other`, an already applied continuation of this command.
    /// Returns false, leaving `self` untouched, when the two cannot merge.
    pub fn try_merge(&mut self, other: &EditCommand) -> bool {
        match (self, other) {
            (Self::MoveKeys(a), Self::MoveKeys(b)) => a.try_merge(b),
            (Self::MoveTangent(a), Self::MoveTangent(b)) => a.try_merge(b),
            (Self::TransformKeys(a), Self::TransformKeys(b)) => a.try_merge(b),
            _ => false,
        }
    }

    /// Merge key, or `None` for commands that never merge.
    pub fn compression_id(&self) -> Option<CompressionId> {
        match self {
            Self::MoveKeys(_) => Some(CompressionId::MoveKeys),
            Self::MoveTangent(_) => Some(CompressionId::MoveTangent),
            Self::TransformKeys(_) => Some(CompressionId::TransformKeys),
            Self::AddKeys(_) | Self::RemoveKeys(_) | Self::SetInterpolation(_) => None,
        }
    }

    /// Text shown in the undo history.
    pub fn description(&self) -> &'static str {
        match self {
            Self::AddKeys(_) => "Add multiple keyframes",
            Self::RemoveKeys(_) => "Remove multiple keyframes",
            Self::MoveKeys(_) => "Move multiple keys",
            Self::SetInterpolation(_) => "Set multiple keys interpolation",
            Self::MoveTangent(_) => "Move keyframe slope",
            Self::TransformKeys(_) => "Transform keyframes",
        }
    }
}

impl fmt::Debug for EditCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AddKeys(cmd) => f.debug_tuple("AddKeys").field(cmd).finish(),
            Self::RemoveKeys(cmd) => f.debug_tuple("RemoveKeys").field(cmd).finish(),
            Self::MoveKeys(cmd) => f.debug_tuple("MoveKeys").field(cmd).finish(),
            Self::SetInterpolation(cmd) => f.debug_tuple("SetInterpolation").field(cmd).finish(),
            Self::MoveTangent(cmd) => f.debug_tuple("MoveTangent").field(cmd).finish(),
            Self::TransformKeys(cmd) => f.debug_tuple("TransformKeys").field(cmd).finish(),
        }
    }
}

impl From<AddKeysCommand> for EditCommand {
    fn from(cmd: AddKeysCommand) -> Self {
        Self::AddKeys(cmd)
    }
}

impl From<RemoveKeysCommand> for EditCommand {
    fn from(cmd: RemoveKeysCommand) -> Self {
        Self::RemoveKeys(cmd)
    }
}

impl From<MoveKeysCommand> for EditCommand {
    fn from(cmd: MoveKeysCommand) -> Self {
        Self::MoveKeys(cmd)
    }
}

impl From<SetKeysInterpolationCommand> for EditCommand {
    fn from(cmd: SetKeysInterpolationCommand) -> Self {
        Self::SetInterpolation(cmd)
    }
}

impl From<MoveTangentCommand> for EditCommand {
    fn from(cmd: MoveTangentCommand) -> Self {
        Self::MoveTangent(cmd)
    }
}

impl From<TransformKeysCommand> for EditCommand {
    fn from(cmd: TransformKeysCommand) -> Self {
        Self::TransformKeys(cmd)
    }
}

/// Log a skipped item. Contract violations also trip a debug assertion.
pub(crate) fn skip_item(command: &'static str, time: f64, err: &EditError) {
    debug_assert!(!err.is_contract_violation(), "{command}: {err}");
    warn!(command, time, %err, "skipping keyframe");
}

/// Indices in the order keys must be processed so that a key shifted by
/// `dt` never lands on a neighbour that has not moved yet.
pub(crate) fn shift_order(len: usize, dt: f64) -> Vec<usize> {
    if dt > 0.0 {
        (0..len).rev().collect()
    } else {
        (0..len).collect()
    }
}

/// Shape keyframes already moved during one pass.
///
/// Every coordinate binding of a shape shares the shape's keyframes, so only
/// the first selected coordinate moves the keyframe. The others just pick
/// up their keyframe at the new time.
#[derive(Debug, Default)]
pub(crate) struct ShapeMoves(SmallVec<[(StateOwner, f64); 4]>);

impl ShapeMoves {
    /// Run `relocate` unless the shape keyframe at `from` was already moved
    /// to `to` in this pass.
    pub(crate) fn relocate(
        &mut self,
        binding: &CurveBinding,
        from: f64,
        to: f64,
        relocate: impl FnOnce() -> EditResult<Keyframe>,
    ) -> EditResult<Keyframe> {
        if !binding.is_bezier() {
            return relocate();
        }
        let slot = (binding.state_owner(), from);
        if self.0.contains(&slot) {
            let time = round_time(to);
            return binding
                .keyframe_at_time(time)?
                .ok_or(EditError::KeyframeNotFound { time });
        }
        let key = relocate()?;
        self.0.push(slot);
        Ok(key)
    }
}

// ── Tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shift_order() {
        assert_eq!(shift_order(3, 1.0), vec![2, 1, 0]);
        assert_eq!(shift_order(3, 0.0), vec![0, 1, 2]);
        assert_eq!(shift_order(3, -2.0), vec![0, 1, 2]);
    }
}
