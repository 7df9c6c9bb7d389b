//! Editing one tangent of one keyframe.

use std::fmt;
use std::rc::Rc;

use curvekit_core::{EditContext, Keyframe, KeyframeType, TangentSide};

use super::{skip_item, Direction};
use crate::batch::ChangeBatch;
use crate::error::{EditError, EditResult};
use crate::selection::KeyRef;
use crate::view::CurveView;

const NAME: &str = "move tangent";

/// Smallest handle offset along time. A left handle must sit before its
/// keyframe and a right handle after it.
pub const TANGENT_DX_EPSILON: f64 = 0.0001;

/// Set the slope of one side of a keyframe.
///
/// Depending on the keyframe's position and current kind, the edit either
/// moves both tangents together (the key becomes `Free`) or just the edited
/// side (the key becomes `Broken`).
pub struct MoveTangentCommand {
    key: KeyRef,
    side: TangentSide,
    /// State before the first edit; the undo target, also across merges.
    old: Keyframe,
    interpolation: KeyframeType,
    left: f64,
    right: f64,
    set_both: bool,
    update_on_first_redo: bool,
    applied_once: bool,
    view: Rc<dyn CurveView>,
}

impl MoveTangentCommand {
    /// Edit from a dragged handle, `(dx, dy)` away from the keyframe.
    pub fn from_offset(
        view: Rc<dyn CurveView>,
        side: TangentSide,
        key: KeyRef,
        dx: f64,
        dy: f64,
        update_on_first_redo: bool,
    ) -> EditResult<Self> {
        let dx = match side {
            TangentSide::Left if dx >= 0.0 => -TANGENT_DX_EPSILON,
            TangentSide::Right if dx <= 0.0 => TANGENT_DX_EPSILON,
            _ => dx,
        };
        let slope = dy / dx;

        let (old, at_boundary) = locate(&key)?;
        let set_both = if at_boundary {
            matches!(
                old.interpolation,
                KeyframeType::CatmullRom | KeyframeType::Cubic | KeyframeType::Free
            )
        } else {
            old.interpolation != KeyframeType::Broken
        };
        Ok(Self::build(view, side, key, old, slope, set_both, update_on_first_redo))
    }

    /// Edit with an explicit slope value.
    pub fn from_slope(
        view: Rc<dyn CurveView>,
        side: TangentSide,
        key: KeyRef,
        slope: f64,
    ) -> EditResult<Self> {
        let (old, _) = locate(&key)?;
        let set_both = old.interpolation != KeyframeType::Broken;
        Ok(Self::build(view, side, key, old, slope, set_both, true))
    }

    fn build(
        view: Rc<dyn CurveView>,
        side: TangentSide,
        key: KeyRef,
        old: Keyframe,
        slope: f64,
        set_both: bool,
        update_on_first_redo: bool,
    ) -> Self {
        let (interpolation, left, right) = if set_both {
            (KeyframeType::Free, slope, slope)
        } else {
            match side {
                TangentSide::Left => (KeyframeType::Broken, slope, old.right_derivative),
                TangentSide::Right => (KeyframeType::Broken, old.left_derivative, slope),
            }
        };
        Self {
            key,
            side,
            old,
            interpolation,
            left,
            right,
            set_both,
            update_on_first_redo,
            applied_once: false,
            view,
        }
    }

    pub fn side(&self) -> TangentSide {
        self.side
    }

    /// Whether the edit moves both tangents.
    pub fn sets_both(&self) -> bool {
        self.set_both
    }

    /// `(interpolation, left, right)` written on redo.
    pub fn target(&self) -> (KeyframeType, f64, f64) {
        (self.interpolation, self.left, self.right)
    }

    pub(crate) fn apply(&mut self, cx: &EditContext, direction: Direction) {
        {
            let binding = self.key.binding().clone();
            let mut batch = ChangeBatch::new(cx);
            if batch.add_binding(&binding) {
                if direction == Direction::Redo && !self.applied_once && !self.update_on_first_redo
                {
                    batch.suppress_notifications();
                }
                let (interpolation, left, right) = match direction {
                    Direction::Redo => (self.interpolation, self.left, self.right),
                    Direction::Undo => (
                        self.old.interpolation,
                        self.old.left_derivative,
                        self.old.right_derivative,
                    ),
                };
                let time = self.old.time;
                let result = binding
                    .set_interpolation(cx, time, interpolation)
                    .and_then(|_| binding.set_derivatives(cx, time, left, right));
                match result {
                    Ok(key) => self.key.set_key(key),
                    Err(err) => skip_item(NAME, time, &err),
                }
            }
        }
        if direction == Direction::Redo {
            self.applied_once = true;
        }
        self.view.refresh_displayed_tangents();
        self.view.refresh();
    }

    /// Adopt the result of a later edit of the same keyframe, keeping this
    /// command's undo baseline.
    pub(crate) fn try_merge(&mut self, other: &Self) -> bool {
        if !self.key.ptr_eq(&other.key) {
            return false;
        }
        self.side = other.side;
        self.interpolation = other.interpolation;
        self.left = other.left;
        self.right = other.right;
        self.set_both = other.set_both;
        true
    }
}

/// Current keyframe of `key` and whether it is the first or last of its
/// curve.
fn locate(key: &KeyRef) -> EditResult<(Keyframe, bool)> {
    let binding = key.binding();
    if binding.is_bezier() {
        return Err(EditError::Unsupported("tangent editing"));
    }
    let curve = binding.curve()?;
    let time = key.time();
    let index = curve
        .index_of_time(time)
        .ok_or(EditError::KeyframeNotFound { time })?;
    let old = curve
        .keyframe_at(index)
        .ok_or(EditError::KeyframeNotFound { time })?;
    Ok((old, index == 0 || index + 1 == curve.len()))
}

impl fmt::Debug for MoveTangentCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MoveTangentCommand")
            .field("key", &self.key)
            .field("side", &self.side)
            .field("old", &self.old)
            .field("interpolation", &self.interpolation)
            .field("left", &self.left)
            .field("right", &self.right)
            .finish_non_exhaustive()
    }
}

// ── Tests ───────────────────────────────────────────────────────
