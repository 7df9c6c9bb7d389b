//! Changing the interpolation of selected keyframes.

use std::fmt;
use std::rc::Rc;

use curvekit_core::{EditContext, Keyframe, KeyframeType};

use super::{skip_item, Direction};
use crate::batch::ChangeBatch;
use crate::error::EditError;
use crate::selection::KeyRef;
use crate::view::CurveView;

const NAME: &str = "set interpolation";

/// Give every selected keyframe the same interpolation kind.
///
/// Each key's previous kind is remembered individually, together with its
/// slopes when those were user-set, and put back on undo.
pub struct SetKeysInterpolationCommand {
    keys: Vec<KeyRef>,
    kind: KeyframeType,
    previous: Vec<Option<Keyframe>>,
    /// Whether the last application was a redo.
    applied: bool,
    view: Rc<dyn CurveView>,
}

impl SetKeysInterpolationCommand {
    pub fn new(view: Rc<dyn CurveView>, keys: Vec<KeyRef>, kind: KeyframeType) -> Self {
        let previous = vec![None; keys.len()];
        Self {
            keys,
            kind,
            previous,
            applied: false,
            view,
        }
    }

    pub fn kind(&self) -> KeyframeType {
        self.kind
    }

    pub(crate) fn apply(&mut self, cx: &EditContext, direction: Direction) {
        {
            let mut batch = ChangeBatch::new(cx);
            for key in &self.keys {
                batch.add_binding(&key.binding());
            }
            match direction {
                Direction::Redo => self.set(cx),
                Direction::Undo => self.restore(cx),
            }
        }
        self.view.refresh();
    }

    fn set(&mut self, cx: &EditContext) {
        // A redo following another redo keeps the baseline of the first.
        let capture = !self.applied;
        for (key, previous) in self.keys.iter().zip(&mut self.previous) {
            if capture {
                *previous = None;
            }
            let binding = key.binding().clone();
            let time = key.time();
            let current = match binding.keyframe_at_time(time) {
                Ok(Some(current)) => current,
                Ok(None) => {
                    skip_item(NAME, time, &EditError::KeyframeNotFound { time });
                    continue;
                }
                Err(err) => {
                    skip_item(NAME, time, &err);
                    continue;
                }
            };
            match binding.set_interpolation(cx, time, self.kind) {
                Ok(updated) => {
                    if capture {
                        *previous = Some(current);
                    }
                    key.set_key(updated);
                }
                Err(err) => skip_item(NAME, time, &err),
            }
        }
        self.applied = true;
    }

    fn restore(&mut self, cx: &EditContext) {
        if !self.applied {
            return;
        }
        for (key, previous) in self.keys.iter().zip(&self.previous).rev() {
            let Some(previous) = previous else {
                continue;
            };
            let binding = key.binding().clone();
            let mut result = binding.set_interpolation(cx, previous.time, previous.interpolation);
            if previous.interpolation.has_user_tangents() {
                result = result.and_then(|_| {
                    binding.set_derivatives(
                        cx,
                        previous.time,
                        previous.left_derivative,
                        previous.right_derivative,
                    )
                });
            }
            match result {
                Ok(restored) => key.set_key(restored),
                Err(err) => skip_item(NAME, previous.time, &err),
            }
        }
        self.applied = false;
    }
}

impl fmt::Debug for SetKeysInterpolationCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetKeysInterpolationCommand")
            .field("keys", &self.keys)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

// ── Tests ───────────────────────────────────────────────────────
