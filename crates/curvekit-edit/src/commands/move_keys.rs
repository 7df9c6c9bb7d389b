//! Shifting a selection of keyframes in time and value.

use std::fmt;
use std::rc::Rc;

use curvekit_core::{EditContext, Keyframe};
use tracing::warn;

use super::{shift_order, skip_item, Direction, ShapeMoves};
use crate::batch::ChangeBatch;
use crate::selection::{same_keys, sort_by_time, KeyRef};
use crate::view::CurveView;

const NAME: &str = "move keys";

/// Move every selected keyframe by `(dt, dv)`.
///
/// The keyframes' positions are recorded on the first redo; undo moves each
/// one back to its recorded position.
pub struct MoveKeysCommand {
    keys: Vec<KeyRef>,
    dt: f64,
    dv: f64,
    origins: Option<Vec<Option<Keyframe>>>,
    update_on_first_redo: bool,
    applied_once: bool,
    view: Rc<dyn CurveView>,
}

impl MoveKeysCommand {
    pub fn new(
        view: Rc<dyn CurveView>,
        mut keys: Vec<KeyRef>,
        dt: f64,
        dv: f64,
        update_on_first_redo: bool,
    ) -> Self {
        sort_by_time(&mut keys);
        Self {
            keys,
            dt,
            dv,
            origins: None,
            update_on_first_redo,
            applied_once: false,
            view,
        }
    }

    /// Accumulated `(dt, dv)`.
    pub fn delta(&self) -> (f64, f64) {
        (self.dt, self.dv)
    }

    pub fn keys(&self) -> &[KeyRef] {
        &self.keys
    }

    pub(crate) fn apply(&mut self, cx: &EditContext, direction: Direction) {
        {
            let mut batch = ChangeBatch::new(cx);
            for key in &self.keys {
                batch.add_binding(&key.binding());
            }
            if direction == Direction::Redo && !self.applied_once && !self.update_on_first_redo {
                batch.suppress_notifications();
            }
            match direction {
                Direction::Redo => self.shift(cx),
                Direction::Undo => self.restore(cx),
            }
        }
        if direction == Direction::Redo {
            self.applied_once = true;
        }
        self.view.refresh_selected_keys();
        self.view.refresh();
    }

    fn shift(&mut self, cx: &EditContext) {
        let origins = self.origins.get_or_insert_with(|| {
            self.keys
                .iter()
                .map(|key| key.binding().keyframe_at_time(key.time()).ok().flatten())
                .collect()
        });
        let mut moves = ShapeMoves::default();
        for i in shift_order(self.keys.len(), self.dt) {
            let key = &self.keys[i];
            let Some(origin) = origins[i] else {
                warn!(command = NAME, time = key.time(), "keyframe vanished before first move");
                continue;
            };
            let binding = key.binding().clone();
            let (time, value) = (origin.time + self.dt, origin.value + self.dv);
            let result = moves.relocate(&binding, origin.time, time, || {
                binding.move_key_to(cx, &origin, time, value)
            });
            match result {
                Ok(moved) => key.set_key(moved),
                Err(err) => skip_item(NAME, origin.time, &err),
            }
        }
    }

    fn restore(&mut self, cx: &EditContext) {
        let Some(origins) = &self.origins else {
            return;
        };
        let mut moves = ShapeMoves::default();
        for i in shift_order(self.keys.len(), -self.dt) {
            let key = &self.keys[i];
            let Some(origin) = origins[i] else {
                continue;
            };
            let binding = key.binding().clone();
            let current = key.key();
            let result = moves.relocate(&binding, current.time, origin.time, || {
                binding.move_key_to(cx, &current, origin.time, origin.value)
            });
            match result {
                Ok(moved) => key.set_key(moved),
                Err(err) => skip_item(NAME, current.time, &err),
            }
        }
    }

    /// Sum the deltas of a continuation over the identical selection.
    pub(crate) fn try_merge(&mut self, other: &Self) -> bool {
        if !same_keys(&self.keys, &other.keys) {
            return false;
        }
        self.dt += other.dt;
        self.dv += other.dv;
        true
    }
}

impl fmt::Debug for MoveKeysCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MoveKeysCommand")
            .field("keys", &self.keys)
            .field("dt", &self.dt)
            .field("dv", &self.dv)
            .field("applied_once", &self.applied_once)
            .finish_non_exhaustive()
    }
}

// ── Tests ───────────────────────────────────────────────────────
