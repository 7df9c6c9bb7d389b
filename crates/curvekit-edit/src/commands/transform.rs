//! Affine transforms of keyframe selections.
//!
//! The first redo records the full state of every curve (or shape) the
//! selection touches, transforms the keys, then records the result. Later
//! redos and undos just swap the recorded states back in.

use std::fmt;
use std::rc::Rc;

use curvekit_core::{EditContext, KeyTransform, Keyframe};
use glam::DVec2;
use smallvec::SmallVec;
use tracing::warn;

use super::{skip_item, Direction, ShapeMoves};
use crate::batch::ChangeBatch;
use crate::binding::{CapturedState, CurveBinding, StateOwner};
use crate::selection::{same_keys, sort_by_time, KeyRef};
use crate::view::CurveView;

const NAME: &str = "transform keys";

#[derive(Debug)]
struct OwnerState {
    binding: CurveBinding,
    owner: StateOwner,
    before: CapturedState,
    after: Option<CapturedState>,
}

/// Map every selected keyframe's `(time, value)` through an affine transform.
pub struct TransformKeysCommand {
    keys: Vec<KeyRef>,
    transform: KeyTransform,
    states: Option<Vec<OwnerState>>,
    key_before: Vec<Keyframe>,
    key_after: Option<Vec<Keyframe>>,
    update_on_first_redo: bool,
    applied_once: bool,
    view: Rc<dyn CurveView>,
}

impl TransformKeysCommand {
    /// Translate by `translation`, then scale by `scale` about `pivot`.
    pub fn new(
        view: Rc<dyn CurveView>,
        keys: Vec<KeyRef>,
        translation: DVec2,
        scale: DVec2,
        pivot: DVec2,
        update_on_first_redo: bool,
    ) -> Self {
        let transform = KeyTransform::canonical(translation, scale, pivot);
        Self::with_transform(view, keys, transform, update_on_first_redo)
    }

    pub fn with_transform(
        view: Rc<dyn CurveView>,
        mut keys: Vec<KeyRef>,
        transform: KeyTransform,
        update_on_first_redo: bool,
    ) -> Self {
        sort_by_time(&mut keys);
        Self {
            keys,
            transform,
            states: None,
            key_before: Vec::new(),
            key_after: None,
            update_on_first_redo,
            applied_once: false,
            view,
        }
    }

    /// The (possibly composed) transform.
    pub fn transform(&self) -> &KeyTransform {
        &self.transform
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
                Direction::Redo => self.forward(cx),
                Direction::Undo => self.backward(cx),
            }
        }
        if direction == Direction::Redo {
            self.applied_once = true;
        }
        self.view.refresh_selected_keys();
        self.view.refresh();
    }

    fn forward(&mut self, cx: &EditContext) {
        let first = self.states.is_none();
        if first {
            self.key_before = self.keys.iter().map(KeyRef::key).collect();
            self.states = Some(capture_states(&self.keys));
        }
        let Some(states) = self.states.as_mut() else {
            return;
        };

        if let Some(key_after) = &self.key_after {
            if states.iter().all(|s| s.after.is_some()) {
                for state in states.iter() {
                    if let Some(after) = &state.after {
                        restore(cx, &state.binding, after);
                    }
                }
                for (key, after) in self.keys.iter().zip(key_after) {
                    key.set_key(*after);
                }
                return;
            }
        }

        if !first {
            for state in states.iter() {
                restore(cx, &state.binding, &state.before);
            }
            for (key, before) in self.keys.iter().zip(&self.key_before) {
                key.set_key(*before);
            }
        }

        transform_keys(cx, &self.keys, &self.key_before, &self.transform);

        for state in states.iter_mut() {
            state.after = state.binding.capture_state().ok();
        }
        self.key_after = Some(self.keys.iter().map(KeyRef::key).collect());
    }

    fn backward(&mut self, cx: &EditContext) {
        let Some(states) = &self.states else {
            return;
        };
        for state in states {
            restore(cx, &state.binding, &state.before);
        }
        for (key, before) in self.keys.iter().zip(&self.key_before) {
            key.set_key(*before);
        }
    }

    /// Compose a continuation over the identical selection: the result is
    /// `other` applied after `self`.
    pub(crate) fn try_merge(&mut self, other: &Self) -> bool {
        if !same_keys(&self.keys, &other.keys) {
            return false;
        }
        self.transform = self.transform.then(&other.transform);
        if let Some(mine) = self.states.as_mut() {
            match (&other.states, &other.key_after) {
                (Some(theirs), Some(key_after)) => {
                    for state in mine.iter_mut() {
                        state.after = theirs
                            .iter()
                            .find(|t| t.owner == state.owner)
                            .and_then(|t| t.after.clone());
                    }
                    self.key_after = Some(key_after.clone());
                }
                _ => {
                    for state in mine.iter_mut() {
                        state.after = None;
                    }
                    self.key_after = None;
                }
            }
        }
        true
    }
}

/// One entry per distinct state owner touched by `keys`.
fn capture_states(keys: &[KeyRef]) -> Vec<OwnerState> {
    let mut states: Vec<OwnerState> = Vec::new();
    for key in keys {
        let binding = key.binding().clone();
        let owner = binding.state_owner();
        if states.iter().any(|s| s.owner == owner) {
            continue;
        }
        match binding.capture_state() {
            Ok(before) => states.push(OwnerState {
                binding,
                owner,
                before,
                after: None,
            }),
            Err(err) => warn!(command = NAME, %err, "not recording curve state"),
        }
    }
    states
}

fn restore(cx: &EditContext, binding: &CurveBinding, state: &CapturedState) {
    if let Err(err) = binding.restore_state(cx, state) {
        warn!(command = NAME, %err, "could not restore curve state");
    }
}

/// Transform each key from its `before` position. Keys moving later in time
/// go first, latest first, then the others, earliest first. A transform that
/// reverses the order of keys on one curve is staged instead.
fn transform_keys(cx: &EditContext, keys: &[KeyRef], before: &[Keyframe], transform: &KeyTransform) {
    let target_time = |i: usize| transform.apply(before[i].time, before[i].value).0;
    if reverses_order(keys, before, target_time) {
        staged_transform(cx, keys, before, transform);
        return;
    }
    let mut later: Vec<usize> = (0..keys.len())
        .filter(|&i| target_time(i) > before[i].time)
        .collect();
    let mut rest: Vec<usize> = (0..keys.len())
        .filter(|&i| target_time(i) <= before[i].time)
        .collect();
    later.sort_by(|&a, &b| before[b].time.total_cmp(&before[a].time));
    rest.sort_by(|&a, &b| before[a].time.total_cmp(&before[b].time));

    let mut moves = ShapeMoves::default();
    for i in later.into_iter().chain(rest) {
        let key = &keys[i];
        let from = before[i];
        let binding = key.binding().clone();
        let result = moves.relocate(&binding, from.time, target_time(i), || {
            binding.transform_key(cx, &from, transform)
        });
        match result {
            Ok(moved) => key.set_key(moved),
            Err(err) => skip_item(NAME, from.time, &err),
        }
    }
}

/// Whether two keys of one state owner swap places in time.
fn reverses_order(keys: &[KeyRef], before: &[Keyframe], target_time: impl Fn(usize) -> f64) -> bool {
    let mut order: Vec<usize> = (0..keys.len()).collect();
    order.sort_by(|&a, &b| before[a].time.total_cmp(&before[b].time));
    let mut last: SmallVec<[(StateOwner, f64, f64); 4]> = SmallVec::new();
    for i in order {
        let owner = keys[i].binding().state_owner();
        let (from, to) = (before[i].time, target_time(i));
        let seen = last.iter().position(|entry| entry.0 == owner);
        match seen {
            Some(j) => {
                let (_, prev_from, prev_to) = last[j];
                if from > prev_from && to <= prev_to {
                    return true;
                }
                last[j] = (owner, from, to);
            }
            None => last.push((owner, from, to)),
        }
    }
    false
}

/// Park every key past all keys and targets, then move each parked key to
/// its target. A key that cannot reach its target goes back to `before`.
fn staged_transform(cx: &EditContext, keys: &[KeyRef], before: &[Keyframe], transform: &KeyTransform) {
    let targets: Vec<(f64, f64)> = before.iter().map(|k| transform.apply(k.time, k.value)).collect();
    let lowest = before.iter().map(|k| k.time).fold(f64::INFINITY, f64::min);
    let mut highest = targets.iter().map(|t| t.0).fold(f64::NEG_INFINITY, f64::max);
    for key in keys {
        if let Some(last) = key.binding().curve().ok().and_then(|c| c.keyframes().last().copied()) {
            highest = highest.max(last.time);
        }
    }
    let base = highest.ceil() + 1.0;
    let park = |i: usize| base + (before[i].time - lowest);

    let mut order: Vec<usize> = (0..keys.len()).collect();
    order.sort_by(|&a, &b| before[b].time.total_cmp(&before[a].time));

    let mut parked: Vec<Option<Keyframe>> = vec![None; keys.len()];
    let mut moves = ShapeMoves::default();
    for &i in &order {
        let key = &keys[i];
        let from = before[i];
        let binding = key.binding().clone();
        let result = moves.relocate(&binding, from.time, park(i), || {
            binding.move_key_to(cx, &from, park(i), from.value)
        });
        match result {
            Ok(moved) => {
                key.set_key(moved);
                parked[i] = Some(moved);
            }
            Err(err) => skip_item(NAME, from.time, &err),
        }
    }

    let mut moves = ShapeMoves::default();
    let mut returns = ShapeMoves::default();
    for &i in order.iter().rev() {
        let Some(current) = parked[i] else {
            continue;
        };
        let key = &keys[i];
        let binding = key.binding().clone();
        let (time, value) = targets[i];
        let result = moves.relocate(&binding, current.time, time, || {
            binding.move_key_to(cx, &current, time, value)
        });
        let result = match result {
            Ok(moved) => Ok(moved),
            Err(err) => {
                skip_item(NAME, before[i].time, &err);
                let home = before[i];
                returns.relocate(&binding, current.time, home.time, || {
                    binding.move_key_to(cx, &current, home.time, home.value)
                })
            }
        };
        match result {
            Ok(moved) => key.set_key(moved),
            Err(err) => warn!(command = NAME, time = current.time, %err, "keyframe left parked"),
        }
    }
}

impl fmt::Debug for TransformKeysCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformKeysCommand")
            .field("keys", &self.keys)
            .field("transform", &self.transform)
            .field("states", &self.states)
            .finish_non_exhaustive()
    }
}

// ── Tests ───────────────────────────────────────────────────────
