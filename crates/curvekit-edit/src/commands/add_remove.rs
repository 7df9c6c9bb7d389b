//! Adding and removing keyframes.
//!
//! Both commands run the same toggle routine; adding is removing run
//! backwards. Each entry remembers what the toggle displaced, so undo puts
//! back the exact keyframe that was there before. Toggling an entry twice in
//! the same direction leaves it alone.

use std::fmt;
use std::rc::Rc;

use curvekit_core::{EditContext, Keyframe};
use smallvec::SmallVec;

use super::{skip_item, Direction};
use crate::batch::ChangeBatch;
use crate::binding::{CurveBinding, KeySnapshot, StateOwner};
use crate::error::EditResult;
use crate::view::CurveView;

#[derive(Debug)]
enum EntryState {
    /// The curve is as it was before the command first ran.
    Untouched,
    /// The entry's keyframe is in place; `replaced` is what it overwrote.
    Inserted { replaced: Option<KeySnapshot> },
    /// The keyframe was taken out. `inserted` is set when it was the one
    /// this entry had put in.
    Removed { snapshot: KeySnapshot, inserted: bool },
}

#[derive(Debug)]
struct KeyEntry {
    binding: CurveBinding,
    key: Keyframe,
    state: EntryState,
}

impl KeyEntry {
    /// Put the keyframe in. Does nothing when it is already in.
    fn insert(&mut self, cx: &EditContext) -> EditResult<()> {
        let next = match &self.state {
            EntryState::Inserted { .. } => return Ok(()),
            EntryState::Removed { snapshot, inserted } => {
                self.binding.restore_key(cx, snapshot)?;
                if *inserted {
                    EntryState::Inserted { replaced: None }
                } else {
                    EntryState::Untouched
                }
            }
            EntryState::Untouched => {
                let replaced = self.binding.capture_key(self.key.time)?;
                self.binding.insert_key(cx, &self.key)?;
                EntryState::Inserted { replaced }
            }
        };
        self.state = next;
        Ok(())
    }

    /// Take the keyframe out. Does nothing when it is already out.
    fn remove(&mut self, cx: &EditContext) -> EditResult<()> {
        let next = match &self.state {
            EntryState::Removed { .. } => return Ok(()),
            EntryState::Inserted {
                replaced: Some(snapshot),
            } => {
                self.binding.restore_key(cx, snapshot)?;
                EntryState::Untouched
            }
            EntryState::Inserted { replaced: None } => EntryState::Removed {
                snapshot: self.binding.remove_key(cx, self.key.time)?,
                inserted: true,
            },
            EntryState::Untouched => EntryState::Removed {
                snapshot: self.binding.remove_key(cx, self.key.time)?,
                inserted: false,
            },
        };
        self.state = next;
        Ok(())
    }
}

struct ToggleKeys {
    entries: Vec<KeyEntry>,
    view: Rc<dyn CurveView>,
}

impl ToggleKeys {
    fn new(view: Rc<dyn CurveView>, keys: impl IntoIterator<Item = (CurveBinding, Keyframe)>) -> Self {
        // A shape keyframe spans every coordinate curve of the shape, so it
        // is toggled once per time.
        let mut shape_times: SmallVec<[(StateOwner, f64); 8]> = SmallVec::new();
        let mut entries = Vec::new();
        for (binding, key) in keys {
            if binding.is_bezier() {
                let slot = (binding.state_owner(), key.time);
                if shape_times.contains(&slot) {
                    continue;
                }
                shape_times.push(slot);
            }
            entries.push(KeyEntry {
                binding,
                key,
                state: EntryState::Untouched,
            });
        }
        Self { entries, view }
    }

    fn toggle(&mut self, cx: &EditContext, insert: bool, direction: Direction, name: &'static str) {
        {
            let mut batch = ChangeBatch::new(cx);
            let count = self.entries.len();
            // Undo walks the entries backwards.
            let order: Vec<usize> = match direction {
                Direction::Redo => (0..count).collect(),
                Direction::Undo => (0..count).rev().collect(),
            };
            for i in order {
                let entry = &mut self.entries[i];
                if !batch.add_binding(&entry.binding) {
                    continue;
                }
                let result = if insert {
                    entry.insert(cx)
                } else {
                    entry.remove(cx)
                };
                if let Err(err) = result {
                    skip_item(name, entry.key.time, &err);
                }
            }
        }
        self.view.refresh();
    }
}

impl fmt::Debug for ToggleKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToggleKeys")
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}

/// Create keyframes at the given times.
#[derive(Debug)]
pub struct AddKeysCommand {
    keys: ToggleKeys,
}

impl AddKeysCommand {
    pub fn new(
        view: Rc<dyn CurveView>,
        keys: impl IntoIterator<Item = (CurveBinding, Keyframe)>,
    ) -> Self {
        Self {
            keys: ToggleKeys::new(view, keys),
        }
    }

    pub fn len(&self) -> usize {
        self.keys.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.entries.is_empty()
    }

    pub(crate) fn apply(&mut self, cx: &EditContext, direction: Direction) {
        self.keys
            .toggle(cx, direction == Direction::Redo, direction, "add keys");
    }
}

/// Delete the keyframes at the given times.
#[derive(Debug)]
pub struct RemoveKeysCommand {
    keys: ToggleKeys,
}

impl RemoveKeysCommand {
    pub fn new(
        view: Rc<dyn CurveView>,
        keys: impl IntoIterator<Item = (CurveBinding, Keyframe)>,
    ) -> Self {
        Self {
            keys: ToggleKeys::new(view, keys),
        }
    }

    pub fn len(&self) -> usize {
        self.keys.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.entries.is_empty()
    }

    pub(crate) fn apply(&mut self, cx: &EditContext, direction: Direction) {
        self.keys
            .toggle(cx, direction == Direction::Undo, direction, "remove keys");
    }
}

// ── Tests ───────────────────────────────────────────────────────
