//! Selected keyframes.
//!
//! A `KeyRef` is the editor's handle on one selected keyframe. Commands
//! share these handles with the selection and update the snapshot as they
//! move keys, so that the next interactive command finds each key at its
//! current time.

use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;

use curvekit_core::Keyframe;

use crate::binding::CurveBinding;
use crate::error::{EditError, EditResult};

/// A binding paired with the latest known state of one of its keyframes.
#[derive(Debug, Clone)]
pub struct SelectedKey {
    pub binding: CurveBinding,
    pub key: Keyframe,
}

/// Shared handle on a [`SelectedKey`]. Equality is handle identity.
#[derive(Clone)]
pub struct KeyRef(Rc<RefCell<SelectedKey>>);

/// Ordered selection.
pub type KeySelection = Vec<KeyRef>;

impl KeyRef {
    pub fn new(binding: CurveBinding, key: Keyframe) -> Self {
        Self(Rc::new(RefCell::new(SelectedKey { binding, key })))
    }

    /// Select the keyframe stored at `time` on `binding`.
    pub fn at_time(binding: CurveBinding, time: f64) -> EditResult<Self> {
        let key = binding
            .keyframe_at_time(time)?
            .ok_or(EditError::KeyframeNotFound { time })?;
        Ok(Self::new(binding, key))
    }

    /// Borrow the binding.
    pub fn binding(&self) -> Ref<'_, CurveBinding> {
        Ref::map(self.0.borrow(), |s| &s.binding)
    }

    /// Latest known keyframe state.
    pub fn key(&self) -> Keyframe {
        self.0.borrow().key
    }

    pub fn set_key(&self, key: Keyframe) {
        self.0.borrow_mut().key = key;
    }

    pub fn time(&self) -> f64 {
        self.0.borrow().key.time
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for KeyRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for KeyRef {}

impl fmt::Debug for KeyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.0.borrow();
        f.debug_struct("KeyRef")
            .field("curve", &s.binding.curve_id())
            .field("key", &s.key)
            .finish()
    }
}

/// Whether two selections hold the same handles in the same order.
pub fn same_keys(a: &[KeyRef], b: &[KeyRef]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.ptr_eq(y))
}

/// Stable sort by current time.
pub fn sort_by_time(keys: &mut [KeyRef]) {
    keys.sort_by(|a, b| a.time().total_cmp(&b.time()));
}

// ── Tests ───────────────────────────────────────────────────────
