//! Keyframed curves.
//!
//! A `Curve` owns an ordered set of keyframes with unique times and a clamp
//! policy fixed at creation. The keyframe vector sits behind a mutex so that
//! render or evaluation threads can take snapshots while the editing thread
//! writes; every write takes the `EditContext` token and holds the lock for a
//! single step only.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::context::EditContext;
use crate::error::{CurveError, Result};
use crate::interpolation;
use crate::keyframe::{Keyframe, KeyframeType, TangentSide, ValueClamp};

/// Unique identifier for a curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurveId(pub Uuid);

impl CurveId {
    /// Create a new random curve ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CurveId {
    fn default() -> Self {
        Self::new()
    }
}

/// An animation curve.
#[derive(Debug)]
pub struct Curve {
    id: CurveId,
    clamp: ValueClamp,
    /// Sorted by time, unique times.
    keys: Mutex<Vec<Keyframe>>,
}

impl Curve {
    /// Create an empty curve.
    pub fn new(clamp: ValueClamp) -> Self {
        Self {
            id: CurveId::new(),
            clamp,
            keys: Mutex::new(Vec::new()),
        }
    }

    /// Create a curve from arbitrary keyframes. Later duplicates of a time
    /// replace earlier ones; values are clamped and tangents derived.
    pub fn from_keyframes(clamp: ValueClamp, keyframes: impl IntoIterator<Item = Keyframe>) -> Self {
        let mut keys: Vec<Keyframe> = Vec::new();
        for mut key in keyframes {
            key.time = normalize_time(key.time);
            key.value = clamp.apply(key.value);
            match search(&keys, key.time) {
                Ok(idx) => keys[idx] = key,
                Err(pos) => keys.insert(pos, key),
            }
        }
        interpolation::refresh_tangents(&mut keys);
        Self {
            id: CurveId::new(),
            clamp,
            keys: Mutex::new(keys),
        }
    }

    /// Curve identity.
    #[inline]
    pub fn id(&self) -> CurveId {
        self.id
    }

    /// Clamp policy applied on every value write.
    #[inline]
    pub fn clamp(&self) -> ValueClamp {
        self.clamp
    }

    // ── Reads ───────────────────────────────────────────────────

    /// Snapshot of all keyframes, safe to call from any thread.
    pub fn keyframes(&self) -> Vec<Keyframe> {
        self.keys.lock().clone()
    }

    /// Number of keyframes.
    pub fn len(&self) -> usize {
        self.keys.lock().len()
    }

    /// Whether the curve has no keyframes.
    pub fn is_empty(&self) -> bool {
        self.keys.lock().is_empty()
    }

    /// Ordinal position of the keyframe at exactly `time`.
    pub fn index_of_time(&self, time: f64) -> Option<usize> {
        search(&self.keys.lock(), normalize_time(time)).ok()
    }

    /// Keyframe at an ordinal position.
    pub fn keyframe_at(&self, index: usize) -> Option<Keyframe> {
        self.keys.lock().get(index).copied()
    }

    /// Keyframe at exactly `time`.
    pub fn keyframe_at_time(&self, time: f64) -> Option<Keyframe> {
        let keys = self.keys.lock();
        search(&keys, normalize_time(time)).ok().map(|idx| keys[idx])
    }

    /// Evaluated value at `time`.
    pub fn value_at(&self, time: f64) -> f64 {
        interpolation::evaluate(&self.keys.lock(), time)
    }

    // ── Writes ──────────────────────────────────────────────────

    /// Move the keyframe at `index` to `(time, value)`.
    ///
    /// The value is clamped, the time kept as given. Returns the stored
    /// keyframe and its new ordinal position, which differs from `index`
    /// when the move crosses a neighbour.
    pub fn set_value_and_time_at(
        &self,
        _cx: &EditContext,
        time: f64,
        value: f64,
        index: usize,
    ) -> Result<(Keyframe, usize)> {
        check_finite(time, "time")?;
        check_finite(value, "value")?;
        let time = normalize_time(time);

        let mut keys = self.keys.lock();
        check_index(&keys, index)?;
        if let Ok(existing) = search(&keys, time) {
            if existing != index {
                return Err(CurveError::TimeCollision { time });
            }
        }

        let mut key = keys.remove(index);
        key.time = time;
        key.value = self.clamp.apply(value);
        let pos = search(&keys, time).unwrap_or_else(|pos| pos);
        keys.insert(pos, key);
        interpolation::refresh_tangents(&mut keys);
        Ok((keys[pos], pos))
    }

    /// Change the interpolation kind of the keyframe at `index`.
    ///
    /// Switching to `Free` or `Broken` keeps the current slopes; any other
    /// kind derives them from the neighbours.
    pub fn set_interpolation_at(
        &self,
        _cx: &EditContext,
        kind: KeyframeType,
        index: usize,
    ) -> Result<Keyframe> {
        let mut keys = self.keys.lock();
        check_index(&keys, index)?;
        keys[index].interpolation = kind;
        interpolation::refresh_tangents(&mut keys);
        Ok(keys[index])
    }

    /// Override both slopes of the keyframe at `index`.
    ///
    /// The interpolation kind is left alone; callers promote the keyframe to
    /// `Free` or `Broken` first when the slopes must survive later writes.
    pub fn set_derivatives_at(
        &self,
        _cx: &EditContext,
        left: f64,
        right: f64,
        index: usize,
    ) -> Result<Keyframe> {
        check_finite(left, "left derivative")?;
        check_finite(right, "right derivative")?;
        let mut keys = self.keys.lock();
        check_index(&keys, index)?;
        keys[index].left_derivative = left;
        keys[index].right_derivative = right;
        Ok(keys[index])
    }

    /// Override one slope of the keyframe at `index`.
    pub fn set_derivative_at(
        &self,
        _cx: &EditContext,
        side: TangentSide,
        slope: f64,
        index: usize,
    ) -> Result<Keyframe> {
        check_finite(slope, "derivative")?;
        let mut keys = self.keys.lock();
        check_index(&keys, index)?;
        match side {
            TangentSide::Left => keys[index].left_derivative = slope,
            TangentSide::Right => keys[index].right_derivative = slope,
        }
        Ok(keys[index])
    }

    /// Insert a keyframe, replacing any keyframe at the same time.
    /// Returns its ordinal position.
    pub fn add_keyframe(&self, _cx: &EditContext, keyframe: Keyframe) -> Result<usize> {
        check_finite(keyframe.time, "time")?;
        check_finite(keyframe.value, "value")?;
        let mut key = keyframe;
        key.time = normalize_time(key.time);
        key.value = self.clamp.apply(key.value);

        let mut keys = self.keys.lock();
        let pos = match search(&keys, key.time) {
            Ok(idx) => {
                keys[idx] = key;
                idx
            }
            Err(pos) => {
                keys.insert(pos, key);
                pos
            }
        };
        interpolation::refresh_tangents(&mut keys);
        Ok(pos)
    }

    /// Remove the keyframe at `index`.
    pub fn remove_keyframe_at(&self, _cx: &EditContext, index: usize) -> Result<Keyframe> {
        let mut keys = self.keys.lock();
        check_index(&keys, index)?;
        let removed = keys.remove(index);
        interpolation::refresh_tangents(&mut keys);
        Ok(removed)
    }

    /// Remove the keyframe at exactly `time`.
    pub fn remove_keyframe_at_time(&self, cx: &EditContext, time: f64) -> Result<Keyframe> {
        let index = self
            .index_of_time(time)
            .ok_or(CurveError::KeyframeNotFound { time })?;
        self.remove_keyframe_at(cx, index)
    }

    /// Replace the whole keyframe set with a snapshot taken from
    /// [`Curve::keyframes`]. The snapshot is stored verbatim.
    pub fn restore(&self, _cx: &EditContext, snapshot: &[Keyframe]) {
        debug_assert!(
            snapshot.windows(2).all(|w| w[0].time < w[1].time),
            "snapshot must be sorted with unique times"
        );
        *self.keys.lock() = snapshot.to_vec();
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys = self.keys.lock();
        write!(f, "Curve({} keyframes", keys.len())?;
        for key in keys.iter() {
            write!(f, ", {}", key)?;
        }
        write!(f, ")")
    }
}

// ── Helpers ──────────────────────────────────────────────────────

fn search(keys: &[Keyframe], time: f64) -> std::result::Result<usize, usize> {
    keys.binary_search_by(|k| k.time.total_cmp(&time))
}

/// Fold `-0.0` into `0.0` so that `total_cmp` treats them as one time.
#[inline]
fn normalize_time(time: f64) -> f64 {
    time + 0.0
}

fn check_index(keys: &[Keyframe], index: usize) -> Result<()> {
    if index < keys.len() {
        Ok(())
    } else {
        Err(CurveError::IndexOutOfRange {
            index,
            len: keys.len(),
        })
    }
}

fn check_finite(x: f64, what: &'static str) -> Result<()> {
    if x.is_finite() {
        Ok(())
    } else {
        Err(CurveError::NonFiniteInput(what))
    }
}

// ── Tests ───────────────────────────────────────────────────────
