//! Animated parameters.
//!
//! An `AnimatedParam` owns one curve per dimension. Its per-time operations
//! are the interface the curve editor uses for plain parameters; each write
//! notifies the owning holder so that dependents recompute.

use std::sync::Arc;

use curvekit_core::{
    Curve, EditContext, KeyTransform, Keyframe, KeyframeType, TangentSide, ValueClamp,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EditError, EditResult};
use crate::holder::{ParamHolder, RotoContext};

/// Unique identifier for a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParamId(pub Uuid);

/// Value type of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamKind {
    Double,
    Int,
    Bool,
    /// Keyframe values are indices into the parameter's string table.
    String,
}

impl ParamKind {
    /// Clamp policy of the curves of this kind.
    pub fn clamp(self) -> ValueClamp {
        match self {
            Self::Double => ValueClamp::Unclamped,
            Self::Int | Self::String => ValueClamp::Integer,
            Self::Bool => ValueClamp::Boolean,
        }
    }

    /// Interpolation given to keyframes created by the editor.
    pub fn default_interpolation(self) -> KeyframeType {
        match self {
            Self::Double => KeyframeType::Smooth,
            Self::Int | Self::Bool | Self::String => KeyframeType::Constant,
        }
    }
}

/// Who gets told when the parameter changes.
#[derive(Debug, Clone)]
pub enum ParamOwner {
    /// A regular node parameter.
    Holder(Arc<ParamHolder>),
    /// A parameter of a roto item, with no widget of its own. Changes are
    /// pushed to the context with `evaluate_change`.
    Roto(Arc<RotoContext>),
    /// Not attached to anything.
    Detached,
}

/// A keyframable parameter with one curve per dimension.
#[derive(Debug)]
pub struct AnimatedParam {
    id: ParamId,
    name: String,
    kind: ParamKind,
    curves: Vec<Arc<Curve>>,
    owner: ParamOwner,
    strings: Vec<String>,
}

impl AnimatedParam {
    /// Create a parameter with `dimensions` empty curves.
    pub fn new(
        name: impl Into<String>,
        kind: ParamKind,
        dimensions: usize,
        owner: ParamOwner,
    ) -> Self {
        let curves = (0..dimensions)
            .map(|_| Arc::new(Curve::new(kind.clamp())))
            .collect();
        Self {
            id: ParamId(Uuid::new_v4()),
            name: name.into(),
            kind,
            curves,
            owner,
            strings: Vec::new(),
        }
    }

    /// Set the string table used by `ParamKind::String` parameters.
    pub fn with_strings(mut self, strings: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.strings = strings.into_iter().map(Into::into).collect();
        self
    }

    pub fn id(&self) -> ParamId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ParamKind {
        self.kind
    }

    pub fn owner(&self) -> &ParamOwner {
        &self.owner
    }

    /// Number of dimensions.
    pub fn dimensions(&self) -> usize {
        self.curves.len()
    }

    /// Curve of a dimension.
    pub fn curve(&self, dimension: usize) -> EditResult<&Arc<Curve>> {
        self.curves
            .get(dimension)
            .ok_or(EditError::DimensionOutOfRange {
                dimension,
                count: self.curves.len(),
            })
    }

    // ── Reads ───────────────────────────────────────────────────

    /// Evaluated value of a dimension at `time`.
    pub fn value_at_time(&self, time: f64, dimension: usize) -> EditResult<f64> {
        Ok(self.curve(dimension)?.value_at(time))
    }

    /// String shown at `time` for `ParamKind::String` parameters.
    pub fn string_at_time(&self, time: f64, dimension: usize) -> EditResult<Option<&str>> {
        let index = self.value_at_time(time, dimension)?;
        if index < 0.0 {
            return Ok(None);
        }
        Ok(self.strings.get(index as usize).map(String::as_str))
    }

    // ── Writes ──────────────────────────────────────────────────

    /// Key `value` at `time`, creating the keyframe if needed.
    pub fn set_value_at_time(
        &self,
        cx: &EditContext,
        time: f64,
        value: f64,
        dimension: usize,
    ) -> EditResult<Keyframe> {
        let curve = self.curve(dimension)?;
        let key = match curve.index_of_time(time) {
            Some(index) => curve.set_value_and_time_at(cx, time, value, index)?.0,
            None => {
                let key =
                    Keyframe::with_interpolation(time, value, self.kind.default_interpolation());
                let index = curve.add_keyframe(cx, key)?;
                keyframe_at(curve, index)?
            }
        };
        self.value_changed(cx);
        Ok(key)
    }

    /// Store a keyframe exactly as given, replacing any keyframe at its time.
    pub fn set_keyframe(
        &self,
        cx: &EditContext,
        keyframe: Keyframe,
        dimension: usize,
    ) -> EditResult<Keyframe> {
        let curve = self.curve(dimension)?;
        let index = curve.add_keyframe(cx, keyframe)?;
        let key = keyframe_at(curve, index)?;
        self.value_changed(cx);
        Ok(key)
    }

    /// Delete the keyframe at `time`.
    pub fn delete_value_at_time(
        &self,
        cx: &EditContext,
        time: f64,
        dimension: usize,
    ) -> EditResult<Keyframe> {
        let removed = self.curve(dimension)?.remove_keyframe_at_time(cx, time)?;
        self.value_changed(cx);
        Ok(removed)
    }

    /// Shift the keyframe at `time` by `(dt, dv)`.
    pub fn move_value_at_time(
        &self,
        cx: &EditContext,
        time: f64,
        dimension: usize,
        dt: f64,
        dv: f64,
    ) -> EditResult<Keyframe> {
        let key = self
            .curve(dimension)?
            .keyframe_at_time(time)
            .ok_or(EditError::KeyframeNotFound { time })?;
        self.relocate_value_at_time(cx, time, dimension, time + dt, key.value + dv)
    }

    /// Move the keyframe at `time` to exactly `(new_time, new_value)`.
    pub fn relocate_value_at_time(
        &self,
        cx: &EditContext,
        time: f64,
        dimension: usize,
        new_time: f64,
        new_value: f64,
    ) -> EditResult<Keyframe> {
        let curve = self.curve(dimension)?;
        let index = index_of(curve, time)?;
        let (key, _) = curve.set_value_and_time_at(cx, new_time, new_value, index)?;
        self.value_changed(cx);
        Ok(key)
    }

    /// Apply an affine transform to the keyframe at `time`.
    pub fn transform_value_at_time(
        &self,
        cx: &EditContext,
        time: f64,
        dimension: usize,
        transform: &KeyTransform,
    ) -> EditResult<Keyframe> {
        let key = self
            .curve(dimension)?
            .keyframe_at_time(time)
            .ok_or(EditError::KeyframeNotFound { time })?;
        let (new_time, new_value) = transform.apply(key.time, key.value);
        self.relocate_value_at_time(cx, time, dimension, new_time, new_value)
    }

    /// Set both slopes of the keyframe at `time`.
    pub fn move_derivatives_at_time(
        &self,
        cx: &EditContext,
        dimension: usize,
        time: f64,
        left: f64,
        right: f64,
    ) -> EditResult<Keyframe> {
        let curve = self.curve(dimension)?;
        let key = curve.set_derivatives_at(cx, left, right, index_of(curve, time)?)?;
        self.value_changed(cx);
        Ok(key)
    }

    /// Set one slope of the keyframe at `time`.
    pub fn move_derivative_at_time(
        &self,
        cx: &EditContext,
        dimension: usize,
        time: f64,
        slope: f64,
        side: TangentSide,
    ) -> EditResult<Keyframe> {
        let curve = self.curve(dimension)?;
        let key = curve.set_derivative_at(cx, side, slope, index_of(curve, time)?)?;
        self.value_changed(cx);
        Ok(key)
    }

    /// Change the interpolation kind of the keyframe at `time`.
    pub fn set_interpolation_at_time(
        &self,
        cx: &EditContext,
        dimension: usize,
        time: f64,
        kind: KeyframeType,
    ) -> EditResult<Keyframe> {
        let curve = self.curve(dimension)?;
        let key = curve.set_interpolation_at(cx, kind, index_of(curve, time)?)?;
        self.value_changed(cx);
        Ok(key)
    }

    /// Replace a dimension's keyframes with a snapshot.
    pub fn clone_curve(
        &self,
        cx: &EditContext,
        dimension: usize,
        snapshot: &[Keyframe],
    ) -> EditResult<()> {
        self.curve(dimension)?.restore(cx, snapshot);
        self.value_changed(cx);
        Ok(())
    }

    fn value_changed(&self, cx: &EditContext) {
        if let ParamOwner::Holder(holder) = &self.owner {
            holder.notify_value_changed(cx);
        }
    }
}

fn index_of(curve: &Curve, time: f64) -> EditResult<usize> {
    curve
        .index_of_time(time)
        .ok_or(EditError::KeyframeNotFound { time })
}

fn keyframe_at(curve: &Curve, index: usize) -> EditResult<Keyframe> {
    curve.keyframe_at(index).ok_or(EditError::Curve(
        curvekit_core::CurveError::IndexOutOfRange {
            index,
            len: curve.len(),
        },
    ))
}

// ── Tests ───────────────────────────────────────────────────────
