//! Bindings between editable curves and the entities that own them.
//!
//! The command layer never looks at concrete owner types. It talks to a
//! `CurveBinding`, which resolves its weak references on every call and
//! routes each operation to the owner's own API: per-time writes for
//! animated parameters, control-point bookkeeping for parametric functions,
//! and whole-keyframe operations for bezier shapes.

use std::sync::{Arc, Weak};

use curvekit_core::{Curve, CurveId, EditContext, KeyTransform, Keyframe, KeyframeType, TangentSide};

use crate::bezier::{round_time, Axis, BezierShape, ShapeId, ShapeKeyframe, ShapeSnapshot};
use crate::error::{EditError, EditResult};
use crate::holder::{ParamHolder, RotoContext};
use crate::param::{AnimatedParam, ParamOwner};
use crate::parametric::ParametricParam;

/// What a binding drives.
#[derive(Debug, Clone)]
pub enum BindingTarget {
    /// One dimension of an animated parameter.
    Parameter {
        param: Weak<AnimatedParam>,
        dimension: usize,
    },
    /// One dimension of a parametric function.
    Parametric {
        param: Weak<ParametricParam>,
        dimension: usize,
    },
    /// One coordinate of a bezier control point.
    BezierCoordinate {
        shape: Weak<BezierShape>,
        point: usize,
        axis: Axis,
    },
}

/// Who must be told once a batch of edits on a binding is done.
#[derive(Debug, Clone)]
pub enum ChangeTarget {
    Holder(Arc<ParamHolder>),
    Roto(Arc<RotoContext>),
    Parametric {
        param: Arc<ParametricParam>,
        dimension: usize,
    },
    Detached,
}

/// Unit of whole-state capture. Every coordinate curve of a shape shares
/// the shape's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateOwner {
    Curve(CurveId),
    Shape(ShapeId),
}

/// A keyframe captured before removal or replacement.
#[derive(Debug, Clone, PartialEq)]
pub enum KeySnapshot {
    Keyframe(Keyframe),
    Shape(ShapeKeyframe),
}

/// Full state of a [`StateOwner`].
#[derive(Debug, Clone, PartialEq)]
pub enum CapturedState {
    Curve(Vec<Keyframe>),
    Shape(ShapeSnapshot),
}

/// Non-owning handle on an editable curve and its owner.
#[derive(Debug, Clone)]
pub struct CurveBinding {
    curve: Weak<Curve>,
    curve_id: CurveId,
    state_owner: StateOwner,
    target: BindingTarget,
}

enum Resolved {
    Parameter(Arc<AnimatedParam>, usize),
    Parametric(Arc<ParametricParam>, usize),
    Bezier(Arc<BezierShape>),
}

impl CurveBinding {
    /// Bind a dimension of an animated parameter.
    pub fn parameter(param: &Arc<AnimatedParam>, dimension: usize) -> EditResult<Self> {
        let curve = param.curve(dimension)?;
        Ok(Self {
            curve: Arc::downgrade(curve),
            curve_id: curve.id(),
            state_owner: StateOwner::Curve(curve.id()),
            target: BindingTarget::Parameter {
                param: Arc::downgrade(param),
                dimension,
            },
        })
    }

    /// Bind a dimension of a parametric parameter.
    pub fn parametric(param: &Arc<ParametricParam>, dimension: usize) -> EditResult<Self> {
        let curve = param.curve(dimension)?;
        Ok(Self {
            curve: Arc::downgrade(curve),
            curve_id: curve.id(),
            state_owner: StateOwner::Curve(curve.id()),
            target: BindingTarget::Parametric {
                param: Arc::downgrade(param),
                dimension,
            },
        })
    }

    /// Bind one coordinate of a bezier control point.
    pub fn bezier(shape: &Arc<BezierShape>, point: usize, axis: Axis) -> EditResult<Self> {
        let curve = shape.point(point)?.curve(axis);
        Ok(Self {
            curve: Arc::downgrade(curve),
            curve_id: curve.id(),
            state_owner: StateOwner::Shape(shape.id()),
            target: BindingTarget::BezierCoordinate {
                shape: Arc::downgrade(shape),
                point,
                axis,
            },
        })
    }

    pub fn target(&self) -> &BindingTarget {
        &self.target
    }

    pub fn curve_id(&self) -> CurveId {
        self.curve_id
    }

    pub fn state_owner(&self) -> StateOwner {
        self.state_owner
    }

    pub fn is_bezier(&self) -> bool {
        matches!(self.target, BindingTarget::BezierCoordinate { .. })
    }

    /// Whether both the curve and its owner still exist.
    pub fn is_alive(&self) -> bool {
        self.resolve().is_ok()
    }

    /// The bound curve.
    pub fn curve(&self) -> EditResult<Arc<Curve>> {
        Ok(self.resolve()?.0)
    }

    fn resolve(&self) -> EditResult<(Arc<Curve>, Resolved)> {
        let curve = self.curve.upgrade().ok_or(EditError::ExpiredBinding)?;
        let owner = match &self.target {
            BindingTarget::Parameter { param, dimension } => {
                Resolved::Parameter(param.upgrade().ok_or(EditError::ExpiredBinding)?, *dimension)
            }
            BindingTarget::Parametric { param, dimension } => {
                Resolved::Parametric(param.upgrade().ok_or(EditError::ExpiredBinding)?, *dimension)
            }
            BindingTarget::BezierCoordinate { shape, .. } => {
                Resolved::Bezier(shape.upgrade().ok_or(EditError::ExpiredBinding)?)
            }
        };
        Ok((curve, owner))
    }

    /// Who gets notified when this binding's curve changes.
    pub fn change_target(&self) -> EditResult<ChangeTarget> {
        let (_, owner) = self.resolve()?;
        Ok(match owner {
            Resolved::Parameter(param, _) => match param.owner() {
                ParamOwner::Holder(holder) => ChangeTarget::Holder(holder.clone()),
                ParamOwner::Roto(roto) => ChangeTarget::Roto(roto.clone()),
                ParamOwner::Detached => ChangeTarget::Detached,
            },
            Resolved::Parametric(param, dimension) => ChangeTarget::Parametric { param, dimension },
            Resolved::Bezier(shape) => ChangeTarget::Roto(shape.context().clone()),
        })
    }

    // ── Reads ───────────────────────────────────────────────────

    /// The keyframe stored at exactly `time`, if any.
    pub fn keyframe_at_time(&self, time: f64) -> EditResult<Option<Keyframe>> {
        Ok(self.curve()?.keyframe_at_time(time))
    }

    /// Capture what lives at `time` so it can be put back exactly.
    pub fn capture_key(&self, time: f64) -> EditResult<Option<KeySnapshot>> {
        let (curve, owner) = self.resolve()?;
        Ok(match owner {
            Resolved::Bezier(shape) => shape.keyframe_snapshot(time).map(KeySnapshot::Shape),
            _ => curve.keyframe_at_time(time).map(KeySnapshot::Keyframe),
        })
    }

    /// Capture the full state of the binding's [`StateOwner`].
    pub fn capture_state(&self) -> EditResult<CapturedState> {
        let (curve, owner) = self.resolve()?;
        Ok(match owner {
            Resolved::Bezier(shape) => CapturedState::Shape(shape.snapshot()),
            _ => CapturedState::Curve(curve.keyframes()),
        })
    }

    // ── Existence ───────────────────────────────────────────────

    /// Create a keyframe at `key.time`.
    ///
    /// Parameters key their currently evaluated value, parametric functions
    /// gain a control point holding `key.value`, and shapes key every
    /// control point.
    pub fn insert_key(&self, cx: &EditContext, key: &Keyframe) -> EditResult<()> {
        let (curve, owner) = self.resolve()?;
        match owner {
            Resolved::Parameter(param, dim) => {
                let value = param.value_at_time(key.time, dim)?;
                param.set_value_at_time(cx, key.time, value, dim)?;
            }
            Resolved::Parametric(param, dim) => match curve.index_of_time(key.time) {
                Some(index) => {
                    curve.set_value_and_time_at(cx, key.time, key.value, index)?;
                }
                None => {
                    param.add_control_point(cx, dim, key.time, key.value)?;
                }
            },
            Resolved::Bezier(shape) => shape.set_keyframe(cx, key.time)?,
        }
        Ok(())
    }

    /// Delete the keyframe at `time`, returning what was removed.
    pub fn remove_key(&self, cx: &EditContext, time: f64) -> EditResult<KeySnapshot> {
        let (curve, owner) = self.resolve()?;
        match owner {
            Resolved::Parameter(param, dim) => {
                Ok(KeySnapshot::Keyframe(param.delete_value_at_time(cx, time, dim)?))
            }
            Resolved::Parametric(param, dim) => {
                let index = curve
                    .index_of_time(time)
                    .ok_or(EditError::KeyframeNotFound { time })?;
                Ok(KeySnapshot::Keyframe(param.delete_control_point(cx, dim, index)?))
            }
            Resolved::Bezier(shape) => {
                let snapshot = shape
                    .keyframe_snapshot(time)
                    .ok_or(EditError::KeyframeNotFound { time })?;
                shape.remove_keyframe(cx, time)?;
                Ok(KeySnapshot::Shape(snapshot))
            }
        }
    }

    /// Put back a keyframe captured by [`CurveBinding::remove_key`] or
    /// [`CurveBinding::capture_key`].
    pub fn restore_key(&self, cx: &EditContext, snapshot: &KeySnapshot) -> EditResult<()> {
        let (curve, owner) = self.resolve()?;
        match (owner, snapshot) {
            (Resolved::Parameter(param, dim), KeySnapshot::Keyframe(key)) => {
                param.set_keyframe(cx, *key, dim)?;
            }
            (Resolved::Parametric(_, _), KeySnapshot::Keyframe(key)) => {
                curve.add_keyframe(cx, *key)?;
            }
            (Resolved::Bezier(shape), KeySnapshot::Shape(key)) => shape.restore_keyframe(cx, key)?,
            _ => {
                debug_assert!(false, "snapshot does not match binding kind");
                return Err(EditError::Unsupported("restoring a foreign snapshot"));
            }
        }
        Ok(())
    }

    // ── Moves ───────────────────────────────────────────────────

    /// Move `key` to `(time, value)` and return the stored keyframe.
    ///
    /// Shape keyframes move as a whole, to the nearest frame; the value is
    /// ignored for them.
    pub fn move_key_to(
        &self,
        cx: &EditContext,
        key: &Keyframe,
        time: f64,
        value: f64,
    ) -> EditResult<Keyframe> {
        let (curve, owner) = self.resolve()?;
        match owner {
            Resolved::Parameter(param, dim) => {
                param.relocate_value_at_time(cx, key.time, dim, time, value)
            }
            Resolved::Parametric(_, _) => {
                let index = curve
                    .index_of_time(key.time)
                    .ok_or(EditError::KeyframeNotFound { time: key.time })?;
                Ok(curve.set_value_and_time_at(cx, time, value, index)?.0)
            }
            Resolved::Bezier(shape) => {
                let time = round_time(time);
                shape.move_keyframe(cx, key.time, time)?;
                curve
                    .keyframe_at_time(time)
                    .ok_or(EditError::KeyframeNotFound { time })
            }
        }
    }

    /// Map `key` through `transform` and store the result.
    pub fn transform_key(
        &self,
        cx: &EditContext,
        key: &Keyframe,
        transform: &KeyTransform,
    ) -> EditResult<Keyframe> {
        if let (_, Resolved::Parameter(param, dim)) = self.resolve()? {
            return param.transform_value_at_time(cx, key.time, dim, transform);
        }
        let (time, value) = transform.apply(key.time, key.value);
        self.move_key_to(cx, key, time, value)
    }

    // ── Interpolation and tangents ──────────────────────────────

    /// Change the interpolation of the keyframe at `time`. Shapes only
    /// accept `Constant` and `Linear`; other kinds become `Linear`.
    pub fn set_interpolation(
        &self,
        cx: &EditContext,
        time: f64,
        kind: KeyframeType,
    ) -> EditResult<Keyframe> {
        let (curve, owner) = self.resolve()?;
        match owner {
            Resolved::Parameter(param, dim) => param.set_interpolation_at_time(cx, dim, time, kind),
            Resolved::Parametric(_, _) => {
                Ok(curve.set_interpolation_at(cx, kind, index_of(&curve, time)?)?)
            }
            Resolved::Bezier(_) => Ok(curve.set_interpolation_at(
                cx,
                kind.restricted_to_shape(),
                index_of(&curve, time)?,
            )?),
        }
    }

    /// Override both slopes of the keyframe at `time`.
    pub fn set_derivatives(
        &self,
        cx: &EditContext,
        time: f64,
        left: f64,
        right: f64,
    ) -> EditResult<Keyframe> {
        let (curve, owner) = self.resolve()?;
        match owner {
            Resolved::Parameter(param, dim) => {
                param.move_derivatives_at_time(cx, dim, time, left, right)
            }
            Resolved::Parametric(_, _) => {
                Ok(curve.set_derivatives_at(cx, left, right, index_of(&curve, time)?)?)
            }
            Resolved::Bezier(_) => Err(EditError::Unsupported("tangent editing")),
        }
    }

    /// Override one slope of the keyframe at `time`.
    pub fn set_derivative(
        &self,
        cx: &EditContext,
        time: f64,
        side: TangentSide,
        slope: f64,
    ) -> EditResult<Keyframe> {
        let (curve, owner) = self.resolve()?;
        match owner {
            Resolved::Parameter(param, dim) => {
                param.move_derivative_at_time(cx, dim, time, slope, side)
            }
            Resolved::Parametric(_, _) => {
                Ok(curve.set_derivative_at(cx, side, slope, index_of(&curve, time)?)?)
            }
            Resolved::Bezier(_) => Err(EditError::Unsupported("tangent editing")),
        }
    }

    // ── Whole state ─────────────────────────────────────────────

    /// Restore a state captured by [`CurveBinding::capture_state`].
    pub fn restore_state(&self, cx: &EditContext, state: &CapturedState) -> EditResult<()> {
        let (curve, owner) = self.resolve()?;
        match (owner, state) {
            (Resolved::Parameter(param, dim), CapturedState::Curve(keys)) => {
                param.clone_curve(cx, dim, keys)?;
            }
            (Resolved::Parametric(_, _), CapturedState::Curve(keys)) => curve.restore(cx, keys),
            (Resolved::Bezier(shape), CapturedState::Shape(snapshot)) => shape.restore(cx, snapshot),
            _ => {
                debug_assert!(false, "captured state does not match binding kind");
                return Err(EditError::Unsupported("restoring a foreign state"));
            }
        }
        Ok(())
    }
}

fn index_of(curve: &Curve, time: f64) -> EditResult<usize> {
    curve
        .index_of_time(time)
        .ok_or(EditError::KeyframeNotFound { time })
}

// ── Tests ───────────────────────────────────────────────────────
