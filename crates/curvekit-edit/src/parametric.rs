//! Parametric-function parameters.
//!
//! Each dimension is a function of `x` described by control points. The
//! editor never writes values into these curves directly to create or
//! delete samples: it goes through `add_control_point` and
//! `delete_control_point`, which keep the function's bookkeeping straight.

use std::sync::Arc;

use curvekit_core::{Curve, EditContext, Keyframe, KeyframeType, ValueClamp};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::{EditError, EditResult};
use crate::holder::ParamHolder;

/// Unique identifier for a parametric parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParametricId(pub Uuid);

/// A parameter whose dimensions are procedurally evaluated curves.
#[derive(Debug)]
pub struct ParametricParam {
    id: ParametricId,
    name: String,
    curves: Vec<Arc<Curve>>,
    holder: Option<Arc<ParamHolder>>,
    evaluations: Mutex<Vec<u64>>,
}

impl ParametricParam {
    /// Create a parameter with `dimensions` empty function curves.
    pub fn new(
        name: impl Into<String>,
        dimensions: usize,
        holder: Option<Arc<ParamHolder>>,
    ) -> Self {
        Self {
            id: ParametricId(Uuid::new_v4()),
            name: name.into(),
            curves: (0..dimensions)
                .map(|_| Arc::new(Curve::new(ValueClamp::Unclamped)))
                .collect(),
            holder,
            evaluations: Mutex::new(vec![0; dimensions]),
        }
    }

    pub fn id(&self) -> ParametricId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dimensions(&self) -> usize {
        self.curves.len()
    }

    pub fn holder(&self) -> Option<&Arc<ParamHolder>> {
        self.holder.as_ref()
    }

    /// Function curve of a dimension.
    pub fn curve(&self, dimension: usize) -> EditResult<&Arc<Curve>> {
        self.curves
            .get(dimension)
            .ok_or(EditError::DimensionOutOfRange {
                dimension,
                count: self.curves.len(),
            })
    }

    /// Evaluate the function of a dimension at `x`.
    pub fn value_at(&self, dimension: usize, x: f64) -> EditResult<f64> {
        Ok(self.curve(dimension)?.value_at(x))
    }

    /// Add a control point. Fails when a point already sits at `time`.
    pub fn add_control_point(
        &self,
        cx: &EditContext,
        dimension: usize,
        time: f64,
        value: f64,
    ) -> EditResult<usize> {
        let curve = self.curve(dimension)?;
        if curve.index_of_time(time).is_some() {
            return Err(EditError::ControlPointRejected {
                dimension,
                reason: format!("a control point already exists at {time}"),
            });
        }
        let key = Keyframe::with_interpolation(time, value, KeyframeType::Smooth);
        Ok(curve.add_keyframe(cx, key)?)
    }

    /// Delete the control point at ordinal `index`.
    pub fn delete_control_point(
        &self,
        cx: &EditContext,
        dimension: usize,
        index: usize,
    ) -> EditResult<Keyframe> {
        let curve = self.curve(dimension)?;
        curve
            .remove_keyframe_at(cx, index)
            .map_err(|e| EditError::ControlPointRejected {
                dimension,
                reason: e.to_string(),
            })
    }

    /// Tell dependents that a dimension's function changed.
    pub fn evaluate_value_change(&self, cx: &EditContext, dimension: usize) {
        if let Some(count) = self.evaluations.lock().get_mut(dimension) {
            *count += 1;
        }
        debug!(param = %self.name, dimension, "parametric curve changed");
        if let Some(holder) = &self.holder {
            holder.notify_value_changed(cx);
        }
    }

    /// Number of `evaluate_value_change` signals received by a dimension.
    pub fn evaluation_count(&self, dimension: usize) -> u64 {
        self.evaluations.lock().get(dimension).copied().unwrap_or(0)
    }
}

// ── Tests ───────────────────────────────────────────────────────
