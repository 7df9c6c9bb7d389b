//! Animated bezier (roto) shapes.
//!
//! Every control point carries an x and a y curve. The shape itself owns the
//! list of keyframe times: a shape keyframe is one keyframe at the same time
//! on every coordinate curve, so keyframes are created, removed and moved on
//! the shape as a whole rather than per coordinate. Shape times are frame
//! numbers.

use std::sync::Arc;

use curvekit_core::{Curve, EditContext, Keyframe, KeyframeType, ValueClamp};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::{EditError, EditResult};
use crate::holder::RotoContext;

/// Unique identifier for a bezier shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShapeId(pub Uuid);

/// Coordinate channel of a control point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
}

/// A control point's two coordinate curves.
#[derive(Debug)]
pub struct ControlPoint {
    pub x: Arc<Curve>,
    pub y: Arc<Curve>,
}

impl ControlPoint {
    fn new() -> Self {
        Self {
            x: Arc::new(Curve::new(ValueClamp::Unclamped)),
            y: Arc::new(Curve::new(ValueClamp::Unclamped)),
        }
    }

    /// Coordinate curve for an axis.
    pub fn curve(&self, axis: Axis) -> &Arc<Curve> {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
        }
    }
}

/// Everything stored at one shape keyframe.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeKeyframe {
    pub time: f64,
    /// `(x, y)` keyframes per control point.
    pub points: Vec<(Keyframe, Keyframe)>,
}

/// Full animation state of a shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeSnapshot {
    times: Vec<f64>,
    points: Vec<(Vec<Keyframe>, Vec<Keyframe>)>,
}

/// An animated closed or open bezier.
#[derive(Debug)]
pub struct BezierShape {
    id: ShapeId,
    name: String,
    context: Arc<RotoContext>,
    points: Vec<ControlPoint>,
    /// Sorted keyframe times.
    times: Mutex<Vec<f64>>,
}

impl BezierShape {
    /// Create a shape whose control points are keyed at `time`.
    pub fn new(
        cx: &EditContext,
        name: impl Into<String>,
        context: Arc<RotoContext>,
        positions: &[(f64, f64)],
        time: f64,
    ) -> EditResult<Self> {
        let time = round_time(time);
        let points: Vec<ControlPoint> = positions.iter().map(|_| ControlPoint::new()).collect();
        for (point, &(x, y)) in points.iter().zip(positions) {
            point.x.add_keyframe(cx, shape_key(time, x))?;
            point.y.add_keyframe(cx, shape_key(time, y))?;
        }
        Ok(Self {
            id: ShapeId(Uuid::new_v4()),
            name: name.into(),
            context,
            points,
            times: Mutex::new(vec![time]),
        })
    }

    pub fn id(&self) -> ShapeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Roto context owning the shape.
    pub fn context(&self) -> &Arc<RotoContext> {
        &self.context
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Control point by index.
    pub fn point(&self, index: usize) -> EditResult<&ControlPoint> {
        self.points.get(index).ok_or(EditError::PointOutOfRange {
            index,
            count: self.points.len(),
        })
    }

    /// Evaluated position of a control point.
    pub fn position_at(&self, index: usize, time: f64) -> EditResult<(f64, f64)> {
        let point = self.point(index)?;
        Ok((point.x.value_at(time), point.y.value_at(time)))
    }

    /// Sorted keyframe times.
    pub fn keyframe_times(&self) -> Vec<f64> {
        self.times.lock().clone()
    }

    pub fn is_keyframe(&self, time: f64) -> bool {
        self.times.lock().contains(&round_time(time))
    }

    // ── Shape keyframes ─────────────────────────────────────────

    /// Key the current shape at `time`. No-op when already keyed.
    pub fn set_keyframe(&self, cx: &EditContext, time: f64) -> EditResult<()> {
        let time = round_time(time);
        if self.is_keyframe(time) {
            return Ok(());
        }
        for point in &self.points {
            let x = point.x.value_at(time);
            let y = point.y.value_at(time);
            point.x.add_keyframe(cx, shape_key(time, x))?;
            point.y.add_keyframe(cx, shape_key(time, y))?;
        }
        self.insert_time(time);
        debug!(shape = %self.name, time, "shape keyframe set");
        Ok(())
    }

    /// Remove the shape keyframe at `time`. No-op when not keyed.
    pub fn remove_keyframe(&self, cx: &EditContext, time: f64) -> EditResult<()> {
        let time = round_time(time);
        if !self.is_keyframe(time) {
            return Ok(());
        }
        for point in &self.points {
            point.x.remove_keyframe_at_time(cx, time)?;
            point.y.remove_keyframe_at_time(cx, time)?;
        }
        self.times.lock().retain(|&t| t != time);
        debug!(shape = %self.name, time, "shape keyframe removed");
        Ok(())
    }

    /// Move the shape keyframe at `old_time` to `new_time`.
    pub fn move_keyframe(&self, cx: &EditContext, old_time: f64, new_time: f64) -> EditResult<()> {
        let old_time = round_time(old_time);
        let new_time = round_time(new_time);
        if old_time == new_time {
            return Ok(());
        }
        if !self.is_keyframe(old_time) {
            return Err(EditError::KeyframeNotFound { time: old_time });
        }
        if self.is_keyframe(new_time) {
            return Err(curvekit_core::CurveError::TimeCollision { time: new_time }.into());
        }
        for point in &self.points {
            for curve in [&point.x, &point.y] {
                let index = curve
                    .index_of_time(old_time)
                    .ok_or(EditError::KeyframeNotFound { time: old_time })?;
                let value = curve.keyframe_at(index).map(|k| k.value).unwrap_or_default();
                curve.set_value_and_time_at(cx, new_time, value, index)?;
            }
        }
        let mut times = self.times.lock();
        times.retain(|&t| t != old_time);
        let pos = times.partition_point(|&t| t < new_time);
        times.insert(pos, new_time);
        Ok(())
    }

    /// Everything keyed at `time`, or `None` when not a keyframe.
    pub fn keyframe_snapshot(&self, time: f64) -> Option<ShapeKeyframe> {
        let time = round_time(time);
        if !self.is_keyframe(time) {
            return None;
        }
        let points = self
            .points
            .iter()
            .map(|p| Some((p.x.keyframe_at_time(time)?, p.y.keyframe_at_time(time)?)))
            .collect::<Option<Vec<_>>>()?;
        Some(ShapeKeyframe { time, points })
    }

    /// Put back a keyframe captured with [`BezierShape::keyframe_snapshot`].
    pub fn restore_keyframe(&self, cx: &EditContext, snapshot: &ShapeKeyframe) -> EditResult<()> {
        debug_assert_eq!(snapshot.points.len(), self.points.len());
        for (point, (x, y)) in self.points.iter().zip(&snapshot.points) {
            point.x.add_keyframe(cx, *x)?;
            point.y.add_keyframe(cx, *y)?;
        }
        if !self.is_keyframe(snapshot.time) {
            self.insert_time(snapshot.time);
        }
        Ok(())
    }

    /// Capture the whole animation.
    pub fn snapshot(&self) -> ShapeSnapshot {
        ShapeSnapshot {
            times: self.keyframe_times(),
            points: self
                .points
                .iter()
                .map(|p| (p.x.keyframes(), p.y.keyframes()))
                .collect(),
        }
    }

    /// Restore an animation captured with [`BezierShape::snapshot`].
    pub fn restore(&self, cx: &EditContext, snapshot: &ShapeSnapshot) {
        debug_assert_eq!(snapshot.points.len(), self.points.len());
        for (point, (x, y)) in self.points.iter().zip(&snapshot.points) {
            point.x.restore(cx, x);
            point.y.restore(cx, y);
        }
        *self.times.lock() = snapshot.times.clone();
    }

    fn insert_time(&self, time: f64) {
        let mut times = self.times.lock();
        let pos = times.partition_point(|&t| t < time);
        times.insert(pos, time);
    }
}

/// Shape times are whole frames, rounded half up.
#[inline]
pub fn round_time(time: f64) -> f64 {
    (time + 0.5).floor() + 0.0
}

fn shape_key(time: f64, value: f64) -> Keyframe {
    Keyframe::with_interpolation(time, value, KeyframeType::Linear)
}

// ── Tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle(cx: &EditContext) -> BezierShape {
        let roto = Arc::new(RotoContext::new("Roto1"));
        BezierShape::new(cx, "Bezier1", roto, &[(0.0, 0.0), (10.0, 0.0), (5.0, 8.0)], 0.0)
            .unwrap()
    }

    #[test]
    fn test_set_keyframe_keys_every_coordinate() {
        let cx = EditContext::new();
        let shape = triangle(&cx);
        shape.set_keyframe(&cx, 10.0).unwrap();
        assert_eq!(shape.keyframe_times(), vec![0.0, 10.0]);
        for i in 0..shape.point_count() {
            let p = shape.point(i).unwrap();
            assert_eq!(p.x.len(), 2);
            assert_eq!(p.y.len(), 2);
        }
    }

    #[test]
    fn test_move_keyframe_moves_every_coordinate() {
        let cx = EditContext::new();
        let shape = triangle(&cx);
        shape.set_keyframe(&cx, 10.0).unwrap();
        shape.move_keyframe(&cx, 10.0, 14.6).unwrap();
        assert_eq!(shape.keyframe_times(), vec![0.0, 15.0]);
        assert!(shape.point(2).unwrap().y.keyframe_at_time(15.0).is_some());
    }

    #[test]
    fn test_move_onto_existing_keyframe_fails() {
        let cx = EditContext::new();
        let shape = triangle(&cx);
        shape.set_keyframe(&cx, 10.0).unwrap();
        assert!(shape.move_keyframe(&cx, 10.0, 0.0).is_err());
        assert_eq!(shape.keyframe_times(), vec![0.0, 10.0]);
    }

    #[test]
    fn test_remove_and_restore_keyframe() {
        let cx = EditContext::new();
        let shape = triangle(&cx);
        shape.set_keyframe(&cx, 10.0).unwrap();
        shape.point(1).unwrap().x.set_value_and_time_at(&cx, 10.0, 20.0, 1).unwrap();
        let before = shape.snapshot();

        let captured = shape.keyframe_snapshot(10.0).unwrap();
        shape.remove_keyframe(&cx, 10.0).unwrap();
        assert_eq!(shape.keyframe_times(), vec![0.0]);

        shape.restore_keyframe(&cx, &captured).unwrap();
        assert_eq!(shape.snapshot(), before);
    }

    #[test]
    fn test_round_time() {
        assert_eq!(round_time(2.5), 3.0);
        assert_eq!(round_time(2.49), 2.0);
        assert_eq!(round_time(-0.2), 0.0);
        assert!(round_time(-0.2).is_sign_positive());
    }
}
