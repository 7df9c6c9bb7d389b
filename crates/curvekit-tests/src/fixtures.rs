//! Scene builders shared by the integration tests.

use std::rc::Rc;
use std::sync::Arc;

use curvekit_core::{Curve, EditContext, Keyframe};
use curvekit_edit::{
    AnimatedParam, BezierShape, CountingView, CurveBinding, CurveView, KeyRef, ParamHolder,
    ParamKind, ParamOwner, RotoContext,
};

pub struct Scene {
    pub holder: Arc<ParamHolder>,
    pub param: Arc<AnimatedParam>,
    pub binding: CurveBinding,
    pub view: Rc<CountingView>,
}

impl Scene {
    /// One-dimensional parameter keyed at `keys`.
    pub fn new(cx: &EditContext, kind: ParamKind, keys: &[(f64, f64)]) -> Self {
        let holder = Arc::new(ParamHolder::new("Node1"));
        let param = Arc::new(AnimatedParam::new(
            "value",
            kind,
            1,
            ParamOwner::Holder(holder.clone()),
        ));
        for &(t, v) in keys {
            param.set_value_at_time(cx, t, v, 0).unwrap();
        }
        let binding = CurveBinding::parameter(&param, 0).unwrap();
        Self {
            holder,
            param,
            binding,
            view: Rc::new(CountingView::new()),
        }
    }

    pub fn curve(&self) -> Arc<Curve> {
        self.param.curve(0).unwrap().clone()
    }

    pub fn view(&self) -> Rc<dyn CurveView> {
        self.view.clone()
    }

    /// Select every keyframe, in time order.
    pub fn select_all(&self) -> Vec<KeyRef> {
        self.curve()
            .keyframes()
            .into_iter()
            .map(|k| KeyRef::new(self.binding.clone(), k))
            .collect()
    }

    pub fn select(&self, time: f64) -> KeyRef {
        KeyRef::at_time(self.binding.clone(), time).unwrap()
    }

    pub fn points(&self) -> Vec<(f64, f64)> {
        self.curve()
            .keyframes()
            .iter()
            .map(|k| (k.time, k.value))
            .collect()
    }
}

/// A triangle shape keyed at frame 0.
pub fn triangle(cx: &EditContext) -> (Arc<RotoContext>, Arc<BezierShape>) {
    let roto = Arc::new(RotoContext::new("Roto1"));
    let shape = Arc::new(
        BezierShape::new(
            cx,
            "Bezier1",
            roto.clone(),
            &[(0.0, 0.0), (10.0, 0.0), (5.0, 8.0)],
            0.0,
        )
        .unwrap(),
    );
    (roto, shape)
}

/// Whether two keyframe lists are bit-for-bit equal.
pub fn identical(a: &[Keyframe], b: &[Keyframe]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.is_identical(y))
}
