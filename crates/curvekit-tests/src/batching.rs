//! Integration tests for change batching across owners.

use std::rc::Rc;
use std::sync::Arc;

use curvekit_core::{EditContext, Keyframe};
use curvekit_edit::{
    AddKeysCommand, AnimatedParam, Axis, CurveBinding, EditCommand, KeyRef, MoveKeysCommand,
    NullView, ParamHolder, ParamKind, ParamOwner, ParametricParam, RemoveKeysCommand, RotoContext,
    TransformKeysCommand, UndoStack,
};
use glam::DVec2;

use crate::fixtures::{triangle, Scene};

#[test]
fn one_evaluation_per_holder_per_apply() {
    let cx = EditContext::new();
    let holder = Arc::new(ParamHolder::new("Blur1"));
    let size = Arc::new(AnimatedParam::new(
        "size",
        ParamKind::Double,
        2,
        ParamOwner::Holder(holder.clone()),
    ));
    let mut keys = Vec::new();
    for dim in 0..2 {
        for t in [0.0, 5.0, 10.0] {
            size.set_value_at_time(&cx, t, 1.0, dim).unwrap();
        }
        let binding = CurveBinding::parameter(&size, dim).unwrap();
        for t in [0.0, 5.0, 10.0] {
            keys.push(KeyRef::at_time(binding.clone(), t).unwrap());
        }
    }

    let before = holder.evaluation_count();
    let mut cmd: EditCommand = MoveKeysCommand::new(Rc::new(NullView), keys, 1.0, 0.5, true).into();
    cmd.redo(&cx);
    assert_eq!(holder.evaluation_count(), before + 1);
    cmd.undo(&cx);
    assert_eq!(holder.evaluation_count(), before + 2);
    assert!(!holder.is_in_change_block());
}

#[test]
fn silent_first_redo_skips_recompute() {
    let cx = EditContext::new();
    let scene = Scene::new(&cx, ParamKind::Double, &[(0.0, 0.0), (4.0, 1.0)]);
    let before = scene.holder.evaluation_count();

    let mut cmd: EditCommand = TransformKeysCommand::new(
        scene.view(),
        scene.select_all(),
        DVec2::new(1.0, 0.0),
        DVec2::ONE,
        DVec2::ZERO,
        false,
    )
    .into();
    cmd.redo(&cx);
    assert_eq!(scene.holder.evaluation_count(), before);
    assert_eq!(scene.points(), vec![(1.0, 0.0), (5.0, 1.0)]);

    cmd.undo(&cx);
    cmd.redo(&cx);
    assert_eq!(scene.holder.evaluation_count(), before + 2);
    assert!(!scene.holder.is_in_change_block());
}

#[test]
fn expired_bindings_are_skipped() {
    let cx = EditContext::new();
    let scene = Scene::new(&cx, ParamKind::Double, &[(0.0, 0.0)]);
    let doomed = Arc::new(AnimatedParam::new(
        "doomed",
        ParamKind::Double,
        1,
        ParamOwner::Holder(scene.holder.clone()),
    ));
    let stale = CurveBinding::parameter(&doomed, 0).unwrap();
    drop(doomed);
    assert!(!stale.is_alive());

    let mut stack = UndoStack::default();
    stack.push(
        &cx,
        AddKeysCommand::new(
            scene.view(),
            [
                (stale, Keyframe::new(3.0, 0.0)),
                (scene.binding.clone(), Keyframe::new(3.0, 0.0)),
            ],
        )
        .into(),
    );
    assert_eq!(scene.curve().len(), 2);
    stack.undo(&cx);
    assert_eq!(scene.curve().len(), 1);
    assert!(!scene.holder.is_in_change_block());
}

#[test]
fn roto_owned_parameter_signals_context_once() {
    let cx = EditContext::new();
    let roto = Arc::new(RotoContext::new("Roto1"));
    let opacity = Arc::new(AnimatedParam::new(
        "opacity",
        ParamKind::Double,
        1,
        ParamOwner::Roto(roto.clone()),
    ));
    for t in [0.0, 10.0, 20.0] {
        opacity.set_value_at_time(&cx, t, 1.0, 0).unwrap();
    }
    let binding = CurveBinding::parameter(&opacity, 0).unwrap();
    let keys = opacity
        .curve(0)
        .unwrap()
        .keyframes()
        .into_iter()
        .map(|k| KeyRef::new(binding.clone(), k))
        .collect();

    let before = roto.evaluation_count();
    let mut cmd: EditCommand = MoveKeysCommand::new(Rc::new(NullView), keys, 0.0, -0.5, true).into();
    cmd.redo(&cx);
    assert_eq!(roto.evaluation_count(), before + 1);
}

#[test]
fn shape_edits_signal_their_context() {
    let cx = EditContext::new();
    let (roto, shape) = triangle(&cx);
    let bindings: Vec<CurveBinding> = (0..3)
        .flat_map(|i| [Axis::X, Axis::Y].map(|axis| CurveBinding::bezier(&shape, i, axis).unwrap()))
        .collect();

    let before = roto.evaluation_count();
    let mut add: EditCommand = AddKeysCommand::new(
        Rc::new(NullView),
        bindings.iter().map(|b| (b.clone(), Keyframe::new(6.0, 0.0))),
    )
    .into();
    add.redo(&cx);
    assert_eq!(shape.keyframe_times(), vec![0.0, 6.0]);
    assert_eq!(roto.evaluation_count(), before + 1);

    let mut remove: EditCommand = RemoveKeysCommand::new(
        Rc::new(NullView),
        bindings.iter().map(|b| (b.clone(), Keyframe::new(6.0, 0.0))),
    )
    .into();
    remove.redo(&cx);
    assert_eq!(shape.keyframe_times(), vec![0.0]);
    remove.undo(&cx);
    assert_eq!(shape.keyframe_times(), vec![0.0, 6.0]);
    assert_eq!(roto.evaluation_count(), before + 3);
}

#[test]
fn parametric_dimensions_signal_separately() {
    let cx = EditContext::new();
    let holder = Arc::new(ParamHolder::new("ColorLookup1"));
    let lut = Arc::new(ParametricParam::new("lookup", 3, Some(holder.clone())));
    let red = CurveBinding::parametric(&lut, 0).unwrap();
    let blue = CurveBinding::parametric(&lut, 2).unwrap();

    let before = holder.evaluation_count();
    let mut cmd: EditCommand = AddKeysCommand::new(
        Rc::new(NullView),
        [
            (red.clone(), Keyframe::new(0.0, 0.0)),
            (red, Keyframe::new(1.0, 1.0)),
            (blue, Keyframe::new(0.5, 0.25)),
        ],
    )
    .into();
    cmd.redo(&cx);

    assert_eq!(lut.evaluation_count(0), 1);
    assert_eq!(lut.evaluation_count(1), 0);
    assert_eq!(lut.evaluation_count(2), 1);
    assert_eq!(holder.evaluation_count(), before + 1);
    assert_eq!(lut.curve(0).unwrap().len(), 2);
    assert_eq!(lut.value_at(2, 0.5).unwrap(), 0.25);

    cmd.undo(&cx);
    assert!(lut.curve(0).unwrap().keyframes().is_empty());
    assert_eq!(lut.evaluation_count(0), 2);
}
