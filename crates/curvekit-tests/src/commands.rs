//! Integration tests for the edit commands.

use std::rc::Rc;

use curvekit_core::{EditContext, KeyTransform, Keyframe, KeyframeType, TangentSide};
use curvekit_edit::{
    AddKeysCommand, Axis, CurveBinding, EditCommand, KeyRef, MoveKeysCommand, MoveTangentCommand,
    NullView, ParamKind, RemoveKeysCommand, SetKeysInterpolationCommand, TransformKeysCommand,
    UndoStack,
};
use glam::DVec2;

use crate::fixtures::{identical, triangle, Scene};

#[test]
fn move_keys_forward_without_collision() {
    let cx = EditContext::new();
    let scene = Scene::new(&cx, ParamKind::Double, &[(1.0, 0.0), (2.0, 0.0), (3.0, 0.0)]);
    let mut cmd: EditCommand =
        MoveKeysCommand::new(scene.view(), scene.select_all(), 1.0, 0.0, true).into();
    cmd.redo(&cx);
    assert_eq!(scene.points(), vec![(2.0, 0.0), (3.0, 0.0), (4.0, 0.0)]);
    assert!(scene.view.selection_refreshes() >= 1);
}

#[test]
fn move_tangent_on_smooth_interior_key_frees_both() {
    let cx = EditContext::new();
    let scene = Scene::new(&cx, ParamKind::Double, &[(0.0, 0.0), (5.0, 2.0), (10.0, 1.0)]);
    let mut cmd: EditCommand =
        MoveTangentCommand::from_slope(scene.view(), TangentSide::Left, scene.select(5.0), -2.0)
            .unwrap()
            .into();
    cmd.redo(&cx);
    let key = scene.curve().keyframe_at_time(5.0).unwrap();
    assert_eq!(key.interpolation, KeyframeType::Free);
    assert_eq!(key.left_derivative, -2.0);
    assert_eq!(key.right_derivative, -2.0);
    assert_eq!(scene.view.tangent_refreshes(), 1);
}

#[test]
fn move_tangent_on_broken_key_moves_only_that_side() {
    let cx = EditContext::new();
    let scene = Scene::new(&cx, ParamKind::Double, &[(0.0, 0.0), (5.0, 2.0), (10.0, 1.0)]);
    scene
        .param
        .set_interpolation_at_time(&cx, 0, 5.0, KeyframeType::Broken)
        .unwrap();
    scene
        .param
        .move_derivatives_at_time(&cx, 0, 5.0, -1.0, 0.5)
        .unwrap();

    let mut cmd: EditCommand =
        MoveTangentCommand::from_slope(scene.view(), TangentSide::Right, scene.select(5.0), 3.0)
            .unwrap()
            .into();
    cmd.redo(&cx);
    let key = scene.curve().keyframe_at_time(5.0).unwrap();
    assert_eq!(key.interpolation, KeyframeType::Broken);
    assert_eq!(key.left_derivative, -1.0);
    assert_eq!(key.right_derivative, 3.0);
}

#[test]
fn move_tangent_offset_slope_is_rise_over_run() {
    let cx = EditContext::new();
    let scene = Scene::new(&cx, ParamKind::Double, &[(0.0, 0.0), (5.0, 2.0), (10.0, 1.0)]);
    scene
        .param
        .set_interpolation_at_time(&cx, 0, 5.0, KeyframeType::Broken)
        .unwrap();
    let left = MoveTangentCommand::from_offset(
        scene.view(),
        TangentSide::Left,
        scene.select(5.0),
        -2.0,
        4.0,
        true,
    )
    .unwrap();
    assert_eq!(left.target().1, -2.0);
    let right = MoveTangentCommand::from_offset(
        scene.view(),
        TangentSide::Right,
        scene.select(5.0),
        2.0,
        4.0,
        true,
    )
    .unwrap();
    assert_eq!(right.target().2, 2.0);
}

#[test]
fn bezier_interpolation_downgrades_to_linear() {
    let cx = EditContext::new();
    let (_, shape) = triangle(&cx);
    let binding = CurveBinding::bezier(&shape, 2, Axis::X).unwrap();
    let key = KeyRef::at_time(binding, 0.0).unwrap();
    let mut cmd: EditCommand = SetKeysInterpolationCommand::new(
        Rc::new(NullView),
        vec![key],
        KeyframeType::CatmullRom,
    )
    .into();
    cmd.redo(&cx);
    let stored = shape.point(2).unwrap().x.keyframe_at_time(0.0).unwrap();
    assert_eq!(stored.interpolation, KeyframeType::Linear);
}

#[test]
fn transform_merge_matches_composed_transform() {
    let cx = EditContext::new();
    let keys = [(0.0, 1.0), (2.0, 3.0), (4.0, -2.0)];
    let a = KeyTransform::canonical(DVec2::new(2.0, 0.0), DVec2::ONE, DVec2::ZERO);
    let b = KeyTransform::canonical(DVec2::ZERO, DVec2::new(2.0, 0.5), DVec2::new(4.0, 0.0));

    let merged = Scene::new(&cx, ParamKind::Double, &keys);
    let selection = merged.select_all();
    let mut stack = UndoStack::default();
    stack.push(
        &cx,
        TransformKeysCommand::with_transform(merged.view(), selection.clone(), a, false).into(),
    );
    assert!(stack.push(
        &cx,
        TransformKeysCommand::with_transform(merged.view(), selection, b, false).into(),
    ));
    assert_eq!(stack.undo_count(), 1);

    let once = Scene::new(&cx, ParamKind::Double, &keys);
    let mut cmd: EditCommand =
        TransformKeysCommand::with_transform(once.view(), once.select_all(), a.then(&b), true)
            .into();
    cmd.redo(&cx);
    assert_eq!(merged.curve().keyframes(), once.curve().keyframes());

    stack.undo(&cx);
    assert_eq!(merged.points(), keys.to_vec());
    stack.redo(&cx);
    assert_eq!(merged.curve().keyframes(), once.curve().keyframes());
}

#[test]
fn merge_rejects_different_key_sets() {
    let cx = EditContext::new();
    let scene = Scene::new(&cx, ParamKind::Double, &[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
    let all = scene.select_all();
    let mut reversed = all.clone();
    reversed.reverse();

    let mut first: EditCommand =
        MoveKeysCommand::new(scene.view(), all.clone(), 1.0, 0.0, true).into();
    let fewer: EditCommand =
        MoveKeysCommand::new(scene.view(), all[..2].to_vec(), 1.0, 0.0, true).into();
    let other_kind: EditCommand =
        TransformKeysCommand::with_transform(scene.view(), all.clone(), KeyTransform::IDENTITY, true)
            .into();
    let fresh_handles: EditCommand =
        MoveKeysCommand::new(scene.view(), scene.select_all(), 1.0, 0.0, true).into();
    assert!(!first.try_merge(&fewer));
    assert!(!first.try_merge(&other_kind));
    assert!(!first.try_merge(&fresh_handles));

    // Same handles in any order sort to the same selection.
    let same: EditCommand = MoveKeysCommand::new(scene.view(), reversed, 1.0, 0.0, true).into();
    assert!(first.try_merge(&same));
}

#[test]
fn undo_restores_identical_keyframes_for_every_command() {
    let cx = EditContext::new();
    let keys = [(0.0, 0.0), (3.0, 4.0), (7.0, -1.0), (12.0, 2.5)];

    fn add(s: &Scene) -> EditCommand {
        AddKeysCommand::new(s.view(), [(s.binding.clone(), Keyframe::new(5.0, 0.0))]).into()
    }
    fn remove(s: &Scene) -> EditCommand {
        RemoveKeysCommand::new(s.view(), [(s.binding.clone(), Keyframe::new(7.0, 0.0))]).into()
    }
    fn shift(s: &Scene) -> EditCommand {
        MoveKeysCommand::new(s.view(), s.select_all(), 1.5, -0.25, true).into()
    }
    fn cubic(s: &Scene) -> EditCommand {
        SetKeysInterpolationCommand::new(s.view(), s.select_all(), KeyframeType::Cubic).into()
    }
    fn tangent(s: &Scene) -> EditCommand {
        MoveTangentCommand::from_offset(s.view(), TangentSide::Right, s.select(3.0), 1.0, 2.0, true)
            .unwrap()
            .into()
    }
    fn stretch(s: &Scene) -> EditCommand {
        TransformKeysCommand::new(
            s.view(),
            s.select_all(),
            DVec2::new(-1.0, 0.5),
            DVec2::new(1.5, 2.0),
            DVec2::new(6.0, 1.0),
            true,
        )
        .into()
    }
    let commands: [fn(&Scene) -> EditCommand; 6] = [add, remove, shift, cubic, tangent, stretch];

    for build in &commands {
        let scene = Scene::new(&cx, ParamKind::Double, &keys);
        scene
            .param
            .set_interpolation_at_time(&cx, 0, 7.0, KeyframeType::Broken)
            .unwrap();
        scene
            .param
            .move_derivatives_at_time(&cx, 0, 7.0, 0.25, -3.0)
            .unwrap();
        let before = scene.curve().keyframes();

        let mut cmd = build(&scene);
        for _ in 0..2 {
            cmd.redo(&cx);
            cmd.undo(&cx);
            assert!(
                identical(&scene.curve().keyframes(), &before),
                "{} did not undo exactly",
                cmd.description()
            );
        }

        cmd.redo(&cx);
        cmd.redo(&cx);
        cmd.undo(&cx);
        assert!(
            identical(&scene.curve().keyframes(), &before),
            "{} did not undo exactly after a repeated redo",
            cmd.description()
        );
    }
}

#[test]
fn add_keys_on_parameter_captures_current_value() {
    let cx = EditContext::new();
    let scene = Scene::new(&cx, ParamKind::Int, &[(0.0, 2.0)]);
    let mut cmd: EditCommand =
        AddKeysCommand::new(scene.view(), [(scene.binding.clone(), Keyframe::new(8.0, 99.0))])
            .into();
    cmd.redo(&cx);
    assert_eq!(scene.points(), vec![(0.0, 2.0), (8.0, 2.0)]);
}

#[test]
fn bezier_move_and_remove_round_trip() {
    let cx = EditContext::new();
    let (_, shape) = triangle(&cx);
    shape.set_keyframe(&cx, 10.0).unwrap();
    let before = shape.snapshot();
    let x = CurveBinding::bezier(&shape, 0, Axis::X).unwrap();

    let mut stack = UndoStack::default();
    let key = KeyRef::at_time(x.clone(), 10.0).unwrap();
    stack.push(
        &cx,
        MoveKeysCommand::new(Rc::new(NullView), vec![key.clone()], 3.3, 0.0, true).into(),
    );
    assert_eq!(shape.keyframe_times(), vec![0.0, 13.0]);
    stack.seal();
    stack.push(
        &cx,
        RemoveKeysCommand::new(Rc::new(NullView), [(x, key.key())]).into(),
    );
    assert_eq!(shape.keyframe_times(), vec![0.0]);

    stack.undo(&cx);
    stack.undo(&cx);
    assert_eq!(shape.snapshot(), before);
}
