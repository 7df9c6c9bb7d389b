//! Property tests over random curves and edits.

use std::collections::BTreeMap;

use curvekit_core::{EditContext, KeyTransform, KeyframeType};
use curvekit_edit::{
    EditCommand, MoveKeysCommand, ParamKind, SetKeysInterpolationCommand, TransformKeysCommand,
};
use glam::DVec2;
use proptest::prelude::*;

use crate::fixtures::{identical, Scene};

fn curve_points() -> impl Strategy<Value = Vec<(f64, f64)>> {
    prop::collection::btree_map(-50i32..50, -100.0f64..100.0, 1..8).prop_map(|map: BTreeMap<_, _>| {
        map.into_iter().map(|(t, v)| (f64::from(t), v)).collect()
    })
}

fn interpolation() -> impl Strategy<Value = KeyframeType> {
    prop::sample::select(vec![
        KeyframeType::Constant,
        KeyframeType::Linear,
        KeyframeType::Smooth,
        KeyframeType::CatmullRom,
        KeyframeType::Cubic,
        KeyframeType::Horizontal,
        KeyframeType::Free,
        KeyframeType::Broken,
    ])
}

fn strictly_increasing(times: &[f64]) -> bool {
    times.windows(2).all(|w| w[0] < w[1])
}

proptest! {
    #[test]
    fn int_curves_stay_integral(points in curve_points(), dt in -5i32..5, dv in -10.0f64..10.0) {
        let cx = EditContext::new();
        let scene = Scene::new(&cx, ParamKind::Int, &points);
        let mut cmd: EditCommand =
            MoveKeysCommand::new(scene.view(), scene.select_all(), f64::from(dt), dv, true).into();
        cmd.redo(&cx);
        for (_, value) in scene.points() {
            prop_assert_eq!(value.fract(), 0.0);
        }
    }

    #[test]
    fn bool_curves_stay_binary(points in curve_points(), dv in -2.0f64..2.0) {
        let cx = EditContext::new();
        let scene = Scene::new(&cx, ParamKind::Bool, &points);
        let mut cmd: EditCommand =
            MoveKeysCommand::new(scene.view(), scene.select_all(), 0.0, dv, true).into();
        cmd.redo(&cx);
        for (_, value) in scene.points() {
            prop_assert!(value == 0.0 || value == 1.0);
        }
    }

    #[test]
    fn move_keeps_times_unique_and_undoes_exactly(
        points in curve_points(),
        dt in -20i32..20,
        dv in -10.0f64..10.0,
    ) {
        let cx = EditContext::new();
        let scene = Scene::new(&cx, ParamKind::Double, &points);
        let before = scene.curve().keyframes();
        let mut cmd: EditCommand =
            MoveKeysCommand::new(scene.view(), scene.select_all(), f64::from(dt), dv, true).into();

        cmd.redo(&cx);
        let times: Vec<f64> = scene.points().into_iter().map(|(t, _)| t).collect();
        prop_assert_eq!(times.len(), before.len());
        prop_assert!(strictly_increasing(&times));

        cmd.undo(&cx);
        prop_assert!(identical(&scene.curve().keyframes(), &before));
    }

    #[test]
    fn transform_lands_on_mapped_points_and_undoes_exactly(
        points in curve_points(),
        tx in -10.0f64..10.0,
        sx in prop::sample::select(vec![-2.0, -0.5, 0.5, 1.0, 1.5, 3.0]),
        sy in -3.0f64..3.0,
        pivot in -20.0f64..20.0,
    ) {
        let cx = EditContext::new();
        let scene = Scene::new(&cx, ParamKind::Double, &points);
        let before = scene.curve().keyframes();
        let transform = KeyTransform::canonical(
            DVec2::new(tx, 0.0),
            DVec2::new(sx, sy),
            DVec2::new(pivot, 0.0),
        );
        let mut expected: Vec<(f64, f64)> =
            points.iter().map(|&(t, v)| transform.apply(t, v)).collect();
        expected.sort_by(|a, b| a.0.total_cmp(&b.0));
        let mut cmd: EditCommand = TransformKeysCommand::new(
            scene.view(),
            scene.select_all(),
            DVec2::new(tx, 0.0),
            DVec2::new(sx, sy),
            DVec2::new(pivot, 0.0),
            true,
        )
        .into();

        for _ in 0..2 {
            cmd.redo(&cx);
            let after = scene.points();
            let times: Vec<f64> = after.iter().map(|&(t, _)| t).collect();
            prop_assert!(strictly_increasing(&times));
            prop_assert_eq!(&after, &expected);
            cmd.undo(&cx);
            prop_assert!(identical(&scene.curve().keyframes(), &before));
        }
    }

    #[test]
    fn interpolation_undoes_exactly(
        points in curve_points(),
        first in interpolation(),
        second in interpolation(),
    ) {
        let cx = EditContext::new();
        let scene = Scene::new(&cx, ParamKind::Double, &points);
        let mut setup: EditCommand =
            SetKeysInterpolationCommand::new(scene.view(), scene.select_all(), first).into();
        setup.redo(&cx);
        let before = scene.curve().keyframes();

        let mut cmd: EditCommand =
            SetKeysInterpolationCommand::new(scene.view(), scene.select_all(), second).into();
        cmd.redo(&cx);
        prop_assert!(scene.curve().keyframes().iter().all(|k| k.interpolation == second));
        cmd.undo(&cx);
        prop_assert!(identical(&scene.curve().keyframes(), &before));
    }
}
