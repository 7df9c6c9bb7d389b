//! CurveKit - headless curve editing session
//!
//! Builds a small scene (a node with an animated parameter, a colour lookup
//! and a roto shape), runs a scripted series of edits through the undo
//! stack, and logs the resulting curves.
//!
//! Usage: `curvekit [config.json]`

use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;

use anyhow::{Context, Result};
use curvekit_core::{Curve, EditContext, Keyframe, KeyframeType, TangentSide};
use curvekit_edit::{
    AddKeysCommand, AnimatedParam, Axis, BezierShape, CountingView, CurveBinding, CurveView,
    EditCommand, EditorConfig, KeyRef, MoveKeysCommand, MoveTangentCommand, ParamHolder,
    ParamKind, ParamOwner, ParametricParam, RemoveKeysCommand, RotoContext,
    SetKeysInterpolationCommand, TransformKeysCommand, UndoStack,
};
use glam::DVec2;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> Result<()> {
    let config = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => EditorConfig::load_from_file(&path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => EditorConfig::default(),
    };

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .context("invalid log filter")?;
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!(undo_depth = config.undo_depth, "CurveKit session starting");

    let cx = EditContext::new();
    let view = Rc::new(CountingView::new());
    let mut stack = UndoStack::from_config(&config);
    run_session(&cx, view.clone(), &mut stack)?;

    info!(
        undo_steps = stack.undo_count(),
        redo_steps = stack.redo_count(),
        refreshes = view.refreshes(),
        "session finished"
    );
    Ok(())
}

fn run_session(cx: &EditContext, view: Rc<dyn CurveView>, stack: &mut UndoStack) -> Result<()> {
    let holder = Arc::new(ParamHolder::new("Transform1"));
    let translate = Arc::new(AnimatedParam::new(
        "translate",
        ParamKind::Double,
        2,
        ParamOwner::Holder(holder.clone()),
    ));
    for (t, x) in [(0.0, 0.0), (10.0, 50.0), (20.0, 20.0)] {
        translate.set_value_at_time(cx, t, x, 0)?;
    }
    let x = CurveBinding::parameter(&translate, 0)?;

    // Key a new frame, then drag it in three steps that merge into one.
    let added = AddKeysCommand::new(view.clone(), [(x.clone(), Keyframe::new(15.0, 0.0))]);
    stack.push(cx, added.into());
    let key = KeyRef::at_time(x.clone(), 15.0)?;
    for _ in 0..3 {
        let drag = MoveKeysCommand::new(view.clone(), vec![key.clone()], 1.0, 2.0, true);
        stack.push(cx, drag.into());
    }
    stack.seal();
    log_curve("translate.x after drag", translate.curve(0)?);

    // Shape the middle key by hand.
    let middle = KeyRef::at_time(x.clone(), 10.0)?;
    let slope =
        MoveTangentCommand::from_offset(view.clone(), TangentSide::Right, middle, 2.0, 3.0, true)?;
    stack.push(cx, slope.into());

    // Stretch every key in time about frame 0.
    let selection = translate
        .curve(0)?
        .keyframes()
        .iter()
        .map(|k| KeyRef::new(x.clone(), *k))
        .collect::<Vec<_>>();
    let stretch = TransformKeysCommand::new(
        view.clone(),
        selection.clone(),
        DVec2::ZERO,
        DVec2::new(2.0, 1.0),
        DVec2::ZERO,
        true,
    );
    stack.push(cx, stretch.into());
    stack.seal();
    stack.push(
        cx,
        SetKeysInterpolationCommand::new(view.clone(), selection, KeyframeType::Linear).into(),
    );
    log_curve("translate.x after transform", translate.curve(0)?);

    // Colour lookup control points.
    let lut = Arc::new(ParametricParam::new("lookup", 1, Some(holder.clone())));
    let master = CurveBinding::parametric(&lut, 0)?;
    let points: EditCommand = AddKeysCommand::new(
        view.clone(),
        [
            (master.clone(), Keyframe::new(0.0, 0.0)),
            (master.clone(), Keyframe::new(0.5, 0.6)),
            (master, Keyframe::new(1.0, 1.0)),
        ],
    )
    .into();
    stack.push(cx, points);
    log_curve("lookup.master", lut.curve(0)?);

    // Roto shape keyed at frames 0 and 12, then the second keyframe removed.
    let roto = Arc::new(RotoContext::new("Roto1"));
    let shape = Arc::new(BezierShape::new(
        cx,
        "Bezier1",
        roto.clone(),
        &[(0.0, 0.0), (100.0, 0.0), (50.0, 80.0)],
        0.0,
    )?);
    let apex = CurveBinding::bezier(&shape, 2, Axis::Y)?;
    stack.push(
        cx,
        AddKeysCommand::new(view.clone(), [(apex.clone(), Keyframe::new(12.0, 80.0))]).into(),
    );
    stack.push(
        cx,
        RemoveKeysCommand::new(view, [(apex, Keyframe::new(12.0, 80.0))]).into(),
    );
    info!(shape = shape.name(), keyframes = ?shape.keyframe_times(), "shape state");

    // Walk the history back and forth.
    while stack.can_undo() {
        if let Some(text) = stack.undo_text() {
            info!(command = text, "undo");
        }
        stack.undo(cx);
    }
    log_curve("translate.x fully undone", translate.curve(0)?);
    while stack.redo(cx) {}
    log_curve("translate.x fully redone", translate.curve(0)?);

    if holder.is_in_change_block() {
        warn!(holder = holder.name(), "change block left open");
    }
    info!(
        holder = holder.name(),
        evaluations = holder.evaluation_count(),
        roto_evaluations = roto.evaluation_count(),
        "dependents recomputed"
    );
    Ok(())
}

fn log_curve(label: &str, curve: &Curve) {
    match serde_json::to_string(&curve.keyframes()) {
        Ok(json) => info!(label, keyframes = %json, "curve"),
        Err(err) => warn!(label, %err, "cannot serialize curve"),
    }
}
