//! CurveKit Edit - undoable editing of animation curves
//!
//! This crate provides the editing layer on top of `curvekit-core`:
//! - Curve owners: parameter holders, animated and parametric parameters,
//!   bezier shapes and their roto context
//! - `CurveBinding`, the uniform interface commands use to reach any owner
//! - Change batching so dependents recompute once per edit
//! - The edit commands and an undo stack that merges interactive drags

pub mod batch;
pub mod bezier;
pub mod binding;
pub mod commands;
pub mod config;
pub mod error;
pub mod holder;
pub mod param;
pub mod parametric;
pub mod selection;
pub mod undo;
pub mod view;

pub use batch::ChangeBatch;
pub use bezier::{Axis, BezierShape, ControlPoint, ShapeId, ShapeKeyframe, ShapeSnapshot};
pub use binding::{BindingTarget, CapturedState, ChangeTarget, CurveBinding, KeySnapshot, StateOwner};
pub use commands::{
    AddKeysCommand, CompressionId, Direction, EditCommand, MoveKeysCommand, MoveTangentCommand,
    RemoveKeysCommand, SetKeysInterpolationCommand, TransformKeysCommand, TANGENT_DX_EPSILON,
};
pub use config::EditorConfig;
pub use error::{EditError, EditResult};
pub use holder::{HolderId, ParamHolder, RotoContext, RotoId};
pub use param::{AnimatedParam, ParamId, ParamKind, ParamOwner};
pub use parametric::{ParametricId, ParametricParam};
pub use selection::{same_keys, sort_by_time, KeyRef, KeySelection, SelectedKey};
pub use undo::UndoStack;
pub use view::{CountingView, CurveView, NullView};
