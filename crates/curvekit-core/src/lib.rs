//! CurveKit Core - keyframe and curve model
//!
//! This crate provides the data model edited by `curvekit-edit`:
//! - Keyframes, interpolation kinds and clamp policies
//! - Curves with unique-time ordering and derived tangents
//! - Hermite evaluation of curve segments
//! - Affine transforms over the time/value plane
//! - The editing-context capability token

pub mod context;
pub mod curve;
pub mod error;
pub mod geometry;
pub mod interpolation;
pub mod keyframe;

pub use context::EditContext;
pub use curve::{Curve, CurveId};
pub use error::{CurveError, Result};
pub use geometry::KeyTransform;
pub use keyframe::{Keyframe, KeyframeType, TangentSide, ValueClamp};
