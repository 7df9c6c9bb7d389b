//! Error types for curve editing.

use curvekit_core::CurveError;
use thiserror::Error;

/// Errors raised while editing a curve through its binding or owner.
///
/// Commands absorb these per item: one failing keyframe never aborts the
/// rest of a multi-key edit.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditError {
    #[error(transparent)]
    Curve(#[from] CurveError),

    #[error("binding expired: its curve or owner no longer exists")]
    ExpiredBinding,

    #[error("control point rejected on dimension {dimension}: {reason}")]
    ControlPointRejected { dimension: usize, reason: String },

    #[error("no keyframe at time {time}")]
    KeyframeNotFound { time: f64 },

    #[error("dimension {dimension} out of range ({count} dimensions)")]
    DimensionOutOfRange { dimension: usize, count: usize },

    #[error("control point {index} out of range ({count} points)")]
    PointOutOfRange { index: usize, count: usize },

    #[error("{0} is not supported by this binding")]
    Unsupported(&'static str),

    #[error("configuration error: {0}")]
    Config(String),
}

impl EditError {
    /// Whether the error signals a broken internal contract rather than an
    /// ordinary skipped item.
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::ControlPointRejected { .. })
    }
}

/// Result type alias for editing operations.
pub type EditResult<T> = std::result::Result<T, EditError>;
