//! Error types for curve operations.

use thiserror::Error;

/// Errors raised by direct curve mutation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CurveError {
    #[error("keyframe index {index} out of range (curve has {len} keyframes)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("another keyframe already exists at time {time}")]
    TimeCollision { time: f64 },

    #[error("no keyframe at time {time}")]
    KeyframeNotFound { time: f64 },

    #[error("non-finite input: {0}")]
    NonFiniteInput(&'static str),
}

/// Result type alias for curve operations.
pub type Result<T> = std::result::Result<T, CurveError>;
