//! Keyframes, interpolation kinds and value clamping.
//!
//! A keyframe is a timed sample carrying its own interpolation kind and a
//! pair of tangent slopes. Auto kinds derive their slopes from neighbouring
//! keyframes; `Free` and `Broken` keep whatever the user set.

use serde::{Deserialize, Serialize};
use std::fmt;

// ── Interpolation kinds ─────────────────────────────────────────

/// How the curve is shaped around a keyframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum KeyframeType {
    /// Hold the value until the next keyframe.
    Constant,
    /// Straight segments to both neighbours.
    Linear,
    /// Catmull-Rom slope, flattened at extrema so the curve never overshoots.
    #[default]
    Smooth,
    /// Catmull-Rom slope.
    CatmullRom,
    /// Natural cubic spline slope.
    Cubic,
    /// Flat tangents.
    Horizontal,
    /// User tangents, left and right tied.
    Free,
    /// User tangents, left and right independent.
    Broken,
}

impl KeyframeType {
    /// Whether the tangents are user-controlled rather than derived.
    #[inline]
    pub fn has_user_tangents(self) -> bool {
        matches!(self, Self::Free | Self::Broken)
    }

    /// Kinds a bezier control point accepts: anything but `Constant`
    /// becomes `Linear`.
    #[inline]
    pub fn restricted_to_shape(self) -> Self {
        match self {
            Self::Constant => Self::Constant,
            _ => Self::Linear,
        }
    }

    /// Display name for the undo history and menus.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Constant => "Constant",
            Self::Linear => "Linear",
            Self::Smooth => "Smooth",
            Self::CatmullRom => "Catmull-Rom",
            Self::Cubic => "Cubic",
            Self::Horizontal => "Horizontal",
            Self::Free => "Free",
            Self::Broken => "Broken",
        }
    }
}

/// Which tangent of a keyframe is being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TangentSide {
    Left,
    Right,
}

// ── Clamp policy ────────────────────────────────────────────────

/// Rounding applied to every value written into a curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ValueClamp {
    #[default]
    Unclamped,
    /// Round half up to the nearest integer.
    Integer,
    /// Threshold at 0.5 to exactly 0 or 1.
    Boolean,
}

impl ValueClamp {
    /// Apply the policy to a value.
    #[inline]
    pub fn apply(self, value: f64) -> f64 {
        match self {
            Self::Unclamped => value,
            Self::Integer => (value + 0.5).floor(),
            Self::Boolean => {
                if value < 0.5 {
                    0.0
                } else {
                    1.0
                }
            }
        }
    }

    /// Whether `value` already satisfies the policy.
    pub fn admits(self, value: f64) -> bool {
        match self {
            Self::Unclamped => true,
            Self::Integer => value.fract() == 0.0,
            Self::Boolean => value == 0.0 || value == 1.0,
        }
    }
}

// ── Keyframe ────────────────────────────────────────────────────

/// A single sample of a curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub time: f64,
    pub value: f64,
    pub interpolation: KeyframeType,
    /// Slope arriving at the keyframe.
    pub left_derivative: f64,
    /// Slope leaving the keyframe.
    pub right_derivative: f64,
}

impl Keyframe {
    /// Create a keyframe with the default interpolation and flat tangents.
    pub fn new(time: f64, value: f64) -> Self {
        Self {
            time,
            value,
            interpolation: KeyframeType::default(),
            left_derivative: 0.0,
            right_derivative: 0.0,
        }
    }

    /// Create a keyframe with a specific interpolation kind.
    pub fn with_interpolation(time: f64, value: f64, interpolation: KeyframeType) -> Self {
        Self {
            interpolation,
            ..Self::new(time, value)
        }
    }

    /// Set both tangents.
    pub fn with_derivatives(mut self, left: f64, right: f64) -> Self {
        self.left_derivative = left;
        self.right_derivative = right;
        self
    }

    /// Slope on the given side.
    #[inline]
    pub fn derivative(&self, side: TangentSide) -> f64 {
        match side {
            TangentSide::Left => self.left_derivative,
            TangentSide::Right => self.right_derivative,
        }
    }

    /// Bitwise comparison, treating `-0.0` and `0.0` as distinct.
    ///
    /// Undo is expected to restore keyframes exactly, so tests compare with
    /// this rather than `==`.
    pub fn is_identical(&self, other: &Self) -> bool {
        self.time.to_bits() == other.time.to_bits()
            && self.value.to_bits() == other.value.to_bits()
            && self.interpolation == other.interpolation
            && self.left_derivative.to_bits() == other.left_derivative.to_bits()
            && self.right_derivative.to_bits() == other.right_derivative.to_bits()
    }
}

impl fmt::Display for Keyframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}) {} [{}, {}]",
            self.time,
            self.value,
            self.interpolation.display_name(),
            self.left_derivative,
            self.right_derivative
        )
    }
}

// ── Tests ───────────────────────────────────────────────────────
