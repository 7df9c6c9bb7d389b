//! Affine transforms applied to keyframes seen as `(time, value)` points.

use glam::{DMat3, DVec2};
use serde::{Deserialize, Serialize};

/// 2D affine transform on the time/value plane.
///
/// Stored as a full 3×3 matrix so that successive interactive transforms can
/// be composed by plain matrix product.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyTransform {
    matrix: DMat3,
}

impl KeyTransform {
    /// Identity transform.
    pub const IDENTITY: Self = Self {
        matrix: DMat3::IDENTITY,
    };

    /// Translate by `translation`, then scale by `scale` about `pivot`.
    ///
    /// Equivalent to `T(translation) · T(pivot) · S(scale) · T(-pivot)`.
    pub fn canonical(translation: DVec2, scale: DVec2, pivot: DVec2) -> Self {
        let matrix = DMat3::from_translation(translation)
            * DMat3::from_translation(pivot)
            * DMat3::from_scale(scale)
            * DMat3::from_translation(-pivot);
        Self { matrix }
    }

    /// Pure translation.
    #[inline]
    pub fn translate(dt: f64, dv: f64) -> Self {
        Self {
            matrix: DMat3::from_translation(DVec2::new(dt, dv)),
        }
    }

    /// Wrap an arbitrary matrix.
    #[inline]
    pub fn from_matrix(matrix: DMat3) -> Self {
        Self { matrix }
    }

    /// The underlying matrix.
    #[inline]
    pub fn matrix(&self) -> DMat3 {
        self.matrix
    }

    /// Transform that applies `self` first and then `next`.
    #[inline]
    pub fn then(&self, next: &Self) -> Self {
        Self {
            matrix: next.matrix * self.matrix,
        }
    }

    /// Map a `(time, value)` pair.
    #[inline]
    pub fn apply(&self, time: f64, value: f64) -> (f64, f64) {
        let p = self.matrix.transform_point2(DVec2::new(time, value));
        (p.x, p.y)
    }
}

impl Default for KeyTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

// ── Tests ───────────────────────────────────────────────────────
