//! Tangent computation and segment evaluation.
//!
//! Slopes are expressed in value units per time unit. A segment between two
//! keyframes is a cubic Hermite spline using the right slope of its left key
//! and the left slope of its right key, so a pair of `Linear` keys yields a
//! straight line without a special case.

use crate::keyframe::{Keyframe, KeyframeType};

/// Recompute the derived tangents of every keyframe whose kind is not
/// user-controlled. `keys` must be sorted by time with unique times.
pub fn refresh_tangents(keys: &mut [Keyframe]) {
    let cubic = if keys.iter().any(|k| k.interpolation == KeyframeType::Cubic) {
        natural_spline_slopes(keys)
    } else {
        Vec::new()
    };

    for i in 0..keys.len() {
        let kind = keys[i].interpolation;
        if kind.has_user_tangents() {
            continue;
        }
        let prev_secant = (i > 0).then(|| secant(&keys[i - 1], &keys[i]));
        let next_secant = (i + 1 < keys.len()).then(|| secant(&keys[i], &keys[i + 1]));

        let (left, right) = match kind {
            KeyframeType::Constant | KeyframeType::Horizontal => (0.0, 0.0),
            KeyframeType::Linear => {
                let left = prev_secant.or(next_secant).unwrap_or(0.0);
                let right = next_secant.or(prev_secant).unwrap_or(0.0);
                (left, right)
            }
            KeyframeType::CatmullRom => {
                let slope = catmull_rom_slope(keys, i, prev_secant, next_secant);
                (slope, slope)
            }
            KeyframeType::Smooth => {
                let slope = smooth_slope(keys, i, prev_secant, next_secant);
                (slope, slope)
            }
            KeyframeType::Cubic => {
                let slope = cubic.get(i).copied().unwrap_or(0.0);
                (slope, slope)
            }
            KeyframeType::Free | KeyframeType::Broken => unreachable!(),
        };
        keys[i].left_derivative = left;
        keys[i].right_derivative = right;
    }
}

/// Evaluate sorted keyframes at `time`. Values are held constant outside the
/// keyed range; an empty set evaluates to 0.
pub fn evaluate(keys: &[Keyframe], time: f64) -> f64 {
    let (first, last) = match (keys.first(), keys.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return 0.0,
    };
    if time <= first.time {
        return first.value;
    }
    if time >= last.time {
        return last.value;
    }

    let idx = keys.partition_point(|k| k.time <= time).saturating_sub(1);
    let a = &keys[idx];
    let b = &keys[idx + 1];
    if a.interpolation == KeyframeType::Constant {
        return a.value;
    }

    let span = b.time - a.time;
    let s = (time - a.time) / span;
    hermite(a.value, a.right_derivative * span, b.value, b.left_derivative * span, s)
}

/// Cubic Hermite basis on `s` in `[0, 1]`, tangents already scaled by span.
#[inline]
pub fn hermite(p0: f64, m0: f64, p1: f64, m1: f64, s: f64) -> f64 {
    let s2 = s * s;
    let s3 = s2 * s;

    let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
    let h10 = s3 - 2.0 * s2 + s;
    let h01 = -2.0 * s3 + 3.0 * s2;
    let h11 = s3 - s2;

    h00 * p0 + h10 * m0 + h01 * p1 + h11 * m1
}

#[inline]
fn secant(a: &Keyframe, b: &Keyframe) -> f64 {
    (b.value - a.value) / (b.time - a.time)
}

fn catmull_rom_slope(
    keys: &[Keyframe],
    i: usize,
    prev_secant: Option<f64>,
    next_secant: Option<f64>,
) -> f64 {
    match (prev_secant, next_secant) {
        (Some(_), Some(_)) => {
            let prev = &keys[i - 1];
            let next = &keys[i + 1];
            (next.value - prev.value) / (next.time - prev.time)
        }
        (Some(s), None) | (None, Some(s)) => s,
        (None, None) => 0.0,
    }
}

fn smooth_slope(
    keys: &[Keyframe],
    i: usize,
    prev_secant: Option<f64>,
    next_secant: Option<f64>,
) -> f64 {
    let (Some(dp), Some(dn)) = (prev_secant, next_secant) else {
        return 0.0;
    };
    // Extremum: flat tangent.
    if dp * dn <= 0.0 {
        return 0.0;
    }
    let slope = catmull_rom_slope(keys, i, prev_secant, next_secant);
    let limit = 3.0 * dp.abs().min(dn.abs());
    slope.clamp(-limit, limit)
}

/// Slopes of the natural cubic spline through all keys (zero second
/// derivative at both ends), solved with the Thomas algorithm.
fn natural_spline_slopes(keys: &[Keyframe]) -> Vec<f64> {
    let n = keys.len();
    if n < 2 {
        return vec![0.0; n];
    }

    let h: Vec<f64> = keys.windows(2).map(|w| w[1].time - w[0].time).collect();
    let d: Vec<f64> = keys.windows(2).map(|w| secant(&w[0], &w[1])).collect();

    // Tridiagonal system a[i] m[i-1] + b[i] m[i] + c[i] m[i+1] = r[i].
    let mut a = vec![0.0; n];
    let mut b = vec![0.0; n];
    let mut c = vec![0.0; n];
    let mut r = vec![0.0; n];

    b[0] = 2.0;
    c[0] = 1.0;
    r[0] = 3.0 * d[0];
    for i in 1..n - 1 {
        a[i] = h[i];
        b[i] = 2.0 * (h[i - 1] + h[i]);
        c[i] = h[i - 1];
        r[i] = 3.0 * (h[i] * d[i - 1] + h[i - 1] * d[i]);
    }
    a[n - 1] = 1.0;
    b[n - 1] = 2.0;
    r[n - 1] = 3.0 * d[n - 2];

    for i in 1..n {
        let w = a[i] / b[i - 1];
        b[i] -= w * c[i - 1];
        r[i] -= w * r[i - 1];
    }
    let mut m = vec![0.0; n];
    m[n - 1] = r[n - 1] / b[n - 1];
    for i in (0..n - 1).rev() {
        m[i] = (r[i] - c[i] * m[i + 1]) / b[i];
    }
    m
}

// ── Tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(kind: KeyframeType, points: &[(f64, f64)]) -> Vec<Keyframe> {
        let mut keys: Vec<Keyframe> = points
            .iter()
            .map(|&(t, v)| Keyframe::with_interpolation(t, v, kind))
            .collect();
        refresh_tangents(&mut keys);
        keys
    }

    #[test]
    fn test_linear_tangents_are_secants() {
        let k = keys(KeyframeType::Linear, &[(0.0, 0.0), (2.0, 4.0), (4.0, 0.0)]);
        assert_eq!(k[0].left_derivative, 2.0);
        assert_eq!(k[0].right_derivative, 2.0);
        assert_eq!(k[1].left_derivative, 2.0);
        assert_eq!(k[1].right_derivative, -2.0);
        assert_eq!(k[2].left_derivative, -2.0);
    }

    #[test]
    fn test_linear_evaluation_is_straight() {
        let k = keys(KeyframeType::Linear, &[(0.0, 0.0), (10.0, 100.0)]);
        assert!((evaluate(&k, 2.5) - 25.0).abs() < 1e-9);
        assert!((evaluate(&k, 7.0) - 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_constant_holds() {
        let k = keys(KeyframeType::Constant, &[(0.0, 1.0), (10.0, 5.0)]);
        assert_eq!(evaluate(&k, 9.99), 1.0);
        assert_eq!(evaluate(&k, 10.0), 5.0);
    }

    #[test]
    fn test_extrapolation_holds_end_values() {
        let k = keys(KeyframeType::Linear, &[(1.0, 10.0), (3.0, 30.0)]);
        assert_eq!(evaluate(&k, -5.0), 10.0);
        assert_eq!(evaluate(&k, 50.0), 30.0);
        assert_eq!(evaluate(&[], 1.0), 0.0);
    }

    #[test]
    fn test_smooth_flat_at_extremum_and_ends() {
        let k = keys(KeyframeType::Smooth, &[(0.0, 0.0), (1.0, 5.0), (2.0, 0.0)]);
        assert_eq!(k[0].right_derivative, 0.0);
        assert_eq!(k[1].left_derivative, 0.0);
        assert_eq!(k[2].left_derivative, 0.0);
    }

    #[test]
    fn test_smooth_monotonic_uses_catmull_rom() {
        let k = keys(KeyframeType::Smooth, &[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]);
        assert_eq!(k[1].left_derivative, 1.0);
        assert_eq!(k[1].right_derivative, 1.0);
    }

    #[test]
    fn test_catmull_rom_interior_slope() {
        let k = keys(KeyframeType::CatmullRom, &[(0.0, 0.0), (1.0, 3.0), (3.0, 1.0)]);
        assert!((k[1].left_derivative - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_cubic_on_line_has_line_slope() {
        let k = keys(
            KeyframeType::Cubic,
            &[(0.0, 0.0), (1.0, 2.0), (3.0, 6.0), (4.0, 8.0)],
        );
        for key in &k {
            assert!((key.left_derivative - 2.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_user_tangents_untouched() {
        let mut k = vec![
            Keyframe::with_interpolation(0.0, 0.0, KeyframeType::Broken).with_derivatives(1.0, -1.0),
            Keyframe::with_interpolation(1.0, 1.0, KeyframeType::Linear),
        ];
        refresh_tangents(&mut k);
        assert_eq!(k[0].left_derivative, 1.0);
        assert_eq!(k[0].right_derivative, -1.0);
    }
}
