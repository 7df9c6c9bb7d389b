//! Benchmarks for curve evaluation and tangent refresh.
//!
//! Run with: cargo bench -p curvekit-core

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use curvekit_core::{Curve, EditContext, Keyframe, KeyframeType, ValueClamp};

fn build_curve(kind: KeyframeType, count: usize) -> Curve {
    Curve::from_keyframes(
        ValueClamp::Unclamped,
        (0..count).map(|i| {
            let t = i as f64;
            Keyframe::with_interpolation(t, (t * 0.37).sin() * 100.0, kind)
        }),
    )
}

fn bench_evaluation(c: &mut Criterion) {
    let curve = build_curve(KeyframeType::Smooth, 1000);

    c.bench_function("value_at_1000_keys", |bencher| {
        bencher.iter(|| curve.value_at(black_box(512.25)));
    });
}

fn bench_tangent_refresh(c: &mut Criterion) {
    let cx = EditContext::new();
    let smooth = build_curve(KeyframeType::Smooth, 1000);
    let cubic = build_curve(KeyframeType::Cubic, 1000);

    c.bench_function("move_key_smooth_1000", |bencher| {
        bencher.iter(|| smooth.set_value_and_time_at(&cx, 500.0, black_box(3.0), 500));
    });

    c.bench_function("move_key_cubic_1000", |bencher| {
        bencher.iter(|| cubic.set_value_and_time_at(&cx, 500.0, black_box(3.0), 500));
    });
}

fn bench_snapshot(c: &mut Criterion) {
    let curve = build_curve(KeyframeType::Linear, 1000);

    c.bench_function("snapshot_1000_keys", |bencher| {
        bencher.iter(|| black_box(curve.keyframes()));
    });
}

criterion_group!(benches, bench_evaluation, bench_tangent_refresh, bench_snapshot);
criterion_main!(benches);
