//! Criterion benchmarks for the series primitives used by daily aggregation.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nf3_math::{iqr_bounds, partitioned_cumulative_sum, trailing_mean};

fn synthetic_daily(n: usize) -> Vec<f64> {
    // Deterministic LCG jitter around a daily baseline.
    let mut state = 0x9e37_79b9_7f4a_7c15u64;
    (0..n)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            let frac = (state >> 33) as f64 / (1u64 << 31) as f64;
            40.0 + 10.0 * frac
        })
        .collect()
}

fn bench_series_ops(c: &mut Criterion) {
    let values = synthetic_daily(3650);
    let months: Vec<usize> = (0..values.len()).map(|i| i / 30).collect();

    c.bench_function("trailing_mean_30d_10y", |b| {
        b.iter(|| trailing_mean(black_box(&values), 30))
    });
    c.bench_function("iqr_bounds_10y", |b| {
        b.iter(|| iqr_bounds(black_box(&values), 1.5))
    });
    c.bench_function("monthly_cumsum_10y", |b| {
        b.iter(|| partitioned_cumulative_sum(black_box(&values), black_box(&months)))
    });
}

criterion_group!(benches, bench_series_ops);
criterion_main!(benches);
