use std::time::Duration;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use dataset_dashboard::stats::{summarize, MedianRule};

// Deterministic pseudo-random values with plenty of repeats.
fn dataset(len: usize) -> Vec<f64> {
    let mut state = 0x2545_f491_u64;
    (0..len)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            ((state >> 33) % 1000) as f64 / 10.0
        })
        .collect()
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("summarize");
    group.measurement_time(Duration::from_secs(10));

    for len in [100, 10_000, 1_000_000] {
        let values = dataset(len);
        group.bench_with_input(BenchmarkId::new("compat", len), &values, |b, values| {
            b.iter(|| summarize(values, MedianRule::Compat))
        });
    }
    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
