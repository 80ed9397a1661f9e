//! Benchmarks for indicator implementations.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sigkit_core::{Bar, PriceSeries};
use sigkit_indicators::{atr, compute_indicators, ema, rsi, sma, IndicatorConfig};

fn generate_test_data(size: usize) -> Vec<f64> {
    (0..size)
        .map(|i| 100.0 + (i as f64 * 0.1).sin() * 10.0)
        .collect()
}

fn generate_series(size: usize) -> PriceSeries {
    let bars = generate_test_data(size)
        .into_iter()
        .enumerate()
        .map(|(i, c)| Bar::new(i as i64 * 60_000, c, c + 0.5, c - 0.5, c, 1000.0))
        .collect();
    PriceSeries::new("BENCH", bars).expect("valid series")
}

fn benchmark_moving_averages(c: &mut Criterion) {
    let mut group = c.benchmark_group("MovingAverage");

    for size in [1000, 10000, 100000].iter() {
        let data = generate_test_data(*size);

        group.bench_with_input(BenchmarkId::new("sma", size), &data, |b, data| {
            b.iter(|| sma(black_box(data), black_box(20)))
        });

        group.bench_with_input(BenchmarkId::new("ema", size), &data, |b, data| {
            b.iter(|| ema(black_box(data), black_box(20)))
        });
    }

    group.finish();
}

fn benchmark_wilder(c: &mut Criterion) {
    let mut group = c.benchmark_group("Wilder");

    for size in [1000, 10000, 100000].iter() {
        let data = generate_test_data(*size);
        let high: Vec<f64> = data.iter().map(|c| c + 0.5).collect();
        let low: Vec<f64> = data.iter().map(|c| c - 0.5).collect();

        group.bench_with_input(BenchmarkId::new("rsi", size), &data, |b, data| {
            b.iter(|| rsi(black_box(data), black_box(14)))
        });

        group.bench_with_input(BenchmarkId::new("atr", size), &data, |b, data| {
            b.iter(|| atr(black_box(&high), black_box(&low), black_box(data), black_box(14)))
        });
    }

    group.finish();
}

fn benchmark_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("Frame");
    let config = IndicatorConfig::default();

    for size in [1000, 10000].iter() {
        let series = generate_series(*size);

        group.bench_with_input(BenchmarkId::new("compute_indicators", size), &series, |b, series| {
            b.iter(|| compute_indicators(black_box(series), &config))
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_moving_averages, benchmark_wilder, benchmark_frame);
criterion_main!(benches);
