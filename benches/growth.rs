//! Benchmarks for the growth calculation

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use oi_screener::detection::calculate_growth_pct;
use oi_screener::exchange::OiItem;

/// 15 minutes of readings at a 5 second poll interval
fn window(len: usize) -> Vec<OiItem> {
    (0..len)
        .map(|i| {
            let wobble = ((i * 7919) % 97) as f64;
            OiItem::new(i as i64 * 5_000, 1_000_000.0 + wobble * 250.0)
        })
        .collect()
}

fn benchmark_growth_full_window(c: &mut Criterion) {
    let items = window(180);

    c.bench_function("growth_full_window", |b| {
        b.iter(|| calculate_growth_pct(black_box(&items), black_box(0)))
    });
}

fn benchmark_growth_short_lookback(c: &mut Criterion) {
    let items = window(180);
    let since = 150 * 5_000;

    c.bench_function("growth_short_lookback", |b| {
        b.iter(|| calculate_growth_pct(black_box(&items), black_box(since)))
    });
}

fn benchmark_growth_universe(c: &mut Criterion) {
    let windows: Vec<Vec<OiItem>> = (0..500).map(|_| window(180)).collect();

    c.bench_function("growth_500_symbols", |b| {
        b.iter(|| {
            windows
                .iter()
                .filter_map(|w| calculate_growth_pct(black_box(w), 0))
                .filter(|pct| *pct > 5.0)
                .count()
        })
    });
}

criterion_group!(
    benches,
    benchmark_growth_full_window,
    benchmark_growth_short_lookback,
    benchmark_growth_universe
);
criterion_main!(benches);
