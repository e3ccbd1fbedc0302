//! Criterion benchmarks for ReplayLab hot paths.
//!
//! Benchmarks:
//! 1. Bar loop (full backtest with a trivial and an indicator-driven strategy)
//! 2. Indicator computation (SMA, EMA, RSI, MACD, Bollinger)
//! 3. Metrics calculation over a long run

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use replaylab_core::domain::{closes, Bar};
use replaylab_core::engine::Backtester;
use replaylab_core::indicators::{bollinger_bands, ema, macd, rsi, sma};
use replaylab_core::metrics::{MetricsConfig, PerformanceReport};
use replaylab_core::strategy::{BuyAndHold, MultiIndicator, SmaCrossover};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_bars(n: usize) -> Vec<Bar> {
    let start = Utc.with_ymd_and_hms(2020, 1, 2, 0, 0, 0).unwrap();
    (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.1).sin() * 10.0;
            Bar::new(
                start + Duration::days(i as i64),
                close - 0.3,
                close + 1.5,
                close - 1.5,
                close,
                1_000_000.0,
            )
        })
        .collect()
}

// ── Bar loop ─────────────────────────────────────────────────────────

fn bench_bar_loop(c: &mut Criterion) {
    let mut group = c.benchmark_group("bar_loop");
    let backtester = Backtester::with_settings(100_000.0, 0.001).unwrap();

    for &bar_count in &[252, 1260, 2520] {
        let bars = make_bars(bar_count);

        group.bench_with_input(
            BenchmarkId::new("buy_and_hold", bar_count),
            &bar_count,
            |b, _| b.iter(|| backtester.run(black_box(&bars), &BuyAndHold)),
        );

        let crossover = SmaCrossover::default();
        group.bench_with_input(
            BenchmarkId::new("sma_crossover", bar_count),
            &bar_count,
            |b, _| b.iter(|| backtester.run(black_box(&bars), &crossover)),
        );
    }

    // Recomputes indicators over the whole prefix each bar.
    let bars = make_bars(504);
    group.bench_function("multi_indicator_504_bars", |b| {
        b.iter(|| backtester.run(black_box(&bars), &MultiIndicator));
    });

    group.finish();
}

// ── Indicators ───────────────────────────────────────────────────────

fn bench_indicators(c: &mut Criterion) {
    let mut group = c.benchmark_group("indicators");

    for &bar_count in &[252, 2520] {
        let values = closes(&make_bars(bar_count));

        group.bench_with_input(BenchmarkId::new("sma_20", bar_count), &values, |b, v| {
            b.iter(|| sma(black_box(v), 20));
        });
        group.bench_with_input(BenchmarkId::new("ema_21", bar_count), &values, |b, v| {
            b.iter(|| ema(black_box(v), 21));
        });
        group.bench_with_input(BenchmarkId::new("rsi_14", bar_count), &values, |b, v| {
            b.iter(|| rsi(black_box(v), 14));
        });
        group.bench_with_input(BenchmarkId::new("macd", bar_count), &values, |b, v| {
            b.iter(|| macd(black_box(v), 12, 26, 9));
        });
        group.bench_with_input(BenchmarkId::new("bollinger", bar_count), &values, |b, v| {
            b.iter(|| bollinger_bands(black_box(v), 20, 2.0));
        });
    }

    group.finish();
}

// ── Metrics ──────────────────────────────────────────────────────────

fn bench_metrics(c: &mut Criterion) {
    let bars = make_bars(2520);
    let result = Backtester::with_settings(100_000.0, 0.001)
        .unwrap()
        .run(&bars, &SmaCrossover::new(5, 20).unwrap())
        .unwrap();
    let config = MetricsConfig::default();

    c.bench_function("metrics_2520_bars", |b| {
        b.iter(|| {
            PerformanceReport::compute(
                black_box(&result.equity_curve),
                black_box(&result.trades),
                result.initial_capital,
                &config,
            )
        });
    });
}

criterion_group!(benches, bench_bar_loop, bench_indicators, bench_metrics);
criterion_main!(benches);
