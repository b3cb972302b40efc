//! Benchmarks for signal generation and replay

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ema_paper::backtest::ReplayDriver;
use ema_paper::execution::{MultiplierPricer, PaperEngine};
use ema_paper::feed::Bar;
use ema_paper::ledger::MemoryLedger;
use ema_paper::risk::LotSizer;
use ema_paper::signal::CrossoverDetector;

/// One trading week of 5-minute bars on a deterministic zigzag
fn week_of_bars() -> Vec<Bar> {
    let start = Utc.with_ymd_and_hms(2025, 10, 13, 3, 45, 0).unwrap();
    (0..375)
        .map(|i| {
            let close = 25_000.0 + 60.0 * ((i as f64) / 12.0).sin() + (i % 7) as f64;
            Bar::new(
                start + Duration::minutes(5 * i),
                close,
                close + 8.0,
                close - 8.0,
                close,
            )
        })
        .collect()
}

fn benchmark_generate(c: &mut Criterion) {
    let bars = week_of_bars();
    let detector = CrossoverDetector::new(10, 20, 40.0);

    c.bench_function("ema_crossover_generate", |b| {
        b.iter(|| detector.generate(black_box(&bars)))
    });
}

fn benchmark_replay(c: &mut Criterion) {
    let bars = week_of_bars();
    let detector = CrossoverDetector::new(10, 20, 40.0);

    c.bench_function("replay_week", |b| {
        b.iter(|| {
            let mut engine = PaperEngine::new(
                "NIFTY 50",
                MultiplierPricer::new(0.01),
                LotSizer::new(75, 4),
                100_000.0,
            );
            let mut ledger = MemoryLedger::new();
            ReplayDriver::new(&detector, &mut engine, &mut ledger).run(black_box(&bars))
        })
    });
}

criterion_group!(benches, benchmark_generate, benchmark_replay);
criterion_main!(benches);
