//! Property tests over random price paths

use crate::common::hlc_bars;
use ema_paper::backtest::ReplayDriver;
use ema_paper::execution::{MultiplierPricer, PaperEngine, TradeEvent};
use ema_paper::feed::Bar;
use ema_paper::ledger::MemoryLedger;
use ema_paper::risk::LotSizer;
use ema_paper::signal::{CrossoverDetector, Side};
use proptest::prelude::*;

const MAX_RISK: f64 = 40.0;
const LOT_SIZE: u64 = 75;
const MAX_LOTS: u64 = 4;

/// Random walk around 25000 with noisy ranges
fn price_path() -> impl Strategy<Value = Vec<Bar>> {
    prop::collection::vec((-30.0f64..30.0, 0.0f64..25.0, 0.0f64..25.0), 0..200).prop_map(
        |steps| {
            let mut close = 25_000.0;
            let rows: Vec<(f64, f64, f64)> = steps
                .into_iter()
                .map(|(step, up, down)| {
                    close += step;
                    (close + up, close - down, close)
                })
                .collect();
            hlc_bars(&rows)
        },
    )
}

fn engine(balance: f64, protective_exits: bool) -> PaperEngine {
    PaperEngine::new(
        "NIFTY 50",
        MultiplierPricer::new(0.01),
        LotSizer::new(LOT_SIZE, MAX_LOTS),
        balance,
    )
    .with_protective_exits(protective_exits)
}

proptest! {
    #[test]
    fn prop_signal_setups_are_bounded(bars in price_path()) {
        let detector = CrossoverDetector::new(3, 8, MAX_RISK);
        let signals = detector.generate(&bars);
        prop_assert_eq!(signals.len(), bars.len());

        for (i, signal) in signals.iter().enumerate() {
            prop_assert_eq!(signal.timestamp, bars[i].timestamp);
            let Some(setup) = signal.setup else { continue };

            // Long EMA needs a full span of bars
            prop_assert!(i >= 7);
            prop_assert!(setup.risk > 0.0 && setup.risk <= MAX_RISK);
            let expected = signal.entry_price + setup.side.sign() * 2.0 * setup.risk;
            prop_assert_eq!(setup.target, expected);
            match setup.side {
                Side::Long => prop_assert_eq!(setup.stop_loss, bars[i - 1].low),
                Side::Short => prop_assert_eq!(setup.stop_loss, bars[i - 1].high),
            }
        }
    }

    #[test]
    fn prop_replay_keeps_engine_invariants(
        bars in price_path(),
        balance in 0.0f64..200_000.0,
        protective_exits in any::<bool>(),
    ) {
        let detector = CrossoverDetector::new(3, 8, MAX_RISK);
        let mut engine = engine(balance, protective_exits);
        let mut ledger = MemoryLedger::new();
        let report = ReplayDriver::new(&detector, &mut engine, &mut ledger).run(&bars);

        let mut open_side = None;
        for event in &report.events {
            prop_assert!(event.balance() >= 0.0);
            match event {
                TradeEvent::Entry(e) => {
                    // At most one open position
                    prop_assert!(open_side.is_none());
                    open_side = Some(e.side);
                    prop_assert!(e.quantity > 0);
                    prop_assert_eq!(e.quantity % LOT_SIZE, 0);
                    prop_assert!(e.quantity <= LOT_SIZE * MAX_LOTS);
                }
                TradeEvent::Exit(x) => {
                    prop_assert_eq!(open_side.take(), Some(x.side));
                    let moved = (x.exit_price - x.entry_price) * x.side.sign();
                    if moved > 0.0 {
                        prop_assert!(x.pnl > 0.0);
                    } else if moved < 0.0 {
                        prop_assert!(x.pnl < 0.0);
                    }
                    let expected =
                        (x.exit_price - x.entry_price) * x.quantity as f64 * x.side.sign();
                    prop_assert_eq!(x.pnl, expected);
                }
            }
        }
        prop_assert_eq!(open_side.is_some(), !engine.is_flat());
        prop_assert!(engine.balance() >= 0.0);
    }

    #[test]
    fn prop_replay_is_deterministic(bars in price_path()) {
        let detector = CrossoverDetector::new(3, 8, MAX_RISK);
        let run = || {
            let mut engine = engine(100_000.0, true);
            let mut ledger = MemoryLedger::new();
            ReplayDriver::new(&detector, &mut engine, &mut ledger).run(&bars).events
        };
        prop_assert_eq!(run(), run());
    }
}
