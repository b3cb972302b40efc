//! Replay driver integration tests

use crate::common::{bars, engine, ts, FailingLedger};
use ema_paper::backtest::{BacktestSummary, ReplayDriver};
use ema_paper::execution::{Action, Notice, TradeEvent, TradeStatus};
use ema_paper::feed::CsvBarFeed;
use ema_paper::ledger::{JsonlLedger, MemoryLedger};
use ema_paper::signal::{CrossoverDetector, Side};
use std::io::Write;

const SCENARIO: [f64; 6] = [100.0, 101.0, 99.0, 98.0, 105.0, 110.0];

#[test]
fn test_scenario_with_protective_exits() {
    let detector = CrossoverDetector::new(2, 3, 10.0);
    let mut engine = engine(1000.0);
    let mut ledger = MemoryLedger::new();

    let report = ReplayDriver::new(&detector, &mut engine, &mut ledger).run(&bars(&SCENARIO));

    // Short at 99, stopped at 102 on the 105 bar, whose long crossover then enters
    assert_eq!(report.events.len(), 3);
    let TradeEvent::Entry(short) = &report.events[0] else {
        panic!("expected entry");
    };
    assert_eq!(short.side, Side::Short);
    assert_eq!(short.stop_loss, 102.0);
    assert_eq!(short.target_price, 93.0);
    assert_eq!(short.quantity, 300);

    let TradeEvent::Exit(stop) = &report.events[1] else {
        panic!("expected exit");
    };
    assert_eq!(stop.status, TradeStatus::StoppedOut);
    assert_eq!(stop.underlying_price, 102.0);
    assert!((stop.pnl - -9.0).abs() < 1e-9);

    let TradeEvent::Entry(long) = &report.events[2] else {
        panic!("expected entry");
    };
    assert_eq!(long.side, Side::Long);
    assert_eq!(long.stop_loss, 97.0);
    assert_eq!(long.target_price, 121.0);
    assert_eq!(long.timestamp, ts(4));

    assert!(!engine.is_flat());
    assert_eq!(ledger.opens().count(), 2);
    assert_eq!(ledger.closes().count(), 1);
}

#[test]
fn test_failed_ledger_writes_leave_replay_unchanged() {
    let detector = CrossoverDetector::new(2, 3, 10.0);
    let series = bars(&SCENARIO);

    let mut engine_ok = engine(1000.0);
    let mut memory = MemoryLedger::new();
    let recorded = ReplayDriver::new(&detector, &mut engine_ok, &mut memory).run(&series);

    let mut engine_failing = engine(1000.0);
    let report = ReplayDriver::new(&detector, &mut engine_failing, &mut FailingLedger).run(&series);

    assert_eq!(report.events.len(), 3);
    assert_eq!(report.ledger_failures.len(), report.events.len());
    assert!(report
        .ledger_failures
        .iter()
        .zip(&report.events)
        .all(|(f, e)| f.trade_id == e.trade_id() && f.error.contains("disk full")));
    assert_eq!(report.events, recorded.events);
    assert_eq!(report.final_balance, recorded.final_balance);
    assert_eq!(engine_failing.balance(), engine_ok.balance());
    assert_eq!(BacktestSummary::from_report(&report).ledger_failures, 3);
}

#[test]
fn test_replay_is_idempotent() {
    let series = bars(&[
        100.0, 101.0, 99.0, 98.0, 105.0, 110.0, 104.0, 99.0, 97.0, 103.0, 108.0, 101.0,
    ]);
    let detector = CrossoverDetector::new(2, 3, 10.0);

    let run = || {
        let mut engine = engine(1000.0);
        let mut ledger = MemoryLedger::new();
        let report = ReplayDriver::new(&detector, &mut engine, &mut ledger).run(&series);
        (report.events, report.final_balance, ledger.entries().len())
    };

    let (first, balance_a, rows_a) = run();
    let (second, balance_b, rows_b) = run();
    assert!(!first.is_empty());
    assert_eq!(first, second);
    assert_eq!(balance_a, balance_b);
    assert_eq!(rows_a, rows_b);
}

#[test]
fn test_insufficient_capital_is_a_notice() {
    // One lot at synthetic 0.99 costs 74.25
    let detector = CrossoverDetector::new(2, 3, 10.0);
    let mut engine = engine(50.0);
    let mut ledger = MemoryLedger::new();

    let report = ReplayDriver::new(&detector, &mut engine, &mut ledger).run(&bars(&SCENARIO));

    assert!(report.events.is_empty());
    assert!(report
        .notices
        .iter()
        .all(|n| matches!(n.notice, Notice::InsufficientCapital { .. })));
    assert_eq!(report.notices.len(), 2);
    assert_eq!(report.final_balance, 50.0);
}

#[test]
fn test_exit_while_flat_is_noop() {
    let mut engine = engine(1000.0);
    let action = engine.exit(100.0, ts(0), TradeStatus::Closed);
    assert_eq!(action, Action::Skipped(Notice::NotPositioned));
    assert_eq!(engine.balance(), 1000.0);
}

#[test]
fn test_csv_to_jsonl_backtest() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("bars.csv");
    let mut csv = std::fs::File::create(&csv_path).unwrap();
    writeln!(csv, "Datetime,Open,High,Low,Close,Volume").unwrap();
    for (i, close) in SCENARIO.iter().enumerate() {
        writeln!(
            csv,
            "{},{close},{},{},{close},100",
            ts(i).to_rfc3339(),
            close + 1.0,
            close - 1.0
        )
        .unwrap();
    }

    let series = CsvBarFeed::new(&csv_path).load().unwrap();
    let detector = CrossoverDetector::new(2, 3, 10.0);
    let mut engine = engine(1000.0).with_protective_exits(false);
    let ledger_path = dir.path().join("trades.jsonl");
    let mut ledger = JsonlLedger::open(&ledger_path).unwrap();

    let report = ReplayDriver::new(&detector, &mut engine, &mut ledger).run(series.bars());
    let summary = BacktestSummary::from_report(&report);

    assert_eq!(summary.bars, 6);
    assert_eq!(summary.entry_signals, 2);
    assert_eq!(summary.total_trades, 1);
    assert_eq!(summary.win_rate, 0.0);
    assert!(summary.total_return < 0.0);

    let lines: Vec<serde_json::Value> = std::fs::read_to_string(&ledger_path)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["side"], "SHORT");
    assert_eq!(lines[0]["quantity"], 300);
    assert_eq!(lines[1]["status"], "CLOSED");
    assert_eq!(lines[1]["trade_id"], lines[0]["trade_id"]);
    assert_eq!(lines[1]["ledger_id"], lines[0]["ledger_id"]);
}
