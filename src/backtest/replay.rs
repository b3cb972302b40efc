//! Deterministic single-pass replay over a finite bar series

use crate::execution::{Action, Notice, PaperEngine, SyntheticPricer, TradeEvent};
use crate::feed::Bar;
use crate::ledger::{LedgerFailure, LedgerRecorder, TradeLedger};
use crate::risk::DrawdownMonitor;
use crate::signal::CrossoverDetector;
use crate::telemetry::{self, CounterMetric, GaugeMetric, LatencyMetric};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Instant;

/// A signal or exit that was dropped, with the bar it happened on
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoticeRecord {
    pub timestamp: DateTime<Utc>,
    pub notice: Notice,
}

/// Everything a replay produced
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    /// Trade events in the order they were emitted
    pub events: Vec<TradeEvent>,
    pub notices: Vec<NoticeRecord>,
    pub ledger_failures: Vec<LedgerFailure>,
    /// Bars in the series, valid or not
    pub bars: usize,
    /// Bars that produced an entry setup
    pub entry_signals: usize,
    pub initial_balance: f64,
    pub final_balance: f64,
    /// Final balance plus any still-open position marked at the last close
    pub final_equity: f64,
    /// Equity after each bar with a finite close
    pub equity_curve: Vec<(DateTime<Utc>, f64)>,
    pub drawdown: DrawdownMonitor,
}

impl ReplayReport {
    pub fn exits(&self) -> impl Iterator<Item = &crate::execution::ExitEvent> {
        self.events.iter().filter_map(|e| match e {
            TradeEvent::Exit(x) => Some(x),
            TradeEvent::Entry(_) => None,
        })
    }
}

/// Runs the generator once over a series and feeds every bar to the engine.
///
/// Each bar is first checked against the open position's stop and target,
/// then its signal is applied. Ledger writes follow the engine: a failed write
/// is reported, never rolled back.
pub struct ReplayDriver<'a, P: SyntheticPricer, L: TradeLedger> {
    detector: &'a CrossoverDetector,
    engine: &'a mut PaperEngine<P>,
    ledger: &'a mut L,
    recorder: LedgerRecorder,
}

impl<'a, P: SyntheticPricer, L: TradeLedger> ReplayDriver<'a, P, L> {
    pub fn new(
        detector: &'a CrossoverDetector,
        engine: &'a mut PaperEngine<P>,
        ledger: &'a mut L,
    ) -> Self {
        Self {
            detector,
            engine,
            ledger,
            recorder: LedgerRecorder::new(),
        }
    }

    /// Replay `bars` (ascending, de-duplicated) through the engine
    pub fn run(mut self, bars: &[Bar]) -> ReplayReport {
        let started = Instant::now();
        let signals = self.detector.generate(bars);
        telemetry::record_latency(LatencyMetric::SignalGeneration, started.elapsed());

        let initial_balance = self.engine.balance();
        let mut report = ReplayReport {
            events: Vec::new(),
            notices: Vec::new(),
            ledger_failures: Vec::new(),
            bars: bars.len(),
            entry_signals: 0,
            initial_balance,
            final_balance: initial_balance,
            final_equity: initial_balance,
            equity_curve: Vec::with_capacity(bars.len()),
            drawdown: DrawdownMonitor::new(initial_balance),
        };
        let mut last_mark = None;

        for (bar, signal) in bars.iter().zip(&signals) {
            let exit = self.engine.on_bar(bar);
            self.handle(exit, bar.timestamp, &mut report);

            if signal.is_entry() {
                report.entry_signals += 1;
                telemetry::increment(CounterMetric::SignalsEvaluated);
            }
            let action = self.engine.on_signal(signal);
            self.handle(action, bar.timestamp, &mut report);

            if bar.close.is_finite() && bar.close >= 0.0 {
                last_mark = Some(bar.close);
                let equity = self.engine.equity(bar.close);
                report.drawdown.update(equity);
                report.equity_curve.push((bar.timestamp, equity));
                telemetry::set_gauge(GaugeMetric::Equity, equity);
            }
        }

        report.final_balance = self.engine.balance();
        report.final_equity = match last_mark {
            Some(mark) => self.engine.equity(mark),
            None => self.engine.balance(),
        };

        tracing::info!(
            bars = report.bars,
            trades = report.events.len(),
            notices = report.notices.len(),
            ledger_failures = report.ledger_failures.len(),
            final_balance = report.final_balance,
            final_equity = report.final_equity,
            "Replay complete"
        );
        report
    }

    fn handle(&mut self, action: Action, timestamp: DateTime<Utc>, report: &mut ReplayReport) {
        telemetry::record_action(&action);
        match action {
            Action::Trade(event) => {
                if let Some(failure) = self.recorder.record_or_log(&mut *self.ledger, &event) {
                    report.ledger_failures.push(failure);
                }
                report.events.push(event);
            }
            Action::Skipped(notice) => report.notices.push(NoticeRecord { timestamp, notice }),
            Action::Idle => {}
        }
    }
}
