//! Cooperative polling loop

use super::Pacer;
use crate::config::DriverConfig;
use crate::execution::{Action, PaperEngine, SyntheticPricer, TradeEvent};
use crate::feed::BarFeed;
use crate::ledger::{LedgerRecorder, TradeLedger};
use crate::signal::CrossoverDetector;
use crate::telemetry::{self, CounterMetric, GaugeMetric, LatencyMetric};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::{Duration, Instant};
use tokio::sync::watch;

/// Polling statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PollStats {
    /// Ticks started
    pub ticks: u64,
    /// Ticks dropped on fetch error, timeout or an empty window
    pub skipped: u64,
    /// Ticks whose latest bar had already been acted on
    pub unchanged: u64,
    pub trades: u64,
    pub notices: u64,
    pub ledger_failures: u64,
}

/// Result of one tick
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Nothing fetched; state untouched
    Skipped(String),
    /// Latest bar is not newer than the last one acted on
    Unchanged,
    /// Latest bar consumed; any trade events it produced
    Processed(Vec<TradeEvent>),
}

/// Fetch, evaluate, act, wait. Repeats until cancelled.
pub struct Poller<P: SyntheticPricer, L: TradeLedger> {
    feed: Box<dyn BarFeed>,
    detector: CrossoverDetector,
    engine: PaperEngine<P>,
    ledger: L,
    recorder: LedgerRecorder,
    pacer: Box<dyn Pacer>,
    interval: Duration,
    fetch_timeout: Duration,
    last_acted: Option<DateTime<Utc>>,
    stats: PollStats,
}

impl<P: SyntheticPricer, L: TradeLedger> Poller<P, L> {
    pub fn new(
        feed: Box<dyn BarFeed>,
        detector: CrossoverDetector,
        engine: PaperEngine<P>,
        ledger: L,
        pacer: Box<dyn Pacer>,
    ) -> Self {
        let defaults = DriverConfig::default();
        Self {
            feed,
            detector,
            engine,
            ledger,
            recorder: LedgerRecorder::new(),
            pacer,
            interval: Duration::from_secs(defaults.poll_interval_secs),
            fetch_timeout: Duration::from_secs(defaults.fetch_timeout_secs),
            last_acted: None,
            stats: PollStats::default(),
        }
    }

    /// Take the poll interval and fetch timeout from configuration
    pub fn with_driver_config(self, config: &DriverConfig) -> Self {
        self.with_interval(Duration::from_secs(config.poll_interval_secs))
            .with_fetch_timeout(Duration::from_secs(config.fetch_timeout_secs))
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn engine(&self) -> &PaperEngine<P> {
        &self.engine
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn stats(&self) -> &PollStats {
        &self.stats
    }

    /// Timestamp of the last bar whose signal was applied
    pub fn last_acted(&self) -> Option<DateTime<Utc>> {
        self.last_acted
    }

    /// Run ticks until `cancel` turns true or its sender is dropped.
    ///
    /// Cancellation is checked before every tick and raced only against the
    /// wait between ticks, so a tick in progress always completes.
    pub async fn run(&mut self, mut cancel: watch::Receiver<bool>) -> PollStats {
        tracing::info!(
            feed = %self.feed.describe(),
            interval_secs = self.interval.as_secs(),
            "Starting polling loop"
        );

        loop {
            if *cancel.borrow_and_update() {
                break;
            }

            self.tick().await;

            tokio::select! {
                _ = self.pacer.wait(self.interval) => {}
                changed = cancel.changed() => {
                    if changed.is_err() {
                        tracing::debug!("Cancellation sender dropped");
                        break;
                    }
                }
            }
        }

        tracing::info!(
            ticks = self.stats.ticks,
            skipped = self.stats.skipped,
            trades = self.stats.trades,
            balance = self.engine.balance(),
            "Polling loop stopped"
        );
        self.stats.clone()
    }

    /// Fetch the current window and act on its latest bar
    pub async fn tick(&mut self) -> TickOutcome {
        self.stats.ticks += 1;

        let started = Instant::now();
        let fetched = tokio::time::timeout(self.fetch_timeout, self.feed.fetch_window()).await;
        telemetry::record_latency(LatencyMetric::BarFetch, started.elapsed());

        let series = match fetched {
            Ok(Ok(series)) => series,
            Ok(Err(e)) => return self.skip(format!("fetch failed: {e}")),
            Err(_) => {
                return self.skip(format!(
                    "fetch timed out after {}ms",
                    self.fetch_timeout.as_millis()
                ))
            }
        };
        let Some(latest) = series.last() else {
            return self.skip("empty window".to_string());
        };
        if self.last_acted.is_some_and(|t| latest.timestamp <= t) {
            self.stats.unchanged += 1;
            tracing::debug!(latest = %latest.timestamp, "No new bar");
            return TickOutcome::Unchanged;
        }

        let started = Instant::now();
        let signals = self.detector.generate(series.bars());
        telemetry::record_latency(LatencyMetric::SignalGeneration, started.elapsed());

        let mut events = Vec::new();
        let since = self.last_acted;

        // Stops and targets on every bar that arrived since the last tick
        for bar in series
            .bars()
            .iter()
            .filter(|b| since.map_or(true, |t| b.timestamp > t))
        {
            let action = self.engine.on_bar(bar);
            self.handle(action, &mut events);
        }

        // Only the latest bar's signal is acted on
        if let Some(signal) = signals.last() {
            if signal.is_entry() {
                telemetry::increment(CounterMetric::SignalsEvaluated);
            }
            let action = self.engine.on_signal(signal);
            self.handle(action, &mut events);
        }

        self.last_acted = Some(latest.timestamp);
        self.stats.trades += events.len() as u64;
        telemetry::increment(CounterMetric::TicksProcessed);
        if latest.is_valid() {
            telemetry::set_gauge(GaugeMetric::Equity, self.engine.equity(latest.close));
        }

        tracing::debug!(
            latest = %latest.timestamp,
            events = events.len(),
            balance = self.engine.balance(),
            "Tick processed"
        );
        TickOutcome::Processed(events)
    }

    fn handle(&mut self, action: Action, events: &mut Vec<TradeEvent>) {
        telemetry::record_action(&action);
        match action {
            Action::Trade(event) => {
                if self.recorder.record_or_log(&mut self.ledger, &event).is_some() {
                    self.stats.ledger_failures += 1;
                }
                events.push(event);
            }
            Action::Skipped(notice) => {
                tracing::info!(%notice, "Signal not acted on");
                self.stats.notices += 1;
            }
            Action::Idle => {}
        }
    }

    fn skip(&mut self, reason: String) -> TickOutcome {
        tracing::warn!(feed = %self.feed.describe(), %reason, "Tick skipped");
        telemetry::increment(CounterMetric::TicksSkipped);
        self.stats.skipped += 1;
        TickOutcome::Skipped(reason)
    }
}
