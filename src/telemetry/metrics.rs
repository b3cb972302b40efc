//! Prometheus metrics

use crate::execution::{Action, TradeEvent};
use std::time::Duration;

/// Latency metric types
#[derive(Debug, Clone, Copy)]
pub enum LatencyMetric {
    /// Bar feed fetch latency
    BarFetch,
    /// Signal generation latency
    SignalGeneration,
}

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Signals handed to the execution simulator
    SignalsEvaluated,
    /// Positions opened
    TradesOpened,
    /// Positions closed
    TradesClosed,
    /// Signals dropped with a notice
    Notices,
    /// Ledger writes that failed
    LedgerFailures,
    /// Poll ticks that ran to completion
    TicksProcessed,
    /// Poll ticks skipped on fetch error or timeout
    TicksSkipped,
}

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Available balance
    Balance,
    /// Balance plus marked open position
    Equity,
    /// Open position count (0 or 1)
    OpenPositions,
}

fn latency_name(metric: LatencyMetric) -> &'static str {
    match metric {
        LatencyMetric::BarFetch => "emapaper_bar_fetch_latency_ms",
        LatencyMetric::SignalGeneration => "emapaper_signal_generation_latency_ms",
    }
}

fn counter_name(metric: CounterMetric) -> &'static str {
    match metric {
        CounterMetric::SignalsEvaluated => "emapaper_signals_evaluated_total",
        CounterMetric::TradesOpened => "emapaper_trades_opened_total",
        CounterMetric::TradesClosed => "emapaper_trades_closed_total",
        CounterMetric::Notices => "emapaper_notices_total",
        CounterMetric::LedgerFailures => "emapaper_ledger_failures_total",
        CounterMetric::TicksProcessed => "emapaper_ticks_processed_total",
        CounterMetric::TicksSkipped => "emapaper_ticks_skipped_total",
    }
}

fn gauge_name(metric: GaugeMetric) -> &'static str {
    match metric {
        GaugeMetric::Balance => "emapaper_balance",
        GaugeMetric::Equity => "emapaper_equity",
        GaugeMetric::OpenPositions => "emapaper_open_positions",
    }
}

/// Record a latency measurement
pub fn record_latency(metric: LatencyMetric, duration: Duration) {
    metrics::histogram!(latency_name(metric)).record(duration.as_secs_f64() * 1000.0);
}

/// Increment a counter
pub fn increment(metric: CounterMetric) {
    metrics::counter!(counter_name(metric)).increment(1);
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    metrics::gauge!(gauge_name(metric)).set(value);
}

/// Count the outcome of one simulator step
pub fn record_action(action: &Action) {
    match action {
        Action::Trade(TradeEvent::Entry(e)) => {
            increment(CounterMetric::TradesOpened);
            set_gauge(GaugeMetric::OpenPositions, 1.0);
            set_gauge(GaugeMetric::Balance, e.balance);
        }
        Action::Trade(TradeEvent::Exit(e)) => {
            increment(CounterMetric::TradesClosed);
            set_gauge(GaugeMetric::OpenPositions, 0.0);
            set_gauge(GaugeMetric::Balance, e.balance);
        }
        Action::Skipped(_) => increment(CounterMetric::Notices),
        Action::Idle => {}
    }
}

/// Serve metrics on `0.0.0.0:port` for Prometheus to scrape
pub fn install_prometheus(port: u16) -> anyhow::Result<()> {
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics exporter: {}", e))?;
    tracing::info!(port, "Prometheus exporter listening");
    Ok(())
}
