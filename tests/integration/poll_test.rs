//! Polling driver integration tests

use crate::common::{bars, engine, FailingLedger};
use async_trait::async_trait;
use ema_paper::execution::{MultiplierPricer, TradeStatus};
use ema_paper::feed::{Bar, BarFeed, BarSeries, FeedError};
use ema_paper::ledger::{MemoryLedger, TradeLedger};
use ema_paper::live::{ImmediatePacer, Poller, TickOutcome};
use ema_paper::signal::CrossoverDetector;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::watch;

/// Replays scripted windows, then requests cancellation after `cancel_after` fetches
struct ScriptedFeed {
    windows: Vec<Vec<Bar>>,
    fetches: AtomicUsize,
    cancel_after: usize,
    cancel: watch::Sender<bool>,
}

#[async_trait]
impl BarFeed for ScriptedFeed {
    async fn fetch_window(&self) -> Result<BarSeries, FeedError> {
        let n = self.fetches.fetch_add(1, Ordering::SeqCst);
        if n + 1 >= self.cancel_after {
            let _ = self.cancel.send(true);
        }
        let window = &self.windows[n.min(self.windows.len() - 1)];
        Ok(BarSeries::from_unsorted(window.clone()))
    }

    fn describe(&self) -> String {
        "scripted".to_string()
    }
}

struct SlowFeed;

#[async_trait]
impl BarFeed for SlowFeed {
    async fn fetch_window(&self) -> Result<BarSeries, FeedError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(BarSeries::from_unsorted(bars(&[100.0])))
    }

    fn describe(&self) -> String {
        "slow".to_string()
    }
}

fn poller_with<L: TradeLedger>(
    feed: Box<dyn BarFeed>,
    protective_exits: bool,
    ledger: L,
) -> Poller<MultiplierPricer, L> {
    Poller::new(
        feed,
        CrossoverDetector::new(2, 3, 10.0),
        engine(1000.0).with_protective_exits(protective_exits),
        ledger,
        Box::new(ImmediatePacer),
    )
}

fn poller(feed: Box<dyn BarFeed>, protective_exits: bool) -> Poller<MultiplierPricer, MemoryLedger> {
    poller_with(feed, protective_exits, MemoryLedger::new())
}

/// Growing windows over a short-then-long series, cancelling after the fifth fetch
fn growing_feed(all: &[Bar], cancel: watch::Sender<bool>) -> ScriptedFeed {
    ScriptedFeed {
        windows: vec![
            all[..3].to_vec(),
            all[..3].to_vec(),
            all[..4].to_vec(),
            all[..5].to_vec(),
            all[..6].to_vec(),
        ],
        fetches: AtomicUsize::new(0),
        cancel_after: 5,
        cancel,
    }
}

#[tokio::test]
async fn test_poll_acts_on_each_new_bar_once() {
    let all = bars(&[100.0, 101.0, 99.0, 98.0, 105.0, 110.0]);
    let (tx, rx) = watch::channel(false);
    let mut poller = poller(Box::new(growing_feed(&all, tx)), false);

    let stats = poller.run(rx).await;

    assert_eq!(stats.ticks, 5);
    assert_eq!(stats.unchanged, 1);
    assert_eq!(stats.skipped, 0);
    // Short opened on the third bar, closed by the long crossover on the fifth
    assert_eq!(stats.trades, 2);
    assert_eq!(poller.ledger().opens().count(), 1);
    let closes: Vec<_> = poller.ledger().closes().collect();
    assert_eq!(closes.len(), 1);
    assert_eq!(closes[0].status, TradeStatus::Closed);
    assert!(poller.engine().is_flat());
    assert_eq!(poller.last_acted(), Some(all[5].timestamp));
}

#[tokio::test]
async fn test_poll_counts_failed_ledger_writes() {
    let all = bars(&[100.0, 101.0, 99.0, 98.0, 105.0, 110.0]);

    let (tx, rx) = watch::channel(false);
    let mut recorded = poller(Box::new(growing_feed(&all, tx)), false);
    let recorded_stats = recorded.run(rx).await;

    let (tx, rx) = watch::channel(false);
    let mut failing = poller_with(Box::new(growing_feed(&all, tx)), false, FailingLedger);
    let stats = failing.run(rx).await;

    assert_eq!(stats.trades, 2);
    assert_eq!(stats.ledger_failures, stats.trades);
    assert_eq!(recorded_stats.ledger_failures, 0);
    assert_eq!(stats.trades, recorded_stats.trades);
    assert_eq!(failing.engine().balance(), recorded.engine().balance());
    assert!(failing.engine().is_flat());
    assert_eq!(failing.last_acted(), Some(all[5].timestamp));
}

#[tokio::test]
async fn test_poll_ignores_stale_crossovers() {
    // Whole series at once: only the last bar's signal counts, and it has none
    let all = bars(&[100.0, 101.0, 99.0, 98.0, 105.0, 110.0]);
    let (tx, _rx) = watch::channel(false);
    let feed = ScriptedFeed {
        windows: vec![all],
        fetches: AtomicUsize::new(0),
        cancel_after: usize::MAX,
        cancel: tx,
    };
    let mut poller = poller(Box::new(feed), true);

    assert_eq!(poller.tick().await, TickOutcome::Processed(Vec::new()));
    assert!(poller.engine().is_flat());
}

#[tokio::test]
async fn test_poll_fetch_timeout_skips_tick() {
    let mut poller =
        poller(Box::new(SlowFeed), true).with_fetch_timeout(Duration::from_millis(20));

    let outcome = poller.tick().await;

    assert!(matches!(outcome, TickOutcome::Skipped(reason) if reason.contains("timed out")));
    assert_eq!(poller.stats().skipped, 1);
    assert!(poller.last_acted().is_none());
}

#[tokio::test]
async fn test_poll_cancelled_before_first_tick() {
    let (tx, rx) = watch::channel(false);
    tx.send(true).unwrap();
    let mut poller = poller(Box::new(SlowFeed), true);

    let stats = poller.run(rx).await;

    assert_eq!(stats.ticks, 0);
    drop(tx);
}
