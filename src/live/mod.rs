//! Polling driver
//!
//! Re-fetches the most recent bar window on a fixed interval and acts on the
//! latest bar's signal at most once

mod poller;

pub use poller::{PollStats, Poller, TickOutcome};

use async_trait::async_trait;
use std::time::Duration;

/// Suspends the polling loop between ticks
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn wait(&self, period: Duration);
}

/// Sleeps on the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioPacer;

#[async_trait]
impl Pacer for TokioPacer {
    async fn wait(&self, period: Duration) {
        tokio::time::sleep(period).await;
    }
}

/// Returns immediately; for tests and catch-up runs
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediatePacer;

#[async_trait]
impl Pacer for ImmediatePacer {
    async fn wait(&self, _period: Duration) {
        tokio::task::yield_now().await;
    }
}
