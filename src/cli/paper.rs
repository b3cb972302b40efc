//! Paper trading command implementation

use super::{build_feed, build_ledger};
use crate::config::Config;
use crate::execution::PaperEngine;
use crate::live::{Poller, TokioPacer};
use crate::signal::CrossoverDetector;
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::watch;

#[derive(Args, Debug)]
pub struct PaperArgs {
    /// JSON-lines ledger file; overrides `ledger.path`
    #[arg(long)]
    pub ledger: Option<PathBuf>,

    /// Poll interval in seconds; overrides `driver.poll_interval_secs`
    #[arg(long)]
    pub interval: Option<u64>,
}

impl PaperArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let feed = build_feed(config)?;
        let detector = CrossoverDetector::from_config(&config.strategy);
        let engine = PaperEngine::from_config(config);
        let ledger = build_ledger(config, self.ledger.as_deref())?;

        let mut poller = Poller::new(feed, detector, engine, ledger, Box::new(TokioPacer))
            .with_driver_config(&config.driver);
        if let Some(secs) = self.interval.filter(|s| *s > 0) {
            poller = poller.with_interval(Duration::from_secs(secs));
        }

        let (cancel_tx, cancel_rx) = watch::channel(false);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Interrupt received, stopping after the current tick");
                let _ = cancel_tx.send(true);
            }
        });

        let stats = poller.run(cancel_rx).await;
        let engine = poller.engine();
        println!(
            "Stopped after {} ticks ({} skipped), {} trade events, balance {:.2}",
            stats.ticks,
            stats.skipped,
            stats.trades,
            engine.balance()
        );
        if let Some(position) = engine.position() {
            println!(
                "Open position: {} {} x {} from {:.2}",
                position.trade_id, position.side, position.quantity, position.underlying_entry
            );
        }
        Ok(())
    }
}
