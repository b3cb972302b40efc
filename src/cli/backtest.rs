//! Backtest command implementation

use super::{build_feed, build_ledger};
use crate::backtest::{BacktestSummary, ReplayDriver};
use crate::config::Config;
use crate::execution::PaperEngine;
use crate::feed::{BarSeries, CsvBarFeed};
use crate::signal::CrossoverDetector;
use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// Summary output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Args, Debug)]
pub struct BacktestArgs {
    /// CSV bar file; defaults to the configured feed
    #[arg(long)]
    pub bars: Option<PathBuf>,

    /// JSON-lines ledger file; overrides `ledger.path`
    #[arg(long)]
    pub ledger: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

impl BacktestArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let series = load_series(self.bars.as_ref(), config).await?;
        tracing::info!(bars = series.len(), "Running backtest");

        let detector = CrossoverDetector::from_config(&config.strategy);
        let mut engine = PaperEngine::from_config(config);
        let mut ledger = build_ledger(config, self.ledger.as_deref())?;

        let report = ReplayDriver::new(&detector, &mut engine, &mut ledger).run(series.bars());
        let summary = BacktestSummary::from_report(&report);

        match self.format {
            OutputFormat::Table => println!("{}", summary.format_table()),
            OutputFormat::Json => println!("{}", summary.format_json()?),
        }
        Ok(())
    }
}

/// Bars from an explicit CSV file, else one fetch of the configured feed
pub(super) async fn load_series(
    path: Option<&PathBuf>,
    config: &Config,
) -> anyhow::Result<BarSeries> {
    match path {
        Some(path) => Ok(CsvBarFeed::new(path).load()?),
        None => Ok(build_feed(config)?.fetch_window().await?),
    }
}
