//! CLI interface for ema-paper
//!
//! Provides subcommands for:
//! - `backtest`: Replay a bar series and print a summary
//! - `paper`: Poll the configured feed and paper trade until Ctrl-C
//! - `run`: Dispatch on the configured driver mode
//! - `signals`: Print the entry signals of a bar series
//! - `config`: Show the effective configuration

mod backtest;
mod paper;
mod signals;

pub use backtest::{BacktestArgs, OutputFormat};
pub use paper::PaperArgs;
pub use signals::SignalsArgs;

use crate::config::{Config, ConfigError, DataSource, DriverMode};
use crate::feed::{BarFeed, CsvBarFeed, YahooBarFeed};
use crate::ledger::{JsonlLedger, MemoryLedger, TradeLedger};
use clap::{Parser, Subcommand};
use std::path::Path;

#[derive(Parser, Debug)]
#[command(name = "ema-paper")]
#[command(about = "EMA crossover signals and paper trading for a single intraday instrument")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: String,

    /// Override the configured driver mode
    #[arg(long, value_enum, global = true)]
    pub mode: Option<DriverMode>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a bar series through the engine
    Backtest(BacktestArgs),
    /// Poll the feed and paper trade until interrupted
    Paper(PaperArgs),
    /// Run in the configured driver mode
    Run,
    /// Print entry signals for a bar series
    Signals(SignalsArgs),
    /// Show the effective configuration
    Config,
}

/// Build the configured bar feed
pub fn build_feed(config: &Config) -> anyhow::Result<Box<dyn BarFeed>> {
    let data = &config.data;
    match data.source {
        DataSource::Csv => {
            let path = data.path.as_ref().ok_or(ConfigError::MissingDataPath)?;
            let mut feed = CsvBarFeed::new(path);
            if let Some(window) = data.window {
                feed = feed.with_window(window);
            }
            Ok(Box::new(feed))
        }
        DataSource::Yahoo => Ok(Box::new(YahooBarFeed::new(
            config.instrument.symbol.clone(),
            data.interval.clone(),
            data.range.clone(),
        )?)),
    }
}

/// Open the configured ledger, or an in-memory one when no path is set
pub fn build_ledger(config: &Config, path: Option<&Path>) -> anyhow::Result<Box<dyn TradeLedger>> {
    match path.or(config.ledger.path.as_deref()) {
        Some(path) => Ok(Box::new(JsonlLedger::open(path)?)),
        None => Ok(Box::new(MemoryLedger::new())),
    }
}
