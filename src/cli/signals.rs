//! Signals command implementation

use super::backtest::load_series;
use super::OutputFormat;
use crate::config::Config;
use crate::signal::{CrossoverDetector, Signal};
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct SignalsArgs {
    /// CSV bar file; defaults to the configured feed
    #[arg(long)]
    pub bars: Option<PathBuf>,

    /// Include bars without an entry setup
    #[arg(long)]
    pub all: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

impl SignalsArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let series = load_series(self.bars.as_ref(), config).await?;
        let detector = CrossoverDetector::from_config(&config.strategy);
        let signals: Vec<Signal> = detector
            .generate(series.bars())
            .into_iter()
            .filter(|s| self.all || s.is_entry())
            .collect();

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&signals)?),
            OutputFormat::Table => {
                println!(
                    "{:<26} {:>5} {:>10} {:>10} {:>8} {:>10}",
                    "timestamp", "side", "entry", "stop", "risk", "target"
                );
                for signal in &signals {
                    println!("{}", format_row(signal));
                }
                println!("{} signal(s)", signals.len());
            }
        }
        Ok(())
    }
}

fn format_row(signal: &Signal) -> String {
    let ts = signal.timestamp.format("%Y-%m-%d %H:%M:%S%:z");
    match signal.setup {
        Some(setup) => format!(
            "{:<26} {:>5} {:>10.2} {:>10.2} {:>8.2} {:>10.2}",
            ts, setup.side, signal.entry_price, setup.stop_loss, setup.risk, setup.target
        ),
        None => format!(
            "{:<26} {:>5} {:>10.2} {:>10} {:>8} {:>10}",
            ts, "-", signal.entry_price, "-", "-", "-"
        ),
    }
}
