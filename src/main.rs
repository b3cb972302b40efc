use clap::Parser;
use ema_paper::cli::{BacktestArgs, Cli, Commands, OutputFormat, PaperArgs};
use ema_paper::config::{Config, DriverMode};
use std::path::Path;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration; a present but invalid file is fatal
    let mut config = if Path::new(&cli.config).exists() {
        Config::load(&cli.config)?
    } else {
        eprintln!("Warning: {} not found, using default configuration", cli.config);
        Config::default()
    };
    if let Some(mode) = cli.mode {
        config.driver.mode = mode;
    }
    config.validate()?;

    // Initialize telemetry
    ema_paper::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Backtest(args) => {
            tracing::info!("Starting backtest");
            args.execute(&config).await?;
        }
        Commands::Paper(args) => {
            tracing::info!(instrument = %config.instrument.label, "Starting paper trading mode");
            args.execute(&config).await?;
        }
        Commands::Run => match config.driver.mode {
            DriverMode::Replay => {
                let args = BacktestArgs {
                    bars: None,
                    ledger: None,
                    format: OutputFormat::Table,
                };
                args.execute(&config).await?;
            }
            DriverMode::Poll => {
                let args = PaperArgs {
                    ledger: None,
                    interval: None,
                };
                args.execute(&config).await?;
            }
        },
        Commands::Signals(args) => {
            args.execute(&config).await?;
        }
        Commands::Config => {
            println!("Current configuration ({}):", cli.config);
            println!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
