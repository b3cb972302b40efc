//! Configuration types for ema-paper

use crate::telemetry::LogFormat;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub instrument: InstrumentConfig,
    #[serde(default)]
    pub strategy: StrategyConfig,
    #[serde(default)]
    pub capital: CapitalConfig,
    #[serde(default)]
    pub execution: ExecutionConfig,
    #[serde(default)]
    pub driver: DriverConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Malformed configuration, fatal at startup
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("EMA spans must be positive (short={short}, long={long})")]
    ZeroSpan { short: usize, long: usize },
    #[error("Short span {short} must be less than long span {long}")]
    SpanOrder { short: usize, long: usize },
    #[error("max_risk_points must be positive, got {0}")]
    MaxRisk(f64),
    #[error("lot_size must be positive")]
    LotSize,
    #[error("max_lots must be positive")]
    MaxLots,
    #[error("synthetic_multiplier must be positive, got {0}")]
    Multiplier(f64),
    #[error("initial_balance must be non-negative, got {0}")]
    InitialBalance(f64),
    #[error("poll_interval_secs must be positive")]
    PollInterval,
    #[error("fetch_timeout_secs must be positive")]
    FetchTimeout,
    #[error("data.path is required for the csv source")]
    MissingDataPath,
}

/// Traded instrument
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstrumentConfig {
    /// Label written to the trade ledger
    #[serde(default = "default_label")]
    pub label: String,
    /// Data provider symbol
    #[serde(default = "default_symbol")]
    pub symbol: String,
}

fn default_label() -> String {
    "NIFTY 50".to_string()
}
fn default_symbol() -> String {
    "^NSEI".to_string()
}

impl Default for InstrumentConfig {
    fn default() -> Self {
        Self {
            label: default_label(),
            symbol: default_symbol(),
        }
    }
}

/// EMA crossover parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    #[serde(default = "default_short_span")]
    pub short_span: usize,
    #[serde(default = "default_long_span")]
    pub long_span: usize,
    /// Largest accepted entry-to-stop distance (inclusive)
    #[serde(default = "default_max_risk_points")]
    pub max_risk_points: f64,
}

fn default_short_span() -> usize {
    10
}
fn default_long_span() -> usize {
    20
}
fn default_max_risk_points() -> f64 {
    40.0
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            short_span: default_short_span(),
            long_span: default_long_span(),
            max_risk_points: default_max_risk_points(),
        }
    }
}

/// Capital pool and position sizing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapitalConfig {
    #[serde(default = "default_initial_balance")]
    pub initial_balance: f64,
    /// Units per lot
    #[serde(default = "default_lot_size")]
    pub lot_size: u64,
    /// Upper bound on lots per entry
    #[serde(default = "default_max_lots")]
    pub max_lots: u64,
    /// Synthetic option price = underlying price x multiplier
    #[serde(default = "default_synthetic_multiplier")]
    pub synthetic_multiplier: f64,
}

fn default_initial_balance() -> f64 {
    100_000.0
}
fn default_lot_size() -> u64 {
    75
}
fn default_max_lots() -> u64 {
    4
}
fn default_synthetic_multiplier() -> f64 {
    0.01
}

impl Default for CapitalConfig {
    fn default() -> Self {
        Self {
            initial_balance: default_initial_balance(),
            lot_size: default_lot_size(),
            max_lots: default_max_lots(),
            synthetic_multiplier: default_synthetic_multiplier(),
        }
    }
}

/// Execution simulator options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Close positions when a bar trades through the stop or target
    #[serde(default = "default_true")]
    pub protective_exits: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            protective_exits: true,
        }
    }
}

/// Simulation driver mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DriverMode {
    /// Replay a finite bar series once
    #[default]
    Replay,
    /// Poll the feed on a fixed interval
    Poll,
}

/// Simulation driver configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverConfig {
    #[serde(default)]
    pub mode: DriverMode,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Bar fetches slower than this are treated as a skipped tick
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

fn default_poll_interval_secs() -> u64 {
    300
}
fn default_fetch_timeout_secs() -> u64 {
    30
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            mode: DriverMode::Replay,
            poll_interval_secs: default_poll_interval_secs(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
        }
    }
}

/// Bar source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    #[default]
    Csv,
    Yahoo,
}

/// Bar feed configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default)]
    pub source: DataSource,
    /// CSV file for the csv source
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Bar interval for the yahoo source
    #[serde(default = "default_interval")]
    pub interval: String,
    /// Lookback range for the yahoo source
    #[serde(default = "default_range")]
    pub range: String,
    /// Keep only the most recent N bars per fetch
    #[serde(default)]
    pub window: Option<usize>,
}

fn default_interval() -> String {
    "5m".to_string()
}
fn default_range() -> String {
    "7d".to_string()
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            source: DataSource::Csv,
            path: None,
            interval: default_interval(),
            range: default_range(),
            window: None,
        }
    }
}

/// Trade ledger configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// JSON-lines ledger file; trades stay in memory when unset
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Telemetry configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
    /// Prometheus scrape port; metrics are not exported when unset
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::Pretty,
            metrics_port: None,
        }
    }
}

impl Config {
    /// Load and validate configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values the engine cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.strategy;
        if s.short_span == 0 || s.long_span == 0 {
            return Err(ConfigError::ZeroSpan {
                short: s.short_span,
                long: s.long_span,
            });
        }
        if s.short_span >= s.long_span {
            return Err(ConfigError::SpanOrder {
                short: s.short_span,
                long: s.long_span,
            });
        }
        if !(s.max_risk_points > 0.0) {
            return Err(ConfigError::MaxRisk(s.max_risk_points));
        }

        let c = &self.capital;
        if c.lot_size == 0 {
            return Err(ConfigError::LotSize);
        }
        if c.max_lots == 0 {
            return Err(ConfigError::MaxLots);
        }
        if !(c.synthetic_multiplier > 0.0) || !c.synthetic_multiplier.is_finite() {
            return Err(ConfigError::Multiplier(c.synthetic_multiplier));
        }
        if !(c.initial_balance >= 0.0) || !c.initial_balance.is_finite() {
            return Err(ConfigError::InitialBalance(c.initial_balance));
        }

        if self.driver.mode == DriverMode::Poll && self.driver.poll_interval_secs == 0 {
            return Err(ConfigError::PollInterval);
        }
        // `paper` polls whatever the configured mode
        if self.driver.fetch_timeout_secs == 0 {
            return Err(ConfigError::FetchTimeout);
        }
        Ok(())
    }
}
