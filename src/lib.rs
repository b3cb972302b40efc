//! ema-paper: EMA crossover signals and paper trading for one intraday instrument
//!
//! This library provides the core components for:
//! - Bar feeds from CSV files and the Yahoo chart API
//! - EMA crossover signal generation with risk filtering
//! - A paper execution simulator over a virtual capital pool
//! - Lot sizing and drawdown tracking
//! - Deterministic replay with backtest analytics
//! - A cancellable polling driver for live paper trading
//! - Trade ledgers (JSON lines, in-memory)
//! - Structured logging and Prometheus metrics

pub mod backtest;
pub mod cli;
pub mod config;
pub mod execution;
pub mod feed;
pub mod ledger;
pub mod live;
pub mod risk;
pub mod signal;
pub mod telemetry;
