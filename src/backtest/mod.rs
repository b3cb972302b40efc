//! Backtesting module
//!
//! Replays a finite bar series through the signal generator and the paper
//! engine, then summarizes the result

mod analytics;
mod replay;

pub use analytics::BacktestSummary;
pub use replay::{NoticeRecord, ReplayDriver, ReplayReport};
