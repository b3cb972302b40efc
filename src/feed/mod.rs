//! Price bar feeds
//!
//! Supplies ordered, de-duplicated bar windows from a CSV file or the
//! Yahoo chart API

mod csv_file;
mod types;
mod yahoo;

pub use csv_file::CsvBarFeed;
pub use types::{Bar, BarSeries};
pub use yahoo::YahooBarFeed;

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised while fetching bars
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Missing column: {0}")]
    MissingColumn(&'static str),
    #[error("No bars returned for {0}")]
    Empty(String),
    #[error("Unexpected response format: {0}")]
    ResponseFormat(String),
}

/// Trait for bar feed implementations
#[async_trait]
pub trait BarFeed: Send + Sync {
    /// Fetch the most recent window of bars
    async fn fetch_window(&self) -> Result<BarSeries, FeedError>;

    /// Human-readable source label for logs
    fn describe(&self) -> String;
}
