//! CSV file bar feed

use super::{Bar, BarFeed, BarSeries, FeedError};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::io::Read;
use std::path::PathBuf;

const TIMESTAMP_COLUMNS: [&str; 4] = ["datetime", "date", "timestamp", "time"];

/// Reads bars from a CSV file on every fetch.
///
/// Re-reading lets a polling run follow a file that an external
/// downloader keeps appending to.
#[derive(Debug, Clone)]
pub struct CsvBarFeed {
    path: PathBuf,
    window: Option<usize>,
}

impl CsvBarFeed {
    /// Create a feed over the whole file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            window: None,
        }
    }

    /// Only return the most recent `bars` bars
    pub fn with_window(mut self, bars: usize) -> Self {
        self.window = Some(bars);
        self
    }

    /// Load and normalize the file synchronously
    pub fn load(&self) -> Result<BarSeries, FeedError> {
        let file = std::fs::File::open(&self.path)?;
        let series = parse_bars(file)?;
        if series.is_empty() {
            return Err(FeedError::Empty(self.path.display().to_string()));
        }
        Ok(match self.window {
            Some(n) => series.tail(n),
            None => series,
        })
    }
}

#[async_trait]
impl BarFeed for CsvBarFeed {
    async fn fetch_window(&self) -> Result<BarSeries, FeedError> {
        self.load()
    }

    fn describe(&self) -> String {
        format!("csv:{}", self.path.display())
    }
}

struct Columns {
    timestamp: usize,
    open: Option<usize>,
    high: usize,
    low: usize,
    close: usize,
    volume: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, FeedError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let timestamp = TIMESTAMP_COLUMNS
            .iter()
            .find_map(|name| find(name))
            // Pandas writes the index first, under an empty or level-name header
            .unwrap_or(0);

        Ok(Self {
            timestamp,
            open: find("open"),
            high: find("high").ok_or(FeedError::MissingColumn("high"))?,
            low: find("low").ok_or(FeedError::MissingColumn("low"))?,
            close: find("close").ok_or(FeedError::MissingColumn("close"))?,
            volume: find("volume"),
        })
    }
}

/// Parse CSV bar data, sorting and de-duplicating by timestamp.
///
/// Rows whose timestamp cannot be parsed are dropped. Unparseable prices
/// are kept as `NaN`.
pub fn parse_bars<R: Read>(reader: R) -> Result<BarSeries, FeedError> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let columns = Columns::from_headers(rdr.headers()?)?;

    let mut bars = Vec::new();
    let mut dropped = 0usize;
    for record in rdr.records() {
        let record = record?;
        let Some(timestamp) = record.get(columns.timestamp).and_then(parse_timestamp) else {
            dropped += 1;
            continue;
        };
        let price = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i))
                .and_then(|v| v.parse::<f64>().ok())
                .unwrap_or(f64::NAN)
        };
        bars.push(Bar {
            timestamp,
            open: price(columns.open),
            high: price(Some(columns.high)),
            low: price(Some(columns.low)),
            close: price(Some(columns.close)),
            volume: columns
                .volume
                .and_then(|i| record.get(i))
                .and_then(|v| v.parse::<f64>().ok())
                .filter(|v| v.is_finite() && *v >= 0.0)
                .map(|v| v as u64),
        });
    }

    if dropped > 0 {
        tracing::warn!(dropped, "Dropped CSV rows with unparseable timestamps");
    }

    Ok(BarSeries::from_unsorted(bars))
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS[+HH:MM]` and plain dates
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%:z") {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
