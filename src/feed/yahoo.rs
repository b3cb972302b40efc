//! Yahoo Finance chart API bar feed

use super::{Bar, BarFeed, BarSeries, FeedError};
use async_trait::async_trait;
use chrono::DateTime;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

/// Intraday bars from the Yahoo v8 chart endpoint
pub struct YahooBarFeed {
    client: reqwest::Client,
    base_url: String,
    symbol: String,
    interval: String,
    range: String,
}

impl YahooBarFeed {
    /// Create a feed for `symbol` (e.g. `^NSEI`) with a bar interval
    /// (`5m`) and lookback range (`7d`)
    pub fn new(
        symbol: impl Into<String>,
        interval: impl Into<String>,
        range: impl Into<String>,
    ) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36")
            .build()?;
        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            symbol: symbol.into(),
            interval: interval.into(),
            range: range.into(),
        })
    }

    /// Point the feed at another chart endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn chart_url(&self) -> String {
        let symbol = self.symbol.replace('^', "%5E");
        format!("{}/{}", self.base_url.trim_end_matches('/'), symbol)
    }

    fn parse_response(symbol: &str, resp: ChartResponse) -> Result<BarSeries, FeedError> {
        let result = resp.chart.result.ok_or_else(|| match resp.chart.error {
            Some(err) => FeedError::ResponseFormat(format!("{}: {}", err.code, err.description)),
            None => FeedError::ResponseFormat("empty result with no error".into()),
        })?;

        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| FeedError::ResponseFormat("result array is empty".into()))?;
        let timestamps = data
            .timestamp
            .ok_or_else(|| FeedError::Empty(symbol.to_string()))?;
        let quote = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| FeedError::ResponseFormat("no quote data".into()))?;

        let mut bars = Vec::with_capacity(timestamps.len());
        for (i, &ts) in timestamps.iter().enumerate() {
            let timestamp = DateTime::from_timestamp(ts, 0)
                .ok_or_else(|| FeedError::ResponseFormat(format!("invalid timestamp: {ts}")))?;
            let open = quote.open.get(i).copied().flatten();
            let high = quote.high.get(i).copied().flatten();
            let low = quote.low.get(i).copied().flatten();
            let close = quote.close.get(i).copied().flatten();
            let volume = quote.volume.get(i).copied().flatten();

            // Yahoo pads the live session with empty slots
            if open.is_none() && high.is_none() && low.is_none() && close.is_none() {
                continue;
            }

            bars.push(Bar {
                timestamp,
                open: open.unwrap_or(f64::NAN),
                high: high.unwrap_or(f64::NAN),
                low: low.unwrap_or(f64::NAN),
                close: close.unwrap_or(f64::NAN),
                volume,
            });
        }

        if bars.is_empty() {
            return Err(FeedError::Empty(symbol.to_string()));
        }
        Ok(BarSeries::from_unsorted(bars))
    }
}

#[async_trait]
impl BarFeed for YahooBarFeed {
    async fn fetch_window(&self) -> Result<BarSeries, FeedError> {
        let resp: ChartResponse = self
            .client
            .get(self.chart_url())
            .query(&[
                ("interval", self.interval.as_str()),
                ("range", self.range.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let series = Self::parse_response(&self.symbol, resp)?;
        tracing::debug!(
            symbol = %self.symbol,
            bars = series.len(),
            "Fetched Yahoo bars"
        );
        Ok(series)
    }

    fn describe(&self) -> String {
        format!("yahoo:{}@{}/{}", self.symbol, self.interval, self.range)
    }
}
