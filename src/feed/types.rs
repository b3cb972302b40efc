//! Price bar types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single OHLC price bar
///
/// Prices that could not be parsed upstream are carried as `NaN` so the
/// signal generator can exclude the row instead of coercing it to zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Bar open time
    pub timestamp: DateTime<Utc>,
    /// Open price
    pub open: f64,
    /// High price
    pub high: f64,
    /// Low price
    pub low: f64,
    /// Close price
    pub close: f64,
    /// Traded volume, when the source reports it
    pub volume: Option<u64>,
}

impl Bar {
    /// Create a bar without volume
    pub fn new(timestamp: DateTime<Utc>, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume: None,
        }
    }

    /// Attach a volume figure
    pub fn with_volume(mut self, volume: u64) -> Self {
        self.volume = Some(volume);
        self
    }

    /// True when close, high and low are all usable numbers
    pub fn is_valid(&self) -> bool {
        [self.close, self.high, self.low]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0)
    }
}

/// A chronologically ordered bar sequence with unique timestamps
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BarSeries {
    bars: Vec<Bar>,
}

impl BarSeries {
    /// Build a series from bars in any order.
    ///
    /// Duplicate timestamps keep the bar that appears last in the input.
    pub fn from_unsorted(bars: impl IntoIterator<Item = Bar>) -> Self {
        let mut by_time: BTreeMap<DateTime<Utc>, Bar> = BTreeMap::new();
        for bar in bars {
            by_time.insert(bar.timestamp, bar);
        }
        Self {
            bars: by_time.into_values().collect(),
        }
    }

    /// Keep only the most recent `n` bars
    pub fn tail(mut self, n: usize) -> Self {
        if self.bars.len() > n {
            self.bars.drain(..self.bars.len() - n);
        }
        self
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// The most recent bar
    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    pub fn into_bars(self) -> Vec<Bar> {
        self.bars
    }
}

impl AsRef<[Bar]> for BarSeries {
    fn as_ref(&self) -> &[Bar] {
        &self.bars
    }
}
