//! Signal types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trade direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Profit from rising prices
    Long,
    /// Profit from falling prices
    Short,
}

impl Side {
    /// +1 for long, -1 for short
    pub fn sign(self) -> f64 {
        match self {
            Side::Long => 1.0,
            Side::Short => -1.0,
        }
    }

    pub fn opposite(self) -> Side {
        match self {
            Side::Long => Side::Short,
            Side::Short => Side::Long,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Long => f.pad("LONG"),
            Side::Short => f.pad("SHORT"),
        }
    }
}

/// Risk levels of a qualifying entry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Setup {
    /// Entry direction
    pub side: Side,
    /// Previous bar's low (long) or high (short)
    pub stop_loss: f64,
    /// Distance from entry to stop, always > 0
    pub risk: f64,
    /// Entry +/- 2x risk
    pub target: f64,
}

/// Why a bar produced no entry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Rejection {
    /// Not enough valid bars to trust the long EMA
    InsufficientHistory,
    /// Close, high or low is missing or non-numeric
    InvalidRow,
    /// Crossover whose stop sits on the wrong side of the entry
    NonPositiveRisk { risk: f64 },
    /// Crossover whose stop is further away than allowed
    RiskAboveMax { risk: f64, max: f64 },
}

/// Per-bar output of the signal generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Timestamp of the bar this signal belongs to
    pub timestamp: DateTime<Utc>,
    /// Bar close, the would-be entry price
    pub entry_price: f64,
    /// Short EMA after this bar (absent for invalid rows)
    pub short_ema: Option<f64>,
    /// Long EMA after this bar (absent for invalid rows)
    pub long_ema: Option<f64>,
    /// Present iff the bar qualifies as an entry
    pub setup: Option<Setup>,
    /// Reason the bar did not qualify, when there was one
    pub rejection: Option<Rejection>,
}

impl Signal {
    /// Direction of the signal; `None` when no entry condition holds
    pub fn direction(&self) -> Option<Side> {
        self.setup.map(|s| s.side)
    }

    pub fn is_entry(&self) -> bool {
        self.setup.is_some()
    }
}
