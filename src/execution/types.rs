//! Execution types

use crate::signal::Side;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Trade identifier, issued on entry and referenced again on exit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TradeId(pub u64);

impl fmt::Display for TradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{:05}", self.0)
    }
}

/// How a position was closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeStatus {
    /// Closed by an opposing signal
    Closed,
    /// Bar traded through the stop
    StoppedOut,
    /// Bar traded through the target
    TargetHit,
}

impl fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TradeStatus::Closed => "CLOSED",
            TradeStatus::StoppedOut => "STOPPED_OUT",
            TradeStatus::TargetHit => "TARGET_HIT",
        };
        f.write_str(s)
    }
}

/// A position was opened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryEvent {
    pub trade_id: TradeId,
    pub instrument: String,
    pub side: Side,
    /// Bar timestamp of the entry signal
    pub timestamp: DateTime<Utc>,
    /// Underlying close at entry
    pub underlying_price: f64,
    /// Synthetic price paid per unit
    pub entry_price: f64,
    /// Stop level on the underlying
    pub stop_loss: f64,
    /// Entry-to-stop distance on the underlying
    pub risk_points: f64,
    /// Target level on the underlying
    pub target_price: f64,
    pub lots: u64,
    pub quantity: u64,
    pub capital_used: f64,
    /// Available balance after the debit
    pub balance: f64,
}

/// A position was closed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExitEvent {
    pub trade_id: TradeId,
    pub instrument: String,
    pub side: Side,
    pub timestamp: DateTime<Utc>,
    /// Underlying level the exit executed at
    pub underlying_price: f64,
    pub entry_price: f64,
    /// Synthetic price received per unit
    pub exit_price: f64,
    pub quantity: u64,
    /// Capital debited on entry
    pub capital_committed: f64,
    /// Realized P&L
    pub pnl: f64,
    /// Available balance after the credit
    pub balance: f64,
    pub status: TradeStatus,
}

impl ExitEvent {
    /// P&L as a fraction of the capital committed
    pub fn return_pct(&self) -> f64 {
        if self.capital_committed > 0.0 {
            self.pnl / self.capital_committed
        } else {
            0.0
        }
    }
}

/// Output of the execution simulator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TradeEvent {
    Entry(EntryEvent),
    Exit(ExitEvent),
}

impl TradeEvent {
    pub fn trade_id(&self) -> TradeId {
        match self {
            TradeEvent::Entry(e) => e.trade_id,
            TradeEvent::Exit(e) => e.trade_id,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            TradeEvent::Entry(e) => e.timestamp,
            TradeEvent::Exit(e) => e.timestamp,
        }
    }

    /// Available balance after the event
    pub fn balance(&self) -> f64 {
        match self {
            TradeEvent::Entry(e) => e.balance,
            TradeEvent::Exit(e) => e.balance,
        }
    }
}

/// Non-fatal reasons a signal was not acted on
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum Notice {
    /// Not even one lot is affordable
    #[error("insufficient capital: balance {balance:.2} < lot cost {lot_cost:.2}")]
    InsufficientCapital { balance: f64, lot_cost: f64 },
    /// Entry attempted while a position is open
    #[error("already positioned {side}")]
    AlreadyPositioned { side: Side },
    /// Exit attempted while flat
    #[error("no open position to exit")]
    NotPositioned,
}

/// What the simulator did with an input
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// State changed and a trade event was emitted
    Trade(TradeEvent),
    /// Input was actionable but dropped; state unchanged
    Skipped(Notice),
    /// Nothing to do
    Idle,
}

impl Action {
    pub fn event(&self) -> Option<&TradeEvent> {
        match self {
            Action::Trade(event) => Some(event),
            _ => None,
        }
    }
}
