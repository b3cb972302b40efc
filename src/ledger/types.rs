//! Trade ledger records
//!
//! Values here are human-facing and rounded to two decimals; the engine
//! keeps full precision.

use super::LedgerId;
use crate::execution::{EntryEvent, ExitEvent, TradeId, TradeStatus};
use crate::signal::Side;
use chrono::{DateTime, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Round to two decimals for display and storage
pub fn round2(value: f64) -> Decimal {
    Decimal::from_f64(value)
        .map(|d| d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
        .unwrap_or_default()
}

/// Row written when a position opens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenTradeRecord {
    pub trade_id: TradeId,
    pub timestamp: DateTime<Utc>,
    pub instrument: String,
    pub side: Side,
    pub entry_price: Decimal,
    pub risk_points: Decimal,
    pub stop_loss: Decimal,
    pub target_price: Decimal,
    pub quantity: u64,
    pub balance: Decimal,
    pub remarks: String,
}

impl From<&EntryEvent> for OpenTradeRecord {
    fn from(e: &EntryEvent) -> Self {
        Self {
            trade_id: e.trade_id,
            timestamp: e.timestamp,
            instrument: e.instrument.clone(),
            side: e.side,
            entry_price: round2(e.entry_price),
            risk_points: round2(e.risk_points),
            stop_loss: round2(e.stop_loss),
            target_price: round2(e.target_price),
            quantity: e.quantity,
            balance: round2(e.balance),
            remarks: format!(
                "Entered {} {} lot(s) at underlying {:.2}",
                e.side.to_string().to_lowercase(),
                e.lots,
                e.underlying_price
            ),
        }
    }
}

/// Row written when a position closes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloseTradeRecord {
    pub trade_id: TradeId,
    /// Ledger row of the matching open, when it was written
    #[serde(default)]
    pub ledger_id: Option<LedgerId>,
    pub timestamp: DateTime<Utc>,
    pub exit_price: Decimal,
    pub pnl: Decimal,
    pub exit_balance: Decimal,
    pub status: TradeStatus,
    pub remarks: String,
}

impl From<&ExitEvent> for CloseTradeRecord {
    fn from(e: &ExitEvent) -> Self {
        Self {
            trade_id: e.trade_id,
            ledger_id: None,
            timestamp: e.timestamp,
            exit_price: round2(e.exit_price),
            pnl: round2(e.pnl),
            exit_balance: round2(e.balance),
            status: e.status,
            remarks: format!(
                "Exited {} at underlying {:.2}",
                e.side.to_string().to_lowercase(),
                e.underlying_price
            ),
        }
    }
}
