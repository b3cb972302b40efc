//! Trade ledger module
//!
//! Durable record of opened and closed trades. The engine's own state is
//! authoritative; the ledger is write-only from its point of view.

mod jsonl;
mod memory;
mod types;

pub use jsonl::JsonlLedger;
pub use memory::{LedgerEntry, MemoryLedger};
pub use types::{round2, CloseTradeRecord, OpenTradeRecord};

use crate::execution::{TradeEvent, TradeId};
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

/// Identifier of a ledger row
pub type LedgerId = Uuid;

/// Ledger write failures
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Ledger rejected record: {0}")]
    Rejected(String),
}

/// Trait for trade ledger implementations
pub trait TradeLedger: Send {
    /// Record an opened trade
    fn open_trade(&mut self, record: &OpenTradeRecord) -> Result<LedgerId, LedgerError>;
    /// Record a closed trade; `record.ledger_id` is the id its open returned
    fn close_trade(&mut self, record: &CloseTradeRecord) -> Result<(), LedgerError>;
}

impl<L: TradeLedger + ?Sized> TradeLedger for Box<L> {
    fn open_trade(&mut self, record: &OpenTradeRecord) -> Result<LedgerId, LedgerError> {
        (**self).open_trade(record)
    }

    fn close_trade(&mut self, record: &CloseTradeRecord) -> Result<(), LedgerError> {
        (**self).close_trade(record)
    }
}

/// A ledger write that failed after the engine already changed state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerFailure {
    pub trade_id: TradeId,
    pub error: String,
}

/// Writes trade events to a ledger, linking each close to its open's row
#[derive(Debug, Default)]
pub struct LedgerRecorder {
    open_rows: HashMap<TradeId, LedgerId>,
}

impl LedgerRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger row of a trade that is still open
    pub fn open_row(&self, trade_id: TradeId) -> Option<LedgerId> {
        self.open_rows.get(&trade_id).copied()
    }

    /// Record one event, returning the ledger row it refers to.
    ///
    /// A close whose open was never written carries no ledger id.
    pub fn record<L: TradeLedger + ?Sized>(
        &mut self,
        ledger: &mut L,
        event: &TradeEvent,
    ) -> Result<Option<LedgerId>, LedgerError> {
        match event {
            TradeEvent::Entry(e) => {
                let id = ledger.open_trade(&OpenTradeRecord::from(e))?;
                self.open_rows.insert(e.trade_id, id);
                Ok(Some(id))
            }
            TradeEvent::Exit(x) => {
                let mut record = CloseTradeRecord::from(x);
                record.ledger_id = self.open_rows.remove(&x.trade_id);
                ledger.close_trade(&record)?;
                Ok(record.ledger_id)
            }
        }
    }

    /// Record `event`, logging and returning the failure instead of propagating it.
    ///
    /// The engine's state is authoritative: a failed write is never rolled back.
    pub fn record_or_log<L: TradeLedger + ?Sized>(
        &mut self,
        ledger: &mut L,
        event: &TradeEvent,
    ) -> Option<LedgerFailure> {
        match self.record(ledger, event) {
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(
                    trade_id = %event.trade_id(),
                    error = %e,
                    "Ledger write failed"
                );
                crate::telemetry::increment(crate::telemetry::CounterMetric::LedgerFailures);
                Some(LedgerFailure {
                    trade_id: event.trade_id(),
                    error: e.to_string(),
                })
            }
        }
    }
}
