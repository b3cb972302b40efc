//! In-memory trade ledger

use super::{CloseTradeRecord, LedgerError, LedgerId, OpenTradeRecord, TradeLedger};
use uuid::Uuid;

/// A row held by [`MemoryLedger`]
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerEntry {
    Open(LedgerId, OpenTradeRecord),
    Close(CloseTradeRecord),
}

/// Vec-backed ledger for tests and dry runs
#[derive(Debug, Default)]
pub struct MemoryLedger {
    entries: Vec<LedgerEntry>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn opens(&self) -> impl Iterator<Item = &OpenTradeRecord> {
        self.entries.iter().filter_map(|e| match e {
            LedgerEntry::Open(_, r) => Some(r),
            _ => None,
        })
    }

    pub fn closes(&self) -> impl Iterator<Item = &CloseTradeRecord> {
        self.entries.iter().filter_map(|e| match e {
            LedgerEntry::Close(r) => Some(r),
            _ => None,
        })
    }
}

impl TradeLedger for MemoryLedger {
    fn open_trade(&mut self, record: &OpenTradeRecord) -> Result<LedgerId, LedgerError> {
        let id = Uuid::new_v4();
        self.entries.push(LedgerEntry::Open(id, record.clone()));
        Ok(id)
    }

    fn close_trade(&mut self, record: &CloseTradeRecord) -> Result<(), LedgerError> {
        self.entries.push(LedgerEntry::Close(record.clone()));
        Ok(())
    }
}
