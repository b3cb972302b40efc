//! Shared fixtures

use chrono::{DateTime, Duration, TimeZone, Utc};
use ema_paper::execution::{MultiplierPricer, PaperEngine};
use ema_paper::feed::Bar;
use ema_paper::ledger::{
    CloseTradeRecord, LedgerError, LedgerId, OpenTradeRecord, TradeLedger,
};
use ema_paper::risk::LotSizer;

pub fn ts(i: usize) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 13, 3, 45, 0).unwrap() + Duration::minutes(5 * i as i64)
}

/// Bars with high/low one point either side of the close
pub fn bars(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| Bar::new(ts(i), c, c + 1.0, c - 1.0, c))
        .collect()
}

/// Bars with explicit (high, low, close)
pub fn hlc_bars(rows: &[(f64, f64, f64)]) -> Vec<Bar> {
    rows.iter()
        .enumerate()
        .map(|(i, &(h, l, c))| Bar::new(ts(i), c, h, l, c))
        .collect()
}

pub fn engine(balance: f64) -> PaperEngine {
    PaperEngine::new(
        "NIFTY 50",
        MultiplierPricer::new(0.01),
        LotSizer::new(75, 4),
        balance,
    )
}

/// Ledger that rejects every write
pub struct FailingLedger;

impl TradeLedger for FailingLedger {
    fn open_trade(&mut self, _: &OpenTradeRecord) -> Result<LedgerId, LedgerError> {
        Err(LedgerError::Rejected("disk full".to_string()))
    }

    fn close_trade(&mut self, _: &CloseTradeRecord) -> Result<(), LedgerError> {
        Err(LedgerError::Rejected("disk full".to_string()))
    }
}
