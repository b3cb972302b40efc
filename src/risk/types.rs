//! Risk management types

use thiserror::Error;

/// Risk management errors
#[derive(Debug, Error, PartialEq)]
pub enum RiskError {
    /// Debit larger than the available balance
    #[error("Insufficient funds: need {needed:.2}, have {available:.2}")]
    InsufficientFunds { needed: f64, available: f64 },
}
