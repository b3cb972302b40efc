//! Capital pool and position state

use super::RiskError;
use crate::execution::TradeId;
use crate::signal::Side;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The single open position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Identifier issued on entry
    pub trade_id: TradeId,
    /// Trade side
    pub side: Side,
    /// Units held, a multiple of the lot size
    pub quantity: u64,
    /// Synthetic entry price per unit
    pub entry_price: f64,
    /// Underlying price at entry
    pub underlying_entry: f64,
    /// Stop level on the underlying
    pub stop_loss: f64,
    /// Target level on the underlying
    pub target: f64,
    /// Entry timestamp
    pub entry_time: DateTime<Utc>,
    /// Capital debited on entry
    pub capital_committed: f64,
}

impl Position {
    /// Realized P&L if exited at `exit_price`
    pub fn pnl_at(&self, exit_price: f64) -> f64 {
        (exit_price - self.entry_price) * self.quantity as f64 * self.side.sign()
    }

    /// Amount returned to the pool if exited at `exit_price`.
    ///
    /// A short that loses more than its committed capital returns nothing.
    pub fn value_at(&self, exit_price: f64) -> f64 {
        (self.capital_committed + self.pnl_at(exit_price)).max(0.0)
    }
}

/// Available balance of the simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapitalPool {
    initial_balance: f64,
    balance: f64,
}

impl CapitalPool {
    pub fn new(initial_balance: f64) -> Self {
        Self {
            initial_balance,
            balance: initial_balance,
        }
    }

    /// Available balance
    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn initial_balance(&self) -> f64 {
        self.initial_balance
    }

    /// Withdraw capital for an entry
    pub fn debit(&mut self, amount: f64) -> Result<(), RiskError> {
        if amount > self.balance {
            return Err(RiskError::InsufficientFunds {
                needed: amount,
                available: self.balance,
            });
        }
        self.balance -= amount;
        Ok(())
    }

    /// Return exit proceeds
    pub fn credit(&mut self, amount: f64) {
        self.balance += amount.max(0.0);
    }

    /// Balance plus the value of `position` marked at `mark_price`
    pub fn equity(&self, position: Option<&Position>, mark_price: f64) -> f64 {
        match position {
            Some(p) if mark_price.is_finite() => self.balance + p.value_at(mark_price),
            Some(p) => self.balance + p.capital_committed,
            None => self.balance,
        }
    }
}
