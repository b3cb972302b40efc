//! Whole-lot position sizing
//!
//! Entries buy as many lots as the available balance affords, capped at a
//! configured maximum. A partial lot is never bought.

use crate::config::CapitalConfig;

/// Result of sizing an entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LotAllocation {
    /// Number of lots bought
    pub lots: u64,
    /// Units bought, `lots * lot_size`
    pub quantity: u64,
    /// Price of a single lot
    pub lot_cost: f64,
    /// Capital committed, `quantity * unit_price`
    pub cost: f64,
}

/// Sizes entries in whole lots
#[derive(Debug, Clone)]
pub struct LotSizer {
    /// Units per lot
    pub lot_size: u64,
    /// Maximum lots per entry
    pub max_lots: u64,
}

impl LotSizer {
    pub fn new(lot_size: u64, max_lots: u64) -> Self {
        Self { lot_size, max_lots }
    }

    /// Create from CapitalConfig
    pub fn from_config(config: &CapitalConfig) -> Self {
        Self::new(config.lot_size, config.max_lots)
    }

    /// Cost of one lot at `unit_price`
    pub fn lot_cost(&self, unit_price: f64) -> f64 {
        unit_price * self.lot_size as f64
    }

    /// Largest affordable allocation, or `None` when not even one lot fits
    pub fn allocate(&self, balance: f64, unit_price: f64) -> Option<LotAllocation> {
        let lot_cost = self.lot_cost(unit_price);
        if !(lot_cost > 0.0) || !lot_cost.is_finite() || !(balance > 0.0) {
            return None;
        }

        let mut lots = ((balance / lot_cost).floor() as u64).min(self.max_lots);
        loop {
            if lots == 0 {
                return None;
            }
            let quantity = lots * self.lot_size;
            let cost = quantity as f64 * unit_price;
            // Guard against the division rounding up at an exact boundary
            if cost <= balance {
                return Some(LotAllocation {
                    lots,
                    quantity,
                    lot_cost,
                    cost,
                });
            }
            lots -= 1;
        }
    }
}
