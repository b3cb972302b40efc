//! Drawdown tracking

use serde::Serialize;

/// Tracks peak equity and the deepest drawdown seen
#[derive(Debug, Clone, Serialize)]
pub struct DrawdownMonitor {
    /// Peak equity value
    pub peak_equity: f64,
    /// Current equity value
    pub current_equity: f64,
    /// Largest peak-to-trough drop, absolute
    pub max_drawdown: f64,
    /// Largest peak-to-trough drop as a fraction of the peak
    pub max_drawdown_pct: f64,
}

impl DrawdownMonitor {
    /// Create a new drawdown monitor
    pub fn new(initial_equity: f64) -> Self {
        Self {
            peak_equity: initial_equity,
            current_equity: initial_equity,
            max_drawdown: 0.0,
            max_drawdown_pct: 0.0,
        }
    }

    /// Update with new equity value
    pub fn update(&mut self, new_equity: f64) {
        self.current_equity = new_equity;
        if new_equity > self.peak_equity {
            self.peak_equity = new_equity;
        }
        let drawdown = self.peak_equity - new_equity;
        if drawdown > self.max_drawdown {
            self.max_drawdown = drawdown;
        }
        let pct = self.current_drawdown();
        if pct > self.max_drawdown_pct {
            self.max_drawdown_pct = pct;
        }
    }

    /// Current drawdown from peak as a fraction
    pub fn current_drawdown(&self) -> f64 {
        if self.peak_equity <= 0.0 {
            return 0.0;
        }
        (self.peak_equity - self.current_equity) / self.peak_equity
    }
}
