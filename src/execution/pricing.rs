//! Synthetic instrument pricing

/// Maps an underlying price to the traded instrument's price
pub trait SyntheticPricer: Send + Sync {
    fn price(&self, underlying: f64) -> f64;
}

/// Fixed fraction of the underlying, a stand-in for an option quote
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MultiplierPricer {
    pub multiplier: f64,
}

impl MultiplierPricer {
    pub fn new(multiplier: f64) -> Self {
        Self { multiplier }
    }

    /// Trade the underlying itself
    pub fn underlying() -> Self {
        Self::new(1.0)
    }
}

impl SyntheticPricer for MultiplierPricer {
    fn price(&self, underlying: f64) -> f64 {
        underlying * self.multiplier
    }
}

impl<F> SyntheticPricer for F
where
    F: Fn(f64) -> f64 + Send + Sync,
{
    fn price(&self, underlying: f64) -> f64 {
        self(underlying)
    }
}
