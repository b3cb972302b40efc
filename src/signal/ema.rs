//! Recursive exponential moving average

/// EMA seeded with the first observation, `alpha = 2 / (span + 1)`
#[derive(Debug, Clone)]
pub struct Ema {
    alpha: f64,
    value: Option<f64>,
    samples: usize,
}

impl Ema {
    pub fn new(span: usize) -> Self {
        Self {
            alpha: 2.0 / (span as f64 + 1.0),
            value: None,
            samples: 0,
        }
    }

    /// Feed one observation and return the updated average
    pub fn update(&mut self, x: f64) -> f64 {
        let next = match self.value {
            None => x,
            Some(prev) => prev + self.alpha * (x - prev),
        };
        self.value = Some(next);
        self.samples += 1;
        next
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }

    /// Number of observations folded in so far
    pub fn samples(&self) -> usize {
        self.samples
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}
