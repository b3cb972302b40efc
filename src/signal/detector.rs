//! EMA crossover signal generation

use super::ema::Ema;
use super::{Rejection, Setup, Side, Signal};
use crate::config::StrategyConfig;
use crate::feed::Bar;

/// EMA and range of the last valid bar
#[derive(Debug, Clone, Copy)]
struct PrevBar {
    short: f64,
    long: f64,
    high: f64,
    low: f64,
}

/// Detects short/long EMA crossovers with a stop-distance filter
///
/// A bullish crossover enters long with the previous bar's low as stop,
/// a bearish crossover enters short with the previous bar's high as stop.
/// Entries whose risk is not strictly positive or exceeds
/// `max_risk_points` are rejected.
#[derive(Debug, Clone)]
pub struct CrossoverDetector {
    short_span: usize,
    long_span: usize,
    max_risk_points: f64,
}

impl CrossoverDetector {
    /// Create a detector; spans are expected to be validated already
    pub fn new(short_span: usize, long_span: usize, max_risk_points: f64) -> Self {
        Self {
            short_span,
            long_span,
            max_risk_points,
        }
    }

    pub fn from_config(config: &StrategyConfig) -> Self {
        Self::new(config.short_span, config.long_span, config.max_risk_points)
    }

    pub fn max_risk_points(&self) -> f64 {
        self.max_risk_points
    }

    /// Produce exactly one signal per bar, in input order.
    ///
    /// Pure: the same bars always give the same signals.
    pub fn generate(&self, bars: &[Bar]) -> Vec<Signal> {
        let mut short = Ema::new(self.short_span);
        let mut long = Ema::new(self.long_span);
        let mut prev: Option<PrevBar> = None;
        let mut signals = Vec::with_capacity(bars.len());

        for bar in bars {
            if !bar.is_valid() {
                signals.push(Signal {
                    timestamp: bar.timestamp,
                    entry_price: bar.close,
                    short_ema: None,
                    long_ema: None,
                    setup: None,
                    rejection: Some(Rejection::InvalidRow),
                });
                continue;
            }

            let s = short.update(bar.close);
            let l = long.update(bar.close);

            let (setup, rejection) = match prev {
                _ if long.samples() < self.long_span => (None, Some(Rejection::InsufficientHistory)),
                None => (None, Some(Rejection::InsufficientHistory)),
                Some(p) => self.evaluate(bar, &p, s, l),
            };

            signals.push(Signal {
                timestamp: bar.timestamp,
                entry_price: bar.close,
                short_ema: Some(s),
                long_ema: Some(l),
                setup,
                rejection,
            });

            prev = Some(PrevBar {
                short: s,
                long: l,
                high: bar.high,
                low: bar.low,
            });
        }

        signals
    }

    fn evaluate(
        &self,
        bar: &Bar,
        prev: &PrevBar,
        short: f64,
        long: f64,
    ) -> (Option<Setup>, Option<Rejection>) {
        let bullish = prev.short <= prev.long && short > long;
        let bearish = prev.short >= prev.long && short < long;
        debug_assert!(!(bullish && bearish), "crossover in both directions");

        // Bullish wins if both ever held
        let (side, stop_loss, risk) = if bullish {
            (Side::Long, prev.low, bar.close - prev.low)
        } else if bearish {
            (Side::Short, prev.high, prev.high - bar.close)
        } else {
            return (None, None);
        };

        if risk <= 0.0 {
            tracing::trace!(%side, risk, timestamp = %bar.timestamp, "Crossover rejected: non-positive risk");
            return (None, Some(Rejection::NonPositiveRisk { risk }));
        }
        if risk > self.max_risk_points {
            tracing::trace!(%side, risk, timestamp = %bar.timestamp, "Crossover rejected: risk above max");
            return (
                None,
                Some(Rejection::RiskAboveMax {
                    risk,
                    max: self.max_risk_points,
                }),
            );
        }

        let target = bar.close + side.sign() * 2.0 * risk;
        (
            Some(Setup {
                side,
                stop_loss,
                risk,
                target,
            }),
            None,
        )
    }
}
