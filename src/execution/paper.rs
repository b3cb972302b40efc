//! Paper trading execution engine

use super::{
    Action, EntryEvent, ExitEvent, MultiplierPricer, Notice, SyntheticPricer, TradeEvent,
    TradeId, TradeStatus,
};
use crate::config::Config;
use crate::feed::Bar;
use crate::risk::{CapitalPool, LotSizer, Position};
use crate::signal::{Side, Signal};
use chrono::{DateTime, Utc};

/// Simulates fills against a virtual capital pool.
///
/// Owns the capital pool and the (at most one) open position. Every state
/// change happens inside a single method call together with the event that
/// describes it.
pub struct PaperEngine<P: SyntheticPricer = MultiplierPricer> {
    instrument: String,
    pricer: P,
    sizer: LotSizer,
    capital: CapitalPool,
    position: Option<Position>,
    protective_exits: bool,
    next_trade_id: u64,
}

impl PaperEngine<MultiplierPricer> {
    /// Build an engine from validated configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.instrument.label.clone(),
            MultiplierPricer::new(config.capital.synthetic_multiplier),
            LotSizer::from_config(&config.capital),
            config.capital.initial_balance,
        )
        .with_protective_exits(config.execution.protective_exits)
    }
}

impl<P: SyntheticPricer> PaperEngine<P> {
    /// Create a new paper trading engine
    pub fn new(
        instrument: impl Into<String>,
        pricer: P,
        sizer: LotSizer,
        initial_balance: f64,
    ) -> Self {
        Self {
            instrument: instrument.into(),
            pricer,
            sizer,
            capital: CapitalPool::new(initial_balance),
            position: None,
            protective_exits: true,
            next_trade_id: 1,
        }
    }

    /// Enable or disable stop/target exits in [`PaperEngine::on_bar`]
    pub fn with_protective_exits(mut self, enabled: bool) -> Self {
        self.protective_exits = enabled;
        self
    }

    pub fn instrument(&self) -> &str {
        &self.instrument
    }

    /// Available balance
    pub fn balance(&self) -> f64 {
        self.capital.balance()
    }

    pub fn initial_balance(&self) -> f64 {
        self.capital.initial_balance()
    }

    pub fn position(&self) -> Option<&Position> {
        self.position.as_ref()
    }

    pub fn is_flat(&self) -> bool {
        self.position.is_none()
    }

    /// Balance plus the open position marked at the underlying `mark`
    pub fn equity(&self, mark: f64) -> f64 {
        self.capital
            .equity(self.position.as_ref(), self.pricer.price(mark))
    }

    /// Apply one signal.
    ///
    /// Flat + entry signal opens, open + opposing signal closes, anything
    /// else leaves state untouched.
    pub fn on_signal(&mut self, signal: &Signal) -> Action {
        let Some(setup) = signal.setup else {
            return Action::Idle;
        };

        match self.position.as_ref().map(|p| p.side) {
            None => self.open(signal, setup.side, setup.stop_loss, setup.risk, setup.target),
            Some(held) if held == setup.side => {
                tracing::debug!(
                    side = %held,
                    timestamp = %signal.timestamp,
                    "Entry signal ignored, already positioned"
                );
                Action::Skipped(Notice::AlreadyPositioned { side: held })
            }
            Some(_) => self.close(signal.entry_price, signal.timestamp, TradeStatus::Closed),
        }
    }

    /// Check the open position's stop and target against a bar.
    ///
    /// Only bars after the entry bar are checked. When both levels fall
    /// inside the bar's range the stop is assumed to have traded first.
    pub fn on_bar(&mut self, bar: &Bar) -> Action {
        if !self.protective_exits {
            return Action::Idle;
        }
        let Some(position) = self.position.as_ref() else {
            return Action::Idle;
        };
        if bar.timestamp <= position.entry_time || !bar.high.is_finite() || !bar.low.is_finite()
        {
            return Action::Idle;
        }

        let (stop_hit, target_hit) = match position.side {
            Side::Long => (bar.low <= position.stop_loss, bar.high >= position.target),
            Side::Short => (bar.high >= position.stop_loss, bar.low <= position.target),
        };
        let (level, status) = if stop_hit {
            (position.stop_loss, TradeStatus::StoppedOut)
        } else if target_hit {
            (position.target, TradeStatus::TargetHit)
        } else {
            return Action::Idle;
        };

        self.close(level, bar.timestamp, status)
    }

    /// Close the open position at the underlying `price`
    pub fn exit(&mut self, price: f64, timestamp: DateTime<Utc>, status: TradeStatus) -> Action {
        self.close(price, timestamp, status)
    }

    fn open(
        &mut self,
        signal: &Signal,
        side: Side,
        stop_loss: f64,
        risk: f64,
        target: f64,
    ) -> Action {
        let entry_price = self.pricer.price(signal.entry_price);
        let balance = self.capital.balance();
        let Some(alloc) = self.sizer.allocate(balance, entry_price) else {
            let lot_cost = self.sizer.lot_cost(entry_price);
            tracing::warn!(
                balance,
                lot_cost,
                timestamp = %signal.timestamp,
                "Entry skipped, insufficient capital"
            );
            return Action::Skipped(Notice::InsufficientCapital { balance, lot_cost });
        };

        if let Err(e) = self.capital.debit(alloc.cost) {
            // Unreachable: the allocation is bounded by the balance
            tracing::error!(error = %e, "Entry debit rejected");
            return Action::Skipped(Notice::InsufficientCapital {
                balance,
                lot_cost: alloc.lot_cost,
            });
        }

        let trade_id = TradeId(self.next_trade_id);
        self.next_trade_id += 1;

        self.position = Some(Position {
            trade_id,
            side,
            quantity: alloc.quantity,
            entry_price,
            underlying_entry: signal.entry_price,
            stop_loss,
            target,
            entry_time: signal.timestamp,
            capital_committed: alloc.cost,
        });

        let event = EntryEvent {
            trade_id,
            instrument: self.instrument.clone(),
            side,
            timestamp: signal.timestamp,
            underlying_price: signal.entry_price,
            entry_price,
            stop_loss,
            risk_points: risk,
            target_price: target,
            lots: alloc.lots,
            quantity: alloc.quantity,
            capital_used: alloc.cost,
            balance: self.capital.balance(),
        };

        tracing::info!(
            %trade_id,
            %side,
            quantity = event.quantity,
            entry_price = event.entry_price,
            stop_loss,
            target,
            balance = event.balance,
            "Opened position"
        );
        Action::Trade(TradeEvent::Entry(event))
    }

    fn close(&mut self, underlying: f64, timestamp: DateTime<Utc>, status: TradeStatus) -> Action {
        let Some(position) = self.position.take() else {
            tracing::debug!(%timestamp, "Exit ignored, no open position");
            return Action::Skipped(Notice::NotPositioned);
        };

        let exit_price = self.pricer.price(underlying);
        let pnl = position.pnl_at(exit_price);
        self.capital.credit(position.value_at(exit_price));

        let event = ExitEvent {
            trade_id: position.trade_id,
            instrument: self.instrument.clone(),
            side: position.side,
            timestamp,
            underlying_price: underlying,
            entry_price: position.entry_price,
            exit_price,
            quantity: position.quantity,
            capital_committed: position.capital_committed,
            pnl,
            balance: self.capital.balance(),
            status,
        };

        tracing::info!(
            trade_id = %event.trade_id,
            side = %event.side,
            %status,
            exit_price,
            pnl,
            balance = event.balance,
            "Closed position"
        );
        Action::Trade(TradeEvent::Exit(event))
    }
}
