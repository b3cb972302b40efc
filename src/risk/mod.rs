//! Risk management module
//!
//! Capital pool, position state, lot sizing and drawdown tracking

mod limits;
mod position;
mod sizing;
mod types;

pub use limits::DrawdownMonitor;
pub use position::{CapitalPool, Position};
pub use sizing::{LotAllocation, LotSizer};
pub use types::RiskError;
