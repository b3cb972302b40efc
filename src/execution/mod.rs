//! Execution engine module
//!
//! Turns signals into simulated fills against a virtual capital pool

mod paper;
mod pricing;
mod types;

pub use paper::PaperEngine;
pub use pricing::{MultiplierPricer, SyntheticPricer};
pub use types::{Action, EntryEvent, ExitEvent, Notice, TradeEvent, TradeId, TradeStatus};
