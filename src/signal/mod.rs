//! Signal generation module
//!
//! Turns a bar series into one signal per bar from EMA crossovers,
//! filtered by stop distance

mod detector;
mod ema;
mod types;

pub use detector::CrossoverDetector;
pub use ema::Ema;
pub use types::{Rejection, Setup, Side, Signal};
