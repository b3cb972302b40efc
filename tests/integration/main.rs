//! Integration tests for ema-paper

mod common;
mod e2e_test;
mod feed_test;
mod poll_test;
mod properties_test;
mod replay_test;
