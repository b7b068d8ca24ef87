//! Crate-level scenario tests.
//!
//! - `determinism.rs`: every game replays identically from a seed and script
//! - `integration.rs`: sessions driven through `frame`, exports, resets
//! - `helpers.rs`: session builders and input scripts

mod helpers;

pub use helpers::*;
