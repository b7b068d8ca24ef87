//! Crate-level scenario tests.
//!
//! - `determinism.rs`: same seed and inputs give identical state
//! - `integration.rs`: the full tick pipeline and the store/detector properties
//! - `helpers.rs`: spawn and setup utilities

mod determinism;
mod helpers;

pub use helpers::*;
