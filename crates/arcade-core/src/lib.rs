//! # Arcade Core
//!
//! Casual and arcade games on the [`framekit`] frame loop: a coin flip with
//! statistics export, Tetris, Pong, Asteroids, Space Invaders, Bunny Catch and
//! a memory-matching game.
//!
//! Every game starts on the menu, is driven one tick at a time by a
//! [`framekit::Session`], and draws itself into a [`framekit::DrawList`].
//! Randomness comes from the session seed, so a seed plus an input script
//! replays exactly.
//!
//! ## Quick Start
//!
//! ```
//! use arcade_core::{CoinFlip, CoinFlipConfig};
//! use framekit::{GameState, LoopConfig, Session};
//! use glam::Vec2;
//!
//! let config = LoopConfig::with_seed(7);
//! let mut session = Session::new(CoinFlip::new(CoinFlipConfig::default(), &config), &config);
//!
//! session.click(Vec2::new(200.0, 200.0));
//! session.step_n(200).unwrap();
//!
//! assert_eq!(session.state(), GameState::Result);
//! assert_eq!(session.game().stats().total(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod games;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use error::ExportError;
pub use games::{
    Asteroids, AsteroidsConfig, Card, CardState, Catch, CatchConfig, CoinFlip, CoinFlipConfig,
    Face, FlipStats, Invaders, InvadersConfig, Memory, MemoryConfig, Pong, PongConfig, RockSize,
    Side, StatsExport, Tetris, TetrisConfig, Tetromino,
};
