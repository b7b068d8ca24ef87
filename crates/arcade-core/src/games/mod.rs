//! The games.
//!
//! Each game owns its state machine, entities and timers, and implements
//! [`framekit::Game`] so a [`framekit::Session`] can drive it.

pub mod asteroids;
pub mod catch;
pub mod coin_flip;
pub mod invaders;
pub mod memory;
pub mod pong;
pub mod stats;
pub mod tetris;

pub use asteroids::{Asteroids, AsteroidsConfig, RockSize};
pub use catch::{Catch, CatchConfig};
pub use coin_flip::{CoinFlip, CoinFlipConfig, Face};
pub use invaders::{Invaders, InvadersConfig};
pub use memory::{Card, CardState, Memory, MemoryConfig};
pub use pong::{Pong, PongConfig, Side};
pub use stats::{FlipStats, StatsExport};
pub use tetris::{Tetris, TetrisConfig, Tetromino};
