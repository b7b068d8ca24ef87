//! Error types for the frame loop.
//!
//! Almost nothing in a running game is an error: illegal transition requests
//! and input outside `Playing` are silent no-ops, and out-of-range arithmetic
//! is clamped. What remains is configuration loading, malformed transition
//! tables, stale entity lookups and asset loading.

use thiserror::Error;

use crate::entity::EntityId;
use crate::state::{GameEvent, GameState};

/// Errors raised by the frame loop and its building blocks.
#[derive(Debug, Error)]
pub enum FrameError {
    /// An entity id did not resolve to an entity in the arena.
    #[error("unknown entity {0}")]
    UnknownEntity(EntityId),

    /// A transition table rule would leave a terminal state on an event other
    /// than `Start` or `Reset`.
    #[error("rule {from:?} --{event:?}--> leaves a terminal state without a restart")]
    IllegalRule {
        /// Terminal state the rule starts from
        from: GameState,
        /// Event the rule reacts to
        event: GameEvent,
    },

    /// A configuration document could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// A tick callback gave up part-way through.
    #[error("tick {tick} aborted: {reason}")]
    TickAborted {
        /// Tick number that was aborted
        tick: u64,
        /// Human-readable cause
        reason: String,
    },
}

/// Errors from one-shot asset loads.
///
/// These never stop a game: an [`AssetSlot`](crate::assets::AssetSlot) that
/// receives one logs it and falls back to a placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetError {
    /// The asset source had nothing under this name.
    #[error("asset not found: {0}")]
    NotFound(String),

    /// The asset was found but could not be decoded.
    #[error("failed to decode asset {name}: {reason}")]
    Decode {
        /// Asset name
        name: String,
        /// Decoder message
        reason: String,
    },
}
