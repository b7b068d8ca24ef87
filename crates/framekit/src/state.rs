//! Game state machine with explicit transition tables.
//!
//! Each game declares which `(state, event) -> state` transitions it allows.
//! Everything else is a silent no-op: pressing "shoot" on the menu, pausing a
//! game that has no pause, or firing `LivesExhausted` twice.
//!
//! # Invariants
//!
//! - The initial state is always [`GameState::Menu`].
//! - Terminal states ([`GameState::is_terminal`]) are left only through
//!   [`GameEvent::Start`] or [`GameEvent::Reset`]. Tables that break this are
//!   rejected when built or deserialized.
//! - [`GameEvent::Reset`] returns every state to `Menu`.
//!
//! # Example
//!
//! ```
//! use framekit::state::{GameEvent, GameState, StateMachine, TransitionTable};
//!
//! let mut machine = StateMachine::new(TransitionTable::arcade().with_pause());
//! assert_eq!(machine.state(), GameState::Menu);
//!
//! machine.fire(GameEvent::Start);
//! machine.fire(GameEvent::Pause);
//! assert_eq!(machine.state(), GameState::Paused);
//!
//! // Not in the table: ignored
//! assert!(machine.fire(GameEvent::LivesExhausted).is_none());
//! assert_eq!(machine.state(), GameState::Paused);
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::FrameError;

/// Top-level state of a game instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GameState {
    /// Title screen, waiting for `Start`
    Menu,
    /// Active gameplay
    Playing,
    /// Gameplay suspended
    Paused,
    /// Run ended in defeat
    GameOver,
    /// Wave or level cleared, waiting for `Start`
    LevelComplete,
    /// Round finished with an outcome to show (coin result, final score)
    Result,
}

impl GameState {
    /// States that only `Start` or `Reset` may leave.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::GameOver | Self::LevelComplete | Self::Result)
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Menu => "menu",
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::GameOver => "gameOver",
            Self::LevelComplete => "levelComplete",
            Self::Result => "result",
        };
        f.write_str(name)
    }
}

/// Named trigger for a state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GameEvent {
    /// Begin (or restart) play
    Start,
    /// Suspend play
    Pause,
    /// Continue after a pause
    Resume,
    /// The last life was lost
    LivesExhausted,
    /// Every target of the wave or board is gone
    AllTargetsCleared,
    /// A game countdown reached zero
    TimerExpired,
    /// A game-defined end condition (animation settled, match point reached)
    Finished,
    /// Return to the menu from anywhere
    Reset,
}

impl GameEvent {
    /// Events allowed to leave a terminal state.
    #[must_use]
    pub const fn is_restart(self) -> bool {
        matches!(self, Self::Start | Self::Reset)
    }
}

/// A transition that happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// State before the event
    pub from: GameState,
    /// The event
    pub event: GameEvent,
    /// State after the event
    pub to: GameState,
}

/// The allowed transitions of one game.
///
/// Serializes as a list of [`Transition`]s. Deserializing runs
/// [`TransitionTable::validate`], so a loaded table never lets a terminal
/// state leave on anything but a restart event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Transition>", into = "Vec<Transition>")]
pub struct TransitionTable {
    rules: BTreeMap<(GameState, GameEvent), GameState>,
}

impl TransitionTable {
    /// A table containing only `Reset -> Menu` from every state.
    #[must_use]
    pub fn new() -> Self {
        let mut table = Self::default();
        for state in [
            GameState::Menu,
            GameState::Playing,
            GameState::Paused,
            GameState::GameOver,
            GameState::LevelComplete,
            GameState::Result,
        ] {
            table.insert(state, GameEvent::Reset, GameState::Menu);
        }
        table
    }

    /// Standard arcade flow.
    ///
    /// `menu -> playing -> {gameOver, levelComplete}`, with `Start` leading
    /// back into play from `gameOver` and `levelComplete`.
    #[must_use]
    pub fn arcade() -> Self {
        let mut table = Self::new();
        table.insert(GameState::Menu, GameEvent::Start, GameState::Playing);
        table.insert(GameState::Playing, GameEvent::LivesExhausted, GameState::GameOver);
        table.insert(GameState::Playing, GameEvent::AllTargetsCleared, GameState::LevelComplete);
        table.insert(GameState::LevelComplete, GameEvent::Start, GameState::Playing);
        table.insert(GameState::GameOver, GameEvent::Start, GameState::Playing);
        table
    }

    /// Round-based flow ending in `result`.
    ///
    /// `menu -> playing -> result` on `TimerExpired`, `AllTargetsCleared` or
    /// `Finished`, with `Start` beginning the next round.
    #[must_use]
    pub fn timed() -> Self {
        let mut table = Self::new();
        table.insert(GameState::Menu, GameEvent::Start, GameState::Playing);
        table.insert(GameState::Playing, GameEvent::TimerExpired, GameState::Result);
        table.insert(GameState::Playing, GameEvent::AllTargetsCleared, GameState::Result);
        table.insert(GameState::Playing, GameEvent::Finished, GameState::Result);
        table.insert(GameState::Result, GameEvent::Start, GameState::Playing);
        table
    }

    /// Adds `playing <-> paused`.
    #[must_use]
    pub fn with_pause(mut self) -> Self {
        self.insert(GameState::Playing, GameEvent::Pause, GameState::Paused);
        self.insert(GameState::Paused, GameEvent::Resume, GameState::Playing);
        self
    }

    /// Adds a rule after checking it against the terminal-state invariant.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::IllegalRule`] if `from` is terminal and `event`
    /// is not a restart event.
    pub fn with_rule(
        mut self,
        from: GameState,
        event: GameEvent,
        to: GameState,
    ) -> Result<Self, FrameError> {
        if from.is_terminal() && !event.is_restart() {
            return Err(FrameError::IllegalRule { from, event });
        }
        self.insert(from, event, to);
        Ok(self)
    }

    /// Looks up the target of a transition.
    #[must_use]
    pub fn target(&self, from: GameState, event: GameEvent) -> Option<GameState> {
        self.rules.get(&(from, event)).copied()
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if the table has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Checks every rule against the terminal-state invariant.
    ///
    /// # Errors
    ///
    /// Returns the first offending rule as [`FrameError::IllegalRule`].
    pub fn validate(&self) -> Result<(), FrameError> {
        match self
            .rules
            .keys()
            .find(|(from, event)| from.is_terminal() && !event.is_restart())
        {
            Some(&(from, event)) => Err(FrameError::IllegalRule { from, event }),
            None => Ok(()),
        }
    }

    fn insert(&mut self, from: GameState, event: GameEvent, to: GameState) {
        self.rules.insert((from, event), to);
    }
}

impl TryFrom<Vec<Transition>> for TransitionTable {
    type Error = FrameError;

    fn try_from(rules: Vec<Transition>) -> Result<Self, Self::Error> {
        let table = Self {
            rules: rules
                .into_iter()
                .map(|rule| ((rule.from, rule.event), rule.to))
                .collect(),
        };
        table.validate()?;
        Ok(table)
    }
}

impl From<TransitionTable> for Vec<Transition> {
    fn from(table: TransitionTable) -> Self {
        table
            .rules
            .into_iter()
            .map(|((from, event), to)| Transition { from, event, to })
            .collect()
    }
}

/// Current state plus the table that governs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateMachine {
    state: GameState,
    table: TransitionTable,
}

impl StateMachine {
    /// Creates a machine in [`GameState::Menu`].
    #[must_use]
    pub fn new(table: TransitionTable) -> Self {
        Self {
            state: GameState::Menu,
            table,
        }
    }

    /// The current state.
    #[must_use]
    pub fn state(&self) -> GameState {
        self.state
    }

    /// Returns `true` if the current state is `state`.
    #[must_use]
    pub fn is(&self, state: GameState) -> bool {
        self.state == state
    }

    /// Shorthand for `is(GameState::Playing)`.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.is(GameState::Playing)
    }

    /// The governing table.
    #[must_use]
    pub fn table(&self) -> &TransitionTable {
        &self.table
    }

    /// Applies an event. Events without a rule for the current state are
    /// ignored and return `None`.
    pub fn fire(&mut self, event: GameEvent) -> Option<Transition> {
        let Some(to) = self.table.target(self.state, event) else {
            trace!(state = %self.state, ?event, "event ignored");
            return None;
        };
        let transition = Transition {
            from: self.state,
            event,
            to,
        };
        debug!(from = %transition.from, ?event, to = %to, "state transition");
        self.state = to;
        Some(transition)
    }
}
