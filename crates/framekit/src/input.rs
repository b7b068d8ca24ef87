//! Input state: held actions, per-tick presses and pointer clicks.
//!
//! The host feeds raw key names and pointer positions in between frames.
//! [`KeyMap`] turns key names into [`Actions`]; [`InputState`] remembers what
//! is held and what was newly pressed since the previous tick, so games can
//! tell "thrust while held" from "shoot once per press".

use std::collections::BTreeMap;

use bitflags::bitflags;
use glam::Vec2;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Abstract game actions, independent of the physical key.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Actions: u16 {
        /// Left arrow / A
        const MOVE_LEFT = 1 << 0;
        /// Right arrow / D
        const MOVE_RIGHT = 1 << 1;
        /// Up arrow / W
        const MOVE_UP = 1 << 2;
        /// Down arrow / S
        const MOVE_DOWN = 1 << 3;
        /// Rotate piece or ship
        const ROTATE = 1 << 4;
        /// Fire
        const SHOOT = 1 << 5;
        /// Toggle pause
        const PAUSE = 1 << 6;
        /// Start, confirm, flip
        const PRIMARY = 1 << 7;
        /// Hard drop
        const DROP = 1 << 8;
    }
}

/// Key-name to action bindings.
///
/// Key names follow the browser `KeyboardEvent.key` convention. Single
/// characters are matched case-insensitively.
///
/// ```
/// use framekit::input::{Actions, KeyMap};
///
/// let keys = KeyMap::default();
/// assert_eq!(keys.lookup("ArrowLeft"), Actions::MOVE_LEFT);
/// assert_eq!(keys.lookup("A"), Actions::MOVE_LEFT);
/// assert!(keys.lookup("F13").is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMap {
    bindings: BTreeMap<String, Actions>,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self::empty()
            .bind("ArrowLeft", Actions::MOVE_LEFT)
            .bind("a", Actions::MOVE_LEFT)
            .bind("ArrowRight", Actions::MOVE_RIGHT)
            .bind("d", Actions::MOVE_RIGHT)
            .bind("ArrowUp", Actions::MOVE_UP | Actions::ROTATE)
            .bind("w", Actions::MOVE_UP | Actions::ROTATE)
            .bind("ArrowDown", Actions::MOVE_DOWN)
            .bind("s", Actions::MOVE_DOWN)
            .bind("x", Actions::ROTATE)
            .bind(" ", Actions::SHOOT | Actions::DROP)
            .bind("p", Actions::PAUSE)
            .bind("Escape", Actions::PAUSE)
            .bind("Enter", Actions::PRIMARY)
    }
}

impl KeyMap {
    /// A map with no bindings.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            bindings: BTreeMap::new(),
        }
    }

    /// Binds `key` to `actions`, replacing any previous binding.
    #[must_use]
    pub fn bind(mut self, key: &str, actions: Actions) -> Self {
        self.bindings.insert(normalize(key), actions);
        self
    }

    /// Actions bound to `key`; empty for unbound keys.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Actions {
        self.bindings
            .get(&normalize(key))
            .copied()
            .unwrap_or_default()
    }

    /// Number of bound keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns `true` if no keys are bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

fn normalize(key: &str) -> String {
    if key.chars().count() == 1 {
        key.to_lowercase()
    } else {
        key.to_owned()
    }
}

/// Input accumulated between ticks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputState {
    held: Actions,
    pressed: Actions,
    clicks: Vec<Vec2>,
}

impl InputState {
    /// Creates an empty input state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `actions` as held. Actions not already held also count as
    /// pressed this tick; key repeat does not.
    pub fn press(&mut self, actions: Actions) {
        self.pressed |= actions - self.held;
        self.held |= actions;
    }

    /// Marks `actions` as released.
    pub fn release(&mut self, actions: Actions) {
        self.held -= actions;
    }

    /// Records a pointer click at `position`.
    pub fn click(&mut self, position: Vec2) {
        self.clicks.push(position);
    }

    /// Actions currently held.
    #[must_use]
    pub fn held(&self) -> Actions {
        self.held
    }

    /// Returns `true` if any of `actions` is held.
    #[must_use]
    pub fn is_held(&self, actions: Actions) -> bool {
        self.held.intersects(actions)
    }

    /// Returns `true` if any of `actions` went down since the last tick.
    #[must_use]
    pub fn was_pressed(&self, actions: Actions) -> bool {
        self.pressed.intersects(actions)
    }

    /// Clicks since the last tick, oldest first.
    #[must_use]
    pub fn clicks(&self) -> &[Vec2] {
        &self.clicks
    }

    /// Forgets per-tick presses and clicks. Held actions stay held.
    pub fn end_tick(&mut self) {
        self.pressed = Actions::empty();
        self.clicks.clear();
    }

    /// Forgets everything, including held actions.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
