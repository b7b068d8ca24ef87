//! Score, lives, level and named counters.
//!
//! Game rules only ever move these forward during play. A new game calls
//! [`ScoreBoard::reset`], which restores the starting lives and level and
//! zeroes everything else.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Numeric readouts for one game instance.
///
/// ```
/// use framekit::ScoreBoard;
///
/// let mut board = ScoreBoard::new(2);
/// board.add_points(50);
/// assert!(!board.lose_life());
/// assert!(board.lose_life());
/// assert_eq!(board.lives(), 0);
///
/// board.reset();
/// assert_eq!((board.score(), board.lives()), (0, 2));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBoard {
    score: u64,
    lives: u32,
    level: u32,
    initial_lives: u32,
    initial_level: u32,
    counters: BTreeMap<String, u64>,
}

impl ScoreBoard {
    /// Board with `lives` starting lives at level 0.
    #[must_use]
    pub fn new(lives: u32) -> Self {
        Self {
            lives,
            initial_lives: lives,
            ..Self::default()
        }
    }

    /// Sets the starting level.
    #[must_use]
    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self.initial_level = level;
        self
    }

    /// Current score.
    #[must_use]
    pub fn score(&self) -> u64 {
        self.score
    }

    /// Lives left.
    #[must_use]
    pub fn lives(&self) -> u32 {
        self.lives
    }

    /// Current level.
    #[must_use]
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Adds to the score, saturating.
    pub fn add_points(&mut self, points: u64) {
        self.score = self.score.saturating_add(points);
    }

    /// Takes one life. Returns `true` if no lives remain afterwards.
    pub fn lose_life(&mut self) -> bool {
        self.lives = self.lives.saturating_sub(1);
        self.lives == 0
    }

    /// Grants one extra life.
    pub fn gain_life(&mut self) {
        self.lives = self.lives.saturating_add(1);
    }

    /// Sets the level.
    pub fn set_level(&mut self, level: u32) {
        self.level = level;
    }

    /// Moves to the next level and returns it.
    pub fn next_level(&mut self) -> u32 {
        self.level = self.level.saturating_add(1);
        self.level
    }

    /// Increments a named counter and returns its new value.
    pub fn bump(&mut self, counter: &str) -> u64 {
        let value = self.counters.entry(counter.to_owned()).or_default();
        *value = value.saturating_add(1);
        *value
    }

    /// Adds `amount` to a named counter and returns its new value.
    pub fn add(&mut self, counter: &str, amount: u64) -> u64 {
        let value = self.counters.entry(counter.to_owned()).or_default();
        *value = value.saturating_add(amount);
        *value
    }

    /// Value of a named counter; zero if never touched.
    #[must_use]
    pub fn counter(&self, counter: &str) -> u64 {
        self.counters.get(counter).copied().unwrap_or(0)
    }

    /// All named counters in name order.
    pub fn counters(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.counters.iter().map(|(name, value)| (name.as_str(), *value))
    }

    /// Restores starting lives and level, zeroes score and counters.
    pub fn reset(&mut self) {
        self.score = 0;
        self.lives = self.initial_lives;
        self.level = self.initial_level;
        self.counters.clear();
    }
}
