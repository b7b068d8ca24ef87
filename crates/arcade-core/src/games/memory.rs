//! Memory matching.
//!
//! A grid of face-down card pairs dealt with the seeded RNG. Clicking turns a
//! card up; two cards up either match and stay, or are turned back down by a
//! timer a moment later. Clicks are ignored while a mismatch is showing.
//! Matching every pair ends the game in `Result`.

use framekit::{
    Actions, Bounds, DrawList, Game, GameEvent, GameState, InputState, LoopConfig, Rgba,
    ScoreBoard, StateMachine, TickContext, TimerId, Timers, TransitionTable,
};
use glam::Vec2;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Memory tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Grid columns
    pub columns: u8,
    /// Grid rows. With an odd `columns * rows` the last cell stays empty.
    pub rows: u8,
    /// Card footprint
    pub card_size: Vec2,
    /// Space between cards
    pub gap: f32,
    /// Top-left corner of the grid
    pub origin: Vec2,
    /// Seconds a mismatched pair stays up
    pub cover_seconds: f32,
    /// Points per matched pair
    pub match_points: u64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            columns: 4,
            rows: 4,
            card_size: Vec2::new(90.0, 120.0),
            gap: 12.0,
            origin: Vec2::new(20.0, 60.0),
            cover_seconds: 1.0,
            match_points: 10,
        }
    }
}

impl MemoryConfig {
    /// Number of pairs on the table.
    #[must_use]
    pub fn pairs(&self) -> usize {
        usize::from(self.face_count())
    }

    fn face_count(&self) -> u16 {
        u16::from(self.columns) * u16::from(self.rows) / 2
    }
}

/// Whether a card shows its face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardState {
    /// Face down
    Hidden,
    /// Turned up, waiting for its partner
    Shown,
    /// Matched; stays up
    Matched,
}

/// One card on the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Picture on the face; each value appears on exactly two cards
    pub face: u16,
    /// Current state
    pub state: CardState,
}

impl Card {
    fn label(self) -> String {
        face_label(self.face)
    }
}

/// Letter label for a face: `A..Z`, then `AA..AZ`, `BA..` and so on.
#[must_use]
pub fn face_label(face: u16) -> String {
    const LETTERS: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    let mut n = usize::from(face) + 1;
    let mut label = String::new();
    while n > 0 {
        n -= 1;
        label.insert(0, char::from(LETTERS[n % 26]));
        n /= 26;
    }
    label
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MemoryTimer {
    Cover(usize, usize),
}

/// Memory matching game.
#[derive(Debug)]
pub struct Memory {
    config: MemoryConfig,
    machine: StateMachine,
    rng: ChaCha8Rng,
    cover_ticks: u32,
    cards: Vec<Card>,
    first: Option<usize>,
    cover: Option<TimerId>,
    timers: Timers<MemoryTimer>,
    board: ScoreBoard,
}

impl Memory {
    /// Creates a game on the menu. Cards are dealt on start.
    #[must_use]
    pub fn new(config: MemoryConfig, loop_config: &LoopConfig) -> Self {
        Self {
            machine: StateMachine::new(TransitionTable::timed()),
            rng: loop_config.rng(),
            cover_ticks: loop_config.ticks_for(config.cover_seconds),
            cards: Vec::new(),
            first: None,
            cover: None,
            timers: Timers::new(),
            board: ScoreBoard::new(0),
            config,
        }
    }

    /// Cards in row-major order.
    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Current score.
    #[must_use]
    pub fn score(&self) -> u64 {
        self.board.score()
    }

    /// Pairs turned up so far.
    #[must_use]
    pub fn moves(&self) -> u64 {
        self.board.counter("moves")
    }

    /// Pairs matched so far.
    #[must_use]
    pub fn matched_pairs(&self) -> usize {
        self.cards.iter().filter(|c| c.state == CardState::Matched).count() / 2
    }

    /// Returns `true` while a mismatched pair waits to be turned down.
    #[must_use]
    pub fn cover_pending(&self) -> bool {
        self.cover.is_some_and(|id| self.timers.is_pending(id))
    }

    /// Screen rectangle of card `index`.
    #[must_use]
    pub fn card_bounds(&self, index: usize) -> Bounds {
        let columns = usize::from(self.config.columns.max(1));
        #[allow(clippy::cast_precision_loss)]
        let cell = Vec2::new((index % columns) as f32, (index / columns) as f32);
        let min = self.config.origin + cell * (self.config.card_size + Vec2::splat(self.config.gap));
        Bounds::from_min_max(min, min + self.config.card_size)
    }

    fn card_at(&self, point: Vec2) -> Option<usize> {
        (0..self.cards.len()).find(|&i| self.card_bounds(i).contains(point))
    }

    fn deal(&mut self) {
        self.timers.cancel_all();
        self.cover = None;
        self.first = None;
        self.board.reset();

        let pairs = self.config.face_count();
        self.cards = (0..pairs)
            .flat_map(|face| [face, face])
            .map(|face| Card {
                face,
                state: CardState::Hidden,
            })
            .collect();
        self.cards.shuffle(&mut self.rng);
        debug!(pairs, "cards dealt");
    }

    fn turn_up(&mut self, index: usize) {
        if self.cover_pending() || self.cards[index].state != CardState::Hidden {
            return;
        }
        self.cards[index].state = CardState::Shown;

        let Some(first) = self.first.take() else {
            self.first = Some(index);
            return;
        };
        self.board.bump("moves");

        if self.cards[first].face == self.cards[index].face {
            self.cards[first].state = CardState::Matched;
            self.cards[index].state = CardState::Matched;
            self.board.add_points(self.config.match_points);
            if self.cards.iter().all(|c| c.state == CardState::Matched) {
                debug!(moves = self.moves(), "all pairs matched");
                self.machine.fire(GameEvent::AllTargetsCleared);
            }
        } else {
            self.cover = Some(
                self.timers
                    .schedule(self.cover_ticks, MemoryTimer::Cover(first, index)),
            );
        }
    }
}

impl Game for Memory {
    fn state(&self) -> GameState {
        self.machine.state()
    }

    fn apply_input(&mut self, input: &InputState, _ctx: TickContext) {
        if !input.was_pressed(Actions::PRIMARY) {
            return;
        }
        if self.machine.fire(GameEvent::Start).is_some() {
            self.deal();
            return;
        }
        if !self.machine.is_playing() {
            return;
        }
        let hits: Vec<usize> = input.clicks().iter().filter_map(|&p| self.card_at(p)).collect();
        for index in hits {
            self.turn_up(index);
        }
    }

    fn integrate(&mut self, _ctx: TickContext) {
        for timer in self.timers.tick() {
            match timer {
                MemoryTimer::Cover(a, b) => {
                    for i in [a, b] {
                        if let Some(card) = self.cards.get_mut(i) {
                            card.state = CardState::Hidden;
                        }
                    }
                    self.cover = None;
                }
            }
        }
    }

    fn render(&self, out: &mut DrawList) {
        out.background = Rgba::rgb(30, 30, 60);
        for (i, card) in self.cards.iter().enumerate() {
            let bounds = self.card_bounds(i);
            let center = (bounds.min + bounds.max) * 0.5;
            let color = match card.state {
                CardState::Hidden => Rgba::rgb(70, 90, 200),
                CardState::Shown => Rgba::WHITE,
                CardState::Matched => Rgba::rgb(160, 230, 160),
            };
            out.rect(center, self.config.card_size, color);
            if card.state != CardState::Hidden {
                out.text(center - Vec2::new(10.0, 0.0), card.label(), 40.0, Rgba::BLACK);
            }
        }
        out.text(
            Vec2::new(20.0, 20.0),
            format!("Moves {}  Pairs {}/{}", self.moves(), self.matched_pairs(), self.config.pairs()),
            18.0,
            Rgba::WHITE,
        );
        if self.state() == GameState::Result {
            out.text(Vec2::new(140.0, 300.0), "ALL PAIRS FOUND", 32.0, Rgba::GOLD);
        }
    }

    fn reset(&mut self) {
        self.timers.cancel_all();
        self.cover = None;
        self.first = None;
        self.cards.clear();
        self.board.reset();
        self.machine.fire(GameEvent::Reset);
    }

    fn surface(&self) -> Vec2 {
        let grid = Vec2::new(f32::from(self.config.columns), f32::from(self.config.rows));
        self.config.origin * 2.0 + grid * (self.config.card_size + Vec2::splat(self.config.gap))
    }
}
