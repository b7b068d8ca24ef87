//! Tetris on a 10x20 board.
//!
//! Pieces come from a seeded seven-piece bag. Gravity moves the active piece
//! down one row every `gravity_frames(level)` ticks; a piece that cannot
//! move down locks into the board, full rows clear, and the next piece
//! spawns. If it cannot spawn, the game is over.
//!
//! Scoring: `cleared * 100 * (level + 1)` per lock, one point per soft-drop
//! row, two per hard-drop row. `level = lines / 10`.

use framekit::{
    Actions, DrawList, Game, GameEvent, GameState, InputState, LoopConfig, Rgba, ScoreBoard,
    StateMachine, TickContext, TransitionTable,
};
use glam::Vec2;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Board width in cells.
pub const BOARD_WIDTH: usize = 10;
/// Board height in cells.
pub const BOARD_HEIGHT: usize = 20;

const SPAWN_X: i32 = 4;
const SPAWN_Y: i32 = 1;

// =============================================================================
// Pieces
// =============================================================================

/// The seven tetrominoes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tetromino {
    /// Four in a row
    I,
    /// Square
    O,
    /// T
    T,
    /// S
    S,
    /// Z
    Z,
    /// J
    J,
    /// L
    L,
}

impl Tetromino {
    /// All seven, in bag order before shuffling.
    pub const ALL: [Tetromino; 7] = [
        Self::I,
        Self::O,
        Self::T,
        Self::S,
        Self::Z,
        Self::J,
        Self::L,
    ];

    /// Cell offsets in spawn orientation, y pointing down.
    #[must_use]
    pub const fn shape(self) -> [(i32, i32); 4] {
        match self {
            Self::I => [(-1, 0), (0, 0), (1, 0), (2, 0)],
            Self::O => [(0, 0), (1, 0), (0, 1), (1, 1)],
            Self::T => [(-1, 0), (0, 0), (1, 0), (0, -1)],
            Self::S => [(-1, 0), (0, 0), (0, -1), (1, -1)],
            Self::Z => [(-1, -1), (0, -1), (0, 0), (1, 0)],
            Self::J => [(-1, -1), (-1, 0), (0, 0), (1, 0)],
            Self::L => [(1, -1), (-1, 0), (0, 0), (1, 0)],
        }
    }

    /// Non-zero board value for locked cells of this piece.
    #[must_use]
    pub const fn cell_value(self) -> u8 {
        match self {
            Self::I => 1,
            Self::O => 2,
            Self::T => 3,
            Self::S => 4,
            Self::Z => 5,
            Self::J => 6,
            Self::L => 7,
        }
    }
}

/// A tetromino at a position and rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    /// Which piece
    pub kind: Tetromino,
    /// Quarter turns clockwise, `0..4`
    pub rotation: u8,
    /// Pivot column
    pub x: i32,
    /// Pivot row
    pub y: i32,
}

impl Piece {
    /// A piece at the spawn point.
    #[must_use]
    pub const fn spawn(kind: Tetromino) -> Self {
        Self {
            kind,
            rotation: 0,
            x: SPAWN_X,
            y: SPAWN_Y,
        }
    }

    /// Board coordinates of the four cells.
    #[must_use]
    pub fn cells(&self) -> [(i32, i32); 4] {
        let turns = if self.kind == Tetromino::O {
            0
        } else {
            self.rotation % 4
        };
        self.kind.shape().map(|(mut dx, mut dy)| {
            for _ in 0..turns {
                (dx, dy) = (-dy, dx);
            }
            (self.x + dx, self.y + dy)
        })
    }

    /// The same piece shifted.
    #[must_use]
    pub const fn shifted(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..self
        }
    }

    /// The same piece turned a quarter clockwise.
    #[must_use]
    pub const fn rotated(self) -> Self {
        Self {
            rotation: (self.rotation + 1) % 4,
            ..self
        }
    }
}

// =============================================================================
// Board
// =============================================================================

/// Locked cells. Row 0 is the top; zero means empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    rows: Vec<[u8; BOARD_WIDTH]>,
}

impl Default for Board {
    fn default() -> Self {
        Self {
            rows: vec![[0; BOARD_WIDTH]; BOARD_HEIGHT],
        }
    }
}

impl Board {
    /// Empty board.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Value at `(x, y)`; `None` outside the board.
    #[must_use]
    pub fn cell(&self, x: i32, y: i32) -> Option<u8> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        self.rows.get(y)?.get(x).copied()
    }

    /// Sets a cell. Coordinates outside the board are ignored.
    pub fn set(&mut self, x: i32, y: i32, value: u8) {
        if let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y)) {
            if let Some(cell) = self.rows.get_mut(y).and_then(|row| row.get_mut(x)) {
                *cell = value;
            }
        }
    }

    /// Returns `true` if the piece is inside the walls and floor and overlaps
    /// no locked cell. Rows above the board count as free.
    #[must_use]
    pub fn fits(&self, piece: &Piece) -> bool {
        piece.cells().iter().all(|&(x, y)| {
            let in_walls = (0..BOARD_WIDTH as i32).contains(&x) && y < BOARD_HEIGHT as i32;
            in_walls && (y < 0 || self.cell(x, y) == Some(0))
        })
    }

    /// Writes the piece into the board. Returns `false` if any cell was above
    /// the top row.
    pub fn lock(&mut self, piece: &Piece) -> bool {
        let mut inside = true;
        for (x, y) in piece.cells() {
            if y < 0 {
                inside = false;
            } else {
                self.set(x, y, piece.kind.cell_value());
            }
        }
        inside
    }

    /// Returns `true` if every cell of row `y` is filled.
    #[must_use]
    pub fn row_full(&self, y: usize) -> bool {
        self.rows.get(y).is_some_and(|row| row.iter().all(|&c| c != 0))
    }

    /// Removes full rows, shifting everything above down. Returns the number
    /// of rows cleared.
    pub fn clear_lines(&mut self) -> u32 {
        let before = self.rows.len();
        self.rows.retain(|row| row.iter().any(|&c| c == 0));
        let cleared = before - self.rows.len();
        for _ in 0..cleared {
            self.rows.insert(0, [0; BOARD_WIDTH]);
        }
        u32::try_from(cleared).unwrap_or(u32::MAX)
    }

    /// Rows top to bottom.
    #[must_use]
    pub fn rows(&self) -> &[[u8; BOARD_WIDTH]] {
        &self.rows
    }
}

// =============================================================================
// Game
// =============================================================================

/// Tetris tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TetrisConfig {
    /// Ticks per gravity row at level 0
    pub base_gravity_frames: u32,
    /// Fastest gravity
    pub min_gravity_frames: u32,
    /// Ticks shaved off per level
    pub gravity_step: u32,
    /// Lines per level
    pub lines_per_level: u32,
    /// Base points per cleared line
    pub line_points: u64,
    /// Cell size in pixels
    pub cell_size: f32,
}

impl Default for TetrisConfig {
    fn default() -> Self {
        Self {
            base_gravity_frames: 48,
            min_gravity_frames: 3,
            gravity_step: 5,
            lines_per_level: 10,
            line_points: 100,
            cell_size: 24.0,
        }
    }
}

impl TetrisConfig {
    /// Ticks per gravity row at `level`.
    #[must_use]
    pub fn gravity_frames(&self, level: u32) -> u32 {
        self.base_gravity_frames
            .saturating_sub(level.saturating_mul(self.gravity_step))
            .max(self.min_gravity_frames.max(1))
    }
}

/// Tetris game.
#[derive(Debug)]
pub struct Tetris {
    config: TetrisConfig,
    machine: StateMachine,
    rng: ChaCha8Rng,
    board: Board,
    bag: Vec<Tetromino>,
    active: Option<Piece>,
    next: Tetromino,
    gravity: u32,
    lines: u32,
    board_score: ScoreBoard,
}

impl Tetris {
    /// Creates a game on the menu.
    #[must_use]
    pub fn new(config: TetrisConfig, loop_config: &LoopConfig) -> Self {
        let mut game = Self {
            config,
            machine: StateMachine::new(TransitionTable::arcade().with_pause()),
            rng: loop_config.rng(),
            board: Board::new(),
            bag: Vec::new(),
            active: None,
            next: Tetromino::I,
            gravity: 0,
            lines: 0,
            board_score: ScoreBoard::new(1),
        };
        game.next = game.draw();
        game
    }

    /// Locked cells.
    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The falling piece.
    #[must_use]
    pub fn active(&self) -> Option<&Piece> {
        self.active.as_ref()
    }

    /// The piece that spawns next.
    #[must_use]
    pub fn next_piece(&self) -> Tetromino {
        self.next
    }

    /// Lines cleared this game.
    #[must_use]
    pub fn lines(&self) -> u32 {
        self.lines
    }

    /// Current level.
    #[must_use]
    pub fn level(&self) -> u32 {
        self.board_score.level()
    }

    /// Current score.
    #[must_use]
    pub fn score(&self) -> u64 {
        self.board_score.score()
    }

    fn draw(&mut self) -> Tetromino {
        if self.bag.is_empty() {
            self.bag = Tetromino::ALL.to_vec();
            self.bag.shuffle(&mut self.rng);
        }
        self.bag.pop().unwrap_or(Tetromino::T)
    }

    fn new_game(&mut self) {
        self.board = Board::new();
        self.board_score.reset();
        self.lines = 0;
        self.gravity = 0;
        self.active = None;
        self.spawn();
    }

    fn spawn(&mut self) {
        let piece = Piece::spawn(self.next);
        self.next = self.draw();
        if self.board.fits(&piece) {
            self.active = Some(piece);
        } else {
            self.top_out();
        }
    }

    fn top_out(&mut self) {
        self.active = None;
        self.board_score.lose_life();
        debug!(score = self.score(), lines = self.lines, "topped out");
        self.machine.fire(GameEvent::LivesExhausted);
    }

    fn try_move(&mut self, dx: i32, dy: i32) -> bool {
        let Some(piece) = self.active else {
            return false;
        };
        let moved = piece.shifted(dx, dy);
        if self.board.fits(&moved) {
            self.active = Some(moved);
            true
        } else {
            false
        }
    }

    fn try_rotate(&mut self) -> bool {
        let Some(piece) = self.active else {
            return false;
        };
        let turned = piece.rotated();
        // Plain rotation first, then one cell either way off a wall
        for kick in [0, -1, 1, -2, 2] {
            let candidate = turned.shifted(kick, 0);
            if self.board.fits(&candidate) {
                self.active = Some(candidate);
                return true;
            }
        }
        false
    }

    fn hard_drop(&mut self) {
        let mut rows = 0;
        while self.try_move(0, 1) {
            rows += 1;
        }
        self.board_score.add_points(2 * rows);
        self.place_piece();
    }

    /// Locks the active piece, clears full rows, scores, and spawns the next
    /// piece.
    fn place_piece(&mut self) {
        let Some(piece) = self.active.take() else {
            return;
        };
        if !self.board.lock(&piece) {
            self.top_out();
            return;
        }

        let cleared = self.board.clear_lines();
        if cleared > 0 {
            let level = self.level();
            self.board_score
                .add_points(u64::from(cleared) * self.config.line_points * u64::from(level + 1));
            self.lines += cleared;
            self.board_score
                .set_level(self.lines / self.config.lines_per_level.max(1));
            debug!(cleared, lines = self.lines, level = self.level(), "lines cleared");
        }
        self.gravity = 0;
        self.spawn();
    }
}

impl Game for Tetris {
    fn state(&self) -> GameState {
        self.machine.state()
    }

    fn apply_input(&mut self, input: &InputState, _ctx: TickContext) {
        if input.was_pressed(Actions::PAUSE) {
            let event = if self.machine.is(GameState::Paused) {
                GameEvent::Resume
            } else {
                GameEvent::Pause
            };
            self.machine.fire(event);
            return;
        }
        if input.was_pressed(Actions::PRIMARY)
            && self.machine.fire(GameEvent::Start).is_some()
        {
            self.new_game();
            return;
        }
        if !self.machine.is_playing() {
            return;
        }

        if input.was_pressed(Actions::MOVE_LEFT) {
            self.try_move(-1, 0);
        }
        if input.was_pressed(Actions::MOVE_RIGHT) {
            self.try_move(1, 0);
        }
        if input.was_pressed(Actions::ROTATE) {
            self.try_rotate();
        }
        if input.was_pressed(Actions::DROP) {
            self.hard_drop();
        } else if input.is_held(Actions::MOVE_DOWN) && self.try_move(0, 1) {
            self.board_score.add_points(1);
            self.gravity = 0;
        }
    }

    fn integrate(&mut self, _ctx: TickContext) {
        if !self.machine.is_playing() {
            return;
        }
        self.gravity += 1;
        if self.gravity >= self.config.gravity_frames(self.level()) {
            self.gravity = 0;
            if !self.try_move(0, 1) {
                self.place_piece();
            }
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn render(&self, out: &mut DrawList) {
        let size = self.config.cell_size;
        let cell = |x: i32, y: i32| Vec2::new((x as f32 + 0.5) * size, (y as f32 + 0.5) * size);
        let palette = |value: u8| match value {
            1 => Rgba::rgb(0, 240, 240),
            2 => Rgba::rgb(240, 240, 0),
            3 => Rgba::rgb(160, 0, 240),
            4 => Rgba::rgb(0, 240, 0),
            5 => Rgba::rgb(240, 0, 0),
            6 => Rgba::rgb(0, 0, 240),
            _ => Rgba::rgb(240, 160, 0),
        };

        for (y, row) in (0i32..).zip(self.board.rows()) {
            for (x, &value) in (0i32..).zip(row.iter()) {
                if value != 0 {
                    out.rect(cell(x, y), Vec2::splat(size - 1.0), palette(value));
                }
            }
        }
        if let Some(piece) = &self.active {
            for (x, y) in piece.cells().into_iter().filter(|&(_, y)| y >= 0) {
                out.rect(cell(x, y), Vec2::splat(size - 1.0), palette(piece.kind.cell_value()));
            }
        }

        let panel = Vec2::new(BOARD_WIDTH as f32 * size + 16.0, 16.0);
        out.text(panel, format!("SCORE {}", self.score()), 16.0, Rgba::WHITE);
        out.text(panel + Vec2::new(0.0, 24.0), format!("LINES {}", self.lines), 16.0, Rgba::WHITE);
        out.text(panel + Vec2::new(0.0, 48.0), format!("LEVEL {}", self.level()), 16.0, Rgba::WHITE);
        match self.state() {
            GameState::Paused => out.text(panel + Vec2::new(0.0, 96.0), "PAUSED", 20.0, Rgba::WHITE),
            GameState::GameOver => out.text(panel + Vec2::new(0.0, 96.0), "GAME OVER", 20.0, Rgba::RED),
            _ => {}
        }
    }

    fn reset(&mut self) {
        self.board = Board::new();
        self.board_score.reset();
        self.lines = 0;
        self.active = None;
        self.gravity = 0;
        self.machine.fire(GameEvent::Reset);
    }

    #[allow(clippy::cast_precision_loss)]
    fn surface(&self) -> Vec2 {
        Vec2::new(
            BOARD_WIDTH as f32 * self.config.cell_size + 160.0,
            BOARD_HEIGHT as f32 * self.config.cell_size,
        )
    }
}
