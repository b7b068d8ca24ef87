//! Space Invaders.
//!
//! A 5×11 formation marches sideways, dropping one step and reversing each
//! time it touches a side margin. It speeds up as it thins out and with every
//! level. The player's cannon moves along the bottom row with at most one
//! bullet in flight; invaders drop bombs on a seeded cadence.
//!
//! Clearing the formation ends the level (`LevelComplete`); `Start` sets up
//! the next one. Losing the last life or letting the formation reach the
//! cannon row ends the game.

use framekit::{
    detect, draw_body, Actions, Arena, Body, BoundaryPolicy, BoundaryRules, Bounds, Boxes,
    CollisionEvent, DrawList, Edge, EntityId, EntityKind, FrameError, Game, GameEvent, GameState,
    InputState, LoopConfig, Rgba, ScoreBoard, StateMachine, TickContext, TransitionTable,
};
use glam::Vec2;
use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Space Invaders tuning. Speeds in px/s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvadersConfig {
    /// Field width
    pub width: f32,
    /// Field height
    pub height: f32,
    /// Formation rows
    pub rows: u8,
    /// Formation columns
    pub columns: u8,
    /// Invader footprint
    pub invader_size: Vec2,
    /// Distance between neighbouring invader centers
    pub spacing: Vec2,
    /// Center of the top-left invader at the start of a level
    pub origin: Vec2,
    /// Closest the formation gets to a side before turning
    pub edge_margin: f32,
    /// March speed of a full formation on level one
    pub march_speed: f32,
    /// March speed added per level
    pub level_speedup: f32,
    /// Drop at each turn
    pub drop: f32,
    /// Points per row, top row first
    pub row_points: Vec<u64>,
    /// Cannon footprint
    pub cannon_size: Vec2,
    /// Cannon center line
    pub cannon_y: f32,
    /// Cannon speed
    pub cannon_speed: f32,
    /// Bullet footprint
    pub bullet_size: Vec2,
    /// Bullet speed
    pub bullet_speed: f32,
    /// Bomb footprint
    pub bomb_size: Vec2,
    /// Bomb speed
    pub bomb_speed: f32,
    /// Chance per tick that a bomb is dropped
    pub bomb_chance: f64,
    /// Most bombs falling at once
    pub max_bombs: usize,
    /// Starting lives
    pub lives: u32,
}

impl Default for InvadersConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            rows: 5,
            columns: 11,
            invader_size: Vec2::new(30.0, 22.0),
            spacing: Vec2::new(44.0, 36.0),
            origin: Vec2::new(100.0, 80.0),
            edge_margin: 20.0,
            march_speed: 30.0,
            level_speedup: 10.0,
            drop: 20.0,
            row_points: vec![30, 20, 20, 10, 10],
            cannon_size: Vec2::new(40.0, 16.0),
            cannon_y: 560.0,
            cannon_speed: 260.0,
            bullet_size: Vec2::new(4.0, 12.0),
            bullet_speed: 480.0,
            bomb_size: Vec2::new(4.0, 12.0),
            bomb_speed: 200.0,
            bomb_chance: 0.02,
            max_bombs: 3,
            lives: 3,
        }
    }
}

impl InvadersConfig {
    fn formation_size(&self) -> usize {
        usize::from(self.rows) * usize::from(self.columns)
    }

    fn points_for_row(&self, row: u8) -> u64 {
        self.row_points
            .get(usize::from(row))
            .or(self.row_points.last())
            .copied()
            .unwrap_or(0)
    }
}

/// Space Invaders game.
#[derive(Debug)]
pub struct Invaders {
    config: InvadersConfig,
    machine: StateMachine,
    rng: ChaCha8Rng,
    arena: Arena,
    board: ScoreBoard,
    cannon: EntityId,
    direction: f32,
}

impl Invaders {
    /// Creates a game on the menu with the cannon in place.
    #[must_use]
    pub fn new(config: InvadersConfig, loop_config: &LoopConfig) -> Self {
        let falling = BoundaryPolicy::new(Edge::Ignore, Edge::Discard);
        let rules = BoundaryRules::new(Bounds::new(config.width, config.height))
            .with(EntityKind::Ship, BoundaryPolicy::CLAMP)
            .with(EntityKind::Bullet, falling)
            .with(EntityKind::Bomb, falling);
        let mut arena = Arena::with_rules(rules);
        let cannon = arena.spawn(EntityKind::Ship, Self::cannon_body(&config));

        Self {
            machine: StateMachine::new(TransitionTable::arcade()),
            rng: loop_config.rng(),
            board: ScoreBoard::new(config.lives),
            arena,
            cannon,
            direction: 1.0,
            config,
        }
    }

    fn cannon_body(config: &InvadersConfig) -> Body {
        Body::rect(
            Vec2::new(config.width * 0.5, config.cannon_y),
            config.cannon_size,
        )
    }

    /// Entity store.
    #[must_use]
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Entity store, mutably. For setting up scenarios.
    pub fn arena_mut(&mut self) -> &mut Arena {
        &mut self.arena
    }

    /// Score, lives and level.
    #[must_use]
    pub fn board(&self) -> &ScoreBoard {
        &self.board
    }

    /// The player's cannon.
    #[must_use]
    pub fn cannon(&self) -> EntityId {
        self.cannon
    }

    /// Invaders still standing.
    #[must_use]
    pub fn invaders_left(&self) -> usize {
        self.arena.count_alive(EntityKind::Invader)
    }

    /// Current march speed: faster on later levels and as the formation
    /// thins out.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn march_speed(&self) -> f32 {
        let level = self.board.level().saturating_sub(1) as f32;
        let total = self.config.formation_size().max(1) as f32;
        let thinned = 1.0 - self.invaders_left() as f32 / total;
        (self.config.march_speed + self.config.level_speedup * level) * (1.0 + 2.0 * thinned)
    }

    /// Spawns one invader belonging to `row`.
    pub fn spawn_invader(&mut self, row: u8, position: Vec2) -> EntityId {
        self.arena.spawn(
            EntityKind::Invader,
            Body::rect(position, self.config.invader_size).with_variant(row),
        )
    }

    fn spawn_formation(&mut self) {
        self.arena.clear_kind(EntityKind::Invader);
        for row in 0..self.config.rows {
            for column in 0..self.config.columns {
                let offset = Vec2::new(f32::from(column), f32::from(row)) * self.config.spacing;
                self.spawn_invader(row, self.config.origin + offset);
            }
        }
        self.direction = 1.0;
    }

    fn clear_shots(&mut self) {
        self.arena.clear_kind(EntityKind::Bullet);
        self.arena.clear_kind(EntityKind::Bomb);
    }

    fn center_cannon(&mut self) {
        let body = Self::cannon_body(&self.config);
        if let Some(cannon) = self.arena.get_mut(self.cannon) {
            *cannon.body_mut() = body;
        }
    }

    fn new_game(&mut self) {
        self.board.reset();
        self.next_level();
    }

    fn next_level(&mut self) {
        let level = self.board.next_level();
        self.clear_shots();
        self.center_cannon();
        self.spawn_formation();
        debug!(level, "formation ready");
    }

    fn shoot(&mut self) {
        if self.arena.count_alive(EntityKind::Bullet) > 0 {
            return;
        }
        let Some(cannon) = self.arena.get(self.cannon) else {
            return;
        };
        let top = cannon.body().position - Vec2::new(0.0, cannon.body().half_extents().y);
        let bullet = Body::rect(top - Vec2::new(0.0, self.config.bullet_size.y * 0.5), self.config.bullet_size)
            .with_velocity(Vec2::new(0.0, -self.config.bullet_speed));
        self.arena.spawn(EntityKind::Bullet, bullet);
    }

    fn drop_bomb(&mut self) {
        if self.config.bomb_chance <= 0.0
            || self.arena.count_alive(EntityKind::Bomb) >= self.config.max_bombs
            || !self.rng.gen_bool(self.config.bomb_chance.min(1.0))
        {
            return;
        }
        let invaders = self.arena.alive_of(EntityKind::Invader);
        let Some(chosen) = invaders.choose(&mut self.rng) else {
            return;
        };
        // Bombs come from the lowest invader of the chosen column
        let column_x = chosen.body().position.x;
        let Some(shooter) = invaders
            .iter()
            .filter(|e| (e.body().position.x - column_x).abs() < 1.0)
            .max_by(|a, b| a.body().position.y.total_cmp(&b.body().position.y))
        else {
            return;
        };
        let bottom = shooter.body().position + Vec2::new(0.0, shooter.body().half_extents().y);
        let bomb = Body::rect(bottom, self.config.bomb_size)
            .with_velocity(Vec2::new(0.0, self.config.bomb_speed));
        self.arena.spawn(EntityKind::Bomb, bomb);
    }

    /// Turns the formation around and drops it when it touches a side.
    fn turn_at_edges(&mut self) {
        let (mut left, mut right) = (f32::INFINITY, f32::NEG_INFINITY);
        self.arena.for_each_alive(|entity| {
            if entity.is(EntityKind::Invader) {
                let aabb = entity.body().aabb();
                left = left.min(aabb.min.x);
                right = right.max(aabb.max.x);
            }
        });
        let hit_right = self.direction > 0.0 && right > self.config.width - self.config.edge_margin;
        let hit_left = self.direction < 0.0 && left < self.config.edge_margin;
        if !(hit_right || hit_left) {
            return;
        }
        self.direction = -self.direction;
        let (drop, velocity) = (self.config.drop, self.direction * self.march_speed());
        self.arena.for_each_alive_mut(EntityKind::Invader, |invader| {
            let body = invader.body_mut();
            body.position.y += drop;
            body.velocity.x = velocity;
        });
    }

    fn formation_landed(&self) -> bool {
        let line = self.config.cannon_y - self.config.cannon_size.y * 0.5;
        self.arena
            .alive_of(EntityKind::Invader)
            .iter()
            .any(|invader| invader.body().aabb().max.y >= line)
    }
}

impl Game for Invaders {
    fn state(&self) -> GameState {
        self.machine.state()
    }

    fn apply_input(&mut self, input: &InputState, _ctx: TickContext) {
        if input.was_pressed(Actions::PRIMARY) {
            let before = self.machine.state();
            if self.machine.fire(GameEvent::Start).is_some() {
                if before == GameState::LevelComplete {
                    self.next_level();
                } else {
                    self.new_game();
                }
                return;
            }
        }
        if !self.machine.is_playing() {
            return;
        }

        let mut dir = 0.0;
        if input.is_held(Actions::MOVE_LEFT) {
            dir -= 1.0;
        }
        if input.is_held(Actions::MOVE_RIGHT) {
            dir += 1.0;
        }
        let speed = self.config.cannon_speed;
        if let Some(cannon) = self.arena.get_mut(self.cannon) {
            cannon.body_mut().velocity.x = dir * speed;
        }
        if input.was_pressed(Actions::SHOOT) {
            self.shoot();
        }
    }

    fn integrate(&mut self, ctx: TickContext) {
        if !self.machine.is_playing() {
            return;
        }
        let velocity = self.direction * self.march_speed();
        self.arena.for_each_alive_mut(EntityKind::Invader, |invader| {
            invader.body_mut().velocity.x = velocity;
        });
        self.drop_bomb();
        self.arena.update(ctx.dt);
        self.turn_at_edges();
    }

    fn detect(&self) -> Vec<CollisionEvent> {
        if !self.machine.is_playing() {
            return Vec::new();
        }
        let mut events = detect(
            &self.arena.alive_of(EntityKind::Bullet),
            &self.arena.alive_of(EntityKind::Invader),
            &Boxes,
        );
        events.extend(detect(
            &self.arena.alive_of(EntityKind::Bomb),
            &self.arena.alive_of(EntityKind::Ship),
            &Boxes,
        ));
        events
    }

    fn resolve(&mut self, events: &[CollisionEvent], _ctx: TickContext) -> Result<(), FrameError> {
        let mut cannon_hit = false;
        for event in events {
            let (shot, target) = (event.a, event.b);
            if !self.arena.try_get(shot)?.is_alive() {
                continue;
            }
            let target = self.arena.try_get(target)?;
            if !target.is_alive() {
                continue;
            }
            match target.kind() {
                EntityKind::Invader => {
                    let (id, row) = (target.id(), target.body().variant);
                    self.arena.kill(shot);
                    self.arena.kill(id);
                    self.board.add_points(self.config.points_for_row(row));
                }
                _ => {
                    self.arena.kill(shot);
                    cannon_hit = true;
                }
            }
        }
        self.arena.remove_dead();

        if cannon_hit {
            self.arena.clear_kind(EntityKind::Bomb);
            if self.board.lose_life() {
                debug!(score = self.board.score(), "cannon destroyed");
                self.machine.fire(GameEvent::LivesExhausted);
            }
        }
        if !self.machine.is_playing() {
            return Ok(());
        }
        if self.invaders_left() == 0 {
            debug!(level = self.board.level(), "formation cleared");
            self.clear_shots();
            self.machine.fire(GameEvent::AllTargetsCleared);
        } else if self.formation_landed() {
            debug!("formation reached the cannon row");
            self.machine.fire(GameEvent::LivesExhausted);
        }
        Ok(())
    }

    fn render(&self, out: &mut DrawList) {
        const ROW_COLORS: [Rgba; 3] = [
            Rgba::rgb(255, 90, 200),
            Rgba::rgb(90, 200, 255),
            Rgba::rgb(120, 255, 120),
        ];
        self.arena.for_each_alive(|entity| {
            let color = match entity.kind() {
                EntityKind::Invader => {
                    ROW_COLORS[usize::from(entity.body().variant).div_ceil(2).min(2)]
                }
                EntityKind::Ship => Rgba::GREEN,
                EntityKind::Bomb => Rgba::RED,
                _ => Rgba::WHITE,
            };
            out.push(draw_body(entity.body(), color));
        });
        out.text(
            Vec2::new(16.0, 16.0),
            format!("SCORE {:05}", self.board.score()),
            18.0,
            Rgba::WHITE,
        );
        out.text(
            Vec2::new(self.config.width - 180.0, 16.0),
            format!("LIVES {}  LEVEL {}", self.board.lives(), self.board.level()),
            18.0,
            Rgba::WHITE,
        );
        let banner = match self.state() {
            GameState::Menu => Some("PRESS ENTER"),
            GameState::LevelComplete => Some("LEVEL CLEAR"),
            GameState::GameOver => Some("GAME OVER"),
            _ => None,
        };
        if let Some(banner) = banner {
            out.text(
                Vec2::new(self.config.width * 0.5 - 90.0, self.config.height * 0.5),
                banner,
                32.0,
                Rgba::WHITE,
            );
        }
    }

    fn reset(&mut self) {
        self.arena.clear_kind(EntityKind::Invader);
        self.clear_shots();
        self.center_cannon();
        self.board.reset();
        self.direction = 1.0;
        self.machine.fire(GameEvent::Reset);
    }

    fn surface(&self) -> Vec2 {
        Vec2::new(self.config.width, self.config.height)
    }
}
