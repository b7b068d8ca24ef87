//! Asteroids.
//!
//! Ship, rocks and bullets wrap around the screen. Bullets expire after a
//! fixed lifetime; particles from explosions fade the same way.
//!
//! Each tick detection runs over the post-update positions and only reports
//! pairs. Resolution then walks the events in order and skips any whose
//! bullet, rock or ship already died earlier in the same tick, so one bullet
//! never destroys two rocks and one rock never scores twice. Rocks spawned by
//! a split are new entities and take part from the next tick on.

use std::f32::consts::TAU;

use framekit::{
    detect, draw_body, Actions, Arena, Body, BoundaryPolicy, BoundaryRules, Bounds, Circles,
    CollisionEvent, DrawList, EntityId, EntityKind, FrameError, Game, GameEvent, GameState,
    InputState, LoopConfig, Rgba, ScoreBoard, StateMachine, TickContext, Timers, TransitionTable,
};
use glam::Vec2;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Random draws per rock before falling back to a corner.
const SPAWN_ATTEMPTS: u32 = 32;

/// Rock size class, stored in the body's `variant`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RockSize {
    /// Splits into two medium rocks
    Large,
    /// Splits into two small rocks
    Medium,
    /// Destroyed outright
    Small,
}

impl RockSize {
    const fn variant(self) -> u8 {
        match self {
            Self::Large => 0,
            Self::Medium => 1,
            Self::Small => 2,
        }
    }

    const fn from_variant(variant: u8) -> Self {
        match variant {
            0 => Self::Large,
            1 => Self::Medium,
            _ => Self::Small,
        }
    }

    const fn smaller(self) -> Option<Self> {
        match self {
            Self::Large => Some(Self::Medium),
            Self::Medium => Some(Self::Small),
            Self::Small => None,
        }
    }
}

/// Asteroids tuning. Speeds in px/s, times in seconds unless noted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AsteroidsConfig {
    /// Field width
    pub width: f32,
    /// Field height
    pub height: f32,
    /// Ship collision radius
    pub ship_radius: f32,
    /// Turn rate, rad/s
    pub turn_speed: f32,
    /// Thrust acceleration, px/s²
    pub thrust: f32,
    /// Fraction of velocity lost per second
    pub drag: f32,
    /// Ship speed cap
    pub max_speed: f32,
    /// Bullet speed relative to the ship
    pub bullet_speed: f32,
    /// Bullet lifetime
    pub bullet_life: f32,
    /// Ticks between shots
    pub bullet_cooldown: u32,
    /// Most bullets in flight
    pub bullet_limit: usize,
    /// Radii for large, medium, small rocks
    pub rock_radius: [f32; 3],
    /// Speed ranges `(min, max)` for large, medium, small rocks
    pub rock_speed: [(f32, f32); 3],
    /// Points for large, medium, small rocks
    pub rock_points: [u64; 3],
    /// Rocks in the first wave
    pub first_wave: u32,
    /// Most rocks in any wave
    pub max_wave: u32,
    /// Starting lives
    pub lives: u32,
    /// Ticks between losing a ship and the next one appearing
    pub respawn_ticks: u32,
    /// Ticks of invulnerability after (re)spawning
    pub invulnerable_ticks: u32,
    /// Particles per explosion
    pub particles: usize,
}

impl Default for AsteroidsConfig {
    fn default() -> Self {
        Self {
            width: 960.0,
            height: 720.0,
            ship_radius: 14.0,
            turn_speed: 4.8,
            thrust: 280.0,
            drag: 0.3,
            max_speed: 340.0,
            bullet_speed: 520.0,
            bullet_life: 0.85,
            bullet_cooldown: 10,
            bullet_limit: 4,
            rock_radius: [48.0, 28.0, 16.0],
            rock_speed: [(34.0, 58.0), (62.0, 94.0), (98.0, 142.0)],
            rock_points: [20, 50, 100],
            first_wave: 4,
            max_wave: 11,
            lives: 3,
            respawn_ticks: 75,
            invulnerable_ticks: 120,
            particles: 8,
        }
    }
}

impl AsteroidsConfig {
    fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShipTimer {
    Respawn,
}

/// Facing vector for a rotation; zero radians points up the screen.
fn facing(rotation: f32) -> Vec2 {
    Vec2::new(rotation.sin(), -rotation.cos())
}

/// Asteroids game.
#[derive(Debug)]
pub struct Asteroids {
    config: AsteroidsConfig,
    machine: StateMachine,
    rng: ChaCha8Rng,
    arena: Arena,
    board: ScoreBoard,
    timers: Timers<ShipTimer>,
    ship: Option<EntityId>,
    invulnerable: u32,
    cooldown: u32,
    thrusting: bool,
}

impl Asteroids {
    /// Creates a game on the menu.
    #[must_use]
    pub fn new(config: AsteroidsConfig, loop_config: &LoopConfig) -> Self {
        let rules = BoundaryRules::new(Bounds::new(config.width, config.height))
            .with(EntityKind::Ship, BoundaryPolicy::WRAP)
            .with(EntityKind::Asteroid, BoundaryPolicy::WRAP)
            .with(EntityKind::Bullet, BoundaryPolicy::WRAP);
        Self {
            machine: StateMachine::new(TransitionTable::arcade()),
            rng: loop_config.rng(),
            arena: Arena::with_rules(rules),
            board: ScoreBoard::new(config.lives),
            timers: Timers::new(),
            ship: None,
            invulnerable: 0,
            cooldown: 0,
            thrusting: false,
            config,
        }
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

    /// Score, lives and wave (as level).
    #[must_use]
    pub fn board(&self) -> &ScoreBoard {
        &self.board
    }

    /// The ship, if one is on screen.
    #[must_use]
    pub fn ship(&self) -> Option<EntityId> {
        self.ship.filter(|&id| self.arena.get(id).is_some_and(|e| e.is_alive()))
    }

    /// Returns `true` while the ship cannot be hit.
    #[must_use]
    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable > 0
    }

    /// Drops the spawn shield. For setting up scenarios.
    pub fn clear_invulnerability(&mut self) {
        self.invulnerable = 0;
    }

    /// Spawns a rock.
    pub fn spawn_rock(&mut self, size: RockSize, position: Vec2, velocity: Vec2) -> EntityId {
        let radius = self.config.rock_radius[usize::from(size.variant())];
        let spin = self.rng.gen_range(-1.0..1.0);
        self.arena.spawn(
            EntityKind::Asteroid,
            Body::circle(position, radius)
                .with_velocity(velocity)
                .with_rotation(0.0, spin)
                .with_variant(size.variant()),
        )
    }

    fn new_game(&mut self) {
        self.timers.cancel_all();
        self.arena.clear();
        self.board.reset();
        self.cooldown = 0;
        self.spawn_ship();
        self.spawn_wave();
    }

    fn spawn_ship(&mut self) {
        let id = self.arena.spawn(
            EntityKind::Ship,
            Body::circle(self.config.center(), self.config.ship_radius),
        );
        self.ship = Some(id);
        self.invulnerable = self.config.invulnerable_ticks;
    }

    fn random_velocity(&mut self, size: RockSize) -> Vec2 {
        let (min, max) = self.config.rock_speed[usize::from(size.variant())];
        let speed = if max > min {
            self.rng.gen_range(min..max)
        } else {
            min
        };
        let angle = self.rng.gen_range(0.0..TAU);
        Vec2::new(angle.cos(), angle.sin()) * speed
    }

    fn spawn_wave(&mut self) {
        let wave = self.board.next_level();
        let count = (self.config.first_wave + wave - 1).min(self.config.max_wave);
        let center = self.config.center();
        let keep_clear = self.config.rock_radius[0] * 3.0;

        for _ in 0..count {
            let position = self.rock_spawn_point(center, keep_clear);
            let velocity = self.random_velocity(RockSize::Large);
            self.spawn_rock(RockSize::Large, position, velocity);
        }
        debug!(wave, count, "wave spawned");
    }

    /// A random point on screen at least `keep_clear` from the ship's spawn
    /// point. Fields too small to offer one get the top-left corner.
    fn rock_spawn_point(&mut self, center: Vec2, keep_clear: f32) -> Vec2 {
        let (width, height) = (self.config.width, self.config.height);
        let sized = |side: f32| side.is_finite() && side > 0.0;
        if sized(width) && sized(height) {
            for _ in 0..SPAWN_ATTEMPTS {
                let position = Vec2::new(self.rng.gen_range(0.0..width), self.rng.gen_range(0.0..height));
                if position.distance(center) >= keep_clear {
                    return position;
                }
            }
        }
        Vec2::ZERO
    }

    fn burst(&mut self, at: Vec2) {
        for _ in 0..self.config.particles {
            let angle = self.rng.gen_range(0.0..TAU);
            let speed: f32 = self.rng.gen_range(40.0..120.0);
            let life: f32 = self.rng.gen_range(0.4..0.9);
            self.arena.spawn(
                EntityKind::Particle,
                Body::circle(at, 1.5)
                    .with_velocity(Vec2::new(angle.cos(), angle.sin()) * speed)
                    .with_life(life),
            );
        }
    }

    /// Destroys a rock: points, particles, and two smaller rocks if any.
    fn break_rock(&mut self, id: EntityId) {
        let Some(rock) = self.arena.get(id).map(|e| e.body().clone()) else {
            return;
        };
        self.arena.kill(id);
        let size = RockSize::from_variant(rock.variant);
        self.board
            .add_points(self.config.rock_points[usize::from(size.variant())]);
        self.burst(rock.position);

        if let Some(smaller) = size.smaller() {
            for _ in 0..2 {
                let velocity = self.random_velocity(smaller);
                self.spawn_rock(smaller, rock.position, velocity);
            }
        }
    }

    fn lose_ship(&mut self, ship: EntityId) {
        let Some(position) = self.arena.get(ship).map(|e| e.body().position) else {
            return;
        };
        self.arena.kill(ship);
        self.ship = None;
        self.burst(position);

        if self.board.lose_life() {
            debug!(score = self.board.score(), "last ship lost");
            self.machine.fire(GameEvent::LivesExhausted);
        } else {
            self.timers.schedule(self.config.respawn_ticks, ShipTimer::Respawn);
        }
    }

    fn fire(&mut self) {
        let Some(ship) = self.ship().and_then(|id| self.arena.get(id)) else {
            return;
        };
        if self.cooldown > 0 || self.arena.count_alive(EntityKind::Bullet) >= self.config.bullet_limit {
            return;
        }
        let body = ship.body();
        let dir = facing(body.rotation);
        let bullet = Body::circle(body.position + dir * body.radius(), 2.0)
            .with_velocity(body.velocity + dir * self.config.bullet_speed)
            .with_life(self.config.bullet_life);
        self.arena.spawn(EntityKind::Bullet, bullet);
        self.cooldown = self.config.bullet_cooldown;
    }
}

impl Game for Asteroids {
    fn state(&self) -> GameState {
        self.machine.state()
    }

    fn apply_input(&mut self, input: &InputState, _ctx: TickContext) {
        if input.was_pressed(Actions::PRIMARY) && self.machine.fire(GameEvent::Start).is_some() {
            self.new_game();
            return;
        }
        if !self.machine.is_playing() {
            return;
        }

        let mut turn = 0.0;
        if input.is_held(Actions::MOVE_LEFT) {
            turn -= 1.0;
        }
        if input.is_held(Actions::MOVE_RIGHT) {
            turn += 1.0;
        }
        self.thrusting = input.is_held(Actions::MOVE_UP);
        let spin = turn * self.config.turn_speed;
        if let Some(ship) = self.ship().and_then(|id| self.arena.get_mut(id)) {
            ship.body_mut().spin = spin;
        }
        if input.was_pressed(Actions::SHOOT) {
            self.fire();
        }
    }

    fn integrate(&mut self, ctx: TickContext) {
        if !self.machine.is_playing() {
            return;
        }
        for timer in self.timers.tick() {
            match timer {
                ShipTimer::Respawn => self.spawn_ship(),
            }
        }
        self.cooldown = self.cooldown.saturating_sub(1);
        self.invulnerable = self.invulnerable.saturating_sub(1);

        let (thrust, drag, max_speed) = (self.config.thrust, self.config.drag, self.config.max_speed);
        let thrusting = self.thrusting;
        if let Some(ship) = self.ship().and_then(|id| self.arena.get_mut(id)) {
            let body = ship.body_mut();
            if thrusting {
                body.velocity += facing(body.rotation) * thrust * ctx.dt;
            }
            body.velocity *= (1.0 - drag * ctx.dt).max(0.0);
            body.velocity = body.velocity.clamp_length_max(max_speed);
        }
        self.arena.update(ctx.dt);
    }

    fn detect(&self) -> Vec<CollisionEvent> {
        if !self.machine.is_playing() {
            return Vec::new();
        }
        let rocks = self.arena.alive_of(EntityKind::Asteroid);
        let mut events = detect(&self.arena.alive_of(EntityKind::Bullet), &rocks, &Circles);
        if !self.is_invulnerable() {
            events.extend(detect(&self.arena.alive_of(EntityKind::Ship), &rocks, &Circles));
        }
        events
    }

    fn resolve(&mut self, events: &[CollisionEvent], _ctx: TickContext) -> Result<(), FrameError> {
        // Rocks are always the `b` side
        for event in events {
            let (other, rock) = (event.a, event.b);
            if !self.arena.try_get(rock)?.is_alive() {
                continue;
            }
            let other_entity = self.arena.try_get(other)?;
            if !other_entity.is_alive() {
                continue;
            }
            let kind = other_entity.kind();
            match kind {
                EntityKind::Bullet => {
                    self.arena.kill(other);
                    self.break_rock(rock);
                }
                EntityKind::Ship => {
                    self.lose_ship(other);
                    self.break_rock(rock);
                }
                kind => warn!(?kind, "unexpected collision with a rock"),
            }
        }

        self.arena.remove_dead();
        if self.machine.is_playing() && self.arena.count_alive(EntityKind::Asteroid) == 0 {
            self.spawn_wave();
        }
        Ok(())
    }

    fn render(&self, out: &mut DrawList) {
        let blink = self.invulnerable / 6 % 2 == 1;
        self.arena.for_each_alive(|entity| {
            let color = match entity.kind() {
                EntityKind::Ship if blink => return,
                EntityKind::Ship => Rgba::WHITE,
                EntityKind::Bullet => Rgba::rgb(255, 255, 160),
                EntityKind::Particle => Rgba::rgb(255, 180, 80),
                _ => Rgba::rgb(170, 170, 170),
            };
            out.push(draw_body(entity.body(), color));
        });
        out.text(Vec2::new(16.0, 16.0), format!("{:06}", self.board.score()), 20.0, Rgba::WHITE);
        out.text(
            Vec2::new(16.0, 40.0),
            format!("SHIPS {}  WAVE {}", self.board.lives(), self.board.level()),
            14.0,
            Rgba::WHITE,
        );
        if self.state() == GameState::GameOver {
            out.text(self.config.center() - Vec2::new(80.0, 0.0), "GAME OVER", 32.0, Rgba::RED);
        }
    }

    fn reset(&mut self) {
        self.timers.cancel_all();
        self.arena.clear();
        self.board.reset();
        self.ship = None;
        self.invulnerable = 0;
        self.cooldown = 0;
        self.thrusting = false;
        self.machine.fire(GameEvent::Reset);
    }

    fn surface(&self) -> Vec2 {
        Vec2::new(self.config.width, self.config.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use framekit::Session;

    fn started_with(config: AsteroidsConfig, seed: u64) -> Session<Asteroids> {
        let loop_config = LoopConfig::with_seed(seed);
        let game = Asteroids::new(config, &loop_config);
        let mut session = Session::new(game, &loop_config);
        session.press(Actions::PRIMARY);
        session.release(Actions::PRIMARY);
        session.step().unwrap();
        session
    }

    fn started(seed: u64) -> Session<Asteroids> {
        started_with(AsteroidsConfig::default(), seed)
    }

    /// Started game with the wave removed and the shield down.
    fn empty_field(seed: u64) -> Session<Asteroids> {
        let mut session = started(seed);
        let game = session.game_mut();
        game.arena_mut().clear_kind(EntityKind::Asteroid);
        game.clear_invulnerability();
        session
    }

    fn ship_body(session: &Session<Asteroids>) -> Body {
        let game = session.game();
        game.arena().get(game.ship().unwrap()).unwrap().body().clone()
    }

    #[test]
    fn first_wave_has_four_large_rocks() {
        let session = started(1);
        let rocks = session.game().arena().alive_of(EntityKind::Asteroid);
        assert_eq!(rocks.len(), 4);
        assert!(rocks.iter().all(|r| r.body().variant == RockSize::Large.variant()));
        assert_eq!(session.game().board().level(), 1);
        assert!(session.game().is_invulnerable());
    }

    #[test]
    fn bullet_splits_large_rock_into_two_medium() {
        let mut session = empty_field(2);
        let game = session.game_mut();
        let center = game.config.center();
        game.spawn_rock(RockSize::Large, center + Vec2::new(0.0, -80.0), Vec2::ZERO);
        // A far-away rock keeps the wave from ending
        game.spawn_rock(RockSize::Small, Vec2::new(40.0, 40.0), Vec2::ZERO);

        session.key_down(" ");
        session.step_n(6).unwrap();

        let game = session.game();
        assert_eq!(game.board().score(), 20);
        let medium = game
            .arena()
            .alive_of(EntityKind::Asteroid)
            .into_iter()
            .filter(|r| r.body().variant == RockSize::Medium.variant())
            .count();
        assert_eq!(medium, 2);
        assert_eq!(game.arena().count_alive(EntityKind::Bullet), 0);
        assert_eq!(game.arena().count_alive(EntityKind::Particle), 8);
    }

    #[test]
    fn one_bullet_destroys_one_rock() {
        let mut session = empty_field(3);
        let game = session.game_mut();
        let at = Vec2::new(100.0, 100.0);
        game.spawn_rock(RockSize::Small, at + Vec2::new(-5.0, 0.0), Vec2::ZERO);
        game.spawn_rock(RockSize::Small, at + Vec2::new(5.0, 0.0), Vec2::ZERO);
        game.arena_mut()
            .spawn(EntityKind::Bullet, Body::circle(at, 2.0).with_life(1.0));

        session.step().unwrap();

        let game = session.game();
        assert_eq!(game.board().score(), 100);
        assert_eq!(game.arena().count_alive(EntityKind::Asteroid), 1);
    }

    #[test]
    fn bullets_expire() {
        let mut session = empty_field(4);
        session
            .game_mut()
            .spawn_rock(RockSize::Small, Vec2::new(30.0, 30.0), Vec2::ZERO);
        session.key_down(" ");
        session.step().unwrap();
        assert_eq!(session.game().arena().count_alive(EntityKind::Bullet), 1);
        session.step_n(60).unwrap();
        assert_eq!(session.game().arena().count_alive(EntityKind::Bullet), 0);
    }

    #[test]
    fn shooting_respects_cooldown_and_limit() {
        let mut session = empty_field(5);
        session
            .game_mut()
            .spawn_rock(RockSize::Small, Vec2::new(30.0, 30.0), Vec2::ZERO);
        for _ in 0..12 {
            session.key_down(" ");
            session.step().unwrap();
            session.key_up(" ");
            session.step().unwrap();
        }
        let bullets = session.game().arena().count_alive(EntityKind::Bullet);
        assert!(bullets <= 4, "{bullets} bullets in flight");
        assert!(bullets >= 2);
    }

    #[test]
    fn rotation_and_thrust_move_the_ship() {
        let mut session = empty_field(6);
        session
            .game_mut()
            .spawn_rock(RockSize::Small, Vec2::new(30.0, 30.0), Vec2::ZERO);
        session.key_down("ArrowUp");
        session.step_n(30).unwrap();
        let body = ship_body(&session);
        assert!(body.velocity.y < 0.0, "thrust points up at rotation 0");
        assert!(body.velocity.x.abs() < 1e-3);

        session.key_up("ArrowUp");
        session.key_down("ArrowRight");
        session.step_n(10).unwrap();
        assert!(ship_body(&session).rotation > 0.0);
    }

    #[test]
    fn ship_wraps_around() {
        let mut session = empty_field(7);
        let game = session.game_mut();
        game.spawn_rock(RockSize::Small, Vec2::new(480.0, 600.0), Vec2::ZERO);
        let ship = game.ship().unwrap();
        let body = game.arena_mut().get_mut(ship).unwrap().body_mut();
        body.position = Vec2::new(955.0, 100.0);
        body.velocity = Vec2::new(600.0, 0.0);
        session.step().unwrap();
        assert!(ship_body(&session).position.x < 20.0);
    }

    #[test]
    fn crash_costs_a_life_and_respawns() {
        let mut session = empty_field(8);
        let game = session.game_mut();
        let center = game.config.center();
        game.spawn_rock(RockSize::Small, center, Vec2::ZERO);
        game.spawn_rock(RockSize::Small, Vec2::new(30.0, 30.0), Vec2::ZERO);

        session.step().unwrap();
        assert_eq!(session.game().board().lives(), 2);
        assert!(session.game().ship().is_none());

        session.step_n(75).unwrap();
        assert!(session.game().ship().is_some());
        assert!(session.game().is_invulnerable());
    }

    #[test]
    fn last_life_ends_the_game() {
        let mut session = empty_field(9);
        for _ in 0..3 {
            let game = session.game_mut();
            let center = game.config.center();
            game.spawn_rock(RockSize::Small, center, Vec2::ZERO);
            game.spawn_rock(RockSize::Small, Vec2::new(30.0, 30.0), Vec2::ZERO);
            game.clear_invulnerability();
            session.step().unwrap();
            if session.state() == GameState::GameOver {
                break;
            }
            session.step_n(75).unwrap();
            session.game_mut().clear_invulnerability();
        }
        assert_eq!(session.state(), GameState::GameOver);
        assert_eq!(session.game().board().lives(), 0);
        assert!(session.render().has_text("GAME OVER"));
    }

    #[test]
    fn clearing_the_field_starts_the_next_wave() {
        let mut session = empty_field(10);
        let game = session.game_mut();
        game.spawn_rock(RockSize::Small, Vec2::new(100.0, 100.0), Vec2::ZERO);
        game.arena_mut()
            .spawn(EntityKind::Bullet, Body::circle(Vec2::new(100.0, 100.0), 2.0).with_life(1.0));
        session.step().unwrap();

        let game = session.game();
        assert_eq!(game.board().level(), 2);
        assert_eq!(game.arena().count_alive(EntityKind::Asteroid), 5);
        assert_eq!(session.state(), GameState::Playing);
    }

    #[test]
    fn reset_cancels_respawn() {
        let mut session = empty_field(11);
        let game = session.game_mut();
        let center = game.config.center();
        game.spawn_rock(RockSize::Small, center, Vec2::ZERO);
        game.spawn_rock(RockSize::Small, Vec2::new(30.0, 30.0), Vec2::ZERO);
        session.step().unwrap();
        assert_eq!(session.game().timers.pending(), 1);

        session.reset();
        assert_eq!(session.game().timers.pending(), 0);
        assert_eq!(session.state(), GameState::Menu);
        assert!(session.game().arena().is_empty());
    }

    mod field_size_tests {
        use super::*;

        #[test]
        fn small_field_still_spawns_full_wave() {
            let config = AsteroidsConfig {
                width: 200.0,
                height: 200.0,
                ..AsteroidsConfig::default()
            };
            let mut session = started_with(config, 12);
            assert_eq!(session.state(), GameState::Playing);
            assert_eq!(session.game().arena().count_alive(EntityKind::Asteroid), 4);
            session.step_n(30).unwrap();
            assert_eq!(session.state(), GameState::Playing);
        }

        #[test]
        fn zero_sized_field_starts_without_hanging() {
            let config = AsteroidsConfig {
                width: 0.0,
                height: 0.0,
                ..AsteroidsConfig::default()
            };
            let mut session = started_with(config, 13);
            let game = session.game();
            let rocks = game.arena().alive_of(EntityKind::Asteroid);
            assert_eq!(rocks.len(), 4);
            assert!(rocks.iter().all(|r| r.body().position == Vec2::ZERO));
            session.step_n(5).unwrap();
        }

        #[test]
        fn rocks_keep_clear_of_the_ship() {
            for seed in 0..16 {
                let session = started(seed);
                let game = session.game();
                let center = game.config.center();
                let keep_clear = game.config.rock_radius[0] * 3.0;
                for rock in game.arena().alive_of(EntityKind::Asteroid) {
                    assert!(rock.body().position.distance(center) >= keep_clear);
                }
            }
        }
    }

    #[test]
    fn pause_key_is_ignored() {
        let mut session = started(14);
        let game = session.game();
        let before: Vec<Vec2> = game
            .arena()
            .alive_of(EntityKind::Asteroid)
            .iter()
            .map(|r| r.body().position)
            .collect();
        session.key_down("p");
        session.step().unwrap();
        session.key_up("p");
        session.step_n(10).unwrap();

        assert_eq!(session.state(), GameState::Playing);
        let after: Vec<Vec2> = session
            .game()
            .arena()
            .alive_of(EntityKind::Asteroid)
            .iter()
            .map(|r| r.body().position)
            .collect();
        assert_ne!(before, after);
    }
}
