//! Bunny Catch.
//!
//! Move the basket along the bottom and catch what falls. Carrots and the
//! odd golden carrot drop from random columns on a jittered cadence; the
//! round lasts a fixed number of seconds and ends in `Result`.

use framekit::{
    detect, draw_body, Actions, Arena, Body, BoundaryPolicy, BoundaryRules, Bounds,
    CollisionEvent, DrawList, Edge, EntityId, EntityKind, FrameError, Game, GameEvent, GameState,
    InputState, LoopConfig, Rgba, ScoreBoard, Shapes, StateMachine, TickContext, TimerId, Timers,
    TransitionTable,
};
use glam::Vec2;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

const GOLDEN: u8 = 1;

/// Bunny Catch tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatchConfig {
    /// Field width
    pub width: f32,
    /// Field height
    pub height: f32,
    /// Basket footprint
    pub basket_size: Vec2,
    /// Basket center line
    pub basket_y: f32,
    /// Basket speed, px/s
    pub basket_speed: f32,
    /// Falling item radius
    pub item_radius: f32,
    /// Fall speed range `(min, max)`, px/s
    pub fall_speed: (f32, f32),
    /// Mean ticks between drops
    pub spawn_every: u32,
    /// Random spread around `spawn_every`, in ticks
    pub spawn_jitter: u32,
    /// Chance that a drop is golden
    pub golden_chance: f64,
    /// Points for a carrot
    pub points: u64,
    /// Points for a golden carrot
    pub golden_points: u64,
    /// Round length in seconds
    pub round_seconds: f32,
}

impl Default for CatchConfig {
    fn default() -> Self {
        Self {
            width: 600.0,
            height: 600.0,
            basket_size: Vec2::new(80.0, 20.0),
            basket_y: 560.0,
            basket_speed: 360.0,
            item_radius: 14.0,
            fall_speed: (120.0, 220.0),
            spawn_every: 45,
            spawn_jitter: 15,
            golden_chance: 0.1,
            points: 10,
            golden_points: 50,
            round_seconds: 60.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CatchTimer {
    Drop,
    TimeUp,
}

/// Bunny Catch game.
#[derive(Debug)]
pub struct Catch {
    config: CatchConfig,
    machine: StateMachine,
    rng: ChaCha8Rng,
    dt: f32,
    round_ticks: u32,
    arena: Arena,
    board: ScoreBoard,
    basket: EntityId,
    timers: Timers<CatchTimer>,
    round: Option<TimerId>,
}

impl Catch {
    /// Creates a game on the menu with the basket centered.
    #[must_use]
    pub fn new(config: CatchConfig, loop_config: &LoopConfig) -> Self {
        let rules = BoundaryRules::new(Bounds::new(config.width, config.height))
            .with(EntityKind::Paddle, BoundaryPolicy::CLAMP)
            .with(EntityKind::Pickup, BoundaryPolicy::new(Edge::Ignore, Edge::Discard));
        let mut arena = Arena::with_rules(rules);
        let basket = arena.spawn(EntityKind::Paddle, Self::basket_body(&config));

        Self {
            machine: StateMachine::new(TransitionTable::timed()),
            rng: loop_config.rng(),
            dt: loop_config.dt(),
            round_ticks: loop_config.ticks_for(config.round_seconds),
            board: ScoreBoard::new(0),
            timers: Timers::new(),
            round: None,
            arena,
            basket,
            config,
        }
    }

    fn basket_body(config: &CatchConfig) -> Body {
        Body::rect(Vec2::new(config.width * 0.5, config.basket_y), config.basket_size)
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

    /// The basket.
    #[must_use]
    pub fn basket(&self) -> EntityId {
        self.basket
    }

    /// Current score.
    #[must_use]
    pub fn score(&self) -> u64 {
        self.board.score()
    }

    /// Items caught this round.
    #[must_use]
    pub fn caught(&self) -> u64 {
        self.board.counter("caught")
    }

    /// Items that hit the ground this round.
    #[must_use]
    pub fn missed(&self) -> u64 {
        self.board.counter("missed")
    }

    /// Seconds left in the round; zero outside a round.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn time_left(&self) -> f32 {
        self.round
            .and_then(|id| self.timers.remaining(id))
            .map_or(0.0, |ticks| ticks as f32 * self.dt)
    }

    /// Drops an item at `x`.
    pub fn spawn_item(&mut self, x: f32, golden: bool) -> EntityId {
        let (min, max) = self.config.fall_speed;
        let speed = if max > min {
            self.rng.gen_range(min..max)
        } else {
            min
        };
        let body = Body::circle(Vec2::new(x, -self.config.item_radius * 0.5), self.config.item_radius)
            .with_velocity(Vec2::new(0.0, speed))
            .with_variant(if golden { GOLDEN } else { 0 });
        self.arena.spawn(EntityKind::Pickup, body)
    }

    fn next_drop_delay(&mut self) -> u32 {
        let spread = self.config.spawn_jitter.min(self.config.spawn_every.saturating_sub(1));
        let low = self.config.spawn_every - spread;
        self.rng.gen_range(low..=self.config.spawn_every.saturating_add(spread))
    }

    fn start_round(&mut self) {
        self.timers.cancel_all();
        self.arena.clear_kind(EntityKind::Pickup);
        self.board.reset();
        let body = Self::basket_body(&self.config);
        if let Some(basket) = self.arena.get_mut(self.basket) {
            *basket.body_mut() = body;
        }
        self.round = Some(self.timers.schedule(self.round_ticks, CatchTimer::TimeUp));
        let delay = self.next_drop_delay();
        self.timers.schedule(delay, CatchTimer::Drop);
        debug!(ticks = self.round_ticks, "catch round started");
    }

    fn drop_item(&mut self) {
        let r = self.config.item_radius;
        let x = self.rng.gen_range(r..(self.config.width - r).max(r + 1.0));
        let golden = self.rng.gen_bool(self.config.golden_chance.clamp(0.0, 1.0));
        self.spawn_item(x, golden);
        let delay = self.next_drop_delay();
        self.timers.schedule(delay, CatchTimer::Drop);
    }

    fn time_up(&mut self) {
        self.round = None;
        self.timers.cancel_all();
        self.arena.clear_kind(EntityKind::Pickup);
        debug!(score = self.board.score(), caught = self.caught(), "catch round over");
        self.machine.fire(GameEvent::TimerExpired);
    }
}

impl Game for Catch {
    fn state(&self) -> GameState {
        self.machine.state()
    }

    fn apply_input(&mut self, input: &InputState, _ctx: TickContext) {
        if input.was_pressed(Actions::PRIMARY) && self.machine.fire(GameEvent::Start).is_some() {
            self.start_round();
            return;
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
        let speed = self.config.basket_speed;
        if let Some(basket) = self.arena.get_mut(self.basket) {
            basket.body_mut().velocity.x = dir * speed;
        }
    }

    fn integrate(&mut self, ctx: TickContext) {
        if !self.machine.is_playing() {
            return;
        }
        for timer in self.timers.tick() {
            match timer {
                CatchTimer::Drop => self.drop_item(),
                CatchTimer::TimeUp => {
                    self.time_up();
                    return;
                }
            }
        }
        self.arena.update(ctx.dt);
    }

    fn detect(&self) -> Vec<CollisionEvent> {
        if !self.machine.is_playing() {
            return Vec::new();
        }
        detect(
            &self.arena.alive_of(EntityKind::Pickup),
            &self.arena.alive_of(EntityKind::Paddle),
            &Shapes,
        )
    }

    fn resolve(&mut self, events: &[CollisionEvent], _ctx: TickContext) -> Result<(), FrameError> {
        let mut caught = 0;
        for event in events {
            let item = self.arena.try_get(event.a)?;
            if !item.is_alive() {
                continue;
            }
            let points = if item.body().variant == GOLDEN {
                self.config.golden_points
            } else {
                self.config.points
            };
            self.arena.kill(event.a);
            self.board.add_points(points);
            self.board.bump("caught");
            caught += 1;
        }

        let fallen = self
            .arena
            .remove_dead()
            .iter()
            .filter(|e| e.is(EntityKind::Pickup))
            .count();
        let missed = fallen.saturating_sub(caught);
        if missed > 0 {
            self.board.add("missed", missed as u64);
        }
        Ok(())
    }

    fn render(&self, out: &mut DrawList) {
        out.background = Rgba::rgb(140, 200, 255);
        self.arena.for_each_alive(|entity| {
            let color = match (entity.kind(), entity.body().variant) {
                (EntityKind::Paddle, _) => Rgba::rgb(150, 100, 50),
                (_, GOLDEN) => Rgba::GOLD,
                _ => Rgba::rgb(255, 140, 0),
            };
            out.push(draw_body(entity.body(), color));
        });
        out.text(Vec2::new(16.0, 16.0), format!("Score {}", self.score()), 18.0, Rgba::BLACK);
        out.text(
            Vec2::new(self.config.width - 120.0, 16.0),
            format!("Time {:.0}", self.time_left().ceil()),
            18.0,
            Rgba::BLACK,
        );
        match self.state() {
            GameState::Menu => {
                out.text(Vec2::new(200.0, 280.0), "CLICK TO START", 28.0, Rgba::BLACK);
            }
            GameState::Result => {
                out.text(Vec2::new(220.0, 260.0), "TIME UP", 32.0, Rgba::BLACK);
                out.text(
                    Vec2::new(200.0, 300.0),
                    format!("Caught {}  Missed {}", self.caught(), self.missed()),
                    18.0,
                    Rgba::BLACK,
                );
            }
            _ => {}
        }
    }

    fn reset(&mut self) {
        self.timers.cancel_all();
        self.round = None;
        self.arena.clear_kind(EntityKind::Pickup);
        self.board.reset();
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

    fn started(config: CatchConfig, seed: u64) -> Session<Catch> {
        let loop_config = LoopConfig::with_seed(seed);
        let game = Catch::new(config, &loop_config);
        let mut session = Session::new(game, &loop_config);
        session.click(Vec2::new(300.0, 300.0));
        session.step().unwrap();
        session
    }

    /// No random drops during the round.
    fn quiet() -> CatchConfig {
        CatchConfig {
            spawn_every: 100_000,
            spawn_jitter: 0,
            ..CatchConfig::default()
        }
    }

    #[test]
    fn round_starts_with_full_clock() {
        let session = started(CatchConfig::default(), 1);
        assert_eq!(session.state(), GameState::Playing);
        let left = session.game().time_left();
        assert!((left - (60.0 - 1.0 / 60.0)).abs() < 1e-3, "{left}");
    }

    #[test]
    fn items_drop_on_a_cadence() {
        let mut session = started(CatchConfig::default(), 2);
        session.step_n(300).unwrap();
        let game = session.game();
        let dropped = game.arena().count_alive(EntityKind::Pickup) as u64 + game.caught() + game.missed();
        // 300 ticks at one drop per 30..=60 ticks
        assert!((5..=10).contains(&dropped), "{dropped} drops");
    }

    #[test]
    fn basket_catches_an_item() {
        let mut session = started(quiet(), 3);
        let game = session.game_mut();
        let item = game.spawn_item(300.0, false);
        game.arena_mut().get_mut(item).unwrap().body_mut().position.y = 530.0;
        session.step_n(5).unwrap();

        let game = session.game();
        assert_eq!(game.score(), 10);
        assert_eq!(game.caught(), 1);
        assert_eq!(game.missed(), 0);
        assert!(game.arena().get(item).is_none());
    }

    #[test]
    fn golden_items_are_worth_more() {
        let mut session = started(quiet(), 3);
        let game = session.game_mut();
        let item = game.spawn_item(300.0, true);
        game.arena_mut().get_mut(item).unwrap().body_mut().position.y = 530.0;
        session.step_n(5).unwrap();
        assert_eq!(session.game().score(), 50);
    }

    #[test]
    fn missed_items_are_counted() {
        let mut session = started(quiet(), 4);
        session.game_mut().spawn_item(30.0, false);
        session.step_n(400).unwrap();
        assert_eq!(session.game().missed(), 1);
        assert_eq!(session.game().score(), 0);
        assert_eq!(session.game().arena().count_alive(EntityKind::Pickup), 0);
    }

    #[test]
    fn basket_follows_input_and_stops_at_walls() {
        let mut session = started(quiet(), 5);
        session.key_down("ArrowRight");
        session.step_n(120).unwrap();
        let game = session.game();
        let x = game.arena().get(game.basket()).unwrap().body().position.x;
        assert!((x - 560.0).abs() < 1e-3);
    }

    #[test]
    fn round_ends_when_time_runs_out() {
        let mut session = started(CatchConfig::default(), 6);
        session.step_n(3598).unwrap();
        assert_eq!(session.state(), GameState::Playing);
        session.step().unwrap();
        assert_eq!(session.state(), GameState::Result);
        assert!(session.game().time_left().abs() < f32::EPSILON);
        assert!(session.render().has_text("TIME UP"));

        // The clock is stopped; further ticks change nothing
        let before = session.game().score();
        session.step_n(60).unwrap();
        assert_eq!(session.game().score(), before);
        assert_eq!(session.state(), GameState::Result);
    }

    #[test]
    fn click_starts_a_fresh_round() {
        let mut session = started(CatchConfig {
            round_seconds: 1.0,
            ..quiet()
        }, 7);
        session.step_n(60).unwrap();
        assert_eq!(session.state(), GameState::Result);
        session.click(Vec2::ZERO);
        session.step().unwrap();
        assert_eq!(session.state(), GameState::Playing);
        assert!(session.game().time_left() > 0.9);
    }

    #[test]
    fn reset_cancels_the_clock() {
        let mut session = started(CatchConfig::default(), 8);
        session.step_n(100).unwrap();
        session.reset();
        assert_eq!(session.state(), GameState::Menu);
        assert!(session.game().timers.is_empty());
        assert!(session.game().time_left().abs() < f32::EPSILON);

        session.step_n(4000).unwrap();
        assert_eq!(session.state(), GameState::Menu);
    }

    mod cadence_limit_tests {
        use super::*;

        #[test]
        fn zero_spawn_interval_drops_every_tick() {
            let config = CatchConfig {
                spawn_every: 0,
                spawn_jitter: 5,
                ..CatchConfig::default()
            };
            let mut session = started(config, 9);
            session.step_n(30).unwrap();
            assert_eq!(session.state(), GameState::Playing);
            let game = session.game();
            let dropped = game.arena().count_alive(EntityKind::Pickup) as u64 + game.caught() + game.missed();
            assert!(dropped >= 30, "{dropped} drops");
        }

        #[test]
        fn extreme_spawn_interval_does_not_overflow() {
            let config = CatchConfig {
                spawn_every: u32::MAX,
                spawn_jitter: u32::MAX,
                ..CatchConfig::default()
            };
            let mut session = started(config, 10);
            session.step_n(10).unwrap();
            assert_eq!(session.state(), GameState::Playing);
        }
    }
}
