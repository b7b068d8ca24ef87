//! Pong against a speed-capped AI.
//!
//! The left paddle belongs to the player (`MOVE_UP` / `MOVE_DOWN`), the right
//! one tracks the ball no faster than `ai_speed`. The ball bounces off the
//! top and bottom walls through the arena's boundary policy and off paddles
//! through box-circle collision events. When the ball's center leaves the
//! field on one side, the other player scores and the ball is served from
//! the center toward the player who conceded. First to `points_to_win` ends
//! the match.

use std::f32::consts::PI;

use framekit::{
    detect, draw_body, Actions, Arena, Body, BoundaryPolicy, BoundaryRules, Bounds,
    CollisionEvent, DrawList, Edge, EntityId, EntityKind, FrameError, Game, GameEvent, GameState,
    InputState, LoopConfig, Rgba, ScoreBoard, Shapes, StateMachine, TickContext, TransitionTable,
};
use glam::Vec2;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

const SCORE_1: &str = "score1";
const SCORE_2: &str = "score2";

/// Pong tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PongConfig {
    /// Field width
    pub width: f32,
    /// Field height
    pub height: f32,
    /// Paddle size
    pub paddle_size: Vec2,
    /// Gap between paddle and side wall
    pub paddle_margin: f32,
    /// Player paddle speed, px/s
    pub paddle_speed: f32,
    /// AI paddle speed cap, px/s
    pub ai_speed: f32,
    /// Ball radius
    pub ball_radius: f32,
    /// Serve speed, px/s
    pub serve_speed: f32,
    /// Speed added on every paddle hit, px/s
    pub speed_increment: f32,
    /// Ball speed cap, px/s
    pub max_ball_speed: f32,
    /// Largest bounce angle off a paddle edge, degrees
    pub max_bounce_deg: f32,
    /// Largest serve angle, degrees
    pub max_serve_deg: f32,
    /// Points that win the match
    pub points_to_win: u32,
}

impl Default for PongConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 400.0,
            paddle_size: Vec2::new(10.0, 80.0),
            paddle_margin: 16.0,
            paddle_speed: 300.0,
            ai_speed: 200.0,
            ball_radius: 6.0,
            serve_speed: 300.0,
            speed_increment: 25.0,
            max_ball_speed: 700.0,
            max_bounce_deg: 60.0,
            max_serve_deg: 20.0,
            points_to_win: 11,
        }
    }
}

impl PongConfig {
    fn field(&self) -> Bounds {
        Bounds::new(self.width, self.height)
    }

    fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }
}

/// Which side a paddle or serve belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    /// Player 1, left
    Left,
    /// Player 2, right
    Right,
}

impl Side {
    fn direction(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }
}

/// Pong game.
#[derive(Debug)]
pub struct Pong {
    config: PongConfig,
    machine: StateMachine,
    rng: ChaCha8Rng,
    arena: Arena,
    board: ScoreBoard,
    ball: EntityId,
    left: EntityId,
    right: EntityId,
    winner: Option<Side>,
}

impl Pong {
    /// Creates a match on the menu with the ball at rest in the center.
    #[must_use]
    pub fn new(config: PongConfig, loop_config: &LoopConfig) -> Self {
        let rules = BoundaryRules::new(config.field())
            .with(EntityKind::Ball, BoundaryPolicy::new(Edge::Ignore, Edge::Bounce))
            .with(EntityKind::Paddle, BoundaryPolicy::CLAMP);
        let mut arena = Arena::with_rules(rules);

        let left_x = config.paddle_margin + config.paddle_size.x * 0.5;
        let right_x = config.width - left_x;
        let left = arena.spawn(
            EntityKind::Paddle,
            Body::rect(Vec2::new(left_x, config.height * 0.5), config.paddle_size),
        );
        let right = arena.spawn(
            EntityKind::Paddle,
            Body::rect(Vec2::new(right_x, config.height * 0.5), config.paddle_size),
        );
        let ball = arena.spawn(EntityKind::Ball, Body::circle(config.center(), config.ball_radius));

        Self {
            machine: StateMachine::new(TransitionTable::timed()),
            rng: loop_config.rng(),
            arena,
            board: ScoreBoard::new(0),
            ball,
            left,
            right,
            winner: None,
            config,
        }
    }

    /// Left player's points.
    #[must_use]
    pub fn score1(&self) -> u64 {
        self.board.counter(SCORE_1)
    }

    /// Right player's points.
    #[must_use]
    pub fn score2(&self) -> u64 {
        self.board.counter(SCORE_2)
    }

    /// Winner of the finished match.
    #[must_use]
    pub fn winner(&self) -> Option<Side> {
        self.winner
    }

    /// Entity store.
    #[must_use]
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Ball position and velocity.
    #[must_use]
    pub fn ball(&self) -> Option<&Body> {
        self.arena.get(self.ball).map(|e| e.body())
    }

    /// Places the ball. Mostly for setting up rallies.
    pub fn place_ball(&mut self, position: Vec2, velocity: Vec2) {
        if let Some(ball) = self.arena.get_mut(self.ball) {
            let body = ball.body_mut();
            body.position = position;
            body.velocity = velocity;
        }
    }

    fn new_match(&mut self) {
        self.board.reset();
        self.winner = None;
        for id in [self.left, self.right] {
            if let Some(paddle) = self.arena.get_mut(id) {
                paddle.body_mut().position.y = self.config.height * 0.5;
                paddle.body_mut().velocity = Vec2::ZERO;
            }
        }
        self.serve(Side::Right);
    }

    /// Puts the ball in the center moving toward `toward` at a seeded angle.
    fn serve(&mut self, toward: Side) {
        let max = self.config.max_serve_deg.to_radians();
        let angle = if max > 0.0 {
            self.rng.gen_range(-max..=max)
        } else {
            0.0
        };
        let velocity =
            Vec2::new(toward.direction() * angle.cos(), angle.sin()) * self.config.serve_speed;
        self.place_ball(self.config.center(), velocity);
        debug!(?toward, "serve");
    }

    fn point(&mut self, scorer: Side) {
        let total = match scorer {
            Side::Left => self.board.bump(SCORE_1),
            Side::Right => self.board.bump(SCORE_2),
        };
        debug!(?scorer, score1 = self.score1(), score2 = self.score2(), "point");

        if total >= u64::from(self.config.points_to_win) {
            self.winner = Some(scorer);
            self.place_ball(self.config.center(), Vec2::ZERO);
            self.machine.fire(GameEvent::Finished);
            return;
        }
        let toward = match scorer {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        };
        self.serve(toward);
    }

    fn bounce_off(&mut self, paddle: EntityId) {
        let Some(paddle_body) = self.arena.get(paddle).map(|e| e.body().clone()) else {
            return;
        };
        let side = if paddle == self.left { Side::Left } else { Side::Right };
        let config = &self.config;
        let Some(ball) = self.arena.get_mut(self.ball) else {
            return;
        };
        let body = ball.body_mut();

        // Already heading away: the hit was resolved on an earlier tick
        let away = -side.direction();
        if body.velocity.x * away > 0.0 {
            return;
        }

        let half = paddle_body.half_extents();
        let offset = ((body.position.y - paddle_body.position.y) / half.y).clamp(-1.0, 1.0);
        let angle = offset * config.max_bounce_deg.to_radians().min(PI * 0.45);
        let speed = (body.velocity.length() + config.speed_increment).min(config.max_ball_speed);
        body.velocity = Vec2::new(away * angle.cos(), angle.sin()) * speed;
        body.position.x = paddle_body.position.x + away * (half.x + body.radius());
    }
}

impl Game for Pong {
    fn state(&self) -> GameState {
        self.machine.state()
    }

    fn apply_input(&mut self, input: &InputState, _ctx: TickContext) {
        if input.was_pressed(Actions::PRIMARY) && self.machine.fire(GameEvent::Start).is_some() {
            self.new_match();
            return;
        }
        if !self.machine.is_playing() {
            return;
        }

        let mut dir = 0.0;
        if input.is_held(Actions::MOVE_UP) {
            dir -= 1.0;
        }
        if input.is_held(Actions::MOVE_DOWN) {
            dir += 1.0;
        }
        let speed = self.config.paddle_speed;
        if let Some(paddle) = self.arena.get_mut(self.left) {
            paddle.body_mut().velocity = Vec2::new(0.0, dir * speed);
        }
    }

    fn integrate(&mut self, ctx: TickContext) {
        if !self.machine.is_playing() {
            return;
        }
        let ball_y = self.ball().map_or(self.config.height * 0.5, |b| b.position.y);
        let cap = self.config.ai_speed;
        if let Some(ai) = self.arena.get_mut(self.right) {
            let gap = ball_y - ai.body().position.y;
            ai.body_mut().velocity = Vec2::new(0.0, (gap / ctx.dt).clamp(-cap, cap));
        }
        self.arena.update(ctx.dt);
    }

    fn detect(&self) -> Vec<CollisionEvent> {
        if !self.machine.is_playing() {
            return Vec::new();
        }
        detect(
            &self.arena.alive_of(EntityKind::Ball),
            &self.arena.alive_of(EntityKind::Paddle),
            &Shapes,
        )
    }

    fn resolve(&mut self, events: &[CollisionEvent], _ctx: TickContext) -> Result<(), FrameError> {
        if !self.machine.is_playing() {
            return Ok(());
        }
        for event in events {
            if let Some(paddle) = event.side(EntityKind::Paddle) {
                self.bounce_off(paddle);
            }
        }

        let x = self.arena.try_get(self.ball)?.body().position.x;
        if x > self.config.width {
            self.point(Side::Left);
        } else if x < 0.0 {
            self.point(Side::Right);
        }
        Ok(())
    }

    fn render(&self, out: &mut DrawList) {
        let center_x = self.config.width * 0.5;
        out.push(framekit::Draw::Line {
            from: Vec2::new(center_x, 0.0),
            to: Vec2::new(center_x, self.config.height),
            width: 2.0,
            color: Rgba::WHITE.with_alpha(0.3),
        });
        self.arena
            .for_each_alive(|entity| out.push(draw_body(entity.body(), Rgba::WHITE)));
        out.text(Vec2::new(center_x - 60.0, 16.0), self.score1().to_string(), 32.0, Rgba::WHITE);
        out.text(Vec2::new(center_x + 40.0, 16.0), self.score2().to_string(), 32.0, Rgba::WHITE);

        match (self.state(), self.winner) {
            (GameState::Result, Some(Side::Left)) => {
                out.text(Vec2::new(center_x - 80.0, 180.0), "YOU WIN", 32.0, Rgba::GREEN);
            }
            (GameState::Result, Some(Side::Right)) => {
                out.text(Vec2::new(center_x - 80.0, 180.0), "CPU WINS", 32.0, Rgba::RED);
            }
            _ => {}
        }
    }

    fn reset(&mut self) {
        self.board.reset();
        self.winner = None;
        self.place_ball(self.config.center(), Vec2::ZERO);
        self.machine.fire(GameEvent::Reset);
    }

    fn surface(&self) -> Vec2 {
        Vec2::new(self.config.width, self.config.height)
    }
}
