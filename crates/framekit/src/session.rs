//! The per-frame driver.
//!
//! A [`Session`] owns one [`Game`] plus the clock and input plumbing around
//! it. Every tick runs the same fixed sequence:
//!
//! ```text
//! INPUT      game.apply_input(&input, ctx)    read-only view of held/pressed
//! INTEGRATE  game.integrate(ctx)              timelines, arena.update, timers
//! DETECT     game.detect() -> events          &self: cannot mutate
//! RESOLVE    game.resolve(&events, ctx)       score, removal, transitions
//! ```
//!
//! Rendering happens once per frame after all ticks, again through `&self`.
//! All work for tick N finishes before tick N+1 starts.

use glam::Vec2;
use tracing::trace;

use crate::clock::{Clock, TickContext};
use crate::collision::CollisionEvent;
use crate::config::LoopConfig;
use crate::error::FrameError;
use crate::input::{Actions, InputState, KeyMap};
use crate::render::DrawList;
use crate::state::GameState;

/// One game's rules, driven by a [`Session`].
pub trait Game {
    /// Current top-level state.
    fn state(&self) -> GameState;

    /// Reacts to this tick's input. Commands that make no sense in the
    /// current state are ignored.
    fn apply_input(&mut self, input: &InputState, ctx: TickContext);

    /// Advances animations, physics and timers by one tick.
    fn integrate(&mut self, ctx: TickContext);

    /// Reports overlaps in the post-integrate state. Must not mutate.
    fn detect(&self) -> Vec<CollisionEvent> {
        Vec::new()
    }

    /// Applies the effects of this tick's collision events.
    ///
    /// # Errors
    ///
    /// Implementations return an error only for broken invariants; the
    /// session aborts the rest of the frame and reports it.
    fn resolve(&mut self, events: &[CollisionEvent], ctx: TickContext) -> Result<(), FrameError> {
        let _ = (events, ctx);
        Ok(())
    }

    /// Appends this frame's draw commands.
    fn render(&self, out: &mut DrawList);

    /// Returns to the menu, cancelling anything pending.
    fn reset(&mut self);

    /// Size of the drawing surface.
    fn surface(&self) -> Vec2 {
        Vec2::new(800.0, 600.0)
    }
}

/// Clock, input and one game.
#[derive(Debug)]
pub struct Session<G> {
    game: G,
    clock: Clock,
    input: InputState,
    keys: KeyMap,
}

impl<G: Game> Session<G> {
    /// Wraps `game` with a clock built from `config` and the default key map.
    pub fn new(game: G, config: &LoopConfig) -> Self {
        Self {
            game,
            clock: Clock::new(config),
            input: InputState::new(),
            keys: KeyMap::default(),
        }
    }

    /// Replaces the key map.
    #[must_use]
    pub fn with_keys(mut self, keys: KeyMap) -> Self {
        self.keys = keys;
        self
    }

    /// The game.
    pub fn game(&self) -> &G {
        &self.game
    }

    /// The game, mutably. For host-side commands such as exporting stats.
    pub fn game_mut(&mut self) -> &mut G {
        &mut self.game
    }

    /// Shorthand for `game().state()`.
    pub fn state(&self) -> GameState {
        self.game.state()
    }

    /// Ticks run so far.
    pub fn ticks(&self) -> u64 {
        self.clock.ticks()
    }

    /// Pending input.
    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// Host key-down event. Unbound keys are ignored.
    pub fn key_down(&mut self, key: &str) {
        let actions = self.keys.lookup(key);
        if actions.is_empty() {
            trace!(key, "unbound key");
            return;
        }
        self.input.press(actions);
    }

    /// Host key-up event.
    pub fn key_up(&mut self, key: &str) {
        self.input.release(self.keys.lookup(key));
    }

    /// Presses actions directly, bypassing the key map.
    pub fn press(&mut self, actions: Actions) {
        self.input.press(actions);
    }

    /// Releases actions directly.
    pub fn release(&mut self, actions: Actions) {
        self.input.release(actions);
    }

    /// Host pointer click at playfield coordinates. Also counts as a
    /// `PRIMARY` press for this tick.
    pub fn click(&mut self, position: Vec2) {
        self.input.click(position);
        if !self.input.is_held(Actions::PRIMARY) {
            self.input.press(Actions::PRIMARY);
            self.input.release(Actions::PRIMARY);
        }
    }

    /// Runs exactly one tick.
    ///
    /// # Errors
    ///
    /// Propagates an error from [`Game::resolve`].
    pub fn step(&mut self) -> Result<(), FrameError> {
        let Self {
            game, clock, input, ..
        } = self;
        clock.step(|ctx| tick(game, input, ctx))
    }

    /// Runs `n` ticks, stopping at the first error.
    ///
    /// # Errors
    ///
    /// Propagates an error from [`Game::resolve`].
    pub fn step_n(&mut self, n: u32) -> Result<(), FrameError> {
        for _ in 0..n {
            self.step()?;
        }
        Ok(())
    }

    /// Runs as many ticks as `elapsed` seconds allow, then renders.
    ///
    /// # Errors
    ///
    /// Propagates an error from [`Game::resolve`]; the remaining ticks of the
    /// frame are dropped and nothing is rendered. The next call proceeds
    /// normally.
    pub fn frame(&mut self, elapsed: f32) -> Result<DrawList, FrameError> {
        let Self {
            game, clock, input, ..
        } = self;
        clock.run(elapsed, |ctx| tick(game, input, ctx))?;
        Ok(self.render())
    }

    /// Renders the current state without ticking.
    pub fn render(&self) -> DrawList {
        let surface = self.game.surface();
        let mut list = DrawList::new(surface.x, surface.y);
        self.game.render(&mut list);
        list
    }

    /// Resets the game and drops any held input.
    pub fn reset(&mut self) {
        self.input.clear();
        self.game.reset();
    }
}

fn tick<G: Game>(game: &mut G, input: &mut InputState, ctx: TickContext) -> Result<(), FrameError> {
    game.apply_input(input, ctx);
    input.end_tick();
    game.integrate(ctx);
    let events = game.detect();
    if !events.is_empty() {
        trace!(tick = ctx.tick, count = events.len(), "collisions");
    }
    game.resolve(&events, ctx)
}
