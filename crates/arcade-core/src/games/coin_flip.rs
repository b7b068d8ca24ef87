//! Coin flip with a five-phase toss animation.
//!
//! The outcome of each flip is drawn from the seeded RNG when the flip
//! starts. The rotation schedule is then built so that the accumulated
//! rotation `R` at the end of the animation lands on the drawn face:
//! `R mod 2π < π` shows heads, anything else shows tails.
//!
//! ```text
//! toss 25 | rise 10 | tumble 50 | fall 65 | settle 50   (200 frames)
//!          ease-out   sine hover  ease-in   linear
//! ```
//!
//! In the hand-cover variant the coin is hidden under a hand when it lands
//! and revealed three seconds later (or on the next click). Resetting
//! cancels the pending reveal.

use std::f32::consts::{PI, TAU};

use framekit::{
    Actions, AssetError, AssetSlot, Curve, DrawList, Game, GameEvent, GameState, InputState,
    LoopConfig, Phase, Rgba, StateMachine, Step, TickContext, TimerId, Timeline, Timers,
    TransitionTable, Tween,
};
use glam::Vec2;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::stats::FlipStats;

/// Coin face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Face {
    /// Heads
    Heads,
    /// Tails
    Tails,
}

impl Face {
    /// The face shown by a coin rotated `rotation` radians from heads-up.
    #[must_use]
    pub fn from_rotation(rotation: f32) -> Self {
        if rotation.rem_euclid(TAU) < PI {
            Self::Heads
        } else {
            Self::Tails
        }
    }

    /// Upper-case label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Heads => "HEADS",
            Self::Tails => "TAILS",
        }
    }
}

/// Coin flip tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoinFlipConfig {
    /// Frames of the initial toss
    pub toss_frames: u32,
    /// Frames of the ease-out rise
    pub rise_frames: u32,
    /// Frames of the hover at the top
    pub tumble_frames: u32,
    /// Frames of the ease-in fall
    pub fall_frames: u32,
    /// Frames of the settle on the table
    pub settle_frames: u32,
    /// Fewest full turns per flip
    pub min_turns: u32,
    /// Most full turns per flip
    pub max_turns: u32,
    /// Peak height above the table
    pub rise_height: f32,
    /// Hover jitter amplitude
    pub hover_jitter: f32,
    /// Coin radius
    pub coin_radius: f32,
    /// Hide the coin under a hand on landing
    pub hand_cover: bool,
    /// Seconds before the hand lifts
    pub reveal_seconds: f32,
    /// Surface size
    pub surface: Vec2,
}

impl Default for CoinFlipConfig {
    fn default() -> Self {
        Self {
            toss_frames: 25,
            rise_frames: 10,
            tumble_frames: 50,
            fall_frames: 65,
            settle_frames: 50,
            min_turns: 8,
            max_turns: 12,
            rise_height: 150.0,
            hover_jitter: 6.0,
            coin_radius: 60.0,
            hand_cover: false,
            reveal_seconds: 3.0,
            surface: Vec2::new(400.0, 400.0),
        }
    }
}

impl CoinFlipConfig {
    /// The hand-cover variant.
    #[must_use]
    pub fn with_hand_cover(mut self) -> Self {
        self.hand_cover = true;
        self
    }

    /// Total animation length in frames.
    #[must_use]
    pub fn total_frames(&self) -> u32 {
        [
            self.toss_frames,
            self.rise_frames,
            self.tumble_frames,
            self.fall_frames,
            self.settle_frames,
        ]
        .into_iter()
        .fold(0, u32::saturating_add)
    }
}

/// Builds the toss animation for a rotation schedule that ends at `total`
/// radians.
#[must_use]
pub fn flip_timeline(config: &CoinFlipConfig, total: f32) -> Timeline {
    let h = -config.rise_height;
    let toss_top = h * 0.3;
    let at = |share: f32| total * share;

    Timeline::new(vec![
        Phase::new(
            "toss",
            config.toss_frames,
            Tween::default()
                .y(Curve::Linear { from: 0.0, to: toss_top })
                .rotation(Curve::Linear { from: 0.0, to: at(0.1) }),
        ),
        Phase::new(
            "rise",
            config.rise_frames,
            Tween::default()
                .y(Curve::EaseOutQuad { from: toss_top, to: h })
                .rotation(Curve::Linear { from: at(0.1), to: at(0.25) }),
        ),
        Phase::new(
            "tumble",
            config.tumble_frames,
            Tween::default()
                .y(Curve::Sine {
                    center: h,
                    amplitude: config.hover_jitter,
                    cycles: 2.0,
                })
                .rotation(Curve::Linear { from: at(0.25), to: at(0.65) }),
        ),
        Phase::new(
            "fall",
            config.fall_frames,
            Tween::default()
                .y(Curve::EaseInQuad { from: h, to: 0.0 })
                .rotation(Curve::Linear { from: at(0.65), to: at(0.95) }),
        ),
        Phase::new(
            "settle",
            config.settle_frames,
            Tween::default()
                .rotation(Curve::Linear { from: at(0.95), to: total })
                .scale(Curve::Linear { from: 1.08, to: 1.0 }),
        ),
    ])
}

/// Total rotation for `turns` full turns landing on `face`.
///
/// The extra quarter or three-quarter turn keeps the result a quarter turn
/// away from either face boundary.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn rotation_for(face: Face, turns: u32) -> f32 {
    let base = TAU * turns as f32;
    match face {
        Face::Heads => base + PI * 0.5,
        Face::Tails => base + PI * 1.5,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CoinTimer {
    Reveal,
}

/// Coin flip game.
#[derive(Debug)]
pub struct CoinFlip {
    config: CoinFlipConfig,
    machine: StateMachine,
    rng: ChaCha8Rng,
    dt: f32,
    reveal_ticks: u32,
    timeline: Timeline,
    rotation: f32,
    offset: Vec2,
    scale: f32,
    outcome: Option<Face>,
    landing: f32,
    shown: Option<Face>,
    covered: bool,
    reveal: Option<TimerId>,
    timers: Timers<CoinTimer>,
    stats: FlipStats,
    sprite: AssetSlot<u32>,
}

impl CoinFlip {
    /// Creates a coin on the table, heads up.
    #[must_use]
    pub fn new(config: CoinFlipConfig, loop_config: &LoopConfig) -> Self {
        Self {
            machine: StateMachine::new(TransitionTable::timed()),
            rng: loop_config.rng(),
            dt: loop_config.dt(),
            reveal_ticks: loop_config.ticks_for(config.reveal_seconds),
            timeline: Timeline::new(Vec::new()),
            rotation: 0.0,
            offset: Vec2::ZERO,
            scale: 1.0,
            outcome: None,
            landing: 0.0,
            shown: None,
            covered: false,
            reveal: None,
            timers: Timers::new(),
            stats: FlipStats::new(),
            sprite: AssetSlot::new("coin.png"),
            config,
        }
    }

    /// Accumulated rotation in radians.
    #[must_use]
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Result of the last landed flip, hidden while covered.
    #[must_use]
    pub fn result(&self) -> Option<Face> {
        if self.covered {
            None
        } else {
            self.shown
        }
    }

    /// Returns `true` while the hand covers the coin.
    #[must_use]
    pub fn is_covered(&self) -> bool {
        self.covered
    }

    /// Returns `true` while a reveal is scheduled.
    #[must_use]
    pub fn reveal_pending(&self) -> bool {
        self.reveal.is_some_and(|id| self.timers.is_pending(id))
    }

    /// The animation of the current or last flip.
    #[must_use]
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Session statistics.
    #[must_use]
    pub fn stats(&self) -> &FlipStats {
        &self.stats
    }

    /// Clears the statistics without touching the coin.
    pub fn clear_stats(&mut self) {
        self.stats.clear();
    }

    /// Delivers the coin texture. Failure keeps the drawn placeholder.
    pub fn load_sprite(&mut self, result: Result<u32, AssetError>) {
        self.sprite.resolve(result);
    }

    fn start_flip(&mut self, tick: u64) {
        if self.machine.fire(GameEvent::Start).is_none() {
            return;
        }
        let face = if self.rng.gen_bool(0.5) {
            Face::Heads
        } else {
            Face::Tails
        };
        let turns = self
            .rng
            .gen_range(self.config.min_turns..=self.config.max_turns.max(self.config.min_turns));
        let total = rotation_for(face, turns);
        self.timeline = flip_timeline(&self.config, total);
        self.outcome = Some(face);
        self.landing = total;
        self.covered = false;
        debug!(?face, turns, tick, "coin flip started");

        // No animation frames configured
        if self.timeline.is_complete() {
            self.land(tick);
        }
    }

    fn land(&mut self, tick: u64) {
        let Some(face) = self.outcome.take() else {
            return;
        };
        // Rest pose; phases may be configured away
        self.rotation = self.landing;
        self.offset = Vec2::ZERO;
        self.scale = 1.0;
        debug_assert_eq!(face, Face::from_rotation(self.rotation));

        let seconds = f64::from(self.timeline.total_frames()) * f64::from(self.dt);
        self.stats.record(face, tick, seconds);
        self.shown = Some(face);
        self.machine.fire(GameEvent::Finished);

        if self.config.hand_cover {
            self.covered = true;
            self.reveal = Some(self.timers.schedule(self.reveal_ticks, CoinTimer::Reveal));
        }
        debug!(?face, tick, "coin landed");
    }

    fn uncover(&mut self) {
        if let Some(id) = self.reveal.take() {
            self.timers.cancel(id);
        }
        self.covered = false;
    }
}

impl Game for CoinFlip {
    fn state(&self) -> GameState {
        self.machine.state()
    }

    fn apply_input(&mut self, input: &InputState, ctx: TickContext) {
        if !input.was_pressed(Actions::PRIMARY | Actions::SHOOT) {
            return;
        }
        if self.covered {
            self.uncover();
        } else if !self.machine.is_playing() {
            self.start_flip(ctx.tick);
        }
    }

    fn integrate(&mut self, ctx: TickContext) {
        for timer in self.timers.tick() {
            match timer {
                CoinTimer::Reveal => {
                    self.reveal = None;
                    self.covered = false;
                }
            }
        }

        if !self.machine.is_playing() {
            return;
        }
        let step = self.timeline.advance();
        let pose = self.timeline.sample();
        self.rotation = pose.rotation;
        self.offset = pose.offset;
        self.scale = pose.scale;
        if step == Step::Completed {
            self.land(ctx.tick);
        }
    }

    fn render(&self, out: &mut DrawList) {
        out.background = Rgba::rgb(20, 60, 30);
        let center = self.config.surface * 0.5 + self.offset;
        let radius = self.config.coin_radius * self.scale;

        if self.covered {
            out.rect(
                self.config.surface * 0.5,
                Vec2::splat(self.config.coin_radius * 2.6),
                Rgba::rgb(230, 190, 160),
            );
        } else if let Some(&handle) = self.sprite.get() {
            out.push(framekit::Draw::Sprite {
                handle,
                center,
                size: Vec2::new(radius * 2.0, radius * 2.0 * self.rotation.cos().abs()),
                rotation: 0.0,
            });
        } else {
            let color = match Face::from_rotation(self.rotation) {
                Face::Heads => Rgba::GOLD,
                Face::Tails => Rgba::rgb(192, 192, 192),
            };
            out.push(framekit::Draw::Ellipse {
                center,
                radii: Vec2::new(radius, radius * self.rotation.cos().abs().max(0.05)),
                rotation: 0.0,
                color,
            });
        }

        if let (GameState::Result, Some(face)) = (self.state(), self.result()) {
            out.text(Vec2::new(20.0, 20.0), face.label(), 32.0, Rgba::WHITE);
        }
        let s = self.stats.session();
        out.text(
            Vec2::new(20.0, self.config.surface.y - 30.0),
            format!("Flips {}  Heads {}  Tails {}", s.total_flips, s.heads_flips, s.tails_flips),
            14.0,
            Rgba::WHITE,
        );
    }

    fn reset(&mut self) {
        self.timers.cancel_all();
        self.reveal = None;
        self.timeline.cancel();
        self.outcome = None;
        self.shown = None;
        self.covered = false;
        self.rotation = 0.0;
        self.offset = Vec2::ZERO;
        self.scale = 1.0;
        self.stats.clear();
        self.machine.fire(GameEvent::Reset);
    }

    fn surface(&self) -> Vec2 {
        self.config.surface
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use framekit::Session;
    use proptest::prelude::*;

    fn session(config: CoinFlipConfig, seed: u64) -> Session<CoinFlip> {
        let loop_config = LoopConfig::with_seed(seed);
        Session::new(CoinFlip::new(config, &loop_config), &loop_config)
    }

    fn flip(session: &mut Session<CoinFlip>) {
        session.click(Vec2::ZERO);
        session.step_n(200).unwrap();
    }

    mod rotation_tests {
        use super::*;

        #[test]
        fn face_boundaries() {
            assert_eq!(Face::from_rotation(0.0), Face::Heads);
            assert_eq!(Face::from_rotation(PI * 0.5), Face::Heads);
            assert_eq!(Face::from_rotation(PI * 1.5), Face::Tails);
            assert_eq!(Face::from_rotation(TAU + 0.1), Face::Heads);
            assert_eq!(Face::from_rotation(-0.1), Face::Tails);
        }

        #[test]
        fn default_schedule_is_two_hundred_frames() {
            let config = CoinFlipConfig::default();
            assert_eq!(config.total_frames(), 200);
            assert_eq!(flip_timeline(&config, 10.0).total_frames(), 200);
        }

        #[test]
        fn timeline_ends_on_total_rotation() {
            let config = CoinFlipConfig::default();
            let total = rotation_for(Face::Tails, 9);
            let mut timeline = flip_timeline(&config, total);
            for _ in 0..200 {
                timeline.advance();
            }
            assert!(timeline.is_complete());
            let end = timeline.sample();
            assert!((end.rotation - total).abs() < 1e-3);
            assert!(end.offset.y.abs() < 1e-3);
            assert_eq!(Face::from_rotation(end.rotation), Face::Tails);
        }
    }

    mod game_tests {
        use super::*;

        #[test]
        fn flip_lands_after_two_hundred_ticks() {
            let mut session = session(CoinFlipConfig::default(), 3);
            session.click(Vec2::ZERO);
            session.step_n(199).unwrap();
            assert_eq!(session.state(), GameState::Playing);
            session.step().unwrap();
            assert_eq!(session.state(), GameState::Result);

            let game = session.game();
            let face = game.result().unwrap();
            assert_eq!(face, Face::from_rotation(game.rotation()));
            assert_eq!(game.stats().total(), 1);
            let time = game.stats().session().flip_times[0];
            assert!((time - 200.0 / 60.0).abs() < 1e-3);
        }

        #[test]
        fn clicks_during_flight_are_ignored() {
            let mut session = session(CoinFlipConfig::default(), 3);
            session.click(Vec2::ZERO);
            session.step_n(50).unwrap();
            session.click(Vec2::ZERO);
            session.step_n(150).unwrap();
            assert_eq!(session.state(), GameState::Result);
            assert_eq!(session.game().stats().total(), 1);
        }

        #[test]
        fn same_seed_same_results() {
            let run = |seed| {
                let mut s = session(CoinFlipConfig::default(), seed);
                (0..10)
                    .map(|_| {
                        flip(&mut s);
                        s.game().result().unwrap()
                    })
                    .collect::<Vec<_>>()
            };
            assert_eq!(run(11), run(11));
        }

        #[test]
        fn many_flips_see_both_faces() {
            let mut session = session(CoinFlipConfig::default(), 1);
            for _ in 0..40 {
                flip(&mut session);
            }
            let s = session.game().stats().session();
            assert_eq!(s.total_flips, 40);
            assert!(s.heads_flips > 0 && s.tails_flips > 0);
            assert_eq!(s.heads_flips + s.tails_flips, 40);
        }

        #[test]
        fn render_shows_result_text() {
            let mut session = session(CoinFlipConfig::default(), 5);
            flip(&mut session);
            let face = session.game().result().unwrap();
            let list = session.render();
            assert!(list.has_text(face.label()));
            assert!(list.has_text("Flips 1"));
        }

        #[test]
        fn loaded_sprite_replaces_ellipse() {
            let mut session = session(CoinFlipConfig::default(), 5);
            session.game_mut().load_sprite(Ok(42));
            let list = session.render();
            assert!(list
                .iter()
                .any(|d| matches!(d, framekit::Draw::Sprite { handle: 42, .. })));
        }

        #[test]
        fn failed_sprite_keeps_placeholder() {
            let mut session = session(CoinFlipConfig::default(), 5);
            session
                .game_mut()
                .load_sprite(Err(AssetError::NotFound("coin.png".into())));
            let list = session.render();
            assert!(list
                .iter()
                .any(|d| matches!(d, framekit::Draw::Ellipse { .. })));
        }
    }

    mod frame_count_tests {
        use super::*;

        fn without_frames() -> CoinFlipConfig {
            CoinFlipConfig {
                toss_frames: 0,
                rise_frames: 0,
                tumble_frames: 0,
                fall_frames: 0,
                settle_frames: 0,
                ..CoinFlipConfig::default()
            }
        }

        #[test]
        fn zero_frame_flip_lands_on_the_click() {
            let mut session = session(without_frames(), 12);
            session.click(Vec2::ZERO);
            session.step().unwrap();
            assert_eq!(session.state(), GameState::Result);
            assert_eq!(session.game().stats().total(), 1);
            assert_eq!(session.game().stats().session().flip_times[0], 0.0);

            session.click(Vec2::ZERO);
            session.step().unwrap();
            assert_eq!(session.game().stats().total(), 2);
            let face = session.game().result().unwrap();
            assert_eq!(face, Face::from_rotation(session.game().rotation()));
        }

        #[test]
        fn skipped_settle_still_rests_on_the_drawn_face() {
            let config = CoinFlipConfig {
                settle_frames: 0,
                ..CoinFlipConfig::default()
            };
            let mut session = session(config, 13);
            session.click(Vec2::ZERO);
            session.step_n(150).unwrap();
            assert_eq!(session.state(), GameState::Result);
            let game = session.game();
            assert_eq!(game.result().unwrap(), Face::from_rotation(game.rotation()));
        }

        #[test]
        fn huge_frame_counts_saturate() {
            let config = CoinFlipConfig {
                toss_frames: u32::MAX,
                rise_frames: u32::MAX,
                ..CoinFlipConfig::default()
            };
            assert_eq!(config.total_frames(), u32::MAX);
        }
    }

    mod hand_cover_tests {
        use super::*;

        #[test]
        fn reveal_after_three_seconds() {
            let mut session = session(CoinFlipConfig::default().with_hand_cover(), 8);
            flip(&mut session);
            assert!(session.game().is_covered());
            assert!(session.game().result().is_none());
            assert_eq!(session.game().stats().total(), 1);

            session.step_n(179).unwrap();
            assert!(session.game().is_covered());
            session.step().unwrap();
            assert!(!session.game().is_covered());
            assert!(session.game().result().is_some());
        }

        #[test]
        fn click_reveals_early() {
            let mut session = session(CoinFlipConfig::default().with_hand_cover(), 8);
            flip(&mut session);
            session.click(Vec2::ZERO);
            session.step().unwrap();
            assert!(!session.game().is_covered());
            assert!(!session.game().reveal_pending());
            assert_eq!(session.state(), GameState::Result);
        }

        #[test]
        fn reset_cancels_pending_reveal() {
            let mut session = session(CoinFlipConfig::default().with_hand_cover(), 8);
            flip(&mut session);
            assert!(session.game().reveal_pending());

            session.reset();
            assert!(!session.game().reveal_pending());
            assert_eq!(session.state(), GameState::Menu);

            // Start a new flip; the old reveal must not uncover anything mid-flight
            session.click(Vec2::ZERO);
            session.step_n(199).unwrap();
            assert!(!session.game().is_covered());
            assert_eq!(session.state(), GameState::Playing);
        }
    }

    proptest! {
        #[test]
        fn any_frame_counts_land_and_record(
            frames in proptest::array::uniform5(0u32..6),
            seed in any::<u64>(),
        ) {
            let config = CoinFlipConfig {
                toss_frames: frames[0],
                rise_frames: frames[1],
                tumble_frames: frames[2],
                fall_frames: frames[3],
                settle_frames: frames[4],
                ..CoinFlipConfig::default()
            };
            let total = config.total_frames();
            let mut session = session(config, seed);
            for flips in 1..=2 {
                session.click(Vec2::ZERO);
                session.step_n(total.max(1)).unwrap();
                prop_assert_eq!(session.state(), GameState::Result);
                prop_assert_eq!(session.game().stats().total(), flips);
                let game = session.game();
                prop_assert_eq!(game.result().unwrap(), Face::from_rotation(game.rotation()));
            }
        }

        #[test]
        fn landed_face_matches_rotation(seed in any::<u64>()) {
            let mut session = session(CoinFlipConfig::default(), seed);
            flip(&mut session);
            let game = session.game();
            let face = game.result().unwrap();
            prop_assert_eq!(face, Face::from_rotation(game.rotation()));
            prop_assert_eq!(game.stats().history()[0].result, face);
        }
    }
}
