//! Phase timelines for frame-counted animations.
//!
//! A [`Timeline`] is an ordered list of named [`Phase`]s. Each phase lasts a
//! fixed number of frames and owns an update function that maps phase-local
//! time to [`Kinematics`] (offset, rotation, scale). Coin tosses, piece drops
//! and falling-character animations are all expressed as a handful of phases
//! instead of hand-written `if frame < N` ladders.
//!
//! # Invariants
//!
//! - While running, `frame_in_phase < duration` of the active phase.
//! - Phases with zero frames are skipped and never become active.
//! - [`Timeline::advance`] returns [`Step::Completed`] exactly once per run;
//!   further calls return [`Step::Idle`] and change nothing.
//!
//! # Example
//!
//! ```
//! use framekit::timeline::{Curve, Phase, Step, Timeline, Tween};
//!
//! let mut timeline = Timeline::new(vec![
//!     Phase::new("rise", 2, Tween::default().y(Curve::EaseOutQuad { from: 0.0, to: -40.0 })),
//!     Phase::new("fall", 3, Tween::default().y(Curve::EaseInQuad { from: -40.0, to: 0.0 })),
//! ]);
//!
//! assert_eq!(timeline.total_frames(), 5);
//! let steps: Vec<Step> = (0..5).map(|_| timeline.advance()).collect();
//! assert_eq!(steps.last(), Some(&Step::Completed));
//! assert_eq!(timeline.advance(), Step::Idle);
//! assert_eq!(timeline.sample().offset.y, 0.0);
//! ```

use std::f32::consts::TAU;
use std::fmt;
use std::sync::Arc;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

// =============================================================================
// Sampling Types
// =============================================================================

/// Kinematic values produced by a phase for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Kinematics {
    /// Offset from the animated object's rest position
    pub offset: Vec2,
    /// Rotation in radians
    pub rotation: f32,
    /// Uniform scale
    pub scale: f32,
}

impl Default for Kinematics {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            rotation: 0.0,
            scale: 1.0,
        }
    }
}

/// Phase-local time handed to a phase's update function.
///
/// `frame` is in `[0, duration)` while the timeline runs. The single sample
/// taken after completion reports `frame == duration` so the final pose is the
/// end of the last phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseTime {
    /// Frames elapsed in the phase
    pub frame: u32,
    /// Phase length in frames, never zero
    pub duration: u32,
}

impl PhaseTime {
    /// Progress through the phase in `[0, 1]`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn progress(&self) -> f32 {
        self.frame as f32 / self.duration as f32
    }
}

/// A per-frame update function for one phase.
pub trait PhaseFn: Send + Sync {
    /// Produces kinematics for the given phase-local time.
    fn sample(&self, time: PhaseTime) -> Kinematics;
}

impl<F> PhaseFn for F
where
    F: Fn(PhaseTime) -> Kinematics + Send + Sync,
{
    fn sample(&self, time: PhaseTime) -> Kinematics {
        self(time)
    }
}

// =============================================================================
// Curves
// =============================================================================

/// Closed-form scalar curve over phase progress `t` in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Curve {
    /// Constant value
    Hold(f32),
    /// Straight interpolation
    Linear {
        /// Value at `t = 0`
        from: f32,
        /// Value at `t = 1`
        to: f32,
    },
    /// Quadratic ease-in (slow start)
    EaseInQuad {
        /// Value at `t = 0`
        from: f32,
        /// Value at `t = 1`
        to: f32,
    },
    /// Quadratic ease-out (slow finish)
    EaseOutQuad {
        /// Value at `t = 0`
        from: f32,
        /// Value at `t = 1`
        to: f32,
    },
    /// Sinusoidal jitter around a center value
    Sine {
        /// Center value
        center: f32,
        /// Peak deviation
        amplitude: f32,
        /// Full oscillations over the phase
        cycles: f32,
    },
}

impl Curve {
    /// Evaluates the curve. `t` is clamped to `[0, 1]`.
    #[must_use]
    pub fn at(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match *self {
            Self::Hold(v) => v,
            Self::Linear { from, to } => from + (to - from) * t,
            Self::EaseInQuad { from, to } => from + (to - from) * t * t,
            Self::EaseOutQuad { from, to } => {
                let inv = 1.0 - t;
                from + (to - from) * (1.0 - inv * inv)
            }
            Self::Sine {
                center,
                amplitude,
                cycles,
            } => center + amplitude * (TAU * cycles * t).sin(),
        }
    }

    /// Value at the end of the curve.
    #[must_use]
    pub fn end(&self) -> f32 {
        self.at(1.0)
    }
}

/// Serializable phase update built from one curve per channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tween {
    /// Horizontal offset
    pub x: Curve,
    /// Vertical offset
    pub y: Curve,
    /// Rotation in radians
    pub rotation: Curve,
    /// Uniform scale
    pub scale: Curve,
}

impl Default for Tween {
    fn default() -> Self {
        Self {
            x: Curve::Hold(0.0),
            y: Curve::Hold(0.0),
            rotation: Curve::Hold(0.0),
            scale: Curve::Hold(1.0),
        }
    }
}

impl Tween {
    /// Sets the horizontal channel.
    #[must_use]
    pub fn x(mut self, curve: Curve) -> Self {
        self.x = curve;
        self
    }

    /// Sets the vertical channel.
    #[must_use]
    pub fn y(mut self, curve: Curve) -> Self {
        self.y = curve;
        self
    }

    /// Sets the rotation channel.
    #[must_use]
    pub fn rotation(mut self, curve: Curve) -> Self {
        self.rotation = curve;
        self
    }

    /// Sets the scale channel.
    #[must_use]
    pub fn scale(mut self, curve: Curve) -> Self {
        self.scale = curve;
        self
    }
}

impl PhaseFn for Tween {
    fn sample(&self, time: PhaseTime) -> Kinematics {
        let t = time.progress();
        Kinematics {
            offset: Vec2::new(self.x.at(t), self.y.at(t)),
            rotation: self.rotation.at(t),
            scale: self.scale.at(t),
        }
    }
}

// =============================================================================
// Phase
// =============================================================================

/// A named, fixed-length segment of an animation.
#[derive(Clone)]
pub struct Phase {
    name: String,
    frames: u32,
    update: Arc<dyn PhaseFn>,
}

impl Phase {
    /// Creates a phase lasting `frames` frames.
    pub fn new(name: impl Into<String>, frames: u32, update: impl PhaseFn + 'static) -> Self {
        Self {
            name: name.into(),
            frames,
            update: Arc::new(update),
        }
    }

    /// Phase name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Phase length in frames.
    #[must_use]
    pub fn frames(&self) -> u32 {
        self.frames
    }

    /// Samples the phase's update function.
    #[must_use]
    pub fn sample(&self, time: PhaseTime) -> Kinematics {
        self.update.sample(time)
    }
}

impl fmt::Debug for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Phase")
            .field("name", &self.name)
            .field("frames", &self.frames)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Timeline
// =============================================================================

/// Result of one [`Timeline::advance`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Still inside the same phase
    Running,
    /// Moved from one phase index to the next non-empty one
    PhaseChanged {
        /// Index of the phase that ended
        from: usize,
        /// Index of the phase that started
        to: usize,
    },
    /// The last phase ended on this call
    Completed,
    /// The timeline had already completed (or was cancelled); nothing changed
    Idle,
}

/// Ordered phases with a frame cursor.
#[derive(Debug, Clone)]
pub struct Timeline {
    phases: Vec<Phase>,
    current: usize,
    frame_in_phase: u32,
    complete: bool,
    cancelled: bool,
}

impl Timeline {
    /// Creates a timeline positioned at the first frame of the first
    /// non-empty phase.
    ///
    /// A timeline with no non-empty phase is complete from the start.
    #[must_use]
    pub fn new(phases: Vec<Phase>) -> Self {
        let mut timeline = Self {
            phases,
            current: 0,
            frame_in_phase: 0,
            complete: false,
            cancelled: false,
        };
        timeline.reset();
        timeline
    }

    /// Rewinds to the first frame of the first non-empty phase.
    pub fn reset(&mut self) {
        self.frame_in_phase = 0;
        self.cancelled = false;
        match self.next_active(0) {
            Some(first) => {
                self.current = first;
                self.complete = false;
            }
            None => {
                self.current = 0;
                self.complete = true;
            }
        }
    }

    /// Stops the timeline without reporting completion.
    ///
    /// The pose freezes on the frame reached so far. Has no effect on a
    /// timeline that already ran to its end.
    pub fn cancel(&mut self) {
        if !self.complete {
            self.complete = true;
            self.cancelled = true;
        }
    }

    /// Advances one frame.
    pub fn advance(&mut self) -> Step {
        if self.complete {
            return Step::Idle;
        }

        self.frame_in_phase += 1;
        if self.frame_in_phase < self.phases[self.current].frames {
            return Step::Running;
        }

        match self.next_active(self.current + 1) {
            Some(next) => {
                let from = self.current;
                debug!(
                    from = self.phases[from].name(),
                    to = self.phases[next].name(),
                    "phase change"
                );
                self.current = next;
                self.frame_in_phase = 0;
                Step::PhaseChanged { from, to: next }
            }
            None => {
                self.frame_in_phase = self.phases[self.current].frames - 1;
                self.complete = true;
                debug!(phase = self.phases[self.current].name(), "timeline complete");
                Step::Completed
            }
        }
    }

    /// Kinematics for the current frame.
    ///
    /// After completion this is the end pose of the last phase; after
    /// [`Timeline::cancel`] it is the pose of the frame it was cancelled on.
    /// A timeline without non-empty phases samples as [`Kinematics::default`].
    #[must_use]
    pub fn sample(&self) -> Kinematics {
        let Some(phase) = self.current_phase() else {
            return Kinematics::default();
        };
        let time = if self.complete && !self.cancelled {
            PhaseTime {
                frame: phase.frames,
                duration: phase.frames,
            }
        } else {
            PhaseTime {
                frame: self.frame_in_phase,
                duration: phase.frames,
            }
        };
        phase.sample(time)
    }

    /// Returns `true` once the last phase has ended or after `cancel`.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Returns `true` if the run was stopped by [`Timeline::cancel`].
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// The active phase, or `None` if the timeline has no non-empty phase.
    #[must_use]
    pub fn current_phase(&self) -> Option<&Phase> {
        self.phases.get(self.current).filter(|p| p.frames > 0)
    }

    /// Index of the active phase.
    #[must_use]
    pub fn phase_index(&self) -> usize {
        self.current
    }

    /// Frames elapsed in the active phase.
    #[must_use]
    pub fn frame_in_phase(&self) -> u32 {
        self.frame_in_phase
    }

    /// Frames elapsed since the start of the run.
    #[must_use]
    pub fn elapsed_frames(&self) -> u32 {
        if self.complete && !self.cancelled && self.current_phase().is_some() {
            return self.total_frames();
        }
        self.phases[..self.current.min(self.phases.len())]
            .iter()
            .map(Phase::frames)
            .fold(self.frame_in_phase, u32::saturating_add)
    }

    /// Sum of all phase lengths, saturating at `u32::MAX`.
    #[must_use]
    pub fn total_frames(&self) -> u32 {
        self.phases.iter().map(Phase::frames).fold(0, u32::saturating_add)
    }

    /// All phases in order.
    #[must_use]
    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    fn next_active(&self, start: usize) -> Option<usize> {
        (start..self.phases.len()).find(|&i| self.phases[i].frames > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn hold(frames: u32) -> Phase {
        Phase::new(format!("hold{frames}"), frames, Tween::default())
    }

    fn timeline_of(durations: &[u32]) -> Timeline {
        Timeline::new(durations.iter().map(|&d| hold(d)).collect())
    }

    mod curve_tests {
        use super::*;

        #[test]
        fn endpoints() {
            let curves = [
                Curve::Linear { from: 2.0, to: 6.0 },
                Curve::EaseInQuad { from: 2.0, to: 6.0 },
                Curve::EaseOutQuad { from: 2.0, to: 6.0 },
            ];
            for curve in curves {
                assert_eq!(curve.at(0.0), 2.0);
                assert_eq!(curve.at(1.0), 6.0);
            }
        }

        #[test]
        fn ease_shapes() {
            let ease_in = Curve::EaseInQuad { from: 0.0, to: 1.0 };
            let ease_out = Curve::EaseOutQuad { from: 0.0, to: 1.0 };
            assert_eq!(ease_in.at(0.5), 0.25);
            assert_eq!(ease_out.at(0.5), 0.75);
        }

        #[test]
        fn sine_returns_to_center() {
            let sine = Curve::Sine {
                center: 10.0,
                amplitude: 3.0,
                cycles: 1.0,
            };
            assert_eq!(sine.at(0.0), 10.0);
            assert!((sine.at(0.25) - 13.0).abs() < 1e-4);
            assert!((sine.end() - 10.0).abs() < 1e-4);
        }

        #[test]
        fn input_is_clamped() {
            let linear = Curve::Linear { from: 0.0, to: 1.0 };
            assert_eq!(linear.at(-1.0), 0.0);
            assert_eq!(linear.at(2.0), 1.0);
        }
    }

    mod timeline_tests {
        use super::*;

        #[test]
        fn reports_phase_changes() {
            let mut timeline = timeline_of(&[2, 3]);
            assert_eq!(timeline.advance(), Step::Running);
            assert_eq!(timeline.advance(), Step::PhaseChanged { from: 0, to: 1 });
            assert_eq!(timeline.current_phase().unwrap().name(), "hold3");
            assert_eq!(timeline.elapsed_frames(), 2);
        }

        #[test]
        fn zero_length_phases_are_skipped() {
            let mut timeline = timeline_of(&[0, 2, 0, 0, 1, 0]);
            assert_eq!(timeline.phase_index(), 1);
            assert_eq!(timeline.advance(), Step::Running);
            assert_eq!(timeline.advance(), Step::PhaseChanged { from: 1, to: 4 });
            assert_eq!(timeline.advance(), Step::Completed);
            assert_eq!(timeline.phase_index(), 4);
        }

        #[test]
        fn empty_timeline_is_complete_immediately() {
            let mut timeline = timeline_of(&[0, 0]);
            assert!(timeline.is_complete());
            assert!(timeline.current_phase().is_none());
            assert_eq!(timeline.advance(), Step::Idle);
            assert_eq!(timeline.sample(), Kinematics::default());

            let mut none = Timeline::new(Vec::new());
            assert!(none.is_complete());
            assert_eq!(none.advance(), Step::Idle);
            assert_eq!(none.elapsed_frames(), 0);
        }

        #[test]
        fn sample_uses_phase_progress() {
            let mut timeline = Timeline::new(vec![Phase::new(
                "slide",
                4,
                Tween::default().x(Curve::Linear { from: 0.0, to: 8.0 }),
            )]);
            assert_eq!(timeline.sample().offset.x, 0.0);
            timeline.advance();
            assert_eq!(timeline.sample().offset.x, 2.0);
            timeline.advance();
            timeline.advance();
            assert_eq!(timeline.sample().offset.x, 6.0);
            assert_eq!(timeline.advance(), Step::Completed);
            assert_eq!(timeline.sample().offset.x, 8.0);
        }

        #[test]
        fn closures_are_phase_functions() {
            let timeline = Timeline::new(vec![Phase::new("spin", 10, |t: PhaseTime| {
                Kinematics {
                    rotation: t.progress() * 2.0,
                    ..Kinematics::default()
                }
            })]);
            assert_eq!(timeline.sample().rotation, 0.0);
        }

        #[test]
        fn reset_restarts_run() {
            let mut timeline = timeline_of(&[1]);
            assert_eq!(timeline.advance(), Step::Completed);
            timeline.reset();
            assert!(!timeline.is_complete());
            assert_eq!(timeline.advance(), Step::Completed);
        }

        #[test]
        fn cancel_stops_without_completion() {
            let mut timeline = timeline_of(&[5]);
            timeline.advance();
            timeline.cancel();
            assert!(timeline.is_complete());
            assert_eq!(timeline.advance(), Step::Idle);
        }

        #[test]
        fn cancel_freezes_current_pose() {
            let mut timeline = Timeline::new(vec![
                Phase::new(
                    "slide",
                    4,
                    Tween::default().x(Curve::Linear { from: 0.0, to: 8.0 }),
                ),
                hold(3),
            ]);
            timeline.advance();
            let before = timeline.sample();
            assert_eq!(before.offset.x, 2.0);

            timeline.cancel();
            assert!(timeline.is_cancelled());
            assert_eq!(timeline.sample(), before);
            assert_eq!(timeline.advance(), Step::Idle);
            assert_eq!(timeline.sample(), before);
            assert_eq!(timeline.elapsed_frames(), 1);

            timeline.reset();
            assert!(!timeline.is_cancelled());
            assert_eq!(timeline.sample().offset.x, 0.0);
        }

        #[test]
        fn cancel_after_completion_keeps_end_pose() {
            let mut timeline = Timeline::new(vec![Phase::new(
                "slide",
                2,
                Tween::default().x(Curve::Linear { from: 0.0, to: 8.0 }),
            )]);
            timeline.advance();
            assert_eq!(timeline.advance(), Step::Completed);
            timeline.cancel();
            assert!(!timeline.is_cancelled());
            assert_eq!(timeline.sample().offset.x, 8.0);
            assert_eq!(timeline.elapsed_frames(), 2);
        }

        #[test]
        fn total_frames_saturate() {
            let timeline = timeline_of(&[u32::MAX, 5]);
            assert_eq!(timeline.total_frames(), u32::MAX);
        }

        #[test]
        fn debug_hides_update_function() {
            let rendered = format!("{:?}", hold(3));
            assert!(rendered.contains("hold3"));
        }
    }

    proptest! {
        #[test]
        fn completes_after_exactly_total_frames(durations in prop::collection::vec(0u32..12, 0..8)) {
            let mut timeline = timeline_of(&durations);
            let total: u32 = durations.iter().sum();

            if total == 0 {
                prop_assert!(timeline.is_complete());
                return Ok(());
            }

            let mut completions = 0;
            for call in 1..=total {
                prop_assert!(!timeline.is_complete());
                let step = timeline.advance();
                if step == Step::Completed {
                    completions += 1;
                    prop_assert_eq!(call, total);
                }
                let active = timeline.current_phase().unwrap();
                prop_assert!(timeline.frame_in_phase() < active.frames());
            }
            prop_assert_eq!(completions, 1);
            prop_assert!(timeline.is_complete());
            prop_assert_eq!(timeline.elapsed_frames(), total);
        }

        #[test]
        fn completion_is_idempotent(durations in prop::collection::vec(0u32..6, 0..6), extra in 0usize..50) {
            let mut timeline = timeline_of(&durations);
            let total: u32 = durations.iter().sum();
            for _ in 0..total {
                timeline.advance();
            }
            prop_assert!(timeline.is_complete());

            let before = (timeline.phase_index(), timeline.frame_in_phase());
            for _ in 0..extra {
                prop_assert_eq!(timeline.advance(), Step::Idle);
            }
            prop_assert!(timeline.is_complete());
            prop_assert_eq!(before, (timeline.phase_index(), timeline.frame_in_phase()));
        }
    }
}
