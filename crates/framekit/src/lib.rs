//! # Framekit
//!
//! Frame-driven animation loop substrate for small arcade games and animated
//! UI demos.
//!
//! Every game built on framekit runs the same single-threaded tick:
//!
//! 1. **INPUT**: key and pointer edges are folded into an [`InputState`]
//! 2. **INTEGRATE**: phase timelines advance, the [`Arena`] integrates
//!    velocities and applies per-kind boundary policies
//! 3. **DETECT**: the collision checker reports [`CollisionEvent`]s against the
//!    post-update positions without touching any entity
//! 4. **RESOLVE**: game rules consume the events (score, removal, life loss)
//!    and fire [`GameEvent`]s into the [`StateMachine`]
//! 5. **RENDER**: the game is read by shared reference into a [`DrawList`]
//!
//! All work for tick N completes before tick N+1 begins.
//!
//! ## Quick Start
//!
//! ```
//! use framekit::{Arena, Body, EntityKind};
//! use glam::Vec2;
//!
//! let mut arena = Arena::new();
//! let id = arena.spawn(
//!     EntityKind::Asteroid,
//!     Body::circle(Vec2::new(10.0, 10.0), 5.0).with_velocity(Vec2::new(60.0, 0.0)),
//! );
//!
//! arena.update(1.0 / 60.0);
//! assert_eq!(arena.get(id).unwrap().body().position, Vec2::new(11.0, 10.0));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod arena;
pub mod assets;
pub mod clock;
pub mod collision;
pub mod config;
pub mod entity;
pub mod error;
pub mod input;
pub mod render;
pub mod score;
pub mod session;
pub mod state;
pub mod timeline;
pub mod timer;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use arena::{Arena, BoundaryPolicy, BoundaryRules, Edge};
pub use assets::AssetSlot;
pub use clock::{Clock, TickContext};
pub use collision::{detect, Boxes, Circles, CollisionEvent, ContactPair, Predicate, Shapes};
pub use config::LoopConfig;
pub use entity::{Body, Entity, EntityId, EntityKind, Shape};
pub use error::{AssetError, FrameError};
pub use input::{Actions, InputState, KeyMap};
pub use render::{draw_body, Draw, DrawList, Rgba};
pub use score::ScoreBoard;
pub use session::{Game, Session};
pub use state::{GameEvent, GameState, StateMachine, Transition, TransitionTable};
pub use timeline::{Curve, Kinematics, Phase, PhaseTime, Step, Timeline, Tween};
pub use timer::{TimerId, Timers};

use glam::Vec2;

/// Axis-aligned rectangle used for playfields and hit boxes.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Bounds {
    /// Minimum corner
    pub min: Vec2,
    /// Maximum corner
    pub max: Vec2,
}

impl Bounds {
    /// Create bounds spanning `(0, 0)` to `(width, height)`.
    ///
    /// Screen-space games put the origin in the top-left corner, so this is
    /// the usual playfield constructor.
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            min: Vec2::ZERO,
            max: Vec2::new(width, height),
        }
    }

    /// Create bounds from min/max corners.
    #[must_use]
    pub fn from_min_max(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Create bounds from a center point and half extents.
    #[must_use]
    pub fn from_center(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Get the center of the bounds.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Get the size of the bounds.
    #[must_use]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Width of the bounds.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    /// Height of the bounds.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Check if a point is inside the bounds (edges inclusive).
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    /// Check if two rectangles overlap. Touching edges do not count.
    #[must_use]
    pub fn overlaps(&self, other: &Bounds) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    /// Closest point inside the bounds to `point`.
    #[must_use]
    pub fn closest_point(&self, point: Vec2) -> Vec2 {
        point.clamp(self.min, self.max)
    }

    /// Check if this bounds intersects a circle.
    #[must_use]
    pub fn intersects_circle(&self, center: Vec2, radius: f32) -> bool {
        center.distance_squared(self.closest_point(center)) < radius * radius
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}
