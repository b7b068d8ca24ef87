//! Entity types for the frame loop.
//!
//! This module provides the core entity types shared by every game:
//! - [`EntityId`]: Stable identifier for entities
//! - [`EntityKind`]: Classification used for boundary policies and collision filtering
//! - [`Shape`]: Collision/draw footprint
//! - [`Body`]: Kinematic state (position, velocity, rotation, scale, lifetime)
//! - [`Entity`]: The complete entity container
//!
//! # Identity
//!
//! Entities are addressed by id, never by position in a list. Ids are issued by
//! the [`Arena`](crate::arena::Arena) and never reused, so removing an entity
//! while other code still holds its id can only produce a lookup miss, never a
//! silent hit on a different entity.
//!
//! # Example
//!
//! ```
//! use framekit::entity::{Body, Entity, EntityId, EntityKind};
//! use glam::Vec2;
//!
//! let bullet = Entity::new(
//!     EntityId::new(42),
//!     EntityKind::Bullet,
//!     Body::circle(Vec2::new(5.0, 5.0), 2.0),
//! );
//!
//! assert_eq!(bullet.id().as_u64(), 42);
//! assert_eq!(bullet.kind(), EntityKind::Bullet);
//! assert!(bullet.is_alive());
//! ```

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Bounds;

/// Unique identifier for an entity.
///
/// `EntityId` is a newtype wrapper around `u64`. Ids are immutable once
/// assigned and unique within an arena for the arena's whole lifetime.
///
/// # Ordering
///
/// Entity IDs are ordered by their numeric value, which is used to ensure
/// deterministic iteration order across all entities.
///
/// # Example
///
/// ```
/// use framekit::entity::EntityId;
///
/// let id1 = EntityId::new(1);
/// let id2 = EntityId::new(2);
///
/// assert!(id1 < id2);
/// assert_eq!(id1.as_u64(), 1);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates a new `EntityId` from a raw `u64` value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl From<EntityId> for u64 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

/// Entity classification.
///
/// The kind selects the boundary policy applied during
/// [`Arena::update`](crate::arena::Arena::update) and lets games pick the
/// entity lists they hand to the collision checker.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Player-fired projectile
    Bullet,
    /// Enemy-fired projectile (invader bombs)
    Bomb,
    /// Drifting rock that splits when shot
    Asteroid,
    /// Formation enemy
    Invader,
    /// Player-controlled ship or cannon
    Ship,
    /// Pong paddle or catch basket
    Paddle,
    /// Pong ball
    Ball,
    /// Short-lived visual debris
    Particle,
    /// One cell of a falling puzzle piece
    PieceCell,
    /// Falling collectible
    Pickup,
}

impl EntityKind {
    /// All kinds, in declaration order.
    pub const ALL: [EntityKind; 10] = [
        Self::Bullet,
        Self::Bomb,
        Self::Asteroid,
        Self::Invader,
        Self::Ship,
        Self::Paddle,
        Self::Ball,
        Self::Particle,
        Self::PieceCell,
        Self::Pickup,
    ];
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bullet => "Bullet",
            Self::Bomb => "Bomb",
            Self::Asteroid => "Asteroid",
            Self::Invader => "Invader",
            Self::Ship => "Ship",
            Self::Paddle => "Paddle",
            Self::Ball => "Ball",
            Self::Particle => "Particle",
            Self::PieceCell => "PieceCell",
            Self::Pickup => "Pickup",
        };
        f.write_str(name)
    }
}

/// Collision and draw footprint, centered on the body position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    /// Circle with the given radius
    Circle {
        /// Radius before scaling
        radius: f32,
    },
    /// Axis-aligned rectangle with the given half extents
    Rect {
        /// Half width and half height before scaling
        half_extents: Vec2,
    },
}

impl Shape {
    /// Half extents of the shape's bounding box.
    #[must_use]
    pub fn half_extents(&self) -> Vec2 {
        match *self {
            Self::Circle { radius } => Vec2::splat(radius),
            Self::Rect { half_extents } => half_extents,
        }
    }

    /// Radius used by distance tests. Rectangles use the larger half extent.
    #[must_use]
    pub fn radius(&self) -> f32 {
        match *self {
            Self::Circle { radius } => radius,
            Self::Rect { half_extents } => half_extents.max_element(),
        }
    }
}

/// Kinematic state of an entity.
///
/// `Body` is plain data. The arena integrates it once per tick; game rules may
/// overwrite any field between ticks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Center position in playfield units
    pub position: Vec2,
    /// Velocity in units per second
    pub velocity: Vec2,
    /// Rotation in radians
    pub rotation: f32,
    /// Angular velocity in radians per second
    pub spin: f32,
    /// Uniform scale applied to the shape
    pub scale: f32,
    /// Footprint
    pub shape: Shape,
    /// Remaining lifetime in seconds; `None` lives until killed
    pub life: Option<f32>,
    /// Per-kind discriminator (asteroid size class, invader row, pickup type)
    pub variant: u8,
}

impl Body {
    /// A circular body at rest.
    #[must_use]
    pub fn circle(position: Vec2, radius: f32) -> Self {
        Self::with_shape(position, Shape::Circle { radius })
    }

    /// A rectangular body at rest, given its full size.
    #[must_use]
    pub fn rect(position: Vec2, size: Vec2) -> Self {
        Self::with_shape(
            position,
            Shape::Rect {
                half_extents: size * 0.5,
            },
        )
    }

    fn with_shape(position: Vec2, shape: Shape) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            rotation: 0.0,
            spin: 0.0,
            scale: 1.0,
            shape,
            life: None,
            variant: 0,
        }
    }

    /// Sets the velocity.
    #[must_use]
    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    /// Sets rotation and angular velocity.
    #[must_use]
    pub fn with_rotation(mut self, rotation: f32, spin: f32) -> Self {
        self.rotation = rotation;
        self.spin = spin;
        self
    }

    /// Sets the lifetime in seconds.
    #[must_use]
    pub fn with_life(mut self, seconds: f32) -> Self {
        self.life = Some(seconds);
        self
    }

    /// Sets the per-kind variant.
    #[must_use]
    pub fn with_variant(mut self, variant: u8) -> Self {
        self.variant = variant;
        self
    }

    /// Scaled half extents of the footprint.
    #[must_use]
    pub fn half_extents(&self) -> Vec2 {
        self.shape.half_extents() * self.scale
    }

    /// Scaled radius of the footprint.
    #[must_use]
    pub fn radius(&self) -> f32 {
        self.shape.radius() * self.scale
    }

    /// World-space bounding box.
    #[must_use]
    pub fn aabb(&self) -> Bounds {
        Bounds::from_center(self.position, self.half_extents())
    }
}

/// A complete entity in a game instance.
///
/// An `Entity` combines:
/// - A stable [`EntityId`] for identification and ordering
/// - An [`EntityKind`] that selects boundary policy and collision lists
/// - A [`Body`] with kinematic state
/// - An `alive` flag cleared by game rules or lifetime expiry
///
/// Dead entities stay in the arena until
/// [`Arena::remove_dead`](crate::arena::Arena::remove_dead) runs, so ids held by
/// collision events in the same tick still resolve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    id: EntityId,
    kind: EntityKind,
    body: Body,
    alive: bool,
}

impl Entity {
    /// Creates a new live entity.
    #[must_use]
    pub const fn new(id: EntityId, kind: EntityKind, body: Body) -> Self {
        Self {
            id,
            kind,
            body,
            alive: true,
        }
    }

    /// Returns the entity's unique identifier.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Returns the entity's kind.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Returns the entity's body.
    #[must_use]
    pub const fn body(&self) -> &Body {
        &self.body
    }

    /// Returns the entity's body mutably.
    #[must_use]
    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    /// Returns `true` until the entity is killed or expires.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.alive
    }

    /// Marks the entity dead. Idempotent.
    pub fn kill(&mut self) {
        self.alive = false;
    }

    /// Returns `true` if this entity is of the given kind.
    #[must_use]
    pub fn is(&self, kind: EntityKind) -> bool {
        self.kind == kind
    }
}
