//! Entity store for one game instance.
//!
//! The Arena is the container for all moving entities of a game. It provides:
//! - Entity storage with deterministic iteration order (`BTreeMap`)
//! - Stable, never-reused entity ids
//! - A single `update(dt)` integration pass per tick
//! - Per-kind boundary policies (wrap, clamp, bounce, discard)
//! - Deferred removal through `remove_dead()`
//!
//! # Update Pass
//!
//! `update` computes every entity's next body from the pre-tick state first and
//! only then writes the results back. No entity ever observes another entity in
//! a half-updated state, and nothing is removed during the pass: entities that
//! leave the playfield under [`Edge::Discard`] or run out of lifetime are only
//! marked dead. Call [`Arena::remove_dead`] once the tick's collision events
//! have been resolved.
//!
//! # Example
//!
//! ```
//! use framekit::arena::{Arena, BoundaryPolicy, BoundaryRules};
//! use framekit::entity::{Body, EntityKind};
//! use framekit::Bounds;
//! use glam::Vec2;
//!
//! let rules = BoundaryRules::new(Bounds::new(100.0, 100.0))
//!     .with(EntityKind::Bullet, BoundaryPolicy::DISCARD);
//! let mut arena = Arena::with_rules(rules);
//!
//! let bullet = arena.spawn(
//!     EntityKind::Bullet,
//!     Body::circle(Vec2::new(99.0, 50.0), 1.0).with_velocity(Vec2::new(120.0, 0.0)),
//! );
//!
//! arena.update(1.0 / 60.0);
//! assert!(!arena.get(bullet).unwrap().is_alive());
//!
//! let removed = arena.remove_dead();
//! assert_eq!(removed.len(), 1);
//! assert!(arena.get(bullet).is_none());
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::entity::{Body, Entity, EntityId, EntityKind};
use crate::error::FrameError;
use crate::Bounds;

// =============================================================================
// Boundary Policies
// =============================================================================

/// What happens when an entity crosses a playfield edge on one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Edge {
    /// Leave the entity where it is
    #[default]
    Ignore,
    /// Re-enter from the opposite edge
    Wrap,
    /// Keep the whole footprint inside and stop motion along the axis
    Clamp,
    /// Keep the whole footprint inside and reflect velocity along the axis
    Bounce,
    /// Mark the entity dead once its center leaves the playfield
    Discard,
}

/// Per-axis boundary behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BoundaryPolicy {
    /// Horizontal edges
    pub x: Edge,
    /// Vertical edges
    pub y: Edge,
}

impl BoundaryPolicy {
    /// No boundary handling.
    pub const IGNORE: Self = Self::new(Edge::Ignore, Edge::Ignore);
    /// Screen wrap on both axes (Asteroids).
    pub const WRAP: Self = Self::new(Edge::Wrap, Edge::Wrap);
    /// Clamp on both axes (paddles, cannons).
    pub const CLAMP: Self = Self::new(Edge::Clamp, Edge::Clamp);
    /// Discard on both axes (bullets).
    pub const DISCARD: Self = Self::new(Edge::Discard, Edge::Discard);

    /// Creates a policy from per-axis edges.
    #[must_use]
    pub const fn new(x: Edge, y: Edge) -> Self {
        Self { x, y }
    }
}

/// Playfield plus the boundary policy for each entity kind.
///
/// Kinds without an explicit policy use [`BoundaryPolicy::IGNORE`]. Without a
/// playfield, no boundary handling happens at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundaryRules {
    playfield: Option<Bounds>,
    policies: BTreeMap<EntityKind, BoundaryPolicy>,
}

impl BoundaryRules {
    /// Creates rules for the given playfield with every kind ignored.
    #[must_use]
    pub fn new(playfield: Bounds) -> Self {
        Self {
            playfield: Some(playfield),
            policies: BTreeMap::new(),
        }
    }

    /// Sets the policy for one kind.
    #[must_use]
    pub fn with(mut self, kind: EntityKind, policy: BoundaryPolicy) -> Self {
        self.policies.insert(kind, policy);
        self
    }

    /// The playfield, if any.
    #[must_use]
    pub fn playfield(&self) -> Option<Bounds> {
        self.playfield
    }

    /// The policy applied to `kind`.
    #[must_use]
    pub fn policy_for(&self, kind: EntityKind) -> BoundaryPolicy {
        self.policies.get(&kind).copied().unwrap_or_default()
    }

    /// Applies the policy for `kind` to `body`.
    ///
    /// Returns `false` if the body should be discarded.
    fn apply(&self, kind: EntityKind, body: &mut Body) -> bool {
        let Some(field) = self.playfield else {
            return true;
        };
        let policy = self.policy_for(kind);
        let half = body.half_extents();

        let keep_x = apply_edge(
            policy.x,
            &mut body.position.x,
            &mut body.velocity.x,
            field.min.x,
            field.max.x,
            half.x,
        );
        let keep_y = apply_edge(
            policy.y,
            &mut body.position.y,
            &mut body.velocity.y,
            field.min.y,
            field.max.y,
            half.y,
        );
        keep_x && keep_y
    }
}

/// One-axis boundary handling. Returns `false` to discard.
fn apply_edge(edge: Edge, pos: &mut f32, vel: &mut f32, min: f32, max: f32, half: f32) -> bool {
    match edge {
        Edge::Ignore => true,
        Edge::Wrap => {
            let span = max - min;
            if span > 0.0 && (*pos < min || *pos > max) {
                *pos = min + (*pos - min).rem_euclid(span);
            }
            true
        }
        Edge::Clamp => {
            let (lo, hi) = inner_range(min, max, half);
            let clamped = pos.clamp(lo, hi);
            if (clamped - *pos).abs() > f32::EPSILON {
                *vel = 0.0;
            }
            *pos = clamped;
            true
        }
        Edge::Bounce => {
            let (lo, hi) = inner_range(min, max, half);
            if *pos < lo {
                *pos = lo;
                *vel = vel.abs();
            } else if *pos > hi {
                *pos = hi;
                *vel = -vel.abs();
            }
            true
        }
        Edge::Discard => *pos >= min && *pos <= max,
    }
}

/// Range of valid centers for a footprint of `half` inside `[min, max]`.
///
/// Footprints wider than the field collapse to the field center.
fn inner_range(min: f32, max: f32, half: f32) -> (f32, f32) {
    let lo = min + half;
    let hi = max - half;
    if lo > hi {
        let mid = (min + max) * 0.5;
        (mid, mid)
    } else {
        (lo, hi)
    }
}

// =============================================================================
// Arena
// =============================================================================

/// Entity store for a single game instance.
///
/// The Arena manages:
/// - Entity storage with deterministic iteration order
/// - Entity lifecycle (spawn, kill, remove)
/// - The integration pass and boundary handling
///
/// # Determinism
///
/// Entities live in a `BTreeMap` keyed by monotonically assigned ids, so
/// iteration always visits them in spawn order. Two arenas fed the same spawns
/// and updates hold identical state.
///
/// # Example
///
/// ```
/// use framekit::arena::Arena;
/// use framekit::entity::{Body, EntityKind};
/// use glam::Vec2;
///
/// let mut arena = Arena::new();
/// let a = arena.spawn(EntityKind::Asteroid, Body::circle(Vec2::ZERO, 30.0));
/// let b = arena.spawn(EntityKind::Asteroid, Body::circle(Vec2::new(100.0, 0.0), 30.0));
///
/// let ids: Vec<_> = arena.entity_ids_sorted().collect();
/// assert_eq!(ids, vec![a, b]);
/// assert_eq!(arena.count_alive(EntityKind::Asteroid), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    /// Monotonically increasing entity ID counter.
    next_id: u64,
    /// Entity storage with deterministic iteration order.
    entities: BTreeMap<EntityId, Entity>,
    /// Boundary handling applied during `update`.
    rules: BoundaryRules,
}

impl Arena {
    /// Creates a new empty arena without boundary handling.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new empty arena with the given boundary rules.
    #[must_use]
    pub fn with_rules(rules: BoundaryRules) -> Self {
        Self {
            rules,
            ..Self::default()
        }
    }

    /// Returns the boundary rules.
    #[must_use]
    pub fn rules(&self) -> &BoundaryRules {
        &self.rules
    }

    /// Spawns a new live entity and returns its id.
    pub fn spawn(&mut self, kind: EntityKind, body: Body) -> EntityId {
        let id = EntityId::new(self.next_id);
        self.next_id += 1;
        trace!(%id, %kind, "spawn");
        self.entities.insert(id, Entity::new(id, kind, body));
        id
    }

    /// Removes an entity immediately, returning it if it existed.
    ///
    /// Prefer [`Arena::kill`] inside a tick; despawn is for setup and teardown.
    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        trace!(%id, "despawn");
        self.entities.remove(&id)
    }

    /// Marks an entity dead.
    ///
    /// Returns `true` only if the entity existed and was alive, so callers can
    /// use the result to apply an effect at most once per entity.
    pub fn kill(&mut self, id: EntityId) -> bool {
        match self.entities.get_mut(&id) {
            Some(entity) if entity.is_alive() => {
                entity.kill();
                true
            }
            _ => false,
        }
    }

    /// Returns a reference to an entity by ID.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Returns a mutable reference to an entity by ID.
    #[must_use]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Like [`Arena::get`], but a miss is an error.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::UnknownEntity`] if no entity has this id.
    pub fn try_get(&self, id: EntityId) -> Result<&Entity, FrameError> {
        self.entities.get(&id).ok_or(FrameError::UnknownEntity(id))
    }

    /// Returns an iterator over entity IDs in deterministic (sorted) order.
    pub fn entity_ids_sorted(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.keys().copied()
    }

    /// Returns an iterator over all entities, dead or alive, in id order.
    pub fn entities_sorted(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.values()
    }

    /// Returns an iterator over live entities in id order.
    pub fn alive(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.values().filter(|e| e.is_alive())
    }

    /// Calls `f` once for every live entity, in id order.
    pub fn for_each_alive(&self, mut f: impl FnMut(&Entity)) {
        for entity in self.alive() {
            f(entity);
        }
    }

    /// Calls `f` once for every live entity of one kind, mutably.
    pub fn for_each_alive_mut(&mut self, kind: EntityKind, mut f: impl FnMut(&mut Entity)) {
        for entity in self.entities.values_mut() {
            if entity.is_alive() && entity.is(kind) {
                f(entity);
            }
        }
    }

    /// Collects live entities of one kind, in id order.
    #[must_use]
    pub fn alive_of(&self, kind: EntityKind) -> Vec<&Entity> {
        self.alive().filter(|e| e.is(kind)).collect()
    }

    /// Counts live entities of one kind.
    #[must_use]
    pub fn count_alive(&self, kind: EntityKind) -> usize {
        self.alive().filter(|e| e.is(kind)).count()
    }

    /// The first live entity of one kind, by id.
    #[must_use]
    pub fn first_alive(&self, kind: EntityKind) -> Option<&Entity> {
        self.alive().find(|e| e.is(kind))
    }

    /// Returns the number of entities in the arena, dead ones included.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Returns true if the arena has no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Integrates one tick for every live entity.
    ///
    /// For each live entity: `position += velocity * dt`, `rotation += spin *
    /// dt`, lifetime decreases by `dt`, then the kind's boundary policy runs.
    /// Entities whose lifetime reaches zero or that are discarded by the
    /// boundary policy are marked dead but stay in the arena.
    pub fn update(&mut self, dt: f32) {
        // First pass: compute every next state from the pre-tick snapshot
        let next: Vec<(EntityId, Body, bool)> = self
            .alive()
            .map(|entity| {
                let mut body = entity.body().clone();
                body.position += body.velocity * dt;
                body.rotation += body.spin * dt;

                let mut keep = true;
                if let Some(life) = body.life.as_mut() {
                    *life -= dt;
                    keep = *life > 0.0;
                }
                keep &= self.rules.apply(entity.kind(), &mut body);
                (entity.id(), body, keep)
            })
            .collect();

        // Second pass: write back
        for (id, body, keep) in next {
            if let Some(entity) = self.entities.get_mut(&id) {
                *entity.body_mut() = body;
                if !keep {
                    trace!(%id, "expired or left playfield");
                    entity.kill();
                }
            }
        }
    }

    /// Removes every dead entity and returns them in id order.
    pub fn remove_dead(&mut self) -> Vec<Entity> {
        let dead: Vec<EntityId> = self
            .entities
            .values()
            .filter(|e| !e.is_alive())
            .map(Entity::id)
            .collect();
        dead.into_iter()
            .filter_map(|id| self.entities.remove(&id))
            .collect()
    }

    /// Removes all entities. Ids keep counting up.
    pub fn clear(&mut self) {
        self.entities.clear();
    }

    /// Removes all entities of one kind.
    pub fn clear_kind(&mut self, kind: EntityKind) {
        self.entities.retain(|_, e| !e.is(kind));
    }
}

// =============================================================================
// Tests
// =============================================================================
