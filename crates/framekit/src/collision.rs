//! Collision detection.
//!
//! Detection is a pure read: [`detect`] takes two entity lists and a
//! [`Predicate`] and reports [`CollisionEvent`]s. It never mutates an entity.
//! Game rules apply the effects (score, removal, life loss) afterwards, in the
//! same tick, against a complete list of events. Because nothing is removed
//! while pairs are being tested, a hit can never cause an adjacent pair to be
//! skipped.
//!
//! # Predicates
//!
//! - [`Circles`]: `distance(a, b) < a.radius + b.radius`
//! - [`Boxes`]: axis-aligned bounding boxes overlap
//! - [`Shapes`]: exact test per shape pair (circle/circle, box/box, and
//!   circle/box via the closest point on the box)
//!
//! # Example
//!
//! ```
//! use framekit::arena::Arena;
//! use framekit::collision::{detect, Circles};
//! use framekit::entity::{Body, EntityKind};
//! use glam::Vec2;
//!
//! let mut arena = Arena::new();
//! let rock = arena.spawn(EntityKind::Asteroid, Body::circle(Vec2::ZERO, 10.0));
//! let shot = arena.spawn(EntityKind::Bullet, Body::circle(Vec2::new(11.0, 0.0), 2.0));
//!
//! let events = detect(
//!     &arena.alive_of(EntityKind::Bullet),
//!     &arena.alive_of(EntityKind::Asteroid),
//!     &Circles,
//! );
//! assert_eq!(events.len(), 1);
//! assert_eq!(events[0].a, shot);
//! assert_eq!(events[0].b, rock);
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::entity::{Entity, EntityId, EntityKind, Shape};

/// The kinds of the two entities in a collision, in event order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContactPair {
    /// Kind of `CollisionEvent::a`
    pub first: EntityKind,
    /// Kind of `CollisionEvent::b`
    pub second: EntityKind,
}

/// An overlap between two entities reported for the current tick.
///
/// Events are ephemeral: they are produced and consumed within one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionEvent {
    /// Entity from the first list
    pub a: EntityId,
    /// Entity from the second list
    pub b: EntityId,
    /// Kinds of `a` and `b`
    pub kind: ContactPair,
}

impl CollisionEvent {
    /// The id pair with the smaller id first, independent of list order.
    #[must_use]
    pub fn pair(&self) -> (EntityId, EntityId) {
        if self.a <= self.b {
            (self.a, self.b)
        } else {
            (self.b, self.a)
        }
    }

    /// Returns `true` if `id` is either side of the event.
    #[must_use]
    pub fn involves(&self, id: EntityId) -> bool {
        self.a == id || self.b == id
    }

    /// The id of the entity of `kind`, if either side has that kind.
    #[must_use]
    pub fn side(&self, kind: EntityKind) -> Option<EntityId> {
        if self.kind.first == kind {
            Some(self.a)
        } else if self.kind.second == kind {
            Some(self.b)
        } else {
            None
        }
    }
}

/// Overlap test between two entities. Implementations must be symmetric.
pub trait Predicate {
    /// Returns `true` if the two entities overlap.
    fn overlaps(&self, a: &Entity, b: &Entity) -> bool;
}

/// Circular distance test using each body's scaled radius.
#[derive(Debug, Clone, Copy, Default)]
pub struct Circles;

impl Predicate for Circles {
    fn overlaps(&self, a: &Entity, b: &Entity) -> bool {
        let (a, b) = (a.body(), b.body());
        let reach = a.radius() + b.radius();
        a.position.distance_squared(b.position) < reach * reach
    }
}

/// Axis-aligned bounding box overlap.
#[derive(Debug, Clone, Copy, Default)]
pub struct Boxes;

impl Predicate for Boxes {
    fn overlaps(&self, a: &Entity, b: &Entity) -> bool {
        a.body().aabb().overlaps(&b.body().aabb())
    }
}

/// Exact test chosen by the shapes of both entities.
#[derive(Debug, Clone, Copy, Default)]
pub struct Shapes;

impl Predicate for Shapes {
    fn overlaps(&self, a: &Entity, b: &Entity) -> bool {
        match (a.body().shape, b.body().shape) {
            (Shape::Circle { .. }, Shape::Circle { .. }) => Circles.overlaps(a, b),
            (Shape::Rect { .. }, Shape::Rect { .. }) => Boxes.overlaps(a, b),
            (Shape::Circle { .. }, Shape::Rect { .. }) => circle_box(a, b),
            (Shape::Rect { .. }, Shape::Circle { .. }) => circle_box(b, a),
        }
    }
}

fn circle_box(circle: &Entity, rect: &Entity) -> bool {
    let body = circle.body();
    rect.body().aabb().intersects_circle(body.position, body.radius())
}

/// Reports every overlapping pair between `a` and `b`.
///
/// Dead entities and self pairs are skipped, and each unordered pair is
/// reported at most once. Events come out in `a`-major, `b`-minor order, so
/// the result is deterministic for id-ordered inputs.
#[must_use]
pub fn detect(a: &[&Entity], b: &[&Entity], predicate: &impl Predicate) -> Vec<CollisionEvent> {
    let mut seen = BTreeSet::new();
    let mut events = Vec::new();

    for first in a.iter().filter(|e| e.is_alive()) {
        for second in b.iter().filter(|e| e.is_alive()) {
            if first.id() == second.id() || !predicate.overlaps(first, second) {
                continue;
            }
            let event = CollisionEvent {
                a: first.id(),
                b: second.id(),
                kind: ContactPair {
                    first: first.kind(),
                    second: second.kind(),
                },
            };
            if seen.insert(event.pair()) {
                events.push(event);
            }
        }
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;
    use crate::entity::Body;
    use glam::Vec2;
    use proptest::prelude::*;

    mod predicate_tests {
        use super::*;

        fn entity(id: u64, body: Body) -> Entity {
            Entity::new(EntityId::new(id), EntityKind::Asteroid, body)
        }

        #[test]
        fn circles_use_strict_distance() {
            let a = entity(0, Body::circle(Vec2::ZERO, 5.0));
            let touching = entity(1, Body::circle(Vec2::new(10.0, 0.0), 5.0));
            let overlapping = entity(2, Body::circle(Vec2::new(9.9, 0.0), 5.0));
            assert!(!Circles.overlaps(&a, &touching));
            assert!(Circles.overlaps(&a, &overlapping));
        }

        #[test]
        fn boxes_overlap() {
            let a = entity(0, Body::rect(Vec2::ZERO, Vec2::new(10.0, 10.0)));
            let b = entity(1, Body::rect(Vec2::new(9.0, 9.0), Vec2::new(10.0, 10.0)));
            let c = entity(2, Body::rect(Vec2::new(10.0, 0.0), Vec2::new(10.0, 10.0)));
            assert!(Boxes.overlaps(&a, &b));
            assert!(!Boxes.overlaps(&a, &c));
        }

        #[test]
        fn shapes_circle_against_box_corner() {
            let rect = entity(0, Body::rect(Vec2::ZERO, Vec2::new(10.0, 10.0)));
            // Near the corner: inside the AABB of the circle, outside the circle
            let circle = entity(1, Body::circle(Vec2::new(8.0, 8.0), 4.0));
            assert!(Boxes.overlaps(&rect, &circle));
            assert!(!Shapes.overlaps(&rect, &circle));
            assert!(!Shapes.overlaps(&circle, &rect));

            let closer = entity(2, Body::circle(Vec2::new(7.0, 7.0), 4.0));
            assert!(Shapes.overlaps(&rect, &closer));
            assert!(Shapes.overlaps(&closer, &rect));
        }
    }

    mod detect_tests {
        use super::*;

        #[test]
        fn skips_dead_and_self_pairs() {
            let mut arena = Arena::new();
            let a = arena.spawn(EntityKind::Asteroid, Body::circle(Vec2::ZERO, 5.0));
            let b = arena.spawn(EntityKind::Asteroid, Body::circle(Vec2::new(1.0, 0.0), 5.0));
            let c = arena.spawn(EntityKind::Asteroid, Body::circle(Vec2::new(2.0, 0.0), 5.0));
            arena.kill(c);

            let all: Vec<&Entity> = arena.entities_sorted().collect();
            let events = detect(&all, &all, &Circles);
            assert_eq!(events.len(), 1);
            assert_eq!(events[0].pair(), (a, b));
        }

        #[test]
        fn one_bullet_can_report_two_targets() {
            let mut arena = Arena::new();
            let shot = arena.spawn(EntityKind::Bullet, Body::circle(Vec2::ZERO, 2.0));
            let r1 = arena.spawn(EntityKind::Asteroid, Body::circle(Vec2::new(3.0, 0.0), 2.0));
            let r2 = arena.spawn(EntityKind::Asteroid, Body::circle(Vec2::new(-3.0, 0.0), 2.0));

            let events = detect(
                &arena.alive_of(EntityKind::Bullet),
                &arena.alive_of(EntityKind::Asteroid),
                &Circles,
            );
            let pairs: Vec<_> = events.iter().map(|e| (e.a, e.b)).collect();
            assert_eq!(pairs, vec![(shot, r1), (shot, r2)]);
        }

        #[test]
        fn side_and_involves() {
            let event = CollisionEvent {
                a: EntityId::new(4),
                b: EntityId::new(2),
                kind: ContactPair {
                    first: EntityKind::Bullet,
                    second: EntityKind::Invader,
                },
            };
            assert_eq!(event.pair(), (EntityId::new(2), EntityId::new(4)));
            assert_eq!(event.side(EntityKind::Invader), Some(EntityId::new(2)));
            assert_eq!(event.side(EntityKind::Ship), None);
            assert!(event.involves(EntityId::new(4)));
            assert!(!event.involves(EntityId::new(3)));
        }

        #[test]
        fn detection_does_not_mutate() {
            let mut arena = Arena::new();
            arena.spawn(EntityKind::Bullet, Body::circle(Vec2::ZERO, 2.0));
            arena.spawn(EntityKind::Asteroid, Body::circle(Vec2::new(1.0, 0.0), 2.0));
            let before = arena.clone();
            let _ = detect(
                &arena.alive_of(EntityKind::Bullet),
                &arena.alive_of(EntityKind::Asteroid),
                &Shapes,
            );
            assert_eq!(arena, before);
        }
    }

    fn arb_body() -> impl Strategy<Value = Body> {
        (
            -50.0f32..50.0,
            -50.0f32..50.0,
            prop_oneof![
                (1.0f32..10.0).prop_map(|r| Shape::Circle { radius: r }),
                (1.0f32..10.0, 1.0f32..10.0).prop_map(|(w, h)| Shape::Rect {
                    half_extents: Vec2::new(w, h)
                }),
            ],
        )
            .prop_map(|(x, y, shape)| {
                let mut body = Body::circle(Vec2::new(x, y), 1.0);
                body.shape = shape;
                body
            })
    }

    fn unordered(events: &[CollisionEvent]) -> BTreeSet<(EntityId, EntityId)> {
        events.iter().map(CollisionEvent::pair).collect()
    }

    proptest! {
        #[test]
        fn detection_is_symmetric(
            left in prop::collection::vec(arb_body(), 0..12),
            right in prop::collection::vec(arb_body(), 0..12),
        ) {
            let mut arena = Arena::new();
            for body in left {
                arena.spawn(EntityKind::Bullet, body);
            }
            for body in right {
                arena.spawn(EntityKind::Asteroid, body);
            }
            let a = arena.alive_of(EntityKind::Bullet);
            let b = arena.alive_of(EntityKind::Asteroid);

            prop_assert_eq!(unordered(&detect(&a, &b, &Circles)), unordered(&detect(&b, &a, &Circles)));
            prop_assert_eq!(unordered(&detect(&a, &b, &Boxes)), unordered(&detect(&b, &a, &Boxes)));
            prop_assert_eq!(unordered(&detect(&a, &b, &Shapes)), unordered(&detect(&b, &a, &Shapes)));
        }
    }
}
