//! Test helpers for building arenas and scenarios.

use glam::Vec2;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::arena::{Arena, BoundaryPolicy, BoundaryRules};
use crate::entity::{Body, EntityId, EntityKind};
use crate::Bounds;

/// Installs a fmt subscriber that writes through the test harness.
///
/// Safe to call from every test; only the first call installs.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .try_init();
}

/// 800x600 playfield: rocks and ships wrap, bullets are discarded.
pub fn wrapping_rules() -> BoundaryRules {
    BoundaryRules::new(Bounds::new(800.0, 600.0))
        .with(EntityKind::Asteroid, BoundaryPolicy::WRAP)
        .with(EntityKind::Ship, BoundaryPolicy::WRAP)
        .with(EntityKind::Bullet, BoundaryPolicy::DISCARD)
}

/// Spawns a rock of radius `radius` at `position` drifting with `velocity`.
pub fn spawn_rock(arena: &mut Arena, position: Vec2, velocity: Vec2, radius: f32) -> EntityId {
    arena.spawn(
        EntityKind::Asteroid,
        Body::circle(position, radius).with_velocity(velocity),
    )
}

/// Spawns a bullet that lives for one second.
pub fn spawn_bullet(arena: &mut Arena, position: Vec2, velocity: Vec2) -> EntityId {
    arena.spawn(
        EntityKind::Bullet,
        Body::circle(position, 2.0)
            .with_velocity(velocity)
            .with_life(1.0),
    )
}

/// Fills an arena with `rocks` rocks and `bullets` bullets at random spots.
pub fn scatter(arena: &mut Arena, rng: &mut ChaCha8Rng, rocks: usize, bullets: usize) {
    for _ in 0..rocks {
        let position = Vec2::new(rng.gen_range(0.0..800.0), rng.gen_range(0.0..600.0));
        let velocity = Vec2::new(rng.gen_range(-60.0..60.0), rng.gen_range(-60.0..60.0));
        spawn_rock(arena, position, velocity, rng.gen_range(10.0..40.0));
    }
    for _ in 0..bullets {
        let position = Vec2::new(rng.gen_range(0.0..800.0), rng.gen_range(0.0..600.0));
        let velocity = Vec2::new(rng.gen_range(-400.0..400.0), rng.gen_range(-400.0..400.0));
        spawn_bullet(arena, position, velocity);
    }
}
