//! Junk scatter.
//!
//! Each piece of junk is one aggregate: a random body, sometimes a pipe bar
//! and a small inner part. Every part fits inside `MAX_JUNK_SIZE`.

use junkyard_common::{ObjectHandle, WorldPoint};
use junkyard_world::{AggregateOptions, ObjectKind, PhysicsBackend, ScatterSpawner, Shape};
use std::f64::consts::TAU;
use tracing::trace;

/// Largest side of any junk part.
pub const MAX_JUNK_SIZE: f64 = 130.0;

/// Smallest side of a junk body.
const MIN_JUNK_SIZE: f64 = 20.0;

/// Chance that a piece carries a pipe bar.
const PIPE_CHANCE: f64 = 0.3;

/// Spawns randomized junk above the terrain.
#[derive(Debug)]
pub struct JunkSpawner {
    rng: fastrand::Rng,
    spawned: u64,
}

impl JunkSpawner {
    /// Creates a spawner; a seed makes the junk reproducible.
    #[must_use]
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            rng: seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed),
            spawned: 0,
        }
    }

    /// Number of pieces spawned so far.
    #[must_use]
    pub const fn spawned(&self) -> u64 {
        self.spawned
    }

    /// Side length in `(MIN_JUNK_SIZE, MAX_JUNK_SIZE]`.
    fn side(&mut self) -> f64 {
        MIN_JUNK_SIZE + (MAX_JUNK_SIZE - MIN_JUNK_SIZE) * (1.0 - self.rng.f64())
    }

    /// A rectangle or a regular polygon of roughly `width` by `height`.
    fn body(&mut self, at: WorldPoint, width: f64, height: f64) -> Shape {
        let roll = self.rng.f64();
        if roll < 0.3 {
            return Shape::Rect {
                center: at,
                size: WorldPoint::new(width, height),
            };
        }
        let radius = (width + height) / 4.0;
        let angle = self.rng.f64() * TAU;
        let sides = if roll < 0.6 {
            3
        } else if roll < 0.7 {
            // Stand-in for a circle
            20
        } else {
            self.rng.u32(3..=11)
        };
        Shape::regular_polygon(at, sides, radius, angle)
    }

    /// Builds the parts of one piece of junk centered near `at`.
    pub fn parts(&mut self, at: WorldPoint) -> Vec<Shape> {
        let width = self.side();
        let height = self.side();
        let mut parts = vec![self.body(at, width, height)];

        if self.rng.f64() < PIPE_CHANCE {
            parts.push(Shape::Rect {
                center: at + WorldPoint::new(width / 3.0, 0.0),
                size: WorldPoint::new(width, width / 4.0),
            });
        }

        let inner = (width + height) / 4.5;
        let jitter = WorldPoint::new(
            (self.rng.f64() - self.rng.f64()) * inner,
            (self.rng.f64() - self.rng.f64()) * inner,
        );
        parts.push(self.body(at + jitter, inner, inner));

        parts
    }
}

impl ScatterSpawner for JunkSpawner {
    fn spawn(&mut self, physics: &mut dyn PhysicsBackend, at: WorldPoint) -> ObjectHandle {
        let parts = self.parts(at);
        let handle =
            physics.create_aggregate(parts, AggregateOptions::dynamic(ObjectKind::Scatter));
        self.spawned += 1;
        trace!("Spawned junk {handle} at ({:.1}, {:.1})", at.x, at.y);
        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use junkyard_world::MemoryPhysics;

    #[test]
    fn test_parts_fit_max_size() {
        let mut spawner = JunkSpawner::new(Some(7));
        for _ in 0..200 {
            let parts = spawner.parts(WorldPoint::ZERO);
            assert!((2..=3).contains(&parts.len()));
            for part in &parts {
                let bounds = part.bounds();
                assert!(bounds.width() <= MAX_JUNK_SIZE + 1e-9, "{bounds:?}");
                assert!(bounds.height() <= MAX_JUNK_SIZE + 1e-9, "{bounds:?}");
            }
        }
    }

    #[test]
    fn test_spawn_creates_scatter_aggregate() {
        let mut physics = MemoryPhysics::new();
        let mut spawner = JunkSpawner::new(Some(1));

        let handle = spawner.spawn(&mut physics, WorldPoint::new(500.0, -100.0));

        assert!(physics.contains(handle));
        assert_eq!(physics.count_kind(ObjectKind::Scatter), 1);
        assert_eq!(spawner.spawned(), 1);
        let center = physics.aggregate_position(handle).expect("has shapes");
        assert!((center - WorldPoint::new(500.0, -100.0)).length() < MAX_JUNK_SIZE);
    }

    #[test]
    fn test_seeded_spawners_agree() {
        let mut a = JunkSpawner::new(Some(99));
        let mut b = JunkSpawner::new(Some(99));
        assert_eq!(a.parts(WorldPoint::ONE), b.parts(WorldPoint::ONE));
    }
}
