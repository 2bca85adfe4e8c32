//! Headless drive.
//!
//! Places a vehicle on the planet and drives it along the surface. Every
//! tick the focus follows the vehicle, chunks stream in around it, junk the
//! vehicle touches is collected and the world wraps the vehicle across the
//! seam.

use ahash::AHashSet;
use junkyard_common::{Aabb, ObjectHandle, WorldPoint};
use junkyard_world::{
    AggregateOptions, CameraFrame, MemoryPhysics, ObjectKind, PhysicsBackend,
    Shape, World,
};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, info, trace};

use crate::config::EngineConfig;
use crate::junk::JunkSpawner;

/// Focus sits this far above the vehicle.
const FOCUS_ABOVE: f64 = 30.0;

/// Debris pieces per collected junk.
const CONFETTI_PER_JUNK: u32 = 20;

/// Debris lifetime range in ticks.
const CONFETTI_TICKS: (u64, u64) = (120, 600);

/// Collision pairs reported by the physics backend.
type ContactLog = Rc<RefCell<Vec<(ObjectHandle, ObjectHandle)>>>;

/// Camera that only remembers its last frame.
#[derive(Debug, Default)]
pub struct TraceCamera {
    /// Last framed region
    pub last: Option<Aabb>,
}

impl CameraFrame for TraceCamera {
    fn frame(&mut self, min: WorldPoint, max: WorldPoint) {
        trace!("Camera frame ({:.1}, {:.1})..({:.1}, {:.1})", min.x, min.y, max.x, max.y);
        self.last = Some(Aabb::new(min, max));
    }
}

/// Totals for one drive.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunStats {
    /// Ticks simulated
    pub ticks: u64,
    /// Seam crossings and Y clamps of the vehicle
    pub wraps: usize,
    /// Junk pieces collected
    pub collected: usize,
    /// Deferred actions fired
    pub fired: usize,
    /// Vehicle X at the end
    pub final_x: f64,
}

/// One world with a vehicle driving across it.
pub struct Drive {
    world: World,
    physics: MemoryPhysics,
    camera: TraceCamera,
    junk: JunkSpawner,
    vehicle: ObjectHandle,
    speed: f64,
    log_every: u64,
    contacts: ContactLog,
    collected: AHashSet<ObjectHandle>,
    debris_rng: fastrand::Rng,
    stats: RunStats,
}

impl Drive {
    /// Builds the world, streams the start area and drops the vehicle on it.
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        let start_x = config.start_position();
        let mut world_config = config.world.clone();
        if config.flatten_start && world_config.chunker.flatten_near_x.is_none() {
            world_config.chunker.flatten_near_x = Some(start_x);
        }

        let seed = world_config.seed;
        let mut world = World::new(world_config);
        let mut physics = MemoryPhysics::new();
        let mut camera = TraceCamera::default();
        let mut junk = JunkSpawner::new(seed.map(|s| s.wrapping_add(3)));

        let start = WorldPoint::new(start_x, 0.0);
        world.focus(start, &mut physics, &mut camera, &mut junk);

        let vehicle = physics.create_aggregate(
            vehicle_shapes(start),
            AggregateOptions::dynamic(ObjectKind::Vehicle),
        );
        world.track(vehicle);

        let contacts = ContactLog::default();
        let sink = Rc::clone(&contacts);
        world.set_collision_handler(
            &mut physics,
            Box::new(move |a, b| sink.borrow_mut().push((a, b))),
        );

        let mut drive = Self {
            world,
            physics,
            camera,
            junk,
            vehicle,
            speed: config.vehicle_speed,
            log_every: config.log_every,
            contacts,
            collected: AHashSet::new(),
            debris_rng: seed.map_or_else(fastrand::Rng::new, |s| {
                fastrand::Rng::with_seed(s.wrapping_add(4))
            }),
            stats: RunStats::default(),
        };
        drive.settle();
        info!(
            "Vehicle {} placed at x={:.1} on a planet {:.1} wide",
            drive.vehicle,
            start_x,
            drive.world.planet().circumference
        );
        drive
    }

    /// The world being driven.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// The physics backend.
    #[must_use]
    pub const fn physics(&self) -> &MemoryPhysics {
        &self.physics
    }

    /// Camera the drive frames.
    #[must_use]
    pub const fn camera(&self) -> &TraceCamera {
        &self.camera
    }

    /// Junk pieces spawned so far.
    #[must_use]
    pub const fn junk_spawned(&self) -> u64 {
        self.junk.spawned()
    }

    /// Vehicle handle.
    #[must_use]
    pub const fn vehicle(&self) -> ObjectHandle {
        self.vehicle
    }

    /// Vehicle center.
    #[must_use]
    pub fn vehicle_position(&self) -> Option<WorldPoint> {
        self.physics.aggregate_position(self.vehicle)
    }

    /// Puts the vehicle's wheels on the ground under it, if that ground is sampled.
    fn settle(&mut self) {
        let Some(bounds) = self.physics.aggregate_bounds(self.vehicle) else {
            return;
        };
        let center = bounds.center();
        if let Some(ground) = self.world.height_at_x(center.x) {
            let target = WorldPoint::new(center.x, ground - bounds.height() / 2.0);
            self.physics.set_aggregate_position(self.vehicle, target);
        }
    }

    /// Collects every junk piece the vehicle reported touching.
    fn collect_contacts(&mut self) {
        for junk in self.physics.overlapping(self.vehicle, ObjectKind::Scatter) {
            self.physics.emit_collision(self.vehicle, junk);
        }

        let pairs: Vec<_> = self.contacts.borrow_mut().drain(..).collect();
        for (a, b) in pairs {
            let junk = if a == self.vehicle { b } else { a };
            if !self.collected.insert(junk) {
                continue;
            }
            let at = self.physics.aggregate_position(junk);
            self.world.schedule_removal(junk, 0);
            self.stats.collected += 1;
            debug!("Collected junk {junk}");
            if let Some(at) = at {
                self.scatter_confetti(at);
            }
        }
    }

    /// Short-lived debris at `at`, removed after a random delay.
    fn scatter_confetti(&mut self, at: WorldPoint) {
        let (min_delay, max_delay) = CONFETTI_TICKS;
        for _ in 0..CONFETTI_PER_JUNK {
            let offset = WorldPoint::new(self.debris_rng.f64() - 0.5, -self.debris_rng.f64()) * 40.0;
            let piece = self.physics.create_aggregate(
                vec![Shape::regular_polygon(at + offset, 6, 8.0, 0.0)],
                AggregateOptions::dynamic(ObjectKind::Other),
            );
            self.world
                .schedule_removal_between(piece, min_delay, max_delay);
        }
    }

    /// Advances the drive by one tick.
    pub fn step(&mut self) {
        self.physics
            .translate(self.vehicle, WorldPoint::new(self.speed, 0.0));
        self.settle();

        if let Some(position) = self.vehicle_position() {
            let focus = WorldPoint::new(position.x, position.y - FOCUS_ABOVE);
            self.world
                .focus(focus, &mut self.physics, &mut self.camera, &mut self.junk);
        }
        self.collect_contacts();

        let report = self.world.tick(&mut self.physics);
        let physics = &self.physics;
        self.collected.retain(|handle| physics.contains(*handle));
        self.stats.ticks = report.tick;
        self.stats.fired += report.fired;
        for moved in &report.wrap.moved {
            if moved.handle == self.vehicle {
                self.stats.wraps += 1;
            }
        }

        if report.tick % self.log_every == 0 {
            let info = self.world.debug_info();
            info!(
                "tick {}: x={:.1} chunk {} (planet {}), {} sampled, {} materialized, {} pending, {} objects",
                info.tick,
                info.focus_x,
                info.chunk_num,
                info.planet_chunk,
                info.sampled,
                info.materialized,
                info.pending_actions,
                self.physics.len()
            );
        }
    }

    /// Runs `ticks` steps and returns the totals.
    pub fn run(&mut self, ticks: u64) -> RunStats {
        for _ in 0..ticks {
            self.step();
        }
        self.stats.final_x = self.vehicle_position().map_or(f64::NAN, |p| p.x);
        self.stats
    }
}

impl std::fmt::Debug for Drive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Drive")
            .field("world", &self.world)
            .field("physics", &self.physics)
            .field("vehicle", &self.vehicle)
            .field("speed", &self.speed)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

/// Chassis and two octagonal wheels around `at`.
fn vehicle_shapes(at: WorldPoint) -> Vec<Shape> {
    vec![
        Shape::Rect {
            center: at,
            size: WorldPoint::new(120.0, 30.0),
        },
        Shape::regular_polygon(at + WorldPoint::new(-40.0, 20.0), 8, 20.0, 0.0),
        Shape::regular_polygon(at + WorldPoint::new(40.0, 20.0), 8, 20.0, 0.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use junkyard_world::ScatterSpawner;

    fn config(start_x: f64, speed: f64) -> EngineConfig {
        let mut config = EngineConfig {
            start_x: Some(start_x),
            vehicle_speed: speed,
            ..EngineConfig::default()
        };
        config.world.seed = Some(11);
        config.validate();
        config
    }

    #[test]
    fn test_vehicle_starts_on_ground() {
        let drive = Drive::new(&config(5000.0, 0.0));
        let bounds = drive
            .physics()
            .aggregate_bounds(drive.vehicle())
            .expect("vehicle exists");
        let ground = drive
            .world()
            .height_at_x(bounds.center().x)
            .expect("start chunk sampled");

        assert!((bounds.max.y - ground).abs() < 1e-6);
        assert_eq!(drive.world().tracked(), &[drive.vehicle()]);
    }

    #[test]
    fn test_drive_crosses_seam_forward() {
        let base = EngineConfig::default();
        let max_x = base.world.planet_max_x();
        let mut drive = Drive::new(&config(max_x - 300.0, 100.0));

        let stats = drive.run(10);

        assert_eq!(stats.ticks, 10);
        assert_eq!(stats.wraps, 1);
        assert!(stats.final_x < 1000.0, "final x {}", stats.final_x);
        assert!(drive.world().chunk(0).is_some_and(|c| c.is_materialized()));
    }

    #[test]
    fn test_drive_crosses_seam_backward() {
        let mut drive = Drive::new(&config(300.0, -100.0));
        let max_x = drive.world().planet().max_x;

        let stats = drive.run(10);

        assert_eq!(stats.wraps, 1);
        assert!(stats.final_x > max_x - 1000.0, "final x {}", stats.final_x);
    }

    #[test]
    fn test_collected_junk_is_removed() {
        let mut drive = Drive::new(&config(5000.0, 0.0));
        let at = drive.vehicle_position().expect("vehicle exists");
        let junk = drive.junk.spawn(&mut drive.physics, at);

        drive.step();

        assert!(!drive.physics().contains(junk));
        assert!(!drive.collected.contains(&junk));
        assert!(drive.collected.is_empty());
        assert!(drive.stats.collected >= 1);
        assert_eq!(
            drive.physics().count_kind(ObjectKind::Other),
            drive.stats.collected * CONFETTI_PER_JUNK as usize
        );

        let collected = drive.stats.collected;
        drive.step();
        assert!(drive.stats.collected >= collected);
        assert!(drive.camera().last.is_some());
    }

    #[test]
    fn test_trace_camera_keeps_last_frame() {
        let mut camera = TraceCamera::default();
        camera.frame(WorldPoint::ZERO, WorldPoint::ONE);
        camera.frame(WorldPoint::ONE, WorldPoint::splat(3.0));
        assert_eq!(
            camera.last,
            Some(Aabb::new(WorldPoint::ONE, WorldPoint::splat(3.0)))
        );
    }
}
