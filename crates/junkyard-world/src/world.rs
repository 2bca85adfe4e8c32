//! The world context.
//!
//! [`World`] owns every piece of streaming and wrap state for one planet.
//! Collaborators (physics, camera, scatter spawner) are passed into each
//! call, so several worlds can coexist and tests can build them from scratch.

use junkyard_common::{ObjectHandle, WorldPoint};
use tracing::{debug, info};

use crate::chunk::{ChunkIndex, ChunkRecord, ChunkTable};
use crate::config::{ChunkerOptions, WorldConfig};
use crate::generation::HeightGenerator;
use crate::physics::{CameraFrame, CollisionHandler, PhysicsBackend, ScatterSpawner};
use crate::schedule::{DeferredAction, DeferredQueue};
use crate::streaming::{StreamReport, StreamingController};
use crate::terrain::{ChunkHeights, Materialization, Materializer};
use crate::viewport::Viewport;
use crate::wrap::{WrapCoordinator, WrapReport};

/// Derived planet measurements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanetInfo {
    /// Left edge of the X domain
    pub min_x: f64,
    /// Right edge of the X domain
    pub max_x: f64,
    /// Middle of the X domain
    pub middle_x: f64,
    /// Width of the X domain
    pub circumference: f64,
    /// Width of one chunk
    pub x_per_chunk: f64,
    /// Number of chunks
    pub chunks_count: u32,
}

/// Snapshot for debug overlays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugInfo {
    /// Focus X
    pub focus_x: f64,
    /// Unreduced focus chunk number
    pub chunk_num: ChunkIndex,
    /// Focus chunk on the planet
    pub planet_chunk: u32,
    /// Chunks with sampled heights
    pub sampled: usize,
    /// Chunks with terrain
    pub materialized: usize,
    /// Pending deferred actions
    pub pending_actions: usize,
    /// Current tick
    pub tick: u64,
}

/// What one tick did.
#[derive(Debug, Default)]
pub struct TickReport {
    /// Tick number after advancing
    pub tick: u64,
    /// Deferred actions applied
    pub fired: usize,
    /// Wrap pass over tracked objects
    pub wrap: WrapReport,
}

/// One planet: chunk state, streaming, wrapping and viewport.
#[derive(Debug)]
pub struct World {
    /// Configuration the world was built with
    config: WorldConfig,
    /// Sampled chunks
    chunks: ChunkTable,
    /// Height source
    heights: HeightGenerator,
    /// Terrain builder
    materializer: Materializer,
    /// Focus-driven streaming
    streaming: StreamingController,
    /// Seam wrapping
    wrap: WrapCoordinator,
    /// Camera focus and zoom
    viewport: Viewport,
    /// Delayed actions
    deferred: DeferredQueue<DeferredAction>,
    /// Objects wrapped every tick
    tracked: Vec<ObjectHandle>,
    /// Current tick
    tick: u64,
    /// Random delays
    rng: fastrand::Rng,
}

impl World {
    /// Creates a world. Chunks are sampled lazily as they are first needed.
    #[must_use]
    pub fn new(mut config: WorldConfig) -> Self {
        config.validate();
        let rng = config.seed.map_or_else(fastrand::Rng::new, |seed| {
            fastrand::Rng::with_seed(seed.wrapping_add(2))
        });
        let world = Self {
            chunks: ChunkTable::new(config.chunks_count),
            heights: HeightGenerator::from_config(&config),
            materializer: Materializer::from_config(&config),
            streaming: StreamingController::from_config(&config),
            wrap: WrapCoordinator::from_config(&config),
            viewport: Viewport::new(config.base_extent),
            deferred: DeferredQueue::new(),
            tracked: Vec::new(),
            tick: 0,
            rng,
            config,
        };
        info!(
            "Created world: {} chunks of {:.1} across {:.1}, flatten {:?}",
            world.config.chunks_count,
            world.config.x_per_chunk(),
            world.config.circumference(),
            world.heights.flatten_zone()
        );
        world
    }

    /// Configuration in effect.
    #[must_use]
    pub const fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Replaces chunker options. Chunks already sampled keep their heights.
    pub fn set_chunker_options(&mut self, options: ChunkerOptions) {
        self.heights.set_options(&options, self.config.x_per_chunk());
        self.config.chunker = options;
    }

    /// Planet measurements.
    #[must_use]
    pub fn planet(&self) -> PlanetInfo {
        PlanetInfo {
            min_x: self.config.planet_min_x(),
            max_x: self.config.planet_max_x(),
            middle_x: self.config.planet_middle_x(),
            circumference: self.config.circumference(),
            x_per_chunk: self.config.x_per_chunk(),
            chunks_count: self.config.chunks_count,
        }
    }

    /// Chunk table, read-only.
    #[must_use]
    pub const fn chunks(&self) -> &ChunkTable {
        &self.chunks
    }

    /// A chunk record, if sampled.
    #[must_use]
    pub fn chunk(&self, index: ChunkIndex) -> Option<&ChunkRecord> {
        self.chunks.get(index)
    }

    /// Viewport state.
    #[must_use]
    pub const fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Wrap bounds in effect.
    #[must_use]
    pub const fn wrap_coordinator(&self) -> &WrapCoordinator {
        &self.wrap
    }

    /// Current tick.
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Unreduced chunk number containing `x`.
    #[must_use]
    pub fn chunk_num_at_x(&self, x: f64) -> ChunkIndex {
        self.streaming.chunk_num_at_x(x)
    }

    /// Ground surface Y at `x`, if the chunk and its neighbour are sampled.
    #[must_use]
    pub fn height_at_x(&self, x: f64) -> Option<f64> {
        let index = self.streaming.chunk_index_on_planet(x);
        let heights = ChunkHeights::read(&self.chunks, index)?;
        let planet_x = x.rem_euclid(self.config.circumference());
        Some(
            self.materializer
                .layout()
                .surface_y(i64::from(index), &heights, planet_x),
        )
    }

    /// Builds terrain for one chunk. Out-of-domain and repeated requests are no-ops.
    pub fn materialize(
        &mut self,
        index: ChunkIndex,
        physics: &mut dyn PhysicsBackend,
        spawner: &mut dyn ScatterSpawner,
    ) -> Materialization {
        self.materializer
            .materialize(&mut self.chunks, &mut self.heights, index, physics, spawner)
    }

    /// Moves the focus, frames the camera, then streams chunks around it.
    pub fn focus(
        &mut self,
        point: WorldPoint,
        physics: &mut dyn PhysicsBackend,
        camera: &mut dyn CameraFrame,
        spawner: &mut dyn ScatterSpawner,
    ) -> StreamReport {
        self.viewport.set_focus(point, camera);
        self.streaming.update(
            point.x,
            &mut self.chunks,
            &mut self.heights,
            &mut self.materializer,
            physics,
            spawner,
        )
    }

    /// Frames the camera on `point` without moving the focus or streaming.
    pub fn look_at(&self, point: WorldPoint, camera: &mut dyn CameraFrame) {
        self.viewport.look_at(point, camera);
    }

    /// Sets the viewport scale (clamped) and returns it. No terrain is
    /// streamed until the next focus update.
    pub fn scale_viewport(&mut self, scale: f64) -> f64 {
        self.viewport.set_scale(scale)
    }

    /// Adds an object to the per-tick wrap set.
    pub fn track(&mut self, handle: ObjectHandle) {
        if !self.tracked.contains(&handle) {
            self.tracked.push(handle);
        }
    }

    /// Removes an object from the per-tick wrap set.
    pub fn untrack(&mut self, handle: ObjectHandle) -> bool {
        let before = self.tracked.len();
        self.tracked.retain(|&h| h != handle);
        self.tracked.len() != before
    }

    /// Objects wrapped every tick.
    #[must_use]
    pub fn tracked(&self) -> &[ObjectHandle] {
        &self.tracked
    }

    /// Wraps the given objects once.
    pub fn wrap(&self, physics: &mut dyn PhysicsBackend, objects: &[ObjectHandle]) -> WrapReport {
        self.wrap.wrap(physics, objects)
    }

    /// Removes an object now. Returns `false` if it was already gone.
    pub fn remove_object(&mut self, physics: &mut dyn PhysicsBackend, handle: ObjectHandle) -> bool {
        self.untrack(handle);
        physics.remove(handle)
    }

    /// Removes an object `delay` ticks from now.
    pub fn schedule_removal(&mut self, handle: ObjectHandle, delay: u64) {
        self.deferred
            .schedule(delay, DeferredAction::RemoveObject(handle));
    }

    /// Removes an object after a random delay in `[min_delay, max_delay]` ticks.
    pub fn schedule_removal_between(&mut self, handle: ObjectHandle, min_delay: u64, max_delay: u64) {
        let delay = self.rng.u64(min_delay.min(max_delay)..=max_delay.max(min_delay));
        self.schedule_removal(handle, delay);
    }

    /// Number of pending deferred actions.
    #[must_use]
    pub fn pending_actions(&self) -> usize {
        self.deferred.len()
    }

    /// Replaces the collision-start handler on the physics backend.
    pub fn set_collision_handler(&self, physics: &mut dyn PhysicsBackend, handler: CollisionHandler) {
        physics.set_collision_handler(handler);
    }

    /// Advances one tick: applies due deferred actions, then wraps tracked objects.
    pub fn tick(&mut self, physics: &mut dyn PhysicsBackend) -> TickReport {
        self.tick += 1;

        let due = self.deferred.drain_due(self.tick);
        let fired = due.len();
        for action in due {
            match action {
                DeferredAction::RemoveObject(handle) => {
                    let removed = self.remove_object(physics, handle);
                    debug!("Deferred removal of {handle} (removed: {removed})");
                },
            }
        }

        let wrap = self.wrap.wrap(physics, &self.tracked);
        TickReport {
            tick: self.tick,
            fired,
            wrap,
        }
    }

    /// Snapshot for debug overlays.
    #[must_use]
    pub fn debug_info(&self) -> DebugInfo {
        let focus_x = self.viewport.focus().x;
        DebugInfo {
            focus_x,
            chunk_num: self.streaming.chunk_num_at_x(focus_x),
            planet_chunk: self.streaming.chunk_index_on_planet(focus_x),
            sampled: self.chunks.len(),
            materialized: self.chunks.materialized_count(),
            pending_actions: self.deferred.len(),
            tick: self.tick,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{AggregateOptions, BoxScatter, MemoryPhysics, ObjectKind, Shape};
    use crate::viewport::RecordingCamera;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Harness {
        world: World,
        physics: MemoryPhysics,
        camera: RecordingCamera,
        spawner: BoxScatter,
    }

    impl Harness {
        fn new(config: WorldConfig) -> Self {
            Self {
                world: World::new(config),
                physics: MemoryPhysics::new(),
                camera: RecordingCamera::default(),
                spawner: BoxScatter::default(),
            }
        }

        fn focus(&mut self, x: f64, y: f64) -> StreamReport {
            self.world.focus(
                WorldPoint::new(x, y),
                &mut self.physics,
                &mut self.camera,
                &mut self.spawner,
            )
        }

        fn spawn_vehicle(&mut self, center: WorldPoint) -> ObjectHandle {
            self.physics.create_aggregate(
                vec![Shape::Rect {
                    center,
                    size: WorldPoint::new(135.0, 27.0),
                }],
                AggregateOptions::dynamic(ObjectKind::Vehicle),
            )
        }
    }

    fn config() -> WorldConfig {
        WorldConfig {
            seed: Some(5),
            scatter_chance: 0.0,
            ..WorldConfig::default()
        }
    }

    #[test]
    fn test_new_world_is_empty() {
        let h = Harness::new(config());
        assert!(h.world.chunks().is_empty());
        assert_eq!(h.world.tick_count(), 0);
        let planet = h.world.planet();
        assert_eq!(planet.chunks_count, 100);
        assert!((planet.middle_x * 2.0 - planet.circumference).abs() < 1e-9);
    }

    #[test]
    fn test_focus_frames_then_streams() {
        let mut h = Harness::new(config());
        let w = h.world.planet().x_per_chunk;

        let report = h.focus(2.5 * w, 100.0);

        assert_eq!(report.built, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(h.camera.frames.len(), 1);
        let framed = h.camera.frames[0].center() - WorldPoint::new(2.5 * w, 100.0);
        assert!(framed.length() < 1e-9);
        assert_eq!(h.world.viewport().focus(), WorldPoint::new(2.5 * w, 100.0));
        assert!(h.world.chunk(99).is_none());
        assert!(!h.world.chunk(6).is_some_and(ChunkRecord::is_materialized));
    }

    #[test]
    fn test_scale_alone_streams_nothing() {
        let mut h = Harness::new(config());
        assert_eq!(h.world.scale_viewport(50.0), 50.0);
        assert!(h.world.chunks().is_empty());
        assert!(h.camera.frames.is_empty());
        assert_eq!(h.world.scale_viewport(0.0), 0.2);
    }

    #[test]
    fn test_flatten_options_from_config() {
        let w = WorldConfig::default().x_per_chunk();
        let mut flat = World::new(WorldConfig {
            chunker: ChunkerOptions {
                flatten_near_x: Some(50.5 * w),
                flatten_chunk_range: 1,
            },
            ..config()
        });
        let mut plain = World::new(config());
        let mut physics = MemoryPhysics::new();
        let mut spawner = BoxScatter::default();

        for i in 47..=53 {
            flat.materialize(i, &mut physics, &mut spawner);
            plain.materialize(i, &mut physics, &mut spawner);
        }
        for i in 47..=53 {
            let f = flat.chunk(i).expect("sampled");
            let p = plain.chunk(i).expect("sampled");
            if (49..=51).contains(&i) {
                assert_eq!(f.h1, p.h1 / 2.0, "chunk {i}");
                assert_eq!(f.h2, p.h2 / 2.0, "chunk {i}");
            } else {
                assert_eq!((f.h1, f.h2), (p.h1, p.h2), "chunk {i}");
            }
        }
    }

    #[test]
    fn test_tick_wraps_tracked_objects() {
        let mut h = Harness::new(config());
        let max_x = h.world.planet().max_x;
        let car = h.spawn_vehicle(WorldPoint::new(max_x + 20.0, 0.0));
        let parked = h.spawn_vehicle(WorldPoint::new(max_x + 20.0, 0.0));
        h.world.track(car);
        h.world.track(car);
        assert_eq!(h.world.tracked(), &[car]);

        let report = h.world.tick(&mut h.physics);

        assert_eq!(report.tick, 1);
        assert_eq!(report.wrap.moved.len(), 1);
        assert!(h.physics.aggregate_position(car).expect("live").x < max_x);
        assert!(h.physics.aggregate_position(parked).expect("live").x > max_x);
    }

    #[test]
    fn test_scheduled_removal_fires_once() {
        let mut h = Harness::new(config());
        let junk = h.spawner.spawn(&mut h.physics, WorldPoint::ZERO);
        h.world.track(junk);
        h.world.schedule_removal(junk, 3);
        h.world.schedule_removal(junk, 3);

        assert_eq!(h.world.tick(&mut h.physics).fired, 0);
        assert_eq!(h.world.tick(&mut h.physics).fired, 0);
        assert!(h.physics.contains(junk));

        let report = h.world.tick(&mut h.physics);
        assert_eq!(report.fired, 2);
        assert!(!h.physics.contains(junk));
        assert!(h.world.tracked().is_empty());
        assert_eq!(h.world.pending_actions(), 0);
    }

    #[test]
    fn test_random_removal_delay_in_range() {
        let mut h = Harness::new(config());
        let junk = h.spawner.spawn(&mut h.physics, WorldPoint::ZERO);
        h.world.schedule_removal_between(junk, 5, 10);

        let mut removed_at = None;
        for _ in 0..12 {
            let tick = h.world.tick(&mut h.physics).tick;
            if removed_at.is_none() && !h.physics.contains(junk) {
                removed_at = Some(tick);
            }
        }
        assert!(matches!(removed_at, Some(5..=10)));
    }

    #[test]
    fn test_collision_handler_replaced() {
        let mut h = Harness::new(config());
        let a = h.spawner.spawn(&mut h.physics, WorldPoint::ZERO);
        let b = h.spawner.spawn(&mut h.physics, WorldPoint::ONE);

        let first = Rc::new(Cell::new(0));
        let second = Rc::new(Cell::new(0));
        let f = Rc::clone(&first);
        let s = Rc::clone(&second);
        h.world
            .set_collision_handler(&mut h.physics, Box::new(move |_, _| f.set(f.get() + 1)));
        h.physics.emit_collision(a, b);
        h.world
            .set_collision_handler(&mut h.physics, Box::new(move |_, _| s.set(s.get() + 1)));
        h.physics.emit_collision(b, a);

        assert_eq!(first.get(), 1);
        assert_eq!(second.get(), 1);
    }

    #[test]
    fn test_height_at_x_follows_wedges() {
        let mut h = Harness::new(config());
        let w = h.world.planet().x_per_chunk;
        assert!(h.world.height_at_x(10.0 * w).is_none());

        h.focus(10.5 * w, 0.0);
        let record = h.world.chunk(10).expect("sampled").clone();
        let base = h.world.config().floor_y - h.world.config().slab_height / 2.0;

        let left = h.world.height_at_x(10.0 * w).expect("sampled");
        let mid = h.world.height_at_x(10.5 * w).expect("sampled");
        assert!((left - (base - record.h1)).abs() < 1e-6);
        assert!((mid - (base - record.h2)).abs() < 1e-6);

        let lap = h.world.height_at_x(10.5 * w + h.world.planet().circumference);
        assert!((lap.expect("sampled") - mid).abs() < 1e-6);
    }

    #[test]
    fn test_debug_info() {
        let mut h = Harness::new(config());
        let w = h.world.planet().x_per_chunk;
        h.focus(-0.5 * w, 0.0);
        h.world.tick(&mut h.physics);

        let info = h.world.debug_info();
        assert_eq!(info.chunk_num, -1);
        assert_eq!(info.planet_chunk, 99);
        assert_eq!(info.materialized, 3);
        assert_eq!(info.tick, 1);
    }

    #[test]
    fn test_independent_worlds() {
        let mut a = Harness::new(config());
        let b = Harness::new(config());
        let w = a.world.planet().x_per_chunk;
        a.focus(30.5 * w, 0.0);
        assert!(a.world.chunks().materialized_count() > 0);
        assert!(b.world.chunks().is_empty());
    }
}
