//! Collaborator seams: physics backend, camera and scatter spawning.
//!
//! The world never owns rigid bodies. It hands shapes to a [`PhysicsBackend`]
//! and keeps the returned [`ObjectHandle`]s. [`MemoryPhysics`] is a backend
//! without dynamics, used by tests and the headless engine.

use ahash::AHashMap;
use junkyard_common::{Aabb, HandleAllocator, ObjectHandle, WorldPoint};
use tracing::trace;

/// A shape handed to the physics backend.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Axis-aligned rectangle
    Rect {
        /// Center of the rectangle
        center: WorldPoint,
        /// Full width and height
        size: WorldPoint,
    },
    /// Convex polygon in world coordinates
    Polygon {
        /// Vertices, in order
        vertices: Vec<WorldPoint>,
    },
}

impl Shape {
    /// Regular polygon with `sides` vertices (at least 3) on a circle of `radius`.
    #[must_use]
    pub fn regular_polygon(center: WorldPoint, sides: u32, radius: f64, angle: f64) -> Self {
        let sides = sides.max(3);
        let step = std::f64::consts::TAU / f64::from(sides);
        let vertices = (0..sides)
            .map(|i| {
                let a = angle + step * f64::from(i);
                center + WorldPoint::new(a.cos(), a.sin()) * radius
            })
            .collect();
        Self::Polygon { vertices }
    }

    /// Returns the bounds of the shape.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        match self {
            Self::Rect { center, size } => Aabb::from_center(*center, *size * 0.5),
            Self::Polygon { vertices } => Aabb::from_points(vertices.iter().copied())
                .unwrap_or_else(|| Aabb::new(WorldPoint::ZERO, WorldPoint::ZERO)),
        }
    }

    /// Moves the shape by `delta`.
    pub fn translate(&mut self, delta: WorldPoint) {
        match self {
            Self::Rect { center, .. } => *center += delta,
            Self::Polygon { vertices } => vertices.iter_mut().for_each(|v| *v += delta),
        }
    }
}

/// Role of an aggregate in the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// Static chunk terrain
    Terrain,
    /// Collectible scatter ("junk")
    Scatter,
    /// Player-driven composite
    Vehicle,
    /// Anything else
    Other,
}

/// Options for a new aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateOptions {
    /// Role of the aggregate
    pub kind: ObjectKind,
    /// Whether the aggregate is immovable
    pub is_static: bool,
}

impl AggregateOptions {
    /// Options for static terrain.
    pub const TERRAIN: Self = Self {
        kind: ObjectKind::Terrain,
        is_static: true,
    };

    /// Options for a dynamic object of the given kind.
    #[must_use]
    pub const fn dynamic(kind: ObjectKind) -> Self {
        Self {
            kind,
            is_static: false,
        }
    }
}

/// Callback invoked when two objects start touching.
pub type CollisionHandler = Box<dyn FnMut(ObjectHandle, ObjectHandle)>;

/// What the world needs from a physics/collision engine.
pub trait PhysicsBackend {
    /// Registers a group of shapes as one aggregate.
    fn create_aggregate(&mut self, shapes: Vec<Shape>, options: AggregateOptions) -> ObjectHandle;

    /// Removes an aggregate. Returns `false` if it was already gone.
    fn remove(&mut self, handle: ObjectHandle) -> bool;

    /// Combined bounds of an aggregate's shapes.
    fn aggregate_bounds(&self, handle: ObjectHandle) -> Option<Aabb>;

    /// Moves every shape of an aggregate by `delta`. Returns `false` for unknown handles.
    fn translate(&mut self, handle: ObjectHandle, delta: WorldPoint) -> bool;

    /// Replaces the collision-start handler.
    fn set_collision_handler(&mut self, handler: CollisionHandler);

    /// Center of an aggregate's combined bounds.
    fn aggregate_position(&self, handle: ObjectHandle) -> Option<WorldPoint> {
        self.aggregate_bounds(handle).map(|b| b.center())
    }

    /// Moves an aggregate so its bounds center lands on `position`.
    fn set_aggregate_position(&mut self, handle: ObjectHandle, position: WorldPoint) -> bool {
        match self.aggregate_position(handle) {
            Some(center) => self.translate(handle, position - center),
            None => false,
        }
    }
}

/// What the world needs from the renderer.
pub trait CameraFrame {
    /// Frames the view on `[min, max]`.
    fn frame(&mut self, min: WorldPoint, max: WorldPoint);
}

/// Builds scatter objects ("junk") on request.
pub trait ScatterSpawner {
    /// Spawns one object centered near `at` and returns its handle.
    fn spawn(&mut self, physics: &mut dyn PhysicsBackend, at: WorldPoint) -> ObjectHandle;
}

/// Spawns a single square per request.
#[derive(Debug, Clone, Copy)]
pub struct BoxScatter {
    /// Side length
    pub size: f64,
}

impl Default for BoxScatter {
    fn default() -> Self {
        Self { size: 40.0 }
    }
}

impl ScatterSpawner for BoxScatter {
    fn spawn(&mut self, physics: &mut dyn PhysicsBackend, at: WorldPoint) -> ObjectHandle {
        physics.create_aggregate(
            vec![Shape::Rect {
                center: at,
                size: WorldPoint::splat(self.size),
            }],
            AggregateOptions::dynamic(ObjectKind::Scatter),
        )
    }
}

/// One aggregate stored by [`MemoryPhysics`].
#[derive(Debug, Clone)]
struct Aggregate {
    shapes: Vec<Shape>,
    options: AggregateOptions,
}

/// In-memory physics backend with no dynamics.
#[derive(Default)]
pub struct MemoryPhysics {
    /// Handle source
    handles: HandleAllocator,
    /// Live aggregates
    aggregates: AHashMap<ObjectHandle, Aggregate>,
    /// Collision-start handler
    handler: Option<CollisionHandler>,
}

impl MemoryPhysics {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live aggregates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.aggregates.len()
    }

    /// Whether no aggregate is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.aggregates.is_empty()
    }

    /// Checks whether a handle is live.
    #[must_use]
    pub fn contains(&self, handle: ObjectHandle) -> bool {
        self.aggregates.contains_key(&handle)
    }

    /// Shapes of an aggregate.
    #[must_use]
    pub fn shapes(&self, handle: ObjectHandle) -> Option<&[Shape]> {
        self.aggregates.get(&handle).map(|a| a.shapes.as_slice())
    }

    /// Options an aggregate was created with.
    #[must_use]
    pub fn options(&self, handle: ObjectHandle) -> Option<AggregateOptions> {
        self.aggregates.get(&handle).map(|a| a.options)
    }

    /// Number of live aggregates of a kind.
    #[must_use]
    pub fn count_kind(&self, kind: ObjectKind) -> usize {
        self.aggregates
            .values()
            .filter(|a| a.options.kind == kind)
            .count()
    }

    /// Live aggregates of `kind` whose bounds overlap `handle`'s bounds.
    #[must_use]
    pub fn overlapping(&self, handle: ObjectHandle, kind: ObjectKind) -> Vec<ObjectHandle> {
        let Some(bounds) = self.aggregate_bounds(handle) else {
            return Vec::new();
        };
        self.aggregates
            .iter()
            .filter(|(&other, a)| other != handle && a.options.kind == kind)
            .filter(|(&other, _)| {
                self.aggregate_bounds(other)
                    .is_some_and(|b| b.intersects(&bounds))
            })
            .map(|(&other, _)| other)
            .collect()
    }

    /// Delivers a collision-start between two objects to the handler.
    /// Returns `false` if either handle is gone or no handler is set.
    pub fn emit_collision(&mut self, a: ObjectHandle, b: ObjectHandle) -> bool {
        if !self.contains(a) || !self.contains(b) {
            return false;
        }
        match self.handler.as_mut() {
            Some(handler) => {
                handler(a, b);
                true
            },
            None => false,
        }
    }
}

impl PhysicsBackend for MemoryPhysics {
    fn create_aggregate(&mut self, shapes: Vec<Shape>, options: AggregateOptions) -> ObjectHandle {
        let handle = self.handles.next_handle();
        trace!("Created {:?} aggregate {handle} with {} shapes", options.kind, shapes.len());
        self.aggregates.insert(handle, Aggregate { shapes, options });
        handle
    }

    fn remove(&mut self, handle: ObjectHandle) -> bool {
        self.aggregates.remove(&handle).is_some()
    }

    fn aggregate_bounds(&self, handle: ObjectHandle) -> Option<Aabb> {
        let aggregate = self.aggregates.get(&handle)?;
        aggregate
            .shapes
            .iter()
            .map(Shape::bounds)
            .reduce(|a, b| a.union(&b))
    }

    fn translate(&mut self, handle: ObjectHandle, delta: WorldPoint) -> bool {
        match self.aggregates.get_mut(&handle) {
            Some(aggregate) => {
                aggregate.shapes.iter_mut().for_each(|s| s.translate(delta));
                true
            },
            None => false,
        }
    }

    fn set_collision_handler(&mut self, handler: CollisionHandler) {
        self.handler = Some(handler);
    }
}

impl std::fmt::Debug for MemoryPhysics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryPhysics")
            .field("aggregates", &self.aggregates.len())
            .field("issued", &self.handles.issued())
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn square(center: WorldPoint) -> Shape {
        Shape::Rect {
            center,
            size: WorldPoint::splat(10.0),
        }
    }

    #[test]
    fn test_aggregate_bounds_cover_all_shapes() {
        let mut physics = MemoryPhysics::new();
        let h = physics.create_aggregate(
            vec![
                square(WorldPoint::new(0.0, 0.0)),
                Shape::Polygon {
                    vertices: vec![
                        WorldPoint::new(20.0, 0.0),
                        WorldPoint::new(30.0, -20.0),
                        WorldPoint::new(40.0, 0.0),
                    ],
                },
            ],
            AggregateOptions::dynamic(ObjectKind::Other),
        );

        let bounds = physics.aggregate_bounds(h).expect("live handle");
        assert_eq!(bounds.min, WorldPoint::new(-5.0, -20.0));
        assert_eq!(bounds.max, WorldPoint::new(40.0, 5.0));
        assert_eq!(physics.aggregate_position(h), Some(WorldPoint::new(17.5, -7.5)));
    }

    #[test]
    fn test_empty_aggregate_has_no_center() {
        let mut physics = MemoryPhysics::new();
        let h = physics.create_aggregate(Vec::new(), AggregateOptions::dynamic(ObjectKind::Other));
        assert!(physics.aggregate_position(h).is_none());
        assert!(!physics.set_aggregate_position(h, WorldPoint::ZERO));
    }

    #[test]
    fn test_set_position_translates_whole_aggregate() {
        let mut physics = MemoryPhysics::new();
        let h = physics.create_aggregate(
            vec![square(WorldPoint::new(0.0, 0.0)), square(WorldPoint::new(30.0, 0.0))],
            AggregateOptions::dynamic(ObjectKind::Vehicle),
        );

        assert!(physics.set_aggregate_position(h, WorldPoint::new(1015.0, 50.0)));
        let shapes = physics.shapes(h).expect("live handle");
        assert_eq!(shapes[0], square(WorldPoint::new(1000.0, 50.0)));
        assert_eq!(shapes[1], square(WorldPoint::new(1030.0, 50.0)));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut physics = MemoryPhysics::new();
        let h = BoxScatter::default().spawn(&mut physics, WorldPoint::ZERO);
        assert_eq!(physics.count_kind(ObjectKind::Scatter), 1);
        assert!(physics.remove(h));
        assert!(!physics.remove(h));
        assert!(!physics.translate(h, WorldPoint::ONE));
        assert!(physics.is_empty());
    }

    #[test]
    fn test_collision_handler_receives_pairs() {
        let mut physics = MemoryPhysics::new();
        let a = BoxScatter::default().spawn(&mut physics, WorldPoint::ZERO);
        let b = BoxScatter::default().spawn(&mut physics, WorldPoint::ONE);

        assert!(!physics.emit_collision(a, b));

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        physics.set_collision_handler(Box::new(move |x, y| sink.borrow_mut().push((x, y))));

        assert!(physics.emit_collision(a, b));
        physics.remove(b);
        assert!(!physics.emit_collision(a, b));
        assert_eq!(*seen.borrow(), vec![(a, b)]);
    }

    #[test]
    fn test_regular_polygon_fits_radius() {
        let center = WorldPoint::new(100.0, -20.0);
        let shape = Shape::regular_polygon(center, 1, 10.0, 0.3);
        let Shape::Polygon { vertices } = &shape else {
            panic!("expected polygon");
        };
        assert_eq!(vertices.len(), 3);
        assert!(vertices
            .iter()
            .all(|v| ((*v - center).length() - 10.0).abs() < 1e-9));
        assert!(shape.bounds().width() <= 20.0 + 1e-9);
    }

    #[test]
    fn test_overlapping_filters_by_kind_and_bounds() {
        let mut physics = MemoryPhysics::new();
        let probe = physics.create_aggregate(
            vec![square(WorldPoint::ZERO)],
            AggregateOptions::dynamic(ObjectKind::Vehicle),
        );
        let near = BoxScatter::default().spawn(&mut physics, WorldPoint::new(20.0, 0.0));
        let far = BoxScatter::default().spawn(&mut physics, WorldPoint::new(500.0, 0.0));
        let ground = physics.create_aggregate(vec![square(WorldPoint::ONE)], AggregateOptions::TERRAIN);

        let hits = physics.overlapping(probe, ObjectKind::Scatter);
        assert_eq!(hits, vec![near]);
        assert!(!hits.contains(&far));
        assert_eq!(physics.overlapping(probe, ObjectKind::Terrain), vec![ground]);
        assert!(physics.overlapping(ObjectHandle::NULL, ObjectKind::Scatter).is_empty());
    }
}
