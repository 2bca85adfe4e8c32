//! Chunk materialization: terrain geometry and scatter.
//!
//! Each chunk's surface is a flat slab plus two wedges: the left wedge runs
//! from the chunk's left-edge height `h1` to its midpoint height `h2`, the
//! right wedge from `h2` to the next chunk's `h1`. Reading that third height
//! from the neighbour record keeps adjacent chunks continuous.

use junkyard_common::{ObjectHandle, WorldPoint};
use tracing::{debug, trace};

use crate::chunk::{ChunkIndex, ChunkTable};
use crate::config::WorldConfig;
use crate::generation::HeightGenerator;
use crate::physics::{AggregateOptions, PhysicsBackend, ScatterSpawner, Shape};

/// The three heights that shape one chunk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChunkHeights {
    /// Height at the left edge
    pub h1: f64,
    /// Height at the midpoint
    pub h2: f64,
    /// Height at the right edge (next chunk's `h1`)
    pub h3: f64,
}

impl ChunkHeights {
    /// Reads a chunk's heights, sampling it and its right neighbour if needed.
    pub fn read_or_sample(
        table: &mut ChunkTable,
        heights: &mut HeightGenerator,
        index: u32,
    ) -> junkyard_common::WorldResult<Self> {
        let next = table.next_index(index);
        let (h1, h2) = {
            let record = table.get_or_create(i64::from(index), heights)?;
            (record.h1, record.h2)
        };
        let h3 = table.get_or_create(i64::from(next), heights)?.h1;
        Ok(Self { h1, h2, h3 })
    }

    /// Reads heights of already-sampled chunks without sampling.
    #[must_use]
    pub fn read(table: &ChunkTable, index: u32) -> Option<Self> {
        let record = table.get(i64::from(index))?;
        let next = table.get(i64::from(table.next_index(index)))?;
        Some(Self {
            h1: record.h1,
            h2: record.h2,
            h3: next.h1,
        })
    }

    /// Surface height at fraction `t` in `[0, 1]` across the chunk.
    #[must_use]
    pub fn height_at(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        if t <= 0.5 {
            lerp(self.h1, self.h2, t * 2.0)
        } else {
            lerp(self.h2, self.h3, (t - 0.5) * 2.0)
        }
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Horizontal placement and vertical datum shared by every chunk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainLayout {
    /// Chunk width
    pub x_per_chunk: f64,
    /// Slab center Y
    pub floor_y: f64,
    /// Slab thickness
    pub slab_height: f64,
    /// Overlap between neighbouring pieces
    pub seam_buffer: f64,
}

impl TerrainLayout {
    /// Builds the layout from world configuration.
    #[must_use]
    pub fn from_config(config: &WorldConfig) -> Self {
        Self {
            x_per_chunk: config.x_per_chunk(),
            floor_y: config.floor_y,
            slab_height: config.slab_height,
            seam_buffer: config.seam_buffer,
        }
    }

    /// Left edge X of a chunk.
    #[must_use]
    pub fn left_x(&self, index: ChunkIndex) -> f64 {
        index as f64 * self.x_per_chunk
    }

    /// Top of the slab, where the wedges stand.
    #[must_use]
    pub fn base_y(&self) -> f64 {
        self.floor_y - self.slab_height / 2.0
    }

    /// Ground surface Y at world `x` inside chunk `index`.
    #[must_use]
    pub fn surface_y(&self, index: ChunkIndex, heights: &ChunkHeights, x: f64) -> f64 {
        let t = (x - self.left_x(index)) / self.x_per_chunk;
        self.base_y() - heights.height_at(t)
    }

    /// Slab plus left and right wedges for one chunk.
    #[must_use]
    pub fn shapes(&self, index: ChunkIndex, heights: &ChunkHeights) -> Vec<Shape> {
        let left = self.left_x(index);
        let mid = left + self.x_per_chunk / 2.0;
        let right = left + self.x_per_chunk;
        let base = self.base_y();
        let buffer = self.seam_buffer;

        let slab = Shape::Rect {
            center: WorldPoint::new(mid, self.floor_y),
            size: WorldPoint::new(self.x_per_chunk + buffer, self.slab_height + buffer),
        };
        let wedge = |x0: f64, x1: f64, a: f64, b: f64| Shape::Polygon {
            vertices: vec![
                WorldPoint::new(x0, base),
                WorldPoint::new(x0, base - a),
                WorldPoint::new(x1 + buffer, base - b),
                WorldPoint::new(x1 + buffer, base),
            ],
        };

        vec![
            slab,
            wedge(left, mid, heights.h1, heights.h2),
            wedge(mid, right, heights.h2, heights.h3),
        ]
    }
}

/// Result of a materialization request.
#[derive(Debug, Clone, PartialEq)]
pub enum Materialization {
    /// Terrain was built this call.
    Built {
        /// Chunk in domain
        index: u32,
        /// Terrain aggregate
        terrain: ObjectHandle,
        /// Scatter spawned on top
        scatter: Vec<ObjectHandle>,
    },
    /// The chunk already had terrain; nothing changed.
    AlreadyMaterialized {
        /// Chunk in domain
        index: u32,
    },
    /// The index is outside the planet domain; nothing changed.
    OutOfDomain {
        /// Requested index
        index: ChunkIndex,
    },
}

impl Materialization {
    /// Whether terrain was created.
    #[must_use]
    pub const fn is_built(&self) -> bool {
        matches!(self, Self::Built { .. })
    }
}

/// Turns sampled heights into terrain and scatter.
#[derive(Debug, Clone)]
pub struct Materializer {
    /// Geometry
    layout: TerrainLayout,
    /// Scatter roll source
    rng: fastrand::Rng,
    /// Scatter probability per chunk
    scatter_chance: f64,
    /// Maximum scatter per chunk
    scatter_max: u32,
    /// Drop height above ground
    scatter_clearance: f64,
}

impl Materializer {
    /// Creates a materializer from world configuration.
    #[must_use]
    pub fn from_config(config: &WorldConfig) -> Self {
        let rng = config.seed.map_or_else(fastrand::Rng::new, |seed| {
            fastrand::Rng::with_seed(seed.wrapping_add(1))
        });
        Self {
            layout: TerrainLayout::from_config(config),
            rng,
            scatter_chance: config.scatter_chance,
            scatter_max: config.scatter_max.max(1),
            scatter_clearance: config.scatter_clearance,
        }
    }

    /// Returns the terrain layout.
    #[must_use]
    pub const fn layout(&self) -> &TerrainLayout {
        &self.layout
    }

    /// Builds terrain for a chunk unless it is out of domain or already built.
    pub fn materialize(
        &mut self,
        table: &mut ChunkTable,
        heights: &mut HeightGenerator,
        index: ChunkIndex,
        physics: &mut dyn PhysicsBackend,
        spawner: &mut dyn ScatterSpawner,
    ) -> Materialization {
        let Ok(domain) = table.domain_index(index) else {
            trace!("Skipping out-of-domain chunk {index}");
            return Materialization::OutOfDomain { index };
        };
        if table.get(index).is_some_and(|c| c.is_materialized()) {
            trace!("Chunk {index} already materialized");
            return Materialization::AlreadyMaterialized { index: domain };
        }

        let chunk_heights = match ChunkHeights::read_or_sample(table, heights, domain) {
            Ok(h) => h,
            Err(e) => {
                trace!("Skipping chunk {index}: {e}");
                return Materialization::OutOfDomain { index };
            },
        };

        let terrain = physics.create_aggregate(
            self.layout.shapes(index, &chunk_heights),
            AggregateOptions::TERRAIN,
        );
        if let Some(record) = table.get_mut(index) {
            record.attach_terrain(terrain);
        }

        let scatter = self.scatter(index, &chunk_heights, physics, spawner);
        debug!(
            "Materialized chunk {index} (h1={:.1}, h2={:.1}, h3={:.1}, scatter={})",
            chunk_heights.h1,
            chunk_heights.h2,
            chunk_heights.h3,
            scatter.len()
        );

        Materialization::Built {
            index: domain,
            terrain,
            scatter,
        }
    }

    /// Occasionally drops 1..=`scatter_max` objects above the chunk's ground.
    fn scatter(
        &mut self,
        index: ChunkIndex,
        heights: &ChunkHeights,
        physics: &mut dyn PhysicsBackend,
        spawner: &mut dyn ScatterSpawner,
    ) -> Vec<ObjectHandle> {
        if self.rng.f64() >= self.scatter_chance {
            return Vec::new();
        }
        let count = self.rng.u32(1..=self.scatter_max);
        let left = self.layout.left_x(index);
        (0..count)
            .map(|_| {
                let x = left + self.rng.f64() * self.layout.x_per_chunk;
                let y = self.layout.surface_y(index, heights, x) - self.scatter_clearance;
                spawner.spawn(physics, WorldPoint::new(x, y))
            })
            .collect()
    }
}
