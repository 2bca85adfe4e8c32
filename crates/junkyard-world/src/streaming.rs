//! Focus-driven chunk streaming.
//!
//! Every focus update materializes a fixed, forward-biased window of chunks
//! around the focus chunk and advances a round-robin inspection cursor.

use tracing::{debug, info};

use crate::chunk::{ChunkIndex, ChunkTable};
use crate::config::{SeamPolicy, WorldConfig};
use crate::generation::HeightGenerator;
use crate::physics::{PhysicsBackend, ScatterSpawner};
use crate::terrain::{Materialization, Materializer};

/// What one streaming update did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamReport {
    /// Focus chunk for this update
    pub center: ChunkIndex,
    /// Chunks that received terrain
    pub built: Vec<u32>,
    /// Window indices outside the planet domain
    pub skipped: Vec<ChunkIndex>,
    /// Chunk inspected by the cursor
    pub inspected: u32,
    /// Chunk whose terrain was culled, if any
    pub culled: Option<u32>,
}

/// Decides which chunks must exist around the focus point.
#[derive(Debug, Clone)]
pub struct StreamingController {
    /// Chunk width
    x_per_chunk: f64,
    /// Planet circumference
    circumference: f64,
    /// Number of chunks
    chunks_count: u32,
    /// Chunks behind the focus chunk
    window_behind: u32,
    /// Chunks ahead of the focus chunk
    window_ahead: u32,
    /// Out-of-domain handling
    seam_policy: SeamPolicy,
    /// Terrain farther than this is culled by the cursor
    deactivate_radius: Option<u32>,
    /// Round-robin inspection cursor
    cursor: u32,
    /// Last focus chunk
    center: Option<ChunkIndex>,
}

impl StreamingController {
    /// Creates a controller from world configuration.
    #[must_use]
    pub fn from_config(config: &WorldConfig) -> Self {
        Self {
            x_per_chunk: config.x_per_chunk(),
            circumference: config.circumference(),
            chunks_count: config.chunks_count.max(1),
            window_behind: config.window_behind,
            window_ahead: config.window_ahead,
            seam_policy: config.seam_policy,
            deactivate_radius: config.deactivate_radius,
            cursor: 0,
            center: None,
        }
    }

    /// Chunk number containing world `x`: `floor(x / chunk_width)`.
    ///
    /// Unreduced outside the planet; the right edge `planet_max_x` itself
    /// belongs to the last chunk.
    #[must_use]
    pub fn chunk_num_at_x(&self, x: f64) -> ChunkIndex {
        let num = (x / self.x_per_chunk).floor() as ChunkIndex;
        let last = i64::from(self.chunks_count) - 1;
        if num > last && (0.0..=self.circumference).contains(&x) {
            last
        } else {
            num
        }
    }

    /// Chunk on the planet containing world `x`, for any `x`.
    #[must_use]
    pub fn chunk_index_on_planet(&self, x: f64) -> u32 {
        self.chunk_num_at_x(x.rem_euclid(self.circumference))
            .rem_euclid(i64::from(self.chunks_count)) as u32
    }

    /// Focus chunk for a focus `x`, always on the planet.
    ///
    /// Any number of laps past the seam maps onto the same chunk; the seam
    /// policy only decides what happens to window indices beyond it.
    #[must_use]
    pub fn center_for(&self, x: f64) -> ChunkIndex {
        i64::from(self.chunk_index_on_planet(x))
    }

    /// Chunk indices to materialize around `center`, ascending before any
    /// seam reduction.
    pub fn window(&self, center: ChunkIndex) -> impl Iterator<Item = ChunkIndex> + '_ {
        let start = center.saturating_sub(i64::from(self.window_behind));
        let end = center.saturating_add(i64::from(self.window_ahead));
        (start..=end).map(move |i| match self.seam_policy {
            SeamPolicy::Skip => i,
            SeamPolicy::Wrap => i.rem_euclid(i64::from(self.chunks_count)),
        })
    }

    /// Last focus chunk, if any update has run.
    #[must_use]
    pub const fn center(&self) -> Option<ChunkIndex> {
        self.center
    }

    /// Current inspection cursor.
    #[must_use]
    pub const fn cursor(&self) -> u32 {
        self.cursor
    }

    /// Shortest distance in chunks between two indices around the planet.
    #[must_use]
    pub fn circular_distance(&self, a: ChunkIndex, b: ChunkIndex) -> u32 {
        let count = i64::from(self.chunks_count);
        let d = (a - b).rem_euclid(count);
        d.min(count - d) as u32
    }

    /// Materializes the window around focus `x` and runs one cursor step.
    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &mut self,
        focus_x: f64,
        table: &mut ChunkTable,
        heights: &mut HeightGenerator,
        materializer: &mut Materializer,
        physics: &mut dyn PhysicsBackend,
        spawner: &mut dyn ScatterSpawner,
    ) -> StreamReport {
        let center = self.center_for(focus_x);
        if self.center != Some(center) {
            debug!("Focus moved to chunk {center} (from {:?})", self.center);
            self.center = Some(center);
        }

        let mut report = StreamReport {
            center,
            ..StreamReport::default()
        };
        let window: Vec<ChunkIndex> = self.window(center).collect();
        for index in window {
            match materializer.materialize(table, heights, index, physics, spawner) {
                Materialization::Built { index, .. } => report.built.push(index),
                Materialization::OutOfDomain { index } => report.skipped.push(index),
                Materialization::AlreadyMaterialized { .. } => {},
            }
        }

        let (inspected, culled) = self.inspect_next(center, table, physics);
        report.inspected = inspected;
        report.culled = culled;
        report
    }

    /// Advances the cursor and, when a deactivation radius is configured,
    /// removes the inspected chunk's terrain if it is too far from `center`.
    fn inspect_next(
        &mut self,
        center: ChunkIndex,
        table: &mut ChunkTable,
        physics: &mut dyn PhysicsBackend,
    ) -> (u32, Option<u32>) {
        self.cursor = (self.cursor + 1) % self.chunks_count;
        let inspected = self.cursor;

        let Some(radius) = self.deactivate_radius else {
            return (inspected, None);
        };
        if self.circular_distance(i64::from(inspected), center) <= radius {
            return (inspected, None);
        }
        let Some(terrain) = table
            .get_mut(i64::from(inspected))
            .and_then(|c| c.detach_terrain())
        else {
            return (inspected, None);
        };

        physics.remove(terrain);
        info!("Deactivated far chunk {inspected} (focus chunk {center})");
        (inspected, Some(inspected))
    }
}
