//! Chunk records and the sparse chunk table.

use ahash::AHashMap;
use junkyard_common::{ObjectHandle, WorldError, WorldResult};

use crate::generation::HeightGenerator;

/// Index of a chunk around the planet.
///
/// Signed because activation windows can reach below zero or past the
/// chunk count before any domain check.
pub type ChunkIndex = i64;

/// Heights and terrain of one chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkRecord {
    /// Height at the chunk's left edge
    pub h1: f64,
    /// Height at the chunk's midpoint
    pub h2: f64,
    /// Terrain aggregate, once materialized
    terrain: Option<ObjectHandle>,
}

impl ChunkRecord {
    /// Creates a height-only record.
    #[must_use]
    pub const fn new(h1: f64, h2: f64) -> Self {
        Self {
            h1,
            h2,
            terrain: None,
        }
    }

    /// Returns the terrain handle, if materialized.
    #[must_use]
    pub const fn terrain(&self) -> Option<ObjectHandle> {
        self.terrain
    }

    /// Returns whether terrain has been built for this chunk.
    #[must_use]
    pub const fn is_materialized(&self) -> bool {
        self.terrain.is_some()
    }

    /// Attaches terrain. Returns `false` and leaves the record untouched if
    /// terrain is already present.
    pub fn attach_terrain(&mut self, handle: ObjectHandle) -> bool {
        if self.terrain.is_some() {
            return false;
        }
        self.terrain = Some(handle);
        true
    }

    /// Detaches and returns the terrain handle. Heights are kept.
    pub fn detach_terrain(&mut self) -> Option<ObjectHandle> {
        self.terrain.take()
    }
}

/// Sparse store of chunk records keyed by chunk index.
///
/// Entries are created lazily on first query and never evicted.
#[derive(Debug, Clone)]
pub struct ChunkTable {
    /// Number of chunks in the domain
    count: u32,
    /// Sampled chunks
    chunks: AHashMap<u32, ChunkRecord>,
}

impl ChunkTable {
    /// Creates an empty table for a planet of `count` chunks.
    #[must_use]
    pub fn new(count: u32) -> Self {
        Self {
            count: count.max(1),
            chunks: AHashMap::new(),
        }
    }

    /// Returns the size of the chunk domain.
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }

    /// Checks whether an index lies in `[0, count)`.
    #[must_use]
    pub fn in_domain(&self, index: ChunkIndex) -> bool {
        (0..i64::from(self.count)).contains(&index)
    }

    /// Maps an index into the domain or reports it as out of range.
    pub fn domain_index(&self, index: ChunkIndex) -> WorldResult<u32> {
        if self.in_domain(index) {
            Ok(index as u32)
        } else {
            Err(WorldError::OutOfDomainChunk {
                index,
                count: self.count,
            })
        }
    }

    /// The chunk after `index`, wrapping at the seam.
    #[must_use]
    pub const fn next_index(&self, index: u32) -> u32 {
        (index + 1) % self.count
    }

    /// Gets a record if it has been sampled.
    #[must_use]
    pub fn get(&self, index: ChunkIndex) -> Option<&ChunkRecord> {
        let index = u32::try_from(index).ok()?;
        self.chunks.get(&index)
    }

    /// Gets a mutable record if it has been sampled.
    pub fn get_mut(&mut self, index: ChunkIndex) -> Option<&mut ChunkRecord> {
        let index = u32::try_from(index).ok()?;
        self.chunks.get_mut(&index)
    }

    /// Checks whether a record exists for `index`.
    #[must_use]
    pub fn has(&self, index: ChunkIndex) -> bool {
        self.get(index).is_some()
    }

    /// Gets a record, sampling and storing its heights on first use.
    pub fn get_or_create(
        &mut self,
        index: ChunkIndex,
        heights: &mut HeightGenerator,
    ) -> WorldResult<&mut ChunkRecord> {
        let index = self.domain_index(index)?;
        Ok(self.chunks.entry(index).or_insert_with(|| {
            let (h1, h2) = heights.sample(i64::from(index));
            ChunkRecord::new(h1, h2)
        }))
    }

    /// Number of sampled chunks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether no chunk has been sampled yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Number of chunks with terrain attached.
    #[must_use]
    pub fn materialized_count(&self) -> usize {
        self.chunks.values().filter(|c| c.is_materialized()).count()
    }

    /// Iterates over sampled chunks in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (ChunkIndex, &ChunkRecord)> {
        self.chunks.iter().map(|(&i, c)| (i64::from(i), c))
    }
}
