//! Procedural terrain heights.

use tracing::debug;

use crate::chunk::ChunkIndex;
use crate::config::{ChunkerOptions, WorldConfig};

/// Chunks around a world feature whose heights are halved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlattenZone {
    /// Chunk containing the feature
    pub center: ChunkIndex,
    /// Radius in chunks
    pub range: u32,
}

impl FlattenZone {
    /// Builds the zone for the given options, or `None` if no feature is set.
    #[must_use]
    pub fn from_options(options: &ChunkerOptions, x_per_chunk: f64) -> Option<Self> {
        let x = options.flatten_near_x?;
        Some(Self {
            center: (x / x_per_chunk).floor() as ChunkIndex,
            range: options.flatten_chunk_range,
        })
    }

    /// Checks whether a chunk lies inside the zone.
    #[must_use]
    pub fn contains(&self, index: ChunkIndex) -> bool {
        (self.center - index).unsigned_abs() <= u64::from(self.range)
    }
}

/// Samples two random heights per chunk.
#[derive(Debug, Clone)]
pub struct HeightGenerator {
    /// Random source
    rng: fastrand::Rng,
    /// Lowest height
    min_height: f64,
    /// Highest height
    max_height: f64,
    /// Optional flat landing zone
    flatten: Option<FlattenZone>,
}

impl HeightGenerator {
    /// Creates a generator drawing heights in `[min_height, max_height]`.
    #[must_use]
    pub fn new(min_height: f64, max_height: f64, seed: Option<u64>) -> Self {
        let rng = seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);
        Self {
            rng,
            min_height: min_height.min(max_height),
            max_height: max_height.max(min_height),
            flatten: None,
        }
    }

    /// Creates a generator from world configuration, including its flat zone.
    #[must_use]
    pub fn from_config(config: &WorldConfig) -> Self {
        let mut generator = Self::new(
            config.min_terrain_height,
            config.max_terrain_height,
            config.seed,
        );
        generator.set_options(&config.chunker, config.x_per_chunk());
        generator
    }

    /// Applies chunker options. Only affects chunks sampled afterwards.
    pub fn set_options(&mut self, options: &ChunkerOptions, x_per_chunk: f64) {
        self.flatten = FlattenZone::from_options(options, x_per_chunk);
        if let Some(zone) = self.flatten {
            debug!(
                "Flattening chunks within {} of chunk {}",
                zone.range, zone.center
            );
        }
    }

    /// Returns the active flat zone.
    #[must_use]
    pub const fn flatten_zone(&self) -> Option<FlattenZone> {
        self.flatten
    }

    /// Draws `(h1, h2)` for a chunk, halved inside the flat zone.
    pub fn sample(&mut self, index: ChunkIndex) -> (f64, f64) {
        let mut h1 = self.random_height();
        let mut h2 = self.random_height();
        if self.flatten.is_some_and(|zone| zone.contains(index)) {
            h1 /= 2.0;
            h2 /= 2.0;
        }
        (h1, h2)
    }

    fn random_height(&mut self) -> f64 {
        self.min_height + self.rng.f64() * (self.max_height - self.min_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heights_in_range() {
        let mut generator = HeightGenerator::new(20.0, 500.0, None);
        for i in 0..200 {
            let (h1, h2) = generator.sample(i);
            assert!((20.0..=500.0).contains(&h1));
            assert!((20.0..=500.0).contains(&h2));
        }
    }

    #[test]
    fn test_seeded_generation_deterministic() {
        let mut gen1 = HeightGenerator::new(20.0, 500.0, Some(42));
        let mut gen2 = HeightGenerator::new(20.0, 500.0, Some(42));
        for i in 0..10 {
            assert_eq!(gen1.sample(i), gen2.sample(i));
        }
    }

    #[test]
    fn test_flatten_zone_halves_neighbors_only() {
        let w = 100.0;
        let options = ChunkerOptions {
            flatten_near_x: Some(50.5 * w),
            flatten_chunk_range: 1,
        };
        let mut plain = HeightGenerator::new(20.0, 500.0, Some(9));
        let mut flat = HeightGenerator::new(20.0, 500.0, Some(9));
        flat.set_options(&options, w);

        for i in 0..100 {
            let (p1, p2) = plain.sample(i);
            let (f1, f2) = flat.sample(i);
            if (49..=51).contains(&i) {
                assert_eq!((f1, f2), (p1 / 2.0, p2 / 2.0), "chunk {i}");
            } else {
                assert_eq!((f1, f2), (p1, p2), "chunk {i}");
            }
        }
    }

    #[test]
    fn test_no_flatten_without_feature() {
        let options = ChunkerOptions::default();
        assert!(FlattenZone::from_options(&options, 10.0).is_none());

        let zone = FlattenZone { center: 5, range: 0 };
        assert!(zone.contains(5));
        assert!(!zone.contains(4));
    }
}
