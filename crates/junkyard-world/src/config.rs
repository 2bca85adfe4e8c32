//! World configuration.
//!
//! Planet geometry, terrain ranges, streaming window and wrap margins.
//! Configuration can be loaded from and saved to a TOML file.

use std::f64::consts::TAU;
use std::fs;
use std::path::Path;

use junkyard_common::ConfigError;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// What to do with activation-window indices that fall outside `[0, chunks_count)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeamPolicy {
    /// Silently skip out-of-domain indices.
    #[default]
    Skip,
    /// Reduce indices modulo the chunk count so the window straddles the seam.
    Wrap,
}

/// Options consumed once at world start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkerOptions {
    /// World-x of a feature that needs a flat landing zone (None = no flattening)
    pub flatten_near_x: Option<f64>,
    /// Radius of the flat zone, in chunks
    pub flatten_chunk_range: u32,
}

impl Default for ChunkerOptions {
    fn default() -> Self {
        Self {
            flatten_near_x: None,
            flatten_chunk_range: 1,
        }
    }
}

/// World configuration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    // === Planet ===
    /// Planet radius; the walkable surface is one circumference wide
    pub planet_radius: f64,
    /// Number of equal-width chunks around the planet
    pub chunks_count: u32,
    /// Upper (smallest) Y an object may reach before being re-dropped
    pub planet_min_y: f64,
    /// Lower (largest) Y an object may reach before being re-dropped
    pub planet_max_y: f64,

    // === Terrain ===
    /// Lowest sampled terrain height
    pub min_terrain_height: f64,
    /// Highest sampled terrain height
    pub max_terrain_height: f64,
    /// Y of the slab center (world Y grows downward)
    pub floor_y: f64,
    /// Thickness of the flat slab under each chunk
    pub slab_height: f64,
    /// Overlap added to slab and wedge widths to hide seams between chunks
    pub seam_buffer: f64,
    /// Seed for terrain and scatter (None = random)
    pub seed: Option<u64>,

    // === Scatter ===
    /// Probability that a freshly materialized chunk gets scatter objects
    pub scatter_chance: f64,
    /// Maximum scatter objects per chunk
    pub scatter_max: u32,
    /// Distance above the local ground at which scatter is dropped
    pub scatter_clearance: f64,

    // === Streaming ===
    /// Chunks materialized behind the focus chunk
    pub window_behind: u32,
    /// Chunks materialized ahead of the focus chunk
    pub window_ahead: u32,
    /// Handling of window indices outside the planet domain
    pub seam_policy: SeamPolicy,
    /// Cull terrain farther than this many chunks from focus (None = never)
    pub deactivate_radius: Option<u32>,

    // === Wrapping ===
    /// Inward margin applied when an object is moved across the X seam
    pub wrap_margin: f64,
    /// Upward nudge applied when an object is moved across the X seam
    pub wrap_lift: f64,
    /// Offset below `planet_min_y` where out-of-bounds objects are re-dropped
    pub clamp_drop_offset: f64,

    // === Viewport ===
    /// Full viewport size at scale 1.0
    pub base_extent: (f64, f64),

    // === Chunker ===
    /// Flat-zone options
    pub chunker: ChunkerOptions,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            // Planet
            planet_radius: 10_000.0,
            chunks_count: 100,
            planet_min_y: -3000.0,
            planet_max_y: 3000.0,

            // Terrain
            min_terrain_height: 20.0,
            max_terrain_height: 500.0,
            floor_y: 600.0,
            slab_height: 400.0,
            seam_buffer: 2.0,
            seed: None,

            // Scatter
            scatter_chance: 0.25,
            scatter_max: 3,
            scatter_clearance: 130.0,

            // Streaming
            window_behind: 2,
            window_ahead: 3,
            seam_policy: SeamPolicy::Skip,
            deactivate_radius: None,

            // Wrapping
            wrap_margin: 10.0,
            wrap_lift: 10.0,
            clamp_drop_offset: 10.0,

            // Viewport
            base_extent: (800.0, 600.0),

            chunker: ChunkerOptions::default(),
        }
    }
}

impl WorldConfig {
    /// Planet circumference (width of the X domain).
    #[must_use]
    pub fn circumference(&self) -> f64 {
        TAU * self.planet_radius
    }

    /// Left edge of the X domain.
    #[must_use]
    pub const fn planet_min_x(&self) -> f64 {
        0.0
    }

    /// Right edge of the X domain.
    #[must_use]
    pub fn planet_max_x(&self) -> f64 {
        self.planet_min_x() + self.circumference()
    }

    /// Middle of the X domain.
    #[must_use]
    pub fn planet_middle_x(&self) -> f64 {
        (self.planet_max_x() - self.planet_min_x()) / 2.0
    }

    /// Width of one chunk.
    #[must_use]
    pub fn x_per_chunk(&self) -> f64 {
        self.circumference() / f64::from(self.chunks_count)
    }

    /// Parses a configuration from TOML text and validates it.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(text)?;
        config.check()?;
        config.validate();
        Ok(config)
    }

    /// Rejects values that cannot be clamped into something usable.
    ///
    /// A planet radius that is not a positive number is an error, since every
    /// derived measurement depends on it.
    pub fn check(&self) -> Result<(), ConfigError> {
        if self.planet_radius.is_finite() && self.planet_radius > 0.0 {
            Ok(())
        } else {
            Err(ConfigError::Invalid {
                field: "planet_radius",
                reason: format!("{} is not a positive length", self.planet_radius),
            })
        }
    }

    /// Load configuration from a specific path.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        load_or_default(path.as_ref(), Self::from_toml_str)
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        save_toml(self, path.as_ref())
    }

    /// Validate and clamp configuration values to sensible ranges.
    pub fn validate(&mut self) {
        let defaults = Self::default();

        // Planet
        if !(self.planet_radius.is_finite() && self.planet_radius > 0.0) {
            warn!("planet_radius {} unusable, resetting", self.planet_radius);
            self.planet_radius = defaults.planet_radius;
        }
        self.chunks_count = self.chunks_count.max(1);
        if self.planet_min_y > self.planet_max_y {
            std::mem::swap(&mut self.planet_min_y, &mut self.planet_max_y);
        }

        // Terrain
        self.min_terrain_height = self.min_terrain_height.max(0.0);
        self.max_terrain_height = self.max_terrain_height.max(0.0);
        if self.min_terrain_height > self.max_terrain_height {
            std::mem::swap(&mut self.min_terrain_height, &mut self.max_terrain_height);
        }
        self.slab_height = self.slab_height.max(1.0);
        self.seam_buffer = self.seam_buffer.max(0.0);

        // Scatter
        self.scatter_chance = self.scatter_chance.clamp(0.0, 1.0);
        self.scatter_max = self.scatter_max.clamp(1, 16);
        self.scatter_clearance = self.scatter_clearance.max(0.0);

        // Streaming
        let window = self.window_behind.max(self.window_ahead);
        self.deactivate_radius = self.deactivate_radius.map(|r| r.max(window));

        // Wrapping
        self.wrap_margin = self.wrap_margin.max(0.0);
        self.wrap_lift = self.wrap_lift.max(0.0);

        // Viewport
        if self.base_extent.0 <= 0.0 || self.base_extent.1 <= 0.0 {
            self.base_extent = defaults.base_extent;
        }
    }
}

/// Loads a TOML configuration file through `parse`.
/// Returns `T::default()` if the file doesn't exist or is invalid.
pub fn load_or_default<T, F>(path: &Path, parse: F) -> T
where
    T: Default,
    F: FnOnce(&str) -> Result<T, ConfigError>,
{
    if !path.exists() {
        info!("Config file {} not found, using defaults", path.display());
        return T::default();
    }

    let loaded = fs::read_to_string(path)
        .map_err(ConfigError::from)
        .and_then(|contents| parse(&contents));
    match loaded {
        Ok(config) => {
            info!("Loaded config from {}", path.display());
            config
        },
        Err(e) => {
            warn!("Failed to load config from {}: {e}", path.display());
            T::default()
        },
    }
}

/// Saves `value` as pretty TOML, creating parent directories if needed.
pub fn save_toml<T: Serialize>(value: &T, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let contents = toml::to_string_pretty(value)?;
    fs::write(path, contents)?;

    info!("Saved config to {}", path.display());
    Ok(())
}
