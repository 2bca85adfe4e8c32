//! Engine configuration.
//!
//! Wraps the world configuration with the demo drive parameters. Loaded from
//! `junkyard.toml` (or a path given on the command line) and saved back as
//! TOML.

use junkyard_common::ConfigError;
use junkyard_world::{load_or_default, save_toml, WorldConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

/// Configuration file name.
pub const CONFIG_FILE: &str = "junkyard.toml";

/// Engine configuration parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === World Settings ===
    /// Planet, terrain, streaming and wrap settings
    pub world: WorldConfig,

    // === Drive Settings ===
    /// Number of ticks to simulate
    pub ticks: u64,
    /// Horizontal vehicle speed in world units per tick (negative drives left)
    pub vehicle_speed: f64,
    /// Vehicle start X (None = planet middle)
    pub start_x: Option<f64>,
    /// Flatten the terrain around the start point
    pub flatten_start: bool,

    // === Debug Settings ===
    /// Log world debug info every N ticks
    pub log_every: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),

            ticks: 600,
            vehicle_speed: 60.0,
            start_x: None,
            flatten_start: true,

            log_every: 60,
        }
    }
}

impl EngineConfig {
    /// Parses a configuration from TOML text and validates it.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(text)?;
        config.world.check()?;
        config.validate();
        Ok(config)
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
        self.world.validate();

        self.ticks = self.ticks.clamp(1, 1_000_000);
        self.log_every = self.log_every.max(1);

        // Faster than one chunk per tick would step over the streaming window
        let max_speed = self.world.x_per_chunk();
        if !self.vehicle_speed.is_finite() {
            warn!("vehicle_speed {} unusable, resetting", self.vehicle_speed);
            self.vehicle_speed = Self::default().vehicle_speed;
        }
        self.vehicle_speed = self.vehicle_speed.clamp(-max_speed, max_speed);

        if let Some(x) = self.start_x {
            if !x.is_finite() {
                self.start_x = None;
            }
        }
    }

    /// Where the vehicle starts.
    #[must_use]
    pub fn start_position(&self) -> f64 {
        self.start_x.unwrap_or_else(|| self.world.planet_middle_x())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.ticks, 600);
        assert!(config.start_x.is_none());
        assert_eq!(config.world.chunks_count, 100);
        assert_eq!(config.start_position(), config.world.planet_middle_x());
    }

    #[test]
    fn test_config_validation() {
        let mut config = EngineConfig::default();

        config.ticks = 0;
        config.log_every = 0;
        config.vehicle_speed = 1.0e9;
        config.start_x = Some(f64::NAN);
        config.world.scatter_chance = 3.0;

        config.validate();

        assert_eq!(config.ticks, 1);
        assert_eq!(config.log_every, 1);
        assert!((config.vehicle_speed - config.world.x_per_chunk()).abs() < 1e-9);
        assert!(config.start_x.is_none());
        assert_eq!(config.world.scatter_chance, 1.0);
    }

    #[test]
    fn test_config_save_load() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("nested").join("junkyard.toml");

        let mut config = EngineConfig::default();
        config.ticks = 42;
        config.start_x = Some(1234.5);
        config.world.seed = Some(12345);

        config.save_to(&config_path).expect("Failed to save config");

        let loaded = EngineConfig::load_from(&config_path);
        assert_eq!(loaded.ticks, 42);
        assert_eq!(loaded.start_x, Some(1234.5));
        assert_eq!(loaded.world.seed, Some(12345));
    }

    #[test]
    fn test_config_load_missing_file() {
        let config = EngineConfig::load_from("/nonexistent/path/junkyard.toml");
        assert_eq!(config.ticks, 600);
    }

    #[test]
    fn test_config_partial_toml() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("junkyard.toml");
        fs::write(&config_path, "ticks = 10\n\n[world]\nchunks_count = 12\n")
            .expect("Failed to write config");

        let config = EngineConfig::load_from(&config_path);
        assert_eq!(config.ticks, 10);
        assert_eq!(config.world.chunks_count, 12);
        assert_eq!(config.vehicle_speed, 60.0);
    }

    #[test]
    fn test_config_rejects_bad_world_radius() {
        let err = EngineConfig::from_toml_str("ticks = 5\n\n[world]\nplanet_radius = 0.0\n");
        assert!(matches!(
            err,
            Err(ConfigError::Invalid {
                field: "planet_radius",
                ..
            })
        ));

        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("junkyard.toml");
        fs::write(&config_path, "ticks = 5\n\n[world]\nplanet_radius = 0.0\n")
            .expect("Failed to write config");
        let config = EngineConfig::load_from(&config_path);
        assert_eq!(config.ticks, 600);
        assert_eq!(config.world.planet_radius, 10_000.0);
    }

    #[test]
    fn test_config_invalid_toml_falls_back() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("junkyard.toml");
        fs::write(&config_path, "ticks = \"many\"").expect("Failed to write config");

        let config = EngineConfig::load_from(&config_path);
        assert_eq!(config.ticks, 600);
    }
}
