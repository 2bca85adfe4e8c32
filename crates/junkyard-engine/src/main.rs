//! # Junkyard Engine
//!
//! Headless entry point for Junkyard Planet: a side-scrolling world on the
//! surface of a cylindrical planet.
//!
//! This binary ties together:
//! - Configuration: `junkyard.toml`, or the path given as the first argument
//! - World: chunk streaming, terrain, seam wrapping and deferred removals
//! - A demo vehicle driving across the planet and collecting junk

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod app;
mod config;
mod junk;

use anyhow::Result;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::app::Drive;
use crate::config::{EngineConfig, CONFIG_FILE};

/// Main entry point.
fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("junkyard=info".parse()?))
        .init();

    info!("Junkyard Planet starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let path = std::env::args_os()
        .nth(1)
        .map_or_else(|| PathBuf::from(CONFIG_FILE), PathBuf::from);
    let mut config = EngineConfig::load_from(&path);
    config.validate();

    let mut drive = Drive::new(&config);
    let stats = drive.run(config.ticks);

    info!(
        "Drove vehicle {} for {} ticks: {} wraps, {} of {} junk collected, {} deferred actions, ends at x={:.1}",
        drive.vehicle(),
        stats.ticks,
        stats.wraps,
        stats.collected,
        drive.junk_spawned(),
        stats.fired,
        stats.final_x
    );
    if let Some(frame) = drive.camera().last {
        info!(
            "Final frame {:.0}x{:.0} around ({:.1}, {:.1}), {} objects live",
            frame.width(),
            frame.height(),
            frame.center().x,
            frame.center().y,
            drive.physics().len()
        );
    }

    info!("Junkyard Planet shutdown complete");
    Ok(())
}
