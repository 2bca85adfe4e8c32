//! # Junkyard World
//!
//! World management for Junkyard Planet: an endless side-scrolling world on
//! the surface of a cylindrical planet.
//!
//! This crate handles:
//! - Lazy, continuous terrain generation in fixed-width chunks
//! - Focus-driven chunk streaming
//! - Wrapping objects across the planet seam
//! - Viewport focus and zoom
//! - Deferred one-shot actions on the tick timeline

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod chunk;
pub mod config;
pub mod generation;
pub mod physics;
pub mod schedule;
pub mod streaming;
pub mod terrain;
pub mod viewport;
pub mod world;
pub mod wrap;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::chunk::*;
    pub use crate::config::*;
    pub use crate::generation::*;
    pub use crate::physics::*;
    pub use crate::schedule::*;
    pub use crate::streaming::*;
    pub use crate::terrain::*;
    pub use crate::viewport::*;
    pub use crate::world::*;
    pub use crate::wrap::*;
}

pub use prelude::*;
