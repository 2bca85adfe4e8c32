//! Error types for Junkyard Planet.

use thiserror::Error;

use crate::ids::ObjectHandle;

/// Top-level error type for Junkyard operations.
#[derive(Debug, Error)]
pub enum JunkyardError {
    /// World/chunk errors
    #[error("World error: {0}")]
    World(#[from] WorldError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// World, chunk and wrap errors.
///
/// None of these are fatal to a simulation tick; callers skip the offending
/// chunk or object and carry on.
#[derive(Debug, Error)]
pub enum WorldError {
    /// A chunk index outside `[0, count)` was requested.
    #[error("Chunk {index} outside planet domain [0, {count})")]
    OutOfDomainChunk {
        /// Requested index
        index: i64,
        /// Number of chunks on the planet
        count: u32,
    },

    /// A wrappable object has no member shapes to compute a center from.
    #[error("Object {handle} has no shapes to compute an aggregate center")]
    MissingAggregateCenter {
        /// Offending handle
        handle: ObjectHandle,
    },

    /// The physics backend does not know this handle.
    #[error("Unknown object {handle}")]
    UnknownHandle {
        /// Offending handle
        handle: ObjectHandle,
    },
}

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read or written
    #[error("Config IO failed: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML for the expected schema
    #[error("Config parse failed: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config could not be serialized
    #[error("Config serialize failed: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A field holds an unusable value
    #[error("Invalid config field `{field}`: {reason}")]
    Invalid {
        /// Field name
        field: &'static str,
        /// Why it was rejected
        reason: String,
    },
}

/// Result type alias for world operations.
pub type WorldResult<T> = Result<T, WorldError>;

/// Result type alias for Junkyard operations.
pub type JunkyardResult<T> = Result<T, JunkyardError>;
