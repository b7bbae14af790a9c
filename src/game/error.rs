//! Load-time error types.
//!
//! Only level loading and configuration can fail. Everything that happens per
//! frame is handled locally for the affected agent and never surfaces here.

use thiserror::Error;

/// Failure while building a level: bad grid shape or spawn overflow.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LevelError {
    #[error("tile grid is empty")]
    EmptyGrid,

    #[error("tile grid row {row} has {found} columns, expected {expected}")]
    RaggedGrid { row: usize, expected: usize, found: usize },

    #[error("tile grid holds {found} tiles, expected {cols}x{rows}")]
    TileCountMismatch { cols: usize, rows: usize, found: usize },

    #[error("tile size must be positive")]
    InvalidTileSize,

    #[error("agent capacity of {capacity} exceeded while spawning")]
    CapacityExceeded { capacity: usize },

    #[error("spawn for agent slot {index} has a non-finite or out-of-range coordinate or speed")]
    InvalidSpawn { index: usize },

    #[error("agent capacity must be at least one")]
    ZeroCapacity,
}

/// Failure while reading or validating [`InitialConfig`](crate::game::config::InitialConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("invalid config value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: &'static str },
}
