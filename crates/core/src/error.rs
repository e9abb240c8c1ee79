use thiserror::Error;

use crate::model::Direction;

/// Rejected count update.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UpdateError {
    /// A known direction carried a value that is not a non-negative integer.
    #[error("invalid count for {direction}: {value} ({reason})")]
    InvalidValue {
        /// Direction whose value failed to convert.
        direction: Direction,
        /// JSON rendering of the offending value.
        value: String,
        /// Why the conversion failed.
        reason: String,
    },
}

/// Rejected green timing configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("min green ({min}s) exceeds max green ({max}s)")]
    MinExceedsMax { min: u32, max: u32 },
    #[error("seconds per vehicle must be positive")]
    ZeroScale,
    #[error("min green must be at least one second")]
    ZeroMinGreen,
}

/// Unknown direction name.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown direction: {0}")]
pub struct ParseDirectionError(pub String);
