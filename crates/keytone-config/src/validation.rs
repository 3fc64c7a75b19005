//! Range checks for configuration values.
//!
//! Every numeric field in [`EngineConfig`](crate::EngineConfig) has an
//! accepted range. [`EngineConfig::validate`](crate::EngineConfig::validate)
//! runs every check and returns the first failure.

use thiserror::Error;

/// Accepted sample rates, in Hz.
pub const SAMPLE_RATE_RANGE: (u64, u64) = (8_000, 192_000);
/// Accepted output channel counts.
pub const CHANNELS_RANGE: (u64, u64) = (1, 8);
/// Accepted render block sizes, in frames.
pub const BLOCK_SIZE_RANGE: (u64, u64) = (1, 8192);
/// Accepted device buffer sizes, in frames.
pub const BUFFER_SIZE_RANGE: (u64, u64) = (16, 16_384);
/// Accepted scheduler tick intervals, in milliseconds.
pub const TICK_INTERVAL_RANGE: (u64, u64) = (1, 1000);
/// Smallest graph the engine will run with.
pub const MIN_NODES: u64 = 64;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Value outside a closed range.
    #[error("{field} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        /// Dotted field name, e.g. `audio.sample_rate`.
        field: &'static str,
        /// The rejected value.
        value: u64,
        /// Minimum allowed value.
        min: u64,
        /// Maximum allowed value.
        max: u64,
    },

    /// Value below a lower bound.
    #[error("{field} = {value} is below the minimum of {min}")]
    TooSmall {
        /// Dotted field name.
        field: &'static str,
        /// The rejected value.
        value: u64,
        /// Minimum allowed value.
        min: u64,
    },

    /// An empty string where a name is required.
    #[error("{0} must not be empty")]
    Empty(&'static str),
}

/// Result type for validation checks.
pub type ValidationResult<T = ()> = Result<T, ValidationError>;

/// Check `value` against the closed `range`.
pub fn check_range(field: &'static str, value: u64, range: (u64, u64)) -> ValidationResult {
    let (min, max) = range;
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

/// Check `value >= min`.
pub fn check_min(field: &'static str, value: u64, min: u64) -> ValidationResult {
    if value >= min {
        Ok(())
    } else {
        Err(ValidationError::TooSmall { field, value, min })
    }
}
