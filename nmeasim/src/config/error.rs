//! Configuration errors.
//!
//! Every variant is fatal at startup: a scenario that fails validation never
//! starts a simulation.

use std::path::PathBuf;

use thiserror::Error;

use super::duration::DurationParseError;
use crate::coord::CoordError;

/// Errors raised while loading or validating a simulation scenario.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the scenario file
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the scenario file
    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid JSON or does not match the schema
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A coordinate field could not be parsed or is out of range
    #[error("Invalid coordinate in {field}: {source}")]
    Coordinate {
        field: String,
        #[source]
        source: CoordError,
    },

    /// A duration field could not be parsed
    #[error("Invalid duration in {field}: {source}")]
    Duration {
        field: String,
        #[source]
        source: DurationParseError,
    },

    /// A route needs at least one waypoint
    #[error("Route must contain at least one waypoint")]
    EmptyRoute,

    /// A speed profile needs at least one segment
    #[error("Speed profile must contain at least one segment")]
    EmptyProfile,

    /// Only the final speed segment may run indefinitely
    #[error("Speed profile segment {index} has no duration but is not the last segment")]
    IndefiniteSegmentNotLast { index: usize },

    /// A speed segment has a bad speed or duration
    #[error("Speed profile segment {index}: {reason}")]
    InvalidSegment { index: usize, reason: String },

    /// Sentence name not in the supported set
    #[error("Unknown NMEA 0183 sentence type '{0}'")]
    UnknownSentence(String),

    /// PGN not in the encoder catalog
    #[error("Unsupported NMEA 2000 PGN {0}")]
    UnsupportedPgn(u32),

    /// MMSI is not a 9-digit number
    #[error("Invalid MMSI {0} (must be exactly 9 digits)")]
    InvalidMmsi(u64),

    /// Two vessels share one MMSI
    #[error("Duplicate MMSI {0}")]
    DuplicateMmsi(u32),

    /// Any other out-of-domain value
    #[error("Invalid configuration: {field} = '{value}' - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    /// Shorthand for [`ConfigError::InvalidValue`].
    pub fn invalid(
        field: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        ConfigError::InvalidValue {
            field: field.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}
