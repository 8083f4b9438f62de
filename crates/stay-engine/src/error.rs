//! Error types for stay-engine operations.
//!
//! Only malformed input is an error. "No gaps" and "capacity exceeded" are
//! ordinary values returned by the engine.

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StayError {
    /// A date-only string or timestamp could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    /// A range whose start is not strictly before its end.
    #[error("Invalid range: start {start} is not before end {end}")]
    InvalidRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Invalid bedroom count: {0} (must be at least 1)")]
    InvalidBedroomCount(u32),

    #[error("Invalid policy: {0}")]
    InvalidPolicy(String),

    #[error("Unknown booking status: {0}")]
    UnknownStatus(String),

    /// The storage collaborator failed to answer.
    #[error("Store error: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, StayError>;
