//! Storage-shaped records and their conversion into engine types.
//!
//! These mirror the rows the booking store hands back (`start_ts`,
//! `end_ts`, `bedroom_count`, `status`) and the single house settings row.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::instant::{self, DEFAULT_TIMEZONE};
use crate::model::{BookingStatus, CapacityPolicy, OccupiedInterval, TimeRange};

fn default_bedroom_count() -> u32 {
    1
}

fn default_max_bedrooms() -> u32 {
    4
}

fn default_min_nights() -> u32 {
    1
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

/// A booking row as stored.
///
/// `status` stays a plain string until [`BookingRecord::to_interval`] so a
/// row from a newer schema fails as `StayError::UnknownStatus` rather than
/// as a decoding error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub start_ts: String,
    pub end_ts: String,
    #[serde(default = "default_bedroom_count")]
    pub bedroom_count: u32,
    pub status: String,
}

impl BookingRecord {
    /// Normalise the row's timestamps and validate it as an interval.
    pub fn to_interval(&self, timezone: &str) -> Result<OccupiedInterval> {
        let start = instant::parse_instant(&self.start_ts, timezone)?;
        let end = instant::parse_instant(&self.end_ts, timezone)?;
        let status: BookingStatus = self.status.parse()?;
        OccupiedInterval::new(TimeRange::new(start, end)?, self.bedroom_count, status)
    }
}

/// Convert a batch of rows, failing on the first malformed one.
pub fn intervals_from_records(
    records: &[BookingRecord],
    timezone: &str,
) -> Result<Vec<OccupiedInterval>> {
    records.iter().map(|r| r.to_interval(timezone)).collect()
}

/// The house-wide settings row. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HouseSettings {
    #[serde(default)]
    pub buffer_days: u32,
    #[serde(default = "default_max_bedrooms")]
    pub max_bedrooms: u32,
    #[serde(default = "default_min_nights")]
    pub min_nights: u32,
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl Default for HouseSettings {
    fn default() -> Self {
        Self {
            buffer_days: 0,
            max_bedrooms: default_max_bedrooms(),
            min_nights: default_min_nights(),
            timezone: default_timezone(),
        }
    }
}

impl HouseSettings {
    /// Validate and convert into the engine's policy type.
    pub fn policy(&self) -> Result<CapacityPolicy> {
        instant::parse_timezone(&self.timezone)?;
        let policy = CapacityPolicy {
            max_bedrooms: self.max_bedrooms,
            buffer_days: self.buffer_days,
            min_nights: self.min_nights,
        };
        policy.validate()?;
        Ok(policy)
    }
}

/// Query parameters for a gap search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GapQuery {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub min_nights: Option<u32>,
}

impl GapQuery {
    /// Normalise `from` and `to` into a validated window.
    pub fn window(&self, timezone: &str) -> Result<TimeRange> {
        let from = instant::parse_instant(&self.from, timezone)?;
        let to = instant::parse_instant(&self.to, timezone)?;
        TimeRange::new(from, to)
    }

    pub fn min_nights_or(&self, fallback: u32) -> u32 {
        self.min_nights.unwrap_or(fallback)
    }
}
