//! Core value types shared by the gap and capacity engines.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StayError};

/// An absolute point in time.
pub type Instant = DateTime<Utc>;

const SECONDS_PER_DAY: i64 = 86_400;

/// Ceiling of the whole-day span between two instants.
pub(crate) fn ceil_nights(start: Instant, end: Instant) -> i64 {
    let secs = (end - start).num_seconds();
    (secs + SECONDS_PER_DAY - 1).div_euclid(SECONDS_PER_DAY)
}

/// A half-open range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: Instant,
    pub end: Instant,
}

impl TimeRange {
    /// Build a range, rejecting zero-length and inverted input.
    pub fn new(start: Instant, end: Instant) -> Result<Self> {
        let range = Self { start, end };
        range.validate()?;
        Ok(range)
    }

    /// Fails with [`StayError::InvalidRange`] unless `start < end`.
    ///
    /// Ranges built with struct literal syntax or deserialised from storage
    /// skip [`TimeRange::new`], so the engine re-checks at its boundary.
    pub fn validate(&self) -> Result<()> {
        if self.start >= self.end {
            return Err(StayError::InvalidRange {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    pub fn nights(&self) -> i64 {
        ceil_nights(self.start, self.end)
    }

    pub fn contains(&self, instant: Instant) -> bool {
        self.start <= instant && instant < self.end
    }
}

/// Lifecycle state of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Approved,
    Hold,
    Blocked,
    Pending,
    Rejected,
    Cancelled,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 6] = [
        BookingStatus::Approved,
        BookingStatus::Hold,
        BookingStatus::Blocked,
        BookingStatus::Pending,
        BookingStatus::Rejected,
        BookingStatus::Cancelled,
    ];

    /// Whether a booking in this state reserves bedrooms.
    pub fn is_occupying(self) -> bool {
        match self {
            BookingStatus::Approved | BookingStatus::Hold | BookingStatus::Blocked => true,
            BookingStatus::Pending | BookingStatus::Rejected | BookingStatus::Cancelled => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Approved => "APPROVED",
            BookingStatus::Hold => "HOLD",
            BookingStatus::Blocked => "BLOCKED",
            BookingStatus::Pending => "PENDING",
            BookingStatus::Rejected => "REJECTED",
            BookingStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = StayError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_uppercase();
        BookingStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| StayError::UnknownStatus(s.to_string()))
    }
}

/// A booking that may hold bedrooms over its range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupiedInterval {
    pub range: TimeRange,
    pub bedroom_count: u32,
    pub status: BookingStatus,
}

impl OccupiedInterval {
    pub fn new(range: TimeRange, bedroom_count: u32, status: BookingStatus) -> Result<Self> {
        let interval = Self {
            range,
            bedroom_count,
            status,
        };
        interval.validate()?;
        Ok(interval)
    }

    pub fn validate(&self) -> Result<()> {
        self.range.validate()?;
        if self.bedroom_count == 0 {
            return Err(StayError::InvalidBedroomCount(self.bedroom_count));
        }
        Ok(())
    }

    pub fn is_occupying(&self) -> bool {
        self.status.is_occupying()
    }
}

/// A bookable window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gap {
    pub start: Instant,
    pub end: Instant,
    pub nights: i64,
}

/// Per-house booking rules, supplied on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityPolicy {
    pub max_bedrooms: u32,
    pub buffer_days: u32,
    pub min_nights: u32,
}

impl Default for CapacityPolicy {
    fn default() -> Self {
        Self {
            max_bedrooms: 4,
            buffer_days: 0,
            min_nights: 1,
        }
    }
}

impl CapacityPolicy {
    pub fn validate(&self) -> Result<()> {
        if self.max_bedrooms == 0 {
            return Err(StayError::InvalidPolicy(
                "max_bedrooms must be at least 1".to_string(),
            ));
        }
        if self.min_nights == 0 {
            return Err(StayError::InvalidPolicy(
                "min_nights must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// A request being evaluated for admission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRequest {
    pub range: TimeRange,
    pub bedroom_count: u32,
}

impl CandidateRequest {
    pub fn new(range: TimeRange, bedroom_count: u32) -> Result<Self> {
        let candidate = Self {
            range,
            bedroom_count,
        };
        candidate.validate()?;
        Ok(candidate)
    }

    pub fn validate(&self) -> Result<()> {
        self.range.validate()?;
        if self.bedroom_count == 0 {
            return Err(StayError::InvalidBedroomCount(self.bedroom_count));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn nights_round_partial_days_up() {
        let start = Utc.with_ymd_and_hms(2025, 1, 10, 15, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 1, 12, 10, 0, 0).unwrap();
        assert_eq!(TimeRange::new(start, end).unwrap().nights(), 2);
    }

    #[test]
    fn zero_length_range_rejected() {
        let t = Utc.with_ymd_and_hms(2025, 1, 10, 15, 0, 0).unwrap();
        assert!(matches!(
            TimeRange::new(t, t),
            Err(StayError::InvalidRange { .. })
        ));
    }

    #[test]
    fn status_parse_is_case_insensitive() {
        assert_eq!("hold".parse::<BookingStatus>().unwrap(), BookingStatus::Hold);
        assert!("WAITLIST".parse::<BookingStatus>().is_err());
    }

    #[test]
    fn only_approved_hold_blocked_occupy() {
        let occupying: Vec<_> = BookingStatus::ALL
            .into_iter()
            .filter(|s| s.is_occupying())
            .collect();
        assert_eq!(
            occupying,
            vec![
                BookingStatus::Approved,
                BookingStatus::Hold,
                BookingStatus::Blocked
            ]
        );
    }
}
