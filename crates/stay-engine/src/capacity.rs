//! Bedroom-capacity admission for candidate bookings.
//!
//! Bedroom counts are constant across a booking, so concurrent usage inside
//! the candidate's range only changes at the boundaries of the bookings that
//! overlap it. A sweep over those boundaries finds the peak without walking
//! the calendar day by day.
//!
//! Only bookings that hold bedrooms at the same moment add up. Two stays that
//! each overlap the candidate but never each other do not stack, so this
//! admits requests that a plain sum over every overlapping booking would
//! turn away.
//!
//! [`check_capacity`] answers "would this be safe" against a snapshot. It is
//! a pre-check, not the authority: two callers holding the same stale
//! snapshot can both be told "admitted". The serialized commit in
//! [`crate::store::BookingStore::commit`] is where admission is decided.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, StayError};
use crate::model::{CandidateRequest, Instant, OccupiedInterval};
use crate::overlap::ranges_overlap;

/// Why a candidate was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CapacityRejection {
    /// The candidate's bedrooms plus the peak already booked exceed the house.
    Exceeded {
        requested: u32,
        available: u32,
        max_bedrooms: u32,
    },
}

impl fmt::Display for CapacityRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapacityRejection::Exceeded {
                requested,
                available,
                max_bedrooms,
            } => write!(
                f,
                "capacity exceeded: requested {} bedroom(s) but only {} of {} free for these dates",
                requested, available, max_bedrooms
            ),
        }
    }
}

/// Outcome of a capacity check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityDecision {
    pub admitted: bool,
    pub reason: Option<CapacityRejection>,
    /// Peak concurrent bedrooms over the candidate's range, candidate included.
    pub bedrooms_in_use_at_peak: u32,
    /// Bedrooms still free at the busiest point before the candidate.
    pub available_bedrooms: u32,
    /// Occupying bookings that overlap the candidate.
    pub overlapping_bookings: usize,
}

/// Bedroom usage at a single instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupancySnapshot {
    pub at: Instant,
    pub bedrooms_in_use: u32,
    pub max_bedrooms: u32,
    pub available_bedrooms: u32,
    pub active_bookings: usize,
}

/// Decide whether `candidate` fits alongside the occupying bookings in
/// `occupied` without exceeding `max_bedrooms` at any instant.
///
/// # Errors
/// Returns `StayError::InvalidRange` or `StayError::InvalidBedroomCount` for
/// malformed candidate or intervals, and `StayError::InvalidPolicy` when
/// `max_bedrooms` is zero.
pub fn check_capacity(
    occupied: &[OccupiedInterval],
    candidate: &CandidateRequest,
    max_bedrooms: u32,
) -> Result<CapacityDecision> {
    candidate.validate()?;
    if max_bedrooms == 0 {
        return Err(StayError::InvalidPolicy(
            "max_bedrooms must be at least 1".to_string(),
        ));
    }

    let mut overlapping = Vec::new();
    for interval in occupied {
        interval.validate()?;
        if interval.is_occupying() && ranges_overlap(&interval.range, &candidate.range) {
            overlapping.push(interval);
        }
    }

    let existing_peak = peak_concurrent(&overlapping, candidate);
    let in_use_at_peak = existing_peak.saturating_add(candidate.bedroom_count);
    let available = max_bedrooms.saturating_sub(existing_peak);
    let admitted = in_use_at_peak <= max_bedrooms;

    let reason = (!admitted).then_some(CapacityRejection::Exceeded {
        requested: candidate.bedroom_count,
        available,
        max_bedrooms,
    });

    debug!(
        admitted,
        peak = in_use_at_peak,
        available,
        overlapping = overlapping.len(),
        "capacity check"
    );

    Ok(CapacityDecision {
        admitted,
        reason,
        bedrooms_in_use_at_peak: in_use_at_peak,
        available_bedrooms: available,
        overlapping_bookings: overlapping.len(),
    })
}

/// Peak bedrooms held by `overlapping` at any instant inside the candidate.
fn peak_concurrent(overlapping: &[&OccupiedInterval], candidate: &CandidateRequest) -> u32 {
    // Sweep events: (+count at start, -count at end), clipped to the candidate.
    let mut events: Vec<(Instant, i64)> = Vec::with_capacity(overlapping.len() * 2);
    for interval in overlapping {
        let count = i64::from(interval.bedroom_count);
        events.push((interval.range.start.max(candidate.range.start), count));
        events.push((interval.range.end.min(candidate.range.end), -count));
    }
    // Ends sort before starts at the same instant: touching bookings never
    // hold bedrooms together.
    events.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));

    let mut current: i64 = 0;
    let mut peak: i64 = 0;
    for (_, delta) in events {
        current += delta;
        peak = peak.max(current);
    }
    u32::try_from(peak).unwrap_or(u32::MAX)
}

/// Bedrooms held by occupying bookings at `at`.
pub fn bedrooms_in_use_at(occupied: &[OccupiedInterval], at: Instant) -> u32 {
    occupied
        .iter()
        .filter(|interval| interval.is_occupying() && interval.range.contains(at))
        .map(|interval| interval.bedroom_count)
        .fold(0u32, u32::saturating_add)
}

/// House occupancy at a single instant, e.g. "today" on the admin screen.
pub fn occupancy_at(
    occupied: &[OccupiedInterval],
    at: Instant,
    max_bedrooms: u32,
) -> OccupancySnapshot {
    let bedrooms_in_use = bedrooms_in_use_at(occupied, at);
    let active_bookings = occupied
        .iter()
        .filter(|interval| interval.is_occupying() && interval.range.contains(at))
        .count();
    OccupancySnapshot {
        at,
        bedrooms_in_use,
        max_bedrooms,
        available_bedrooms: max_bedrooms.saturating_sub(bedrooms_in_use),
        active_bookings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BookingStatus, TimeRange};
    use chrono::{TimeZone, Utc};

    fn day(d: u32) -> Instant {
        Utc.with_ymd_and_hms(2025, 1, d, 0, 0, 0).unwrap()
    }

    fn booking(start: u32, end: u32, bedrooms: u32) -> OccupiedInterval {
        OccupiedInterval::new(
            TimeRange::new(day(start), day(end)).unwrap(),
            bedrooms,
            BookingStatus::Approved,
        )
        .unwrap()
    }

    #[test]
    fn disjoint_overlaps_do_not_stack() {
        // 1-5 and 6-10 each hold 3 bedrooms but never at the same time.
        let occupied = vec![booking(1, 5, 3), booking(6, 10, 3)];
        let candidate = CandidateRequest::new(TimeRange::new(day(1), day(10)).unwrap(), 1).unwrap();
        let overlapping: Vec<_> = occupied.iter().collect();
        assert_eq!(peak_concurrent(&overlapping, &candidate), 3);
    }

    #[test]
    fn touching_bookings_not_counted_together() {
        let occupied = vec![booking(1, 5, 2), booking(5, 10, 2)];
        let candidate = CandidateRequest::new(TimeRange::new(day(1), day(10)).unwrap(), 1).unwrap();
        let overlapping: Vec<_> = occupied.iter().collect();
        assert_eq!(peak_concurrent(&overlapping, &candidate), 2);
    }
}
