//! Compute bookable gaps between occupied stays.
//!
//! Sorts occupying intervals by start, then walks them with a cursor that
//! only ever moves forward. Each interval excludes `[start - buffer,
//! end + buffer)` from the gaps around it: the leading buffer shortens the
//! gap before check-in, the trailing buffer pushes the cursor past checkout.

use chrono::Duration;
use tracing::debug;

use crate::error::{Result, StayError};
use crate::model::{ceil_nights, CapacityPolicy, Gap, Instant, OccupiedInterval, TimeRange};

/// Find the gaps within `[from, to]` that a new stay could occupy.
///
/// Intervals whose status is not occupying are ignored. Overlapping and
/// unsorted intervals are fine. A gap is emitted only if it spans at least
/// `min_nights` nights on its own; gaps are never merged across an occupied
/// interval.
///
/// # Errors
/// Returns `StayError::InvalidRange` if the window or any interval has
/// `start >= end`, and `StayError::InvalidPolicy` if `min_nights` is zero.
pub fn calculate_gaps(
    occupied: &[OccupiedInterval],
    from: Instant,
    to: Instant,
    min_nights: u32,
    buffer_days: u32,
) -> Result<Vec<Gap>> {
    TimeRange::new(from, to)?;
    if min_nights == 0 {
        return Err(StayError::InvalidPolicy(
            "min_nights must be at least 1".to_string(),
        ));
    }

    let mut busy: Vec<&TimeRange> = Vec::with_capacity(occupied.len());
    for interval in occupied {
        interval.range.validate()?;
        if interval.is_occupying() {
            busy.push(&interval.range);
        }
    }
    busy.sort_by_key(|range| range.start);

    let buffer = Duration::days(i64::from(buffer_days));
    let min_nights = i64::from(min_nights);
    let mut gaps = Vec::new();
    let mut cursor = from;

    for range in busy {
        if cursor < range.start {
            // A buffer reaching before chrono's earliest instant leaves no gap.
            if let Some(gap_end) = range.start.checked_sub_signed(buffer) {
                push_gap(&mut gaps, cursor, gap_end.min(to), min_nights);
            }
        }

        // Past chrono's latest instant nothing after this booking is free.
        cursor = match range.end.checked_add_signed(buffer) {
            Some(free_from) => cursor.max(free_from),
            None => to,
        };
        if cursor >= to {
            break;
        }
    }

    if cursor < to {
        push_gap(&mut gaps, cursor, to, min_nights);
    }

    debug!(
        gaps = gaps.len(),
        %from,
        %to,
        min_nights,
        buffer_days,
        "calculated gaps"
    );
    Ok(gaps)
}

fn push_gap(gaps: &mut Vec<Gap>, start: Instant, end: Instant, min_nights: i64) {
    // A buffer wider than the free space collapses the gap entirely.
    if end <= start {
        return;
    }
    let nights = ceil_nights(start, end);
    if nights >= min_nights {
        gaps.push(Gap { start, end, nights });
    }
}

/// [`calculate_gaps`] with the window and rules taken from typed values.
pub fn calculate_gaps_with_policy(
    occupied: &[OccupiedInterval],
    window: &TimeRange,
    policy: &CapacityPolicy,
) -> Result<Vec<Gap>> {
    policy.validate()?;
    calculate_gaps(
        occupied,
        window.start,
        window.end,
        policy.min_nights,
        policy.buffer_days,
    )
}

/// The earliest gap of at least `min_nights` nights, if any.
pub fn find_first_gap(
    occupied: &[OccupiedInterval],
    from: Instant,
    to: Instant,
    min_nights: u32,
    buffer_days: u32,
) -> Result<Option<Gap>> {
    Ok(calculate_gaps(occupied, from, to, min_nights, buffer_days)?
        .into_iter()
        .next())
}

/// Sum of nights across a gap list.
pub fn total_nights(gaps: &[Gap]) -> i64 {
    gaps.iter().map(|gap| gap.nights).sum()
}
