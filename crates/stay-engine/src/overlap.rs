//! Half-open overlap tests between ranges and bookings.
//!
//! Adjacent ranges (one ends exactly when the other starts) do NOT overlap,
//! so a checkout and a check-in on the same instant are legal unless a
//! buffer policy says otherwise.

use crate::model::{ceil_nights, OccupiedInterval, TimeRange};

/// Two ranges overlap iff `a.start < b.end && b.start < a.end`.
pub fn ranges_overlap(a: &TimeRange, b: &TimeRange) -> bool {
    a.start < b.end && b.start < a.end
}

/// Nights shared by two ranges, rounded up. Zero when they do not overlap.
pub fn overlap_nights(a: &TimeRange, b: &TimeRange) -> i64 {
    if !ranges_overlap(a, b) {
        return 0;
    }
    let start = a.start.max(b.start);
    let end = a.end.min(b.end);
    ceil_nights(start, end)
}

/// Occupying bookings whose range overlaps `range`, in input order.
pub fn find_overlaps<'a>(
    occupied: &'a [OccupiedInterval],
    range: &TimeRange,
) -> Vec<&'a OccupiedInterval> {
    occupied
        .iter()
        .filter(|interval| interval.is_occupying() && ranges_overlap(&interval.range, range))
        .collect()
}
