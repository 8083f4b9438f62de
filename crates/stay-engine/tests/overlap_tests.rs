//! Tests for half-open overlap detection.

use chrono::{TimeZone, Utc};
use stay_engine::model::{BookingStatus, Instant, OccupiedInterval, TimeRange};
use stay_engine::overlap::{find_overlaps, overlap_nights, ranges_overlap};

fn jan(day: u32) -> Instant {
    Utc.with_ymd_and_hms(2025, 1, day, 0, 0, 0).unwrap()
}

fn range(start: u32, end: u32) -> TimeRange {
    TimeRange::new(jan(start), jan(end)).unwrap()
}

#[test]
fn overlapping_ranges_detected() {
    assert!(ranges_overlap(&range(10, 20), &range(15, 25)));
    assert!(ranges_overlap(&range(15, 25), &range(10, 20)));
}

#[test]
fn disjoint_ranges_do_not_overlap() {
    assert!(!ranges_overlap(&range(10, 15), &range(20, 25)));
}

#[test]
fn adjacent_ranges_do_not_overlap() {
    assert!(!ranges_overlap(&range(10, 15), &range(15, 20)));
    assert!(!ranges_overlap(&range(15, 20), &range(10, 15)));
}

#[test]
fn contained_range_overlaps() {
    assert!(ranges_overlap(&range(10, 20), &range(12, 14)));
    assert!(ranges_overlap(&range(12, 14), &range(10, 20)));
}

#[test]
fn identical_ranges_overlap() {
    assert!(ranges_overlap(&range(10, 20), &range(10, 20)));
}

#[test]
fn overlap_nights_counts_shared_span() {
    assert_eq!(overlap_nights(&range(10, 20), &range(15, 25)), 5);
    assert_eq!(overlap_nights(&range(10, 15), &range(15, 20)), 0);
    assert_eq!(overlap_nights(&range(10, 20), &range(12, 14)), 2);
}

#[test]
fn find_overlaps_returns_only_occupying_conflicts() {
    let occupied = vec![
        OccupiedInterval::new(range(1, 5), 1, BookingStatus::Approved).unwrap(),
        OccupiedInterval::new(range(4, 8), 1, BookingStatus::Pending).unwrap(),
        OccupiedInterval::new(range(6, 9), 2, BookingStatus::Hold).unwrap(),
        OccupiedInterval::new(range(9, 12), 1, BookingStatus::Blocked).unwrap(),
    ];

    let hits = find_overlaps(&occupied, &range(3, 9));

    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].range, range(1, 5));
    assert_eq!(hits[1].range, range(6, 9));
}
