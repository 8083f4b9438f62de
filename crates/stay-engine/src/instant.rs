//! Interval normalizer: date strings and timestamps to UTC instants.
//!
//! Date-only input is anchored at 15:00 wall-clock time in the house
//! timezone before conversion. Midnight is the local time most likely to be
//! skipped or repeated by a DST transition; mid-afternoon never is, so the
//! same calendar day always maps to one instant.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{Result, StayError};
use crate::model::Instant;

/// Local hour at which date-only input is anchored.
pub const ANCHOR_HOUR: u32 = 15;

/// Timezone used when the house settings do not name one.
pub const DEFAULT_TIMEZONE: &str = "Europe/London";

/// Parse an IANA timezone identifier.
pub fn parse_timezone(timezone: &str) -> Result<Tz> {
    timezone
        .parse()
        .map_err(|_| StayError::InvalidTimezone(timezone.to_string()))
}

fn parse_date_only(date_only: &str) -> Result<NaiveDate> {
    let bytes = date_only.as_bytes();
    // chrono accepts single-digit months and days; storage never emits them.
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return Err(StayError::Parse(format!(
            "expected YYYY-MM-DD, got '{}'",
            date_only
        )));
    }
    NaiveDate::parse_from_str(date_only, "%Y-%m-%d")
        .map_err(|e| StayError::Parse(format!("invalid date '{}': {}", date_only, e)))
}

/// Convert a `YYYY-MM-DD` calendar date to the UTC instant of 15:00 local
/// time on that date in `timezone`.
///
/// # Errors
/// Returns `StayError::Parse` for malformed dates and
/// `StayError::InvalidTimezone` for unknown zones.
pub fn to_instant(date_only: &str, timezone: &str) -> Result<Instant> {
    let tz = parse_timezone(timezone)?;
    let date = parse_date_only(date_only)?;
    anchor_in(date, &tz)
}

/// Anchor a calendar date at [`ANCHOR_HOUR`] in `tz` and convert to UTC.
pub fn anchor_in(date: NaiveDate, tz: &Tz) -> Result<Instant> {
    let anchor = NaiveTime::from_hms_opt(ANCHOR_HOUR, 0, 0)
        .ok_or_else(|| StayError::Parse(format!("invalid anchor hour {}", ANCHOR_HOUR)))?;
    let local = date.and_time(anchor);
    tz.from_local_datetime(&local)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| {
            StayError::Parse(format!(
                "{} {} does not exist in {}",
                date,
                anchor,
                tz.name()
            ))
        })
}

/// Parse a storage timestamp.
///
/// Accepts RFC 3339 (`2025-01-10T15:00:00Z`, `2025-01-10T15:00:00+01:00`),
/// naive `YYYY-MM-DDTHH:MM:SS` which is read as UTC, and date-only strings
/// which go through [`to_instant`].
pub fn parse_instant(input: &str, timezone: &str) -> Result<Instant> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(ndt.and_utc());
    }
    if input.len() == 10 {
        return to_instant(input, timezone);
    }
    Err(StayError::Parse(format!("invalid timestamp '{}'", input)))
}

/// The calendar date `instant` falls on in `timezone`.
pub fn local_date(instant: Instant, timezone: &str) -> Result<NaiveDate> {
    let tz = parse_timezone(timezone)?;
    Ok(instant.with_timezone(&tz).date_naive())
}

/// Format an instant as a short British date, e.g. `15 Jan 2025`.
pub fn format_for_display(instant: Instant, timezone: &str) -> Result<String> {
    let tz = parse_timezone(timezone)?;
    Ok(instant.with_timezone(&tz).format("%-d %b %Y").to_string())
}

/// Format a range as `15 Jan 2025 - 20 Jan 2025`, collapsing to a single
/// date when both ends display the same.
pub fn format_range(start: Instant, end: Instant, timezone: &str) -> Result<String> {
    let start_str = format_for_display(start, timezone)?;
    let end_str = format_for_display(end, timezone)?;
    if start_str == end_str {
        return Ok(start_str);
    }
    Ok(format!("{} - {}", start_str, end_str))
}
