//! WASM bindings for stay-engine.
//!
//! Exposes gap finding, capacity checks and date normalisation to the
//! JavaScript booking app via `wasm-bindgen`. Booking rows and results cross
//! the boundary as JSON strings in the same shape the booking store uses.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p stay-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target nodejs --out-dir packages/stay-engine-js/wasm/ \
//!   target/wasm32-unknown-unknown/release/stay_engine_wasm.wasm
//! ```

use serde::Serialize;
use stay_engine::instant::{self, DEFAULT_TIMEZONE};
use stay_engine::record::{intervals_from_records, BookingRecord};
use stay_engine::{capacity, gaps, CandidateRequest, TimeRange};
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// JSON plumbing (plain `String` errors so it can be unit tested natively)
// ---------------------------------------------------------------------------

fn timezone_or_default(timezone: Option<String>) -> String {
    timezone.unwrap_or_else(|| DEFAULT_TIMEZONE.to_string())
}

fn parse_bookings(json: &str, timezone: &str) -> Result<Vec<stay_engine::OccupiedInterval>, String> {
    let records: Vec<BookingRecord> =
        serde_json::from_str(json).map_err(|e| format!("Invalid bookings JSON: {}", e))?;
    intervals_from_records(&records, timezone).map_err(|e| e.to_string())
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization error: {}", e))
}

fn gaps_json(
    bookings_json: &str,
    from: &str,
    to: &str,
    min_nights: u32,
    buffer_days: u32,
    timezone: &str,
) -> Result<String, String> {
    let occupied = parse_bookings(bookings_json, timezone)?;
    let from = instant::parse_instant(from, timezone).map_err(|e| e.to_string())?;
    let to = instant::parse_instant(to, timezone).map_err(|e| e.to_string())?;
    let found = gaps::calculate_gaps(&occupied, from, to, min_nights, buffer_days)
        .map_err(|e| e.to_string())?;
    to_json(&found)
}

fn capacity_json(
    bookings_json: &str,
    start: &str,
    end: &str,
    bedroom_count: u32,
    max_bedrooms: u32,
    timezone: &str,
) -> Result<String, String> {
    let occupied = parse_bookings(bookings_json, timezone)?;
    let start = instant::parse_instant(start, timezone).map_err(|e| e.to_string())?;
    let end = instant::parse_instant(end, timezone).map_err(|e| e.to_string())?;
    let candidate = TimeRange::new(start, end)
        .and_then(|range| CandidateRequest::new(range, bedroom_count))
        .map_err(|e| e.to_string())?;
    let decision = capacity::check_capacity(&occupied, &candidate, max_bedrooms)
        .map_err(|e| e.to_string())?;
    to_json(&decision)
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Bookable gaps between occupied stays.
///
/// `bookings_json` is a JSON array of `{start_ts, end_ts, bedroom_count,
/// status}` rows. `from` and `to` are `YYYY-MM-DD` dates or RFC 3339
/// timestamps. Returns a JSON array of `{start, end, nights}`.
#[wasm_bindgen(js_name = "calculateGaps")]
pub fn calculate_gaps(
    bookings_json: &str,
    from: &str,
    to: &str,
    min_nights: u32,
    buffer_days: u32,
    timezone: Option<String>,
) -> Result<String, JsValue> {
    let tz = timezone_or_default(timezone);
    gaps_json(bookings_json, from, to, min_nights, buffer_days, &tz)
        .map_err(|e| JsValue::from_str(&e))
}

/// Whether a stay of `bedroom_count` bedrooms over `[start, end)` fits.
///
/// Returns the capacity decision as JSON. A rejection is a normal result
/// (`admitted: false`), not a thrown error.
#[wasm_bindgen(js_name = "checkCapacity")]
pub fn check_capacity(
    bookings_json: &str,
    start: &str,
    end: &str,
    bedroom_count: u32,
    max_bedrooms: u32,
    timezone: Option<String>,
) -> Result<String, JsValue> {
    let tz = timezone_or_default(timezone);
    capacity_json(bookings_json, start, end, bedroom_count, max_bedrooms, &tz)
        .map_err(|e| JsValue::from_str(&e))
}

/// Normalise a `YYYY-MM-DD` date to the RFC 3339 instant of 15:00 local time.
#[wasm_bindgen(js_name = "toInstant")]
pub fn to_instant(date_only: &str, timezone: Option<String>) -> Result<String, JsValue> {
    let tz = timezone_or_default(timezone);
    instant::to_instant(date_only, &tz)
        .map(|dt| dt.to_rfc3339())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Format a stay as `10 Jan 2025 - 15 Jan 2025`.
#[wasm_bindgen(js_name = "formatRange")]
pub fn format_range(start: &str, end: &str, timezone: Option<String>) -> Result<String, JsValue> {
    let tz = timezone_or_default(timezone);
    let start = instant::parse_instant(start, &tz).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let end = instant::parse_instant(end, &tz).map_err(|e| JsValue::from_str(&e.to_string()))?;
    instant::format_range(start, end, &tz).map_err(|e| JsValue::from_str(&e.to_string()))
}
