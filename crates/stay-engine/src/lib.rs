//! # stay-engine
//!
//! Availability and bedroom-capacity engine for a shared holiday home.
//!
//! Given the bookings that hold bedrooms (approved, on hold, or blocked by an
//! admin) and the house rules (minimum stay, turnover buffer, bedroom count),
//! the engine computes which date ranges a new request could occupy and
//! whether a specific request fits without overselling bedrooms.
//!
//! Everything here is a pure function of its arguments except the
//! [`store`] module, which defines the storage seam.
//!
//! ## Modules
//!
//! - [`instant`] — date-only strings and timestamps → UTC instants (15:00 local anchor)
//! - [`model`] — ranges, statuses, gaps, policies
//! - [`overlap`] — half-open overlap tests
//! - [`gaps`] — bookable gaps under minimum-nights and buffer-days rules
//! - [`capacity`] — peak bedroom usage and admission decisions
//! - [`record`] — storage row shapes and settings
//! - [`store`] — `BookingStore` trait, in-memory store, availability service
//! - [`error`] — Error types

pub mod capacity;
pub mod error;
pub mod gaps;
pub mod instant;
pub mod model;
pub mod overlap;
pub mod record;
pub mod store;

pub use capacity::{check_capacity, CapacityDecision, CapacityRejection, OccupancySnapshot};
pub use error::StayError;
pub use gaps::{calculate_gaps, find_first_gap};
pub use instant::{format_for_display, format_range, to_instant};
pub use model::{
    BookingStatus, CandidateRequest, CapacityPolicy, Gap, Instant, OccupiedInterval, TimeRange,
};
pub use overlap::ranges_overlap;
pub use record::{BookingRecord, GapQuery, HouseSettings};
pub use store::{AvailabilityService, BookingStore, InMemoryStore};
