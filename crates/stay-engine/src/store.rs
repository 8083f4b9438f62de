//! Storage seam: the booking store trait, an in-memory implementation and
//! a thin service that feeds store snapshots into the pure engine.
//!
//! The engine itself never holds state. Whatever implements
//! [`BookingStore`] owns the bookings and is the single place where a
//! booking enters an occupying status. [`BookingStore::commit`] and
//! [`BookingStore::transition`] must re-check capacity and write under one
//! serialization point (a lock, a transaction with an overlap constraint, a
//! single-writer queue). Checking a snapshot and writing later races with
//! other writers and can oversell.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use crate::capacity::{self, CapacityDecision, OccupancySnapshot};
use crate::error::{Result, StayError};
use crate::gaps;
use crate::model::{BookingStatus, CandidateRequest, Gap, Instant, OccupiedInterval, TimeRange};
use crate::overlap::ranges_overlap;
use crate::record::{GapQuery, HouseSettings};

/// A booking held by a store, keyed by an opaque id.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredBooking {
    pub id: String,
    pub interval: OccupiedInterval,
}

/// Source of truth for bookings and house settings.
pub trait BookingStore: Send + Sync {
    fn settings(&self) -> Result<HouseSettings>;

    /// Occupying bookings that overlap `window`.
    fn occupying_between(&self, window: &TimeRange) -> Result<Vec<OccupiedInterval>>;

    /// Add a booking with `status`. Occupying statuses are only written if
    /// the capacity check passes at the moment of writing; the returned
    /// decision says whether it did.
    fn commit(
        &self,
        id: &str,
        candidate: &CandidateRequest,
        status: BookingStatus,
    ) -> Result<CapacityDecision>;

    /// Move an existing booking to `status`, with the same guarantee as
    /// [`BookingStore::commit`] when the new status is occupying.
    fn transition(&self, id: &str, status: BookingStatus) -> Result<CapacityDecision>;
}

impl<S: BookingStore + ?Sized> BookingStore for Arc<S> {
    fn settings(&self) -> Result<HouseSettings> {
        (**self).settings()
    }

    fn occupying_between(&self, window: &TimeRange) -> Result<Vec<OccupiedInterval>> {
        (**self).occupying_between(window)
    }

    fn commit(
        &self,
        id: &str,
        candidate: &CandidateRequest,
        status: BookingStatus,
    ) -> Result<CapacityDecision> {
        (**self).commit(id, candidate, status)
    }

    fn transition(&self, id: &str, status: BookingStatus) -> Result<CapacityDecision> {
        (**self).transition(id, status)
    }
}

/// A [`BookingStore`] kept in process memory behind a mutex.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    settings: HouseSettings,
    bookings: Mutex<Vec<StoredBooking>>,
}

impl InMemoryStore {
    pub fn new(settings: HouseSettings) -> Self {
        Self {
            settings,
            bookings: Mutex::new(Vec::new()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<StoredBooking>>> {
        self.bookings
            .lock()
            .map_err(|_| StayError::Store("booking lock poisoned".to_string()))
    }

    /// Every booking currently held, in insertion order.
    pub fn bookings(&self) -> Result<Vec<StoredBooking>> {
        Ok(self.lock()?.clone())
    }

    fn max_bedrooms(&self) -> Result<u32> {
        Ok(self.settings.policy()?.max_bedrooms)
    }
}

fn others(bookings: &[StoredBooking], id: &str) -> Vec<OccupiedInterval> {
    bookings
        .iter()
        .filter(|b| b.id != id)
        .map(|b| b.interval.clone())
        .collect()
}

impl BookingStore for InMemoryStore {
    fn settings(&self) -> Result<HouseSettings> {
        Ok(self.settings.clone())
    }

    fn occupying_between(&self, window: &TimeRange) -> Result<Vec<OccupiedInterval>> {
        window.validate()?;
        Ok(self
            .lock()?
            .iter()
            .filter(|b| b.interval.is_occupying() && ranges_overlap(&b.interval.range, window))
            .map(|b| b.interval.clone())
            .collect())
    }

    fn commit(
        &self,
        id: &str,
        candidate: &CandidateRequest,
        status: BookingStatus,
    ) -> Result<CapacityDecision> {
        let max_bedrooms = self.max_bedrooms()?;
        let mut bookings = self.lock()?;
        if bookings.iter().any(|b| b.id == id) {
            return Err(StayError::Store(format!("booking {} already exists", id)));
        }

        let decision = capacity::check_capacity(&others(&bookings, id), candidate, max_bedrooms)?;
        if status.is_occupying() && !decision.admitted {
            warn!(id, %status, peak = decision.bedrooms_in_use_at_peak, "commit refused");
            return Ok(decision);
        }

        bookings.push(StoredBooking {
            id: id.to_string(),
            interval: OccupiedInterval::new(candidate.range, candidate.bedroom_count, status)?,
        });
        debug!(id, %status, "booking committed");
        Ok(decision)
    }

    fn transition(&self, id: &str, status: BookingStatus) -> Result<CapacityDecision> {
        let max_bedrooms = self.max_bedrooms()?;
        let mut bookings = self.lock()?;
        let index = bookings
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| StayError::Store(format!("booking {} not found", id)))?;

        let current = &bookings[index].interval;
        let candidate = CandidateRequest::new(current.range, current.bedroom_count)?;
        let decision = capacity::check_capacity(&others(&bookings, id), &candidate, max_bedrooms)?;
        if status.is_occupying() && !decision.admitted {
            warn!(id, %status, peak = decision.bedrooms_in_use_at_peak, "transition refused");
            return Ok(decision);
        }

        bookings[index].interval.status = status;
        debug!(id, %status, "booking transitioned");
        Ok(decision)
    }
}

/// Reads a snapshot from a [`BookingStore`] and runs the engine over it.
#[derive(Debug)]
pub struct AvailabilityService<S> {
    store: S,
}

impl<S: BookingStore> AvailabilityService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Gaps for a caller query, using the house buffer and minimum stay.
    pub fn gaps(&self, query: &GapQuery) -> Result<Vec<Gap>> {
        let settings = self.store.settings()?;
        let policy = settings.policy()?;
        let window = query.window(&settings.timezone)?;

        // Bookings just outside the window still trim its edges by the buffer.
        let buffer = Duration::days(i64::from(policy.buffer_days));
        let fetch = TimeRange::new(
            window
                .start
                .checked_sub_signed(buffer)
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
            window
                .end
                .checked_add_signed(buffer)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        )?;
        let occupied = self.store.occupying_between(&fetch)?;

        gaps::calculate_gaps(
            &occupied,
            window.start,
            window.end,
            query.min_nights_or(policy.min_nights),
            policy.buffer_days,
        )
    }

    /// Advisory capacity check against the current snapshot.
    pub fn precheck(&self, candidate: &CandidateRequest) -> Result<CapacityDecision> {
        let policy = self.store.settings()?.policy()?;
        let occupied = self.store.occupying_between(&candidate.range)?;
        capacity::check_capacity(&occupied, candidate, policy.max_bedrooms)
    }

    /// Occupancy at `at`.
    pub fn occupancy(&self, at: Instant) -> Result<OccupancySnapshot> {
        let policy = self.store.settings()?.policy()?;
        let probe = TimeRange::new(at, at + Duration::seconds(1))?;
        let occupied = self.store.occupying_between(&probe)?;
        Ok(capacity::occupancy_at(&occupied, at, policy.max_bedrooms))
    }
}
