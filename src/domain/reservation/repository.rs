//! Reservation repository interface

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::model::{Reservation, ReservationState, ReservationStatus};
use crate::domain::availability::{CapacityCheck, TimeWindow};
use crate::domain::DomainResult;
use crate::shared::types::{PageRequest, PaginatedResult};

/// Admin listing filter. All fields are optional and combined with AND.
#[derive(Debug, Clone, Default)]
pub struct ReservationFilter {
    /// Reservations starting at or after this instant
    pub start_from: Option<DateTime<Utc>>,
    /// Reservations starting before this instant
    pub start_until: Option<DateTime<Utc>>,
    /// Case-insensitive code substring
    pub code_contains: Option<String>,
    pub vehicle_type_id: Option<i32>,
    pub status: Option<ReservationStatus>,
}

#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Insert a reservation after re-checking pool capacity in the same
    /// transaction. Returns the stored reservation with its id.
    ///
    /// Fails with `Conflict` when `check` no longer passes and with
    /// `DuplicateCode` when the code is already taken.
    async fn insert_within_capacity(
        &self,
        reservation: Reservation,
        members: &[i32],
        check: CapacityCheck,
    ) -> DomainResult<Reservation>;

    /// Windows of reservations for any of `members` that overlap `window`,
    /// skipping the `excluded` statuses.
    async fn find_overlapping(
        &self,
        members: &[i32],
        window: TimeWindow,
        excluded: &[ReservationStatus],
    ) -> DomainResult<Vec<TimeWindow>>;

    async fn find_by_code(&self, code: &str) -> DomainResult<Option<Reservation>>;

    async fn find_by_provider_reference(
        &self,
        reference: &str,
    ) -> DomainResult<Option<Reservation>>;

    /// Persist status, payment fields and `updated_at` of one reservation,
    /// but only while the stored row is still in the `expected` state.
    ///
    /// Fails with `StaleState` when the row moved on or no longer exists.
    async fn update(
        &self,
        reservation: &Reservation,
        expected: ReservationState,
    ) -> DomainResult<()>;

    /// Ids of `active` reservations whose window ended before `now`.
    async fn list_active_past_end(&self, now: DateTime<Utc>) -> DomainResult<Vec<i32>>;

    /// `pending` reservations created before `created_before`, oldest first.
    async fn list_pending_created_before(
        &self,
        created_before: DateTime<Utc>,
    ) -> DomainResult<Vec<Reservation>>;

    /// Set `status` on every id in one statement; returns rows affected.
    /// Rows whose current status cannot move to `status` are left alone.
    async fn bulk_update_status(
        &self,
        ids: &[i32],
        status: ReservationStatus,
        now: DateTime<Utc>,
    ) -> DomainResult<u64>;

    /// Newest first.
    async fn list(
        &self,
        filter: &ReservationFilter,
        page: PageRequest,
    ) -> DomainResult<PaginatedResult<Reservation>>;

    /// Hard delete. Returns false when the code is unknown.
    async fn delete_by_code(&self, code: &str) -> DomainResult<bool>;
}
