//! Availability engine
//!
//! Reads the occupying reservations of every pool member once for the whole
//! window, then counts them per hourly slot.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::domain::{
    AvailabilityResult, CapacityCheck, DomainError, DomainResult, PoolMembership, PoolTopology,
    RepositoryProvider, ReservationStatus, TimeWindow,
};

/// Default upper bound on a queried or booked window.
pub const DEFAULT_MAX_WINDOW_DAYS: i64 = 366;

/// Validated availability request.
#[derive(Debug, Clone, Copy)]
pub struct AvailabilityQuery {
    pub window: TimeWindow,
    pub vehicle_type_id: i32,
}

impl AvailabilityQuery {
    pub fn new(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        vehicle_type_id: i32,
    ) -> DomainResult<Self> {
        Ok(Self {
            window: TimeWindow::new(start, end)?,
            vehicle_type_id,
        })
    }
}

#[derive(Clone)]
pub struct AvailabilityService {
    repos: Arc<dyn RepositoryProvider>,
    topology: Arc<PoolTopology>,
    max_window: Duration,
}

impl AvailabilityService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, topology: Arc<PoolTopology>) -> Self {
        Self {
            repos,
            topology,
            max_window: Duration::days(DEFAULT_MAX_WINDOW_DAYS),
        }
    }

    pub fn with_max_window(mut self, max_window: Duration) -> Self {
        self.max_window = max_window;
        self
    }

    pub fn topology(&self) -> &PoolTopology {
        &self.topology
    }

    pub async fn check(&self, query: AvailabilityQuery) -> DomainResult<AvailabilityResult> {
        let membership = self.topology.resolve_id(query.vehicle_type_id)?;
        let check = self.capacity_check(&membership, query.window).await?;
        self.evaluate(&membership, check).await
    }

    /// Capacity guard for `window`, reading the pool size live from the store.
    /// Windows longer than the configured maximum are rejected up front.
    pub async fn capacity_check(
        &self,
        membership: &PoolMembership,
        window: TimeWindow,
    ) -> DomainResult<CapacityCheck> {
        window.ensure_at_most(self.max_window)?;
        let total = self.pool_capacity(membership).await?;
        Ok(CapacityCheck {
            window,
            vehicle_type_id: membership.vehicle_type_id,
            pool_id: membership.pool_id,
            total,
        })
    }

    pub async fn evaluate(
        &self,
        membership: &PoolMembership,
        check: CapacityCheck,
    ) -> DomainResult<AvailabilityResult> {
        let booked = self
            .repos
            .reservations()
            .find_overlapping(
                &membership.members,
                check.window,
                &ReservationStatus::NON_OCCUPYING,
            )
            .await?;

        let result = AvailabilityResult::evaluate(
            check.window,
            check.vehicle_type_id,
            check.pool_id,
            check.total,
            &booked,
        );

        debug!(
            vehicle_type_id = check.vehicle_type_id,
            pool_id = check.pool_id,
            total = check.total,
            overlapping = booked.len(),
            available = result.is_available(),
            "Availability evaluated"
        );

        Ok(result)
    }

    async fn pool_capacity(&self, membership: &PoolMembership) -> DomainResult<u32> {
        let pool = self.repos.catalog().find_pool(membership.pool_id).await?;
        pool.and_then(|p| p.total_spaces)
            .ok_or_else(|| DomainError::NotConfigured {
                what: "space pool capacity",
                vehicle_type: membership.vehicle_type_id.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::booking::test_support::{at, seeded, window, TestEnv};
    use crate::domain::ReservationStatus;

    #[tokio::test]
    async fn empty_pool_is_fully_available() {
        let env = seeded(2).await;
        let result = env
            .availability
            .check(AvailabilityQuery::new(at(10), at(13), 1).unwrap())
            .await
            .unwrap();

        assert!(result.is_available());
        assert_eq!(result.slots.len(), 3);
        assert!(result.slots.iter().all(|s| s.remaining() == 2));
        assert_eq!(result.first_unavailable(), None);
    }

    #[tokio::test]
    async fn aliases_consume_the_same_pool() {
        let env = seeded(2).await;
        env.insert(1, window(10, 12), ReservationStatus::Active).await;
        env.insert(3, window(11, 13), ReservationStatus::Pending).await;

        let result = env
            .availability
            .check(AvailabilityQuery::new(at(10), at(13), 3).unwrap())
            .await
            .unwrap();
        let remaining: Vec<i64> = result.slots.iter().map(|s| s.remaining()).collect();
        assert_eq!(remaining, vec![1, 0, 1]);
        assert_eq!(result.first_unavailable(), Some(at(11)));

        // Motorcycles have their own pool
        let moto = env
            .availability
            .check(AvailabilityQuery::new(at(10), at(13), 2).unwrap())
            .await
            .unwrap();
        assert!(moto.is_available());
    }

    #[tokio::test]
    async fn released_reservations_do_not_count() {
        let env = seeded(1).await;
        env.insert(1, window(10, 12), ReservationStatus::Canceled).await;
        env.insert(1, window(10, 12), ReservationStatus::PaymentFailed).await;

        let result = env
            .availability
            .check(AvailabilityQuery::new(at(10), at(12), 1).unwrap())
            .await
            .unwrap();
        assert!(result.is_available());
    }

    #[tokio::test]
    async fn unconfigured_pool_is_not_unavailable() {
        let env = TestEnv::unconfigured().await;
        let err = env
            .availability
            .check(AvailabilityQuery::new(at(10), at(11), 1).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotConfigured { .. }));
    }

    #[tokio::test]
    async fn unknown_vehicle_type_is_not_found() {
        let env = seeded(2).await;
        let err = env
            .availability
            .check(AvailabilityQuery::new(at(10), at(11), 42).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn overlong_window_is_rejected_before_slotting() {
        let env = seeded(2).await;
        let far = at(0) + Duration::days(365 * 1000);
        let err = env
            .availability
            .check(AvailabilityQuery::new(at(0), far, 1).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput { field: "end_time", .. }));

        let short = env.availability.clone().with_max_window(Duration::days(2));
        let err = short
            .check(AvailabilityQuery::new(at(0), at(49), 1).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput { field: "end_time", .. }));
        let ok = short
            .check(AvailabilityQuery::new(at(0), at(48), 1).unwrap())
            .await
            .unwrap();
        assert_eq!(ok.slots.len(), 48);
    }

    #[test]
    fn query_rejects_reversed_window() {
        assert!(matches!(
            AvailabilityQuery::new(at(12), at(10), 1),
            Err(DomainError::InvalidInput { field: "end_time", .. })
        ));
    }
}
