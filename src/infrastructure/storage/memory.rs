//! In-memory repositories for development and testing

use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::domain::reservation::ReservationRepository;
use crate::domain::vehicle::CatalogRepository;
use crate::domain::{
    BillingUnit, CapacityCheck, DomainError, DomainResult, PriceEntry, RepositoryProvider,
    Reservation, ReservationFilter, ReservationState, ReservationStatus, SpacePool, TimeWindow,
    VehicleType,
};
use crate::shared::types::{PageRequest, PaginatedResult};

// ── Catalog ────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryCatalogRepository {
    vehicle_types: DashMap<i32, VehicleType>,
    pools: DashMap<i32, SpacePool>,
    prices: DashMap<(i32, BillingUnit), PriceEntry>,
}

impl InMemoryCatalogRepository {
    pub fn add_pool(&self, pool: SpacePool) {
        self.pools.insert(pool.id, pool);
    }

    pub fn add_vehicle_type(&self, vehicle_type: VehicleType) {
        self.vehicle_types.insert(vehicle_type.id, vehicle_type);
    }

    pub fn put_price(&self, entry: PriceEntry) {
        self.prices
            .insert((entry.vehicle_type_id, entry.unit), entry);
    }

    pub fn remove_price(&self, vehicle_type_id: i32, unit: BillingUnit) {
        self.prices.remove(&(vehicle_type_id, unit));
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalogRepository {
    async fn list_vehicle_types(&self) -> DomainResult<Vec<VehicleType>> {
        let mut types: Vec<VehicleType> =
            self.vehicle_types.iter().map(|e| e.value().clone()).collect();
        types.sort_by_key(|vt| vt.id);
        Ok(types)
    }

    async fn find_pool(&self, pool_id: i32) -> DomainResult<Option<SpacePool>> {
        Ok(self.pools.get(&pool_id).map(|p| p.clone()))
    }

    async fn list_pools(&self) -> DomainResult<Vec<SpacePool>> {
        let mut pools: Vec<SpacePool> = self.pools.iter().map(|e| e.value().clone()).collect();
        pools.sort_by_key(|p| p.id);
        Ok(pools)
    }

    async fn set_pool_capacity(&self, pool_id: i32, total_spaces: u32) -> DomainResult<()> {
        let mut pool = self
            .pools
            .get_mut(&pool_id)
            .ok_or_else(|| DomainError::NotFound {
                entity: "SpacePool",
                field: "id",
                value: pool_id.to_string(),
            })?;
        pool.total_spaces = Some(total_spaces);
        Ok(())
    }

    async fn find_price(
        &self,
        vehicle_type_id: i32,
        unit: BillingUnit,
    ) -> DomainResult<Option<PriceEntry>> {
        Ok(self.prices.get(&(vehicle_type_id, unit)).map(|p| p.clone()))
    }

    async fn list_prices(&self) -> DomainResult<Vec<PriceEntry>> {
        let mut prices: Vec<PriceEntry> = self.prices.iter().map(|e| e.value().clone()).collect();
        prices.sort_by_key(|p| (p.vehicle_type_id, p.unit));
        Ok(prices)
    }

    async fn upsert_price(&self, entry: PriceEntry) -> DomainResult<()> {
        self.put_price(entry);
        Ok(())
    }
}

// ── Reservations ───────────────────────────────────────────────

pub struct InMemoryReservationRepository {
    rows: DashMap<i32, Reservation>,
    next_id: AtomicI32,
    /// Makes check-and-insert atomic, standing in for a DB transaction.
    insert_lock: Mutex<()>,
}

impl Default for InMemoryReservationRepository {
    fn default() -> Self {
        Self {
            rows: DashMap::new(),
            next_id: AtomicI32::new(1),
            insert_lock: Mutex::new(()),
        }
    }
}

impl InMemoryReservationRepository {
    /// Store a reservation as-is, without any capacity check.
    pub fn seed(&self, mut reservation: Reservation) -> Reservation {
        reservation.id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.rows.insert(reservation.id, reservation.clone());
        reservation
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn overlapping(
        &self,
        members: &[i32],
        window: &TimeWindow,
        excluded: &[ReservationStatus],
    ) -> Vec<TimeWindow> {
        self.rows
            .iter()
            .filter(|r| {
                members.contains(&r.vehicle_type_id)
                    && !excluded.contains(&r.status)
                    && r.window.overlaps(window)
            })
            .map(|r| r.window)
            .collect()
    }
}

fn matches_filter(r: &Reservation, filter: &ReservationFilter) -> bool {
    filter.start_from.map_or(true, |from| r.window.start() >= from)
        && filter.start_until.map_or(true, |until| r.window.start() < until)
        && filter.code_contains.as_deref().map_or(true, |needle| {
            r.code.to_lowercase().contains(&needle.to_lowercase())
        })
        && filter.vehicle_type_id.map_or(true, |vt| r.vehicle_type_id == vt)
        && filter.status.map_or(true, |s| r.status == s)
}

#[async_trait]
impl ReservationRepository for InMemoryReservationRepository {
    async fn insert_within_capacity(
        &self,
        reservation: Reservation,
        members: &[i32],
        check: CapacityCheck,
    ) -> DomainResult<Reservation> {
        let _guard = self.insert_lock.lock().await;

        if self.rows.iter().any(|r| r.code == reservation.code) {
            return Err(DomainError::DuplicateCode(reservation.code));
        }

        let booked = self.overlapping(members, &check.window, &ReservationStatus::NON_OCCUPYING);
        check.verify(&booked)?;

        Ok(self.seed(reservation))
    }

    async fn find_overlapping(
        &self,
        members: &[i32],
        window: TimeWindow,
        excluded: &[ReservationStatus],
    ) -> DomainResult<Vec<TimeWindow>> {
        Ok(self.overlapping(members, &window, excluded))
    }

    async fn find_by_code(&self, code: &str) -> DomainResult<Option<Reservation>> {
        Ok(self
            .rows
            .iter()
            .find(|r| r.code == code)
            .map(|r| r.value().clone()))
    }

    async fn find_by_provider_reference(
        &self,
        reference: &str,
    ) -> DomainResult<Option<Reservation>> {
        Ok(self
            .rows
            .iter()
            .find(|r| r.provider_reference.as_deref() == Some(reference))
            .map(|r| r.value().clone()))
    }

    async fn update(
        &self,
        reservation: &Reservation,
        expected: ReservationState,
    ) -> DomainResult<()> {
        let stale = || DomainError::StaleState(reservation.code.clone());
        let mut row = self.rows.get_mut(&reservation.id).ok_or_else(stale)?;
        if row.state() != expected {
            return Err(stale());
        }
        row.status = reservation.status;
        row.payment_status = reservation.payment_status;
        row.provider_reference = reservation.provider_reference.clone();
        row.payment_intent = reservation.payment_intent.clone();
        row.updated_at = reservation.updated_at;
        Ok(())
    }

    async fn list_active_past_end(&self, now: DateTime<Utc>) -> DomainResult<Vec<i32>> {
        let mut ids: Vec<i32> = self
            .rows
            .iter()
            .filter(|r| r.status == ReservationStatus::Active && r.window.end() < now)
            .map(|r| r.id)
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }

    async fn list_pending_created_before(
        &self,
        created_before: DateTime<Utc>,
    ) -> DomainResult<Vec<Reservation>> {
        let mut pending: Vec<Reservation> = self
            .rows
            .iter()
            .filter(|r| r.status == ReservationStatus::Pending && r.created_at < created_before)
            .map(|r| r.value().clone())
            .collect();
        pending.sort_by_key(|r| (r.created_at, r.id));
        Ok(pending)
    }

    async fn bulk_update_status(
        &self,
        ids: &[i32],
        status: ReservationStatus,
        now: DateTime<Utc>,
    ) -> DomainResult<u64> {
        let mut affected = 0;
        for id in ids {
            if let Some(mut row) = self.rows.get_mut(id) {
                if !row.status.can_transition_to(status) {
                    continue;
                }
                row.status = status;
                row.updated_at = now;
                affected += 1;
            }
        }
        Ok(affected)
    }

    async fn list(
        &self,
        filter: &ReservationFilter,
        page: PageRequest,
    ) -> DomainResult<PaginatedResult<Reservation>> {
        let mut matching: Vec<Reservation> = self
            .rows
            .iter()
            .filter(|r| matches_filter(r, filter))
            .map(|r| r.value().clone())
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .collect();
        Ok(PaginatedResult::new(items, total, page))
    }

    async fn delete_by_code(&self, code: &str) -> DomainResult<bool> {
        let id = self.rows.iter().find(|r| r.code == code).map(|r| r.id);
        Ok(id.and_then(|id| self.rows.remove(&id)).is_some())
    }
}

// ── Provider ───────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryRepositoryProvider {
    catalog: InMemoryCatalogRepository,
    reservations: InMemoryReservationRepository,
}

impl InMemoryRepositoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn catalog_store(&self) -> &InMemoryCatalogRepository {
        &self.catalog
    }

    pub fn reservation_store(&self) -> &InMemoryReservationRepository {
        &self.reservations
    }
}

impl RepositoryProvider for InMemoryRepositoryProvider {
    fn catalog(&self) -> &dyn CatalogRepository {
        &self.catalog
    }

    fn reservations(&self) -> &dyn ReservationRepository {
        &self.reservations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::reservation::{CustomerContact, Locale, PaymentMethod, ReservationDraft};
    use chrono::{Duration, TimeZone};

    fn at(h: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 6, 1, 0, 0, 0).unwrap() + Duration::hours(h)
    }

    fn reservation(code: &str, vt: i32, start: i64, end: i64) -> Reservation {
        let draft = ReservationDraft {
            contact: CustomerContact {
                name: "Test".into(),
                email: "test@example.com".into(),
                phone: None,
            },
            vehicle_type_id: vt,
            vehicle_plate: "AB123CD".into(),
            vehicle_model: None,
            payment_method: PaymentMethod::OnSite,
            window: TimeWindow::new(at(start), at(end)).unwrap(),
            locale: Locale::En,
        };
        Reservation::new(draft, code, ReservationStatus::Active, None)
    }

    fn check(total: u32, start: i64, end: i64) -> CapacityCheck {
        CapacityCheck {
            window: TimeWindow::new(at(start), at(end)).unwrap(),
            vehicle_type_id: 1,
            pool_id: 1,
            total,
        }
    }

    #[tokio::test]
    async fn insert_rechecks_capacity() {
        let repo = InMemoryReservationRepository::default();
        repo.insert_within_capacity(reservation("AAAA0001", 1, 10, 12), &[1, 3], check(1, 10, 12))
            .await
            .unwrap();

        let err = repo
            .insert_within_capacity(reservation("AAAA0002", 3, 11, 13), &[1, 3], check(1, 11, 13))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn duplicate_code_is_rejected() {
        let repo = InMemoryReservationRepository::default();
        repo.seed(reservation("AAAA0001", 1, 1, 2));
        let err = repo
            .insert_within_capacity(reservation("AAAA0001", 1, 5, 6), &[1], check(5, 5, 6))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::DuplicateCode(code) if code == "AAAA0001"));
    }

    #[tokio::test]
    async fn lists_with_filters_and_pages() {
        let repo = InMemoryReservationRepository::default();
        for i in 0..5 {
            repo.seed(reservation(&format!("CODE000{i}"), 1 + i % 2, i as i64, i as i64 + 1));
        }

        let all = repo
            .list(&ReservationFilter::default(), PageRequest::new(1, 2))
            .await
            .unwrap();
        assert_eq!((all.total, all.items.len(), all.total_pages), (5, 2, 3));

        let filter = ReservationFilter {
            vehicle_type_id: Some(2),
            ..Default::default()
        };
        assert_eq!(repo.list(&filter, PageRequest::default()).await.unwrap().total, 2);

        let filter = ReservationFilter {
            code_contains: Some("code0003".into()),
            ..Default::default()
        };
        assert_eq!(repo.list(&filter, PageRequest::default()).await.unwrap().total, 1);
    }

    #[tokio::test]
    async fn delete_reports_unknown_codes() {
        let repo = InMemoryReservationRepository::default();
        repo.seed(reservation("DEADBEEF", 1, 1, 2));
        assert!(repo.delete_by_code("DEADBEEF").await.unwrap());
        assert!(!repo.delete_by_code("DEADBEEF").await.unwrap());
    }

    #[tokio::test]
    async fn update_rejects_a_moved_row() {
        let repo = InMemoryReservationRepository::default();
        let stored = repo.seed(reservation("BEEF0001", 1, 1, 2));
        let loaded = stored.state();

        let mut finished = stored.clone();
        finished.finish().unwrap();
        repo.update(&finished, loaded).await.unwrap();

        let mut canceled = stored;
        canceled.cancel().unwrap();
        assert!(matches!(
            repo.update(&canceled, loaded).await,
            Err(DomainError::StaleState(_))
        ));
        let current = repo.find_by_code("BEEF0001").await.unwrap().unwrap();
        assert_eq!(current.status, ReservationStatus::Finished);
    }
}
