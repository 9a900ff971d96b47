//! Shared fixtures for booking tests: a seeded in-memory store, a scriptable
//! payment gateway and a recording notifier.

use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use dashmap::{DashMap, DashSet};
use rust_decimal::Decimal;

use super::{AvailabilityService, LifecycleSettings, PricingService, ReservationService};
use crate::application::ports::{
    ChargeRequest, CheckoutSession, Notifier, NotifyError, PaymentError, PaymentGateway,
    RefundOutcome,
};
use crate::domain::reservation::{
    CustomerContact, Locale, ReservationDraft, ReservationRepository,
};
use crate::domain::vehicle::CatalogRepository;
use crate::domain::{
    BillingUnit, CapacityCheck, DomainError, DomainResult, PaymentMethod, PaymentStatus,
    PoolTopology, PriceEntry, RepositoryProvider, Reservation, ReservationFilter,
    ReservationState, ReservationStatus, SpacePool, TimeWindow, VehicleType,
};
use crate::infrastructure::storage::InMemoryRepositoryProvider;
use crate::shared::types::{PageRequest, PaginatedResult};
use crate::shared::utills::RetryConfig;

// ── Time helpers ───────────────────────────────────────────────

/// `h` hours after a fixed instant far in the future.
pub fn at(h: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 6, 1, 0, 0, 0).unwrap() + chrono::Duration::hours(h)
}

pub fn window(start_h: i64, end_h: i64) -> TimeWindow {
    TimeWindow::new(at(start_h), at(end_h)).unwrap()
}

/// Window starting `ahead_h` hours from now and lasting `length_h` hours.
pub fn from_now(ahead_h: i64, length_h: i64) -> TimeWindow {
    let start = Utc::now() + chrono::Duration::hours(ahead_h);
    TimeWindow::new(start, start + chrono::Duration::hours(length_h)).unwrap()
}

pub fn customer_draft(
    vehicle_type_id: i32,
    window: TimeWindow,
    payment_method: PaymentMethod,
) -> ReservationDraft {
    ReservationDraft {
        contact: CustomerContact {
            name: "Maria Rossi".into(),
            email: "maria@example.com".into(),
            phone: Some("+39 333 000 0000".into()),
        },
        vehicle_type_id,
        vehicle_plate: "ab123cd".into(),
        vehicle_model: Some("Fiat Panda".into()),
        payment_method,
        window,
        locale: Locale::En,
    }
}

// ── Payment gateway ────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeGatewayMode {
    Normal,
    /// Every call fails with a non-retryable decline
    Declining,
    /// Every call hangs forever
    Hanging,
}

/// Holds calls of one kind until the test lets them through.
#[derive(Default)]
pub struct CallGate {
    held: tokio::sync::Mutex<()>,
    entered: tokio::sync::Notify,
}

impl CallGate {
    /// Calls block while the returned guard is alive.
    pub async fn hold(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.held.lock().await
    }

    /// Resolves once a call has reached the gate.
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    async fn pass(&self) {
        self.entered.notify_one();
        drop(self.held.lock().await);
    }
}

#[derive(Default)]
pub struct FakeGateway {
    pub capture_gate: CallGate,
    pub void_gate: CallGate,
    mode: AtomicU8,
    charges: DashMap<String, Decimal>,
    refunded_refs: DashSet<String>,
    started: AtomicU32,
    captured: AtomicU32,
    voided: AtomicU32,
    refunded: AtomicU32,
}

impl FakeGateway {
    pub fn set_mode(&self, mode: FakeGatewayMode) {
        let raw = match mode {
            FakeGatewayMode::Normal => 0,
            FakeGatewayMode::Declining => 1,
            FakeGatewayMode::Hanging => 2,
        };
        self.mode.store(raw, Ordering::SeqCst);
    }

    fn mode(&self) -> FakeGatewayMode {
        match self.mode.load(Ordering::SeqCst) {
            1 => FakeGatewayMode::Declining,
            2 => FakeGatewayMode::Hanging,
            _ => FakeGatewayMode::Normal,
        }
    }

    async fn gate(&self) -> Result<(), PaymentError> {
        match self.mode() {
            FakeGatewayMode::Normal => Ok(()),
            FakeGatewayMode::Declining => Err(PaymentError::Declined("card declined".into())),
            FakeGatewayMode::Hanging => std::future::pending().await,
        }
    }

    /// Simulate a refund issued from the provider dashboard.
    pub fn mark_refunded(&self, reference: &str) {
        self.refunded_refs.insert(reference.to_string());
    }

    pub fn charged_amount(&self, reservation: &Reservation) -> Option<Decimal> {
        let reference = reservation.provider_reference.as_deref()?;
        self.charges.get(reference).map(|amount| *amount)
    }

    pub fn started(&self) -> u32 {
        self.started.load(Ordering::SeqCst)
    }

    pub fn captured(&self) -> u32 {
        self.captured.load(Ordering::SeqCst)
    }

    pub fn voided(&self) -> u32 {
        self.voided.load(Ordering::SeqCst)
    }

    pub fn refunded(&self) -> u32 {
        self.refunded.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn start_charge(&self, request: ChargeRequest) -> Result<CheckoutSession, PaymentError> {
        self.gate().await?;
        let n = self.started.fetch_add(1, Ordering::SeqCst) + 1;
        let reference = format!("cs_test_{n}");
        self.charges.insert(reference.clone(), request.amount);
        Ok(CheckoutSession {
            redirect_url: format!("https://pay.test/{reference}"),
            provider_reference: reference,
        })
    }

    async fn refund(&self, provider_reference: &str) -> Result<RefundOutcome, PaymentError> {
        self.gate().await?;
        if !self.refunded_refs.insert(provider_reference.to_string()) {
            return Ok(RefundOutcome::AlreadyRefunded);
        }
        self.refunded.fetch_add(1, Ordering::SeqCst);
        Ok(RefundOutcome::Refunded)
    }

    async fn capture(&self, _provider_reference: &str) -> Result<(), PaymentError> {
        self.capture_gate.pass().await;
        self.gate().await?;
        self.captured.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn cancel(&self, _provider_reference: &str) -> Result<(), PaymentError> {
        self.void_gate.pass().await;
        self.gate().await?;
        self.voided.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ── Notifier ───────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    /// Wait until at least `n` notifications arrived (they are spawned).
    pub async fn wait_for(&self, n: usize) -> Vec<(String, String)> {
        for _ in 0..100 {
            let sent = self.sent.lock().unwrap().clone();
            if sent.len() >= n {
                return sent;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("expected {n} notifications");
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(
        &self,
        reservation: &Reservation,
        status_label: &str,
        _locale: Locale,
    ) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .unwrap()
            .push((reservation.code.clone(), status_label.to_string()));
        Ok(())
    }
}

// ── Code collisions ────────────────────────────────────────────

/// Reports the first `remaining` inserts as code collisions.
struct CollidingProvider {
    inner: Arc<InMemoryRepositoryProvider>,
    remaining: AtomicU32,
}

impl RepositoryProvider for CollidingProvider {
    fn catalog(&self) -> &dyn CatalogRepository {
        self.inner.catalog()
    }

    fn reservations(&self) -> &dyn ReservationRepository {
        self
    }
}

#[async_trait]
impl ReservationRepository for CollidingProvider {
    async fn insert_within_capacity(
        &self,
        reservation: Reservation,
        members: &[i32],
        check: CapacityCheck,
    ) -> DomainResult<Reservation> {
        let collide = self
            .remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if collide {
            return Err(DomainError::DuplicateCode(reservation.code));
        }
        self.inner
            .reservations()
            .insert_within_capacity(reservation, members, check)
            .await
    }

    async fn find_overlapping(
        &self,
        members: &[i32],
        window: TimeWindow,
        excluded: &[ReservationStatus],
    ) -> DomainResult<Vec<TimeWindow>> {
        self.inner
            .reservations()
            .find_overlapping(members, window, excluded)
            .await
    }

    async fn find_by_code(&self, code: &str) -> DomainResult<Option<Reservation>> {
        self.inner.reservations().find_by_code(code).await
    }

    async fn find_by_provider_reference(
        &self,
        reference: &str,
    ) -> DomainResult<Option<Reservation>> {
        self.inner
            .reservations()
            .find_by_provider_reference(reference)
            .await
    }

    async fn update(
        &self,
        reservation: &Reservation,
        expected: ReservationState,
    ) -> DomainResult<()> {
        self.inner.reservations().update(reservation, expected).await
    }

    async fn list_active_past_end(&self, now: DateTime<Utc>) -> DomainResult<Vec<i32>> {
        self.inner.reservations().list_active_past_end(now).await
    }

    async fn list_pending_created_before(
        &self,
        created_before: DateTime<Utc>,
    ) -> DomainResult<Vec<Reservation>> {
        self.inner
            .reservations()
            .list_pending_created_before(created_before)
            .await
    }

    async fn bulk_update_status(
        &self,
        ids: &[i32],
        status: ReservationStatus,
        now: DateTime<Utc>,
    ) -> DomainResult<u64> {
        self.inner
            .reservations()
            .bulk_update_status(ids, status, now)
            .await
    }

    async fn list(
        &self,
        filter: &ReservationFilter,
        page: PageRequest,
    ) -> DomainResult<PaginatedResult<Reservation>> {
        self.inner.reservations().list(filter, page).await
    }

    async fn delete_by_code(&self, code: &str) -> DomainResult<bool> {
        self.inner.reservations().delete_by_code(code).await
    }
}

// ── Environment ────────────────────────────────────────────────

pub fn topology() -> PoolTopology {
    PoolTopology::new()
        .with_member(1, "car", 1)
        .with_member(2, "motorcycle", 2)
        .with_member(3, "suv", 1)
}

/// Car and SUV share pool 1, motorcycles use pool 2. Every type has a
/// tier-coherent price table (car/suv hour = 5).
pub fn seed_catalog(store: &InMemoryRepositoryProvider, capacity: Option<u32>) {
    let catalog = store.catalog_store();
    for (id, name) in [(1, "car"), (2, "motorcycle")] {
        catalog.add_pool(SpacePool {
            id,
            name: name.to_string(),
            total_spaces: capacity,
        });
    }
    for (id, name, pool_id) in [(1, "car", 1), (2, "motorcycle", 2), (3, "suv", 1)] {
        catalog.add_vehicle_type(VehicleType {
            id,
            name: name.to_string(),
            pool_id,
        });
    }
    let tables: [(i32, [i64; 4]); 3] = [
        (1, [5, 120, 840, 4200]),
        (2, [3, 72, 504, 2520]),
        (3, [5, 120, 840, 4200]),
    ];
    for (vehicle_type_id, prices) in tables {
        for (unit, price) in BillingUnit::ALL.into_iter().zip(prices) {
            catalog.put_price(PriceEntry {
                vehicle_type_id,
                unit,
                price: Decimal::from(price),
            });
        }
    }
}

pub struct TestEnv {
    pub store: Arc<InMemoryRepositoryProvider>,
    pub repos: Arc<dyn RepositoryProvider>,
    pub availability: AvailabilityService,
    pub pricing: PricingService,
    pub service: ReservationService,
    pub gateway: Arc<FakeGateway>,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestEnv {
    fn build(capacity: Option<u32>, settings: LifecycleSettings, collisions: u32) -> Self {
        let store = Arc::new(InMemoryRepositoryProvider::new());
        seed_catalog(&store, capacity);

        let repos: Arc<dyn RepositoryProvider> = if collisions > 0 {
            Arc::new(CollidingProvider {
                inner: store.clone(),
                remaining: AtomicU32::new(collisions),
            }) as Arc<dyn RepositoryProvider>
        } else {
            store.clone() as Arc<dyn RepositoryProvider>
        };

        let topology = Arc::new(topology());
        let gateway = Arc::new(FakeGateway::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let service = ReservationService::new(
            repos.clone(),
            topology.clone(),
            gateway.clone(),
            notifier.clone(),
            settings,
        );

        Self {
            availability: AvailabilityService::new(repos.clone(), topology.clone()),
            pricing: PricingService::new(repos.clone(), topology),
            store,
            repos,
            service,
            gateway,
            notifier,
        }
    }

    pub async fn unconfigured() -> Self {
        Self::build(None, fast_settings(), 0)
    }

    pub async fn colliding(collisions: u32, settings: LifecycleSettings) -> Self {
        Self::build(Some(5), settings, collisions)
    }

    /// Store a reservation directly, bypassing the capacity check.
    pub async fn insert(
        &self,
        vehicle_type_id: i32,
        window: TimeWindow,
        status: ReservationStatus,
    ) -> Reservation {
        let draft = customer_draft(vehicle_type_id, window, PaymentMethod::OnSite);
        let code = crate::application::booking::code::generate_code();
        self.store
            .reservation_store()
            .seed(Reservation::new(draft, code, status, None))
    }

    /// Pretend a checkout for `code` was completed outside the service.
    pub async fn force_payment(&self, code: &str, reference: &str, status: PaymentStatus) {
        let mut reservation = self
            .repos
            .reservations()
            .find_by_code(code)
            .await
            .unwrap()
            .unwrap();
        let expected = reservation.state();
        reservation.provider_reference = Some(reference.to_string());
        reservation.payment_status = status;
        self.repos
            .reservations()
            .update(&reservation, expected)
            .await
            .unwrap();
    }
}

fn fast_settings() -> LifecycleSettings {
    LifecycleSettings {
        notify_retry: RetryConfig {
            max_attempts: 2,
            initial_delay: Duration::from_millis(1),
            backoff_multiplier: 2.0,
            max_delay: Duration::from_millis(5),
        },
        ..LifecycleSettings::default()
    }
}

pub async fn seeded(capacity: u32) -> TestEnv {
    TestEnv::build(Some(capacity), fast_settings(), 0)
}

pub async fn seeded_with(capacity: u32, settings: LifecycleSettings) -> TestEnv {
    TestEnv::build(Some(capacity), settings, 0)
}
