//! Reservation lifecycle manager
//!
//! Owns every status transition of a reservation:
//!
//! ```text
//! pending ──► active ──► finished
//!    │          │
//!    │          └──► canceled
//!    ├──► canceled
//!    └──► payment_failed ──► canceled
//! ```
//!
//! Creation holds the per-pool lock across the availability re-check and the
//! insert, and the repository re-verifies capacity inside its own
//! transaction. Every later write is conditional on the state that was read;
//! a lost race re-reads the reservation and decides again. Payment calls are
//! bounded by a timeout. Customer notifications are spawned and never affect
//! the caller's result.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{debug, info, warn};

use super::availability::{AvailabilityService, DEFAULT_MAX_WINDOW_DAYS};
use super::code::{generate_code, normalize_code};
use super::locks::PoolLocks;
use super::pricing::PricingService;
use crate::application::ports::{
    ChargeRequest, Notifier, NotifyError, PaymentError, PaymentGateway, RefundOutcome,
};
use crate::domain::reservation::{status_label, ReservationDraft};
use crate::domain::{
    CapacityCheck, DomainError, DomainResult, PaymentMethod, PaymentStatus, PoolMembership,
    PoolTopology, RepositoryProvider, Reservation, ReservationFilter, ReservationStatus,
};
use crate::shared::types::{PageRequest, PaginatedResult};
use crate::shared::utills::{retry_with_backoff, RetryConfig};

/// Reads of a reservation before a contended write gives up.
const STALE_ATTEMPTS: u32 = 3;

// ── Settings ───────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct LifecycleSettings {
    /// ISO 4217 code sent to the payment provider
    pub currency: String,
    /// Customers cannot cancel closer than this to the start time
    pub cancellation_cutoff: chrono::Duration,
    /// Share of the price charged online for on-site payments (0 = none)
    pub onsite_deposit_percent: u32,
    pub payment_timeout: Duration,
    pub notify_timeout: Duration,
    pub notifications_enabled: bool,
    /// Fresh codes tried before giving up on a collision streak
    pub code_attempts: u32,
    /// Longest window accepted for availability and booking
    pub max_window: chrono::Duration,
    /// Unpaid checkouts older than this stop holding a space
    pub pending_ttl: chrono::Duration,
    pub notify_retry: RetryConfig,
}

impl Default for LifecycleSettings {
    fn default() -> Self {
        Self {
            currency: "eur".to_string(),
            cancellation_cutoff: chrono::Duration::hours(12),
            onsite_deposit_percent: 0,
            payment_timeout: Duration::from_secs(10),
            notify_timeout: Duration::from_secs(10),
            notifications_enabled: true,
            code_attempts: 5,
            max_window: chrono::Duration::days(DEFAULT_MAX_WINDOW_DAYS),
            pending_ttl: chrono::Duration::minutes(60),
            notify_retry: RetryConfig::default(),
        }
    }
}

// ── Requests ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateActor {
    Customer,
    Admin,
}

#[derive(Debug, Clone)]
pub struct CreateReservation {
    pub draft: ReservationDraft,
    pub actor: CreateActor,
    /// Explicit price; administrators only
    pub total_price: Option<Decimal>,
}

#[derive(Debug, Clone)]
pub struct CreatedReservation {
    pub reservation: Reservation,
    /// Checkout page when a charge was started
    pub redirect_url: Option<String>,
    pub provider_reference: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelActor {
    /// When `email` is given it must match the booking.
    Customer { email: Option<String> },
    /// Not bound by the cutoff. `refund` decides whether money moves.
    Admin { refund: bool },
}

#[derive(Debug, Clone)]
pub struct CancelReservation {
    pub code: String,
    pub actor: CancelActor,
}

#[derive(Debug, Clone, Copy)]
enum Lookup<'a> {
    Code(&'a str),
    ProviderReference(&'a str),
}

// ── Service ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct ReservationService {
    repos: Arc<dyn RepositoryProvider>,
    availability: AvailabilityService,
    pricing: PricingService,
    payment: Arc<dyn PaymentGateway>,
    notifier: Arc<dyn Notifier>,
    locks: PoolLocks,
    settings: LifecycleSettings,
}

impl ReservationService {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        topology: Arc<PoolTopology>,
        payment: Arc<dyn PaymentGateway>,
        notifier: Arc<dyn Notifier>,
        settings: LifecycleSettings,
    ) -> Self {
        Self {
            availability: AvailabilityService::new(repos.clone(), topology.clone())
                .with_max_window(settings.max_window),
            pricing: PricingService::new(repos.clone(), topology),
            repos,
            payment,
            notifier,
            locks: PoolLocks::new(),
            settings,
        }
    }

    pub fn availability(&self) -> &AvailabilityService {
        &self.availability
    }

    pub fn pricing(&self) -> &PricingService {
        &self.pricing
    }

    pub fn settings(&self) -> &LifecycleSettings {
        &self.settings
    }

    // ── Create ─────────────────────────────────────────────────

    pub async fn create(&self, request: CreateReservation) -> DomainResult<CreatedReservation> {
        let CreateReservation {
            draft,
            actor,
            total_price,
        } = request;

        draft.validate()?;
        draft.window.ensure_at_most(self.settings.max_window)?;
        let membership = self
            .availability
            .topology()
            .resolve_id(draft.vehicle_type_id)?;

        let price = match (actor, total_price) {
            (CreateActor::Customer, Some(_)) => {
                return Err(DomainError::Forbidden(
                    "only administrators may set a reservation price".to_string(),
                ));
            }
            (CreateActor::Admin, Some(price)) if price.is_sign_negative() => {
                return Err(DomainError::invalid("total_price", "must not be negative"));
            }
            (CreateActor::Admin, Some(price)) => price,
            (_, None) => {
                self.pricing
                    .quote_window(draft.vehicle_type_id, draft.window)
                    .await?
                    .total
            }
        };

        let charge = self.amount_to_charge(actor, draft.payment_method, price);
        let status = if charge.is_some() {
            ReservationStatus::Pending
        } else {
            ReservationStatus::Active
        };

        let reservation = {
            let _pool_guard = self.locks.acquire(membership.pool_id).await;

            let check = self
                .availability
                .capacity_check(&membership, draft.window)
                .await?;
            let availability = self.availability.evaluate(&membership, check).await?;
            if !availability.is_available() {
                return Err(DomainError::Conflict(availability.message()));
            }

            self.insert_with_fresh_code(&draft, &membership, check, status, price)
                .await?
        };

        metrics::counter!("parkspace_reservations_created_total", "status" => reservation.status.as_str())
            .increment(1);
        info!(
            code = %reservation.code,
            vehicle_type_id = reservation.vehicle_type_id,
            pool_id = membership.pool_id,
            status = %reservation.status,
            total_price = %price,
            "Reservation created"
        );

        match charge {
            Some(amount) => self.start_payment(reservation, amount).await,
            None => {
                self.notify(&reservation);
                Ok(CreatedReservation {
                    reservation,
                    redirect_url: None,
                    provider_reference: None,
                })
            }
        }
    }

    /// Amount to collect online at booking time, if any.
    fn amount_to_charge(
        &self,
        actor: CreateActor,
        method: PaymentMethod,
        price: Decimal,
    ) -> Option<Decimal> {
        if actor == CreateActor::Admin {
            return None;
        }
        let amount = match method {
            PaymentMethod::Online => price,
            PaymentMethod::OnSite => (price
                * Decimal::from(self.settings.onsite_deposit_percent)
                / Decimal::ONE_HUNDRED)
                .round_dp_with_strategy(2, RoundingStrategy::ToZero),
        };
        (amount > Decimal::ZERO).then_some(amount)
    }

    async fn insert_with_fresh_code(
        &self,
        draft: &ReservationDraft,
        membership: &PoolMembership,
        check: CapacityCheck,
        status: ReservationStatus,
        price: Decimal,
    ) -> DomainResult<Reservation> {
        let max_attempts = self.settings.code_attempts.max(1);
        let mut attempt = 1;
        loop {
            let candidate = Reservation::new(draft.clone(), generate_code(), status, Some(price));
            match self
                .repos
                .reservations()
                .insert_within_capacity(candidate, &membership.members, check)
                .await
            {
                Err(DomainError::DuplicateCode(code)) if attempt < max_attempts => {
                    warn!(code = %code, attempt, "Reservation code collision, regenerating");
                    attempt += 1;
                }
                Err(DomainError::DuplicateCode(code)) => {
                    return Err(DomainError::Storage(format!(
                        "no unique reservation code after {attempt} attempts (last {code})"
                    )));
                }
                other => return other,
            }
        }
    }

    async fn start_payment(
        &self,
        mut reservation: Reservation,
        amount: Decimal,
    ) -> DomainResult<CreatedReservation> {
        let request = ChargeRequest {
            amount,
            currency: self.settings.currency.clone(),
            reservation_code: reservation.code.clone(),
            customer_email: reservation.contact.email.clone(),
            locale: reservation.locale,
        };
        let inserted = reservation.state();

        match self
            .call_payment("start_charge", self.payment.start_charge(request))
            .await
        {
            Ok(session) => {
                reservation.provider_reference = Some(session.provider_reference.clone());
                reservation.payment_status = PaymentStatus::Pending;
                reservation.updated_at = Utc::now();

                match self.repos.reservations().update(&reservation, inserted).await {
                    Ok(()) => {}
                    Err(DomainError::StaleState(code)) => {
                        warn!(code = %code, "Reservation changed while checkout was starting, voiding checkout");
                        if let Err(err) = self
                            .call_payment("cancel", self.payment.cancel(&session.provider_reference))
                            .await
                        {
                            warn!(code = %code, error = %err, "Orphaned checkout could not be voided");
                        }
                        return Err(DomainError::Conflict(format!(
                            "reservation {code} changed while its checkout was starting"
                        )));
                    }
                    Err(err) => return Err(err),
                }

                debug!(
                    code = %reservation.code,
                    provider_reference = %session.provider_reference,
                    amount = %amount,
                    "Checkout started"
                );
                Ok(CreatedReservation {
                    reservation,
                    redirect_url: Some(session.redirect_url),
                    provider_reference: Some(session.provider_reference),
                })
            }
            Err(err) => {
                warn!(code = %reservation.code, error = %err, "Payment could not be started, releasing space");
                reservation.fail_payment()?;
                match self.repos.reservations().update(&reservation, inserted).await {
                    Ok(()) | Err(DomainError::StaleState(_)) => Err(err),
                    Err(write_err) => Err(write_err),
                }
            }
        }
    }

    // ── Cancel ─────────────────────────────────────────────────

    pub async fn cancel(&self, request: CancelReservation) -> DomainResult<Reservation> {
        let code = normalize_code(&request.code);
        let actor = &request.actor;
        self.with_current(Lookup::Code(&code), move |reservation| {
            self.cancel_current(actor, reservation)
        })
        .await
    }

    async fn cancel_current(
        &self,
        actor: &CancelActor,
        mut reservation: Reservation,
    ) -> DomainResult<Reservation> {
        let loaded = reservation.state();

        if let CancelActor::Customer { email: Some(email) } = actor {
            if !reservation.belongs_to(email) {
                return Err(not_found(&reservation.code));
            }
        }

        match reservation.status {
            ReservationStatus::Canceled => {
                // An admin may still return money held by an earlier no-refund cancel.
                if *actor == (CancelActor::Admin { refund: true })
                    && self.release_payment(&mut reservation).await?
                {
                    reservation.updated_at = Utc::now();
                    self.repos.reservations().update(&reservation, loaded).await?;
                }
                return Ok(reservation);
            }
            ReservationStatus::Finished => {
                return Err(DomainError::invalid(
                    "status",
                    format!("reservation {} is finished and cannot be cancelled", reservation.code),
                ));
            }
            ReservationStatus::PaymentFailed if matches!(actor, CancelActor::Customer { .. }) => {
                return Err(DomainError::Forbidden(format!(
                    "reservation {} failed payment and can only be cancelled by an administrator",
                    reservation.code
                )));
            }
            ReservationStatus::Pending
            | ReservationStatus::Active
            | ReservationStatus::PaymentFailed => {}
        }

        let refund = match actor {
            CancelActor::Customer { .. } => {
                let lead = reservation.time_until_start(Utc::now());
                if lead < self.settings.cancellation_cutoff {
                    return Err(DomainError::Forbidden(format!(
                        "reservations can only be cancelled more than {} hours before the start time",
                        self.settings.cancellation_cutoff.num_hours()
                    )));
                }
                true
            }
            CancelActor::Admin { refund } => *refund,
        };

        if refund {
            self.release_payment(&mut reservation).await?;
        }
        reservation.cancel()?;
        self.repos.reservations().update(&reservation, loaded).await?;

        metrics::counter!("parkspace_reservations_canceled_total").increment(1);
        info!(
            code = %reservation.code,
            refund,
            payment_status = reservation.payment_status.as_str(),
            "Reservation canceled"
        );
        self.notify(&reservation);

        Ok(reservation)
    }

    /// Void an uncaptured checkout or refund a captured one. Returns whether
    /// the payment status changed.
    async fn release_payment(&self, reservation: &mut Reservation) -> DomainResult<bool> {
        let Some(reference) = reservation.provider_reference.clone() else {
            return Ok(false);
        };

        match reservation.payment_status {
            PaymentStatus::Pending => {
                self.call_payment("cancel", self.payment.cancel(&reference))
                    .await?;
                reservation.payment_status = PaymentStatus::Voided;
            }
            PaymentStatus::Succeeded => {
                let outcome = self
                    .call_payment("refund", self.payment.refund(&reference))
                    .await?;
                if outcome == RefundOutcome::AlreadyRefunded {
                    info!(code = %reservation.code, "Payment was already refunded at the provider");
                }
                reservation.payment_status = PaymentStatus::Refunded;
            }
            PaymentStatus::None
            | PaymentStatus::Refunded
            | PaymentStatus::Voided
            | PaymentStatus::Failed => return Ok(false),
        }
        Ok(true)
    }

    // ── Provider events ────────────────────────────────────────

    /// Checkout completed: capture, then `pending → active`.
    ///
    /// The capture happens once. If the reservation left `pending` while it
    /// was in flight, the captured money is recorded and handed back.
    pub async fn confirm_payment(
        &self,
        provider_reference: &str,
        payment_intent: Option<String>,
    ) -> DomainResult<Reservation> {
        let reservation = self.load_by_reference(provider_reference).await?;

        match reservation.status {
            ReservationStatus::Pending => {}
            ReservationStatus::Active => {
                debug!(code = %reservation.code, "Payment already confirmed");
                return Ok(reservation);
            }
            other => {
                warn!(
                    code = %reservation.code,
                    status = %other,
                    "Ignoring payment confirmation for a reservation that is no longer pending"
                );
                return Ok(reservation);
            }
        }

        self.call_payment("capture", self.payment.capture(provider_reference))
            .await?;

        self.with_current(Lookup::ProviderReference(provider_reference), move |reservation| {
            self.settle_capture(reservation, payment_intent.clone())
        })
        .await
    }

    async fn settle_capture(
        &self,
        mut reservation: Reservation,
        payment_intent: Option<String>,
    ) -> DomainResult<Reservation> {
        let loaded = reservation.state();

        match reservation.status {
            ReservationStatus::Pending => {
                reservation.activate()?;
                reservation.payment_status = PaymentStatus::Succeeded;
                reservation.payment_intent = payment_intent;
                self.repos.reservations().update(&reservation, loaded).await?;

                metrics::counter!("parkspace_payments_confirmed_total").increment(1);
                info!(code = %reservation.code, "Payment confirmed, reservation active");
                self.notify(&reservation);
            }
            ReservationStatus::Active => {
                debug!(code = %reservation.code, "Payment confirmed concurrently");
            }
            status => {
                warn!(
                    code = %reservation.code,
                    status = %status,
                    "Charge captured after the reservation left pending, refunding"
                );
                if !matches!(
                    reservation.payment_status,
                    PaymentStatus::Succeeded | PaymentStatus::Refunded
                ) {
                    reservation.payment_status = PaymentStatus::Succeeded;
                    reservation.payment_intent = payment_intent;
                    reservation.updated_at = Utc::now();
                    self.repos.reservations().update(&reservation, loaded).await?;
                }

                let captured = reservation.state();
                if self.release_payment(&mut reservation).await? {
                    reservation.updated_at = Utc::now();
                    self.repos.reservations().update(&reservation, captured).await?;
                }
            }
        }

        Ok(reservation)
    }

    pub async fn record_payment_failure(
        &self,
        provider_reference: &str,
    ) -> DomainResult<Reservation> {
        self.with_current(Lookup::ProviderReference(provider_reference), move |reservation| {
            self.fail_current(reservation)
        })
        .await
    }

    async fn fail_current(&self, mut reservation: Reservation) -> DomainResult<Reservation> {
        if reservation.status != ReservationStatus::Pending {
            debug!(
                code = %reservation.code,
                status = %reservation.status,
                "Ignoring payment failure for a reservation that is not pending"
            );
            return Ok(reservation);
        }

        let loaded = reservation.state();
        reservation.fail_payment()?;
        self.repos.reservations().update(&reservation, loaded).await?;

        info!(code = %reservation.code, "Payment failed, space released");
        self.notify(&reservation);

        Ok(reservation)
    }

    /// Refund issued outside of this service (provider dashboard).
    pub async fn record_refund(&self, provider_reference: &str) -> DomainResult<Reservation> {
        self.with_current(Lookup::ProviderReference(provider_reference), move |reservation| {
            self.refund_current(reservation)
        })
        .await
    }

    async fn refund_current(&self, mut reservation: Reservation) -> DomainResult<Reservation> {
        if reservation.payment_status == PaymentStatus::Refunded
            && reservation.status == ReservationStatus::Canceled
        {
            return Ok(reservation);
        }

        let loaded = reservation.state();
        let notify = reservation.status != ReservationStatus::Canceled;
        if !reservation.status.is_terminal() {
            reservation.cancel()?;
        }
        reservation.payment_status = PaymentStatus::Refunded;
        reservation.updated_at = Utc::now();
        self.repos.reservations().update(&reservation, loaded).await?;

        info!(code = %reservation.code, status = %reservation.status, "External refund recorded");
        if notify && reservation.status == ReservationStatus::Canceled {
            self.notify(&reservation);
        }

        Ok(reservation)
    }

    // ── Sweep ──────────────────────────────────────────────────

    /// Move every active reservation whose window ended before `now` to
    /// finished. Returns how many were moved.
    pub async fn finish_elapsed(&self, now: chrono::DateTime<Utc>) -> DomainResult<u64> {
        let ids = self.repos.reservations().list_active_past_end(now).await?;
        if ids.is_empty() {
            return Ok(0);
        }

        let finished = self
            .repos
            .reservations()
            .bulk_update_status(&ids, ReservationStatus::Finished, now)
            .await?;

        metrics::counter!("parkspace_reservations_finished_total").increment(finished);
        info!(count = finished, "Elapsed reservations finished");
        Ok(finished)
    }

    /// Release checkouts left `pending` for longer than the configured TTL:
    /// each moves to `payment_failed` and its checkout is voided. Returns how
    /// many were released.
    pub async fn expire_abandoned(&self, now: chrono::DateTime<Utc>) -> DomainResult<u64> {
        let cutoff = now - self.settings.pending_ttl;
        let abandoned = self
            .repos
            .reservations()
            .list_pending_created_before(cutoff)
            .await?;

        let mut expired = 0;
        for mut reservation in abandoned {
            let loaded = reservation.state();
            reservation.fail_payment()?;
            match self.repos.reservations().update(&reservation, loaded).await {
                Ok(()) => expired += 1,
                Err(DomainError::StaleState(code)) => {
                    debug!(code = %code, "Checkout settled before it expired");
                    continue;
                }
                Err(err) => return Err(err),
            }

            if let Some(reference) = reservation.provider_reference.clone() {
                match self
                    .call_payment("cancel", self.payment.cancel(&reference))
                    .await
                {
                    Ok(()) => {
                        let failed = reservation.state();
                        reservation.payment_status = PaymentStatus::Voided;
                        if let Err(err) =
                            self.repos.reservations().update(&reservation, failed).await
                        {
                            warn!(code = %reservation.code, error = %err, "Voided checkout not recorded");
                        }
                    }
                    Err(err) => {
                        warn!(code = %reservation.code, error = %err, "Abandoned checkout could not be voided");
                    }
                }
            }

            info!(code = %reservation.code, "Abandoned checkout expired, space released");
            self.notify(&reservation);
        }

        if expired > 0 {
            metrics::counter!("parkspace_reservations_expired_total").increment(expired);
        }
        Ok(expired)
    }

    // ── Queries ────────────────────────────────────────────────

    /// Lookup by code. A mismatching `email` is reported as not found.
    pub async fn find_for_customer(
        &self,
        code: &str,
        email: Option<&str>,
    ) -> DomainResult<Reservation> {
        let code = normalize_code(code);
        let reservation = self.load(&code).await?;
        match email {
            Some(email) if !reservation.belongs_to(email) => Err(not_found(&code)),
            _ => Ok(reservation),
        }
    }

    pub async fn find_by_provider_reference(
        &self,
        provider_reference: &str,
    ) -> DomainResult<Reservation> {
        self.load_by_reference(provider_reference).await
    }

    pub async fn list(
        &self,
        filter: &ReservationFilter,
        page: PageRequest,
    ) -> DomainResult<PaginatedResult<Reservation>> {
        self.repos.reservations().list(filter, page).await
    }

    pub async fn delete(&self, code: &str) -> DomainResult<()> {
        let code = normalize_code(code);
        if !self.repos.reservations().delete_by_code(&code).await? {
            return Err(not_found(&code));
        }
        info!(code = %code, "Reservation deleted");
        Ok(())
    }

    // ── Helpers ────────────────────────────────────────────────

    /// Read the reservation and run `step` on it, reading again whenever
    /// its conditional write loses to a concurrent change.
    async fn with_current<F, Fut>(&self, lookup: Lookup<'_>, mut step: F) -> DomainResult<Reservation>
    where
        F: FnMut(Reservation) -> Fut,
        Fut: Future<Output = DomainResult<Reservation>>,
    {
        let mut attempt = 1;
        loop {
            let reservation = match lookup {
                Lookup::Code(code) => self.load(code).await?,
                Lookup::ProviderReference(reference) => self.load_by_reference(reference).await?,
            };
            match step(reservation).await {
                Err(DomainError::StaleState(code)) if attempt < STALE_ATTEMPTS => {
                    debug!(code = %code, attempt, "Reservation changed concurrently, reading again");
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    async fn load(&self, code: &str) -> DomainResult<Reservation> {
        self.repos
            .reservations()
            .find_by_code(code)
            .await?
            .ok_or_else(|| not_found(code))
    }

    async fn load_by_reference(&self, provider_reference: &str) -> DomainResult<Reservation> {
        self.repos
            .reservations()
            .find_by_provider_reference(provider_reference)
            .await?
            .ok_or_else(|| DomainError::NotFound {
                entity: "Reservation",
                field: "provider_reference",
                value: provider_reference.to_string(),
            })
    }

    async fn call_payment<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T, PaymentError>>,
    ) -> DomainResult<T> {
        match tokio::time::timeout(self.settings.payment_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(err.into_domain(operation)),
            Err(_) => Err(DomainError::UpstreamFailure {
                service: "payment",
                message: format!(
                    "{operation}: no response within {}ms",
                    self.settings.payment_timeout.as_millis()
                ),
                retryable: true,
            }),
        }
    }

    /// Fire-and-forget status notification.
    fn notify(&self, reservation: &Reservation) {
        if !self.settings.notifications_enabled {
            return;
        }

        let notifier = self.notifier.clone();
        let reservation = reservation.clone();
        let timeout = self.settings.notify_timeout;
        let retry = self.settings.notify_retry.clone();

        tokio::spawn(async move {
            let label = status_label(reservation.status, reservation.locale);
            let result = retry_with_backoff(
                retry,
                || async {
                    match tokio::time::timeout(
                        timeout,
                        notifier.notify(&reservation, label, reservation.locale),
                    )
                    .await
                    {
                        Ok(result) => result,
                        Err(_) => Err(NotifyError::Timeout),
                    }
                },
                |_| true,
                "notify_customer",
            )
            .await;

            if let Err(err) = result {
                warn!(code = %reservation.code, error = %err, "Customer notification failed");
            }
        });
    }
}

fn not_found(code: &str) -> DomainError {
    DomainError::NotFound {
        entity: "Reservation",
        field: "code",
        value: code.to_string(),
    }
}
