//! Reservation domain entity

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use super::locale::Locale;
use crate::domain::availability::TimeWindow;
use crate::domain::{DomainError, DomainResult};

/// Reservation lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReservationStatus {
    /// Created, waiting for payment confirmation
    Pending,
    /// Paid (or pay-on-site) and holding a space
    Active,
    /// End of the booked window has passed
    Finished,
    /// Cancelled by the customer or an administrator
    Canceled,
    /// Payment could not be started or was rejected
    PaymentFailed,
}

impl ReservationStatus {
    pub const ALL: [ReservationStatus; 5] = [
        Self::Pending,
        Self::Active,
        Self::Finished,
        Self::Canceled,
        Self::PaymentFailed,
    ];

    /// Statuses that do not hold a space.
    pub const NON_OCCUPYING: [ReservationStatus; 2] = [Self::Canceled, Self::PaymentFailed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Finished => "finished",
            Self::Canceled => "canceled",
            Self::PaymentFailed => "payment_failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
    }

    pub fn is_occupying(&self) -> bool {
        !Self::NON_OCCUPYING.contains(self)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished | Self::Canceled)
    }

    pub fn can_transition_to(&self, next: ReservationStatus) -> bool {
        use ReservationStatus::*;
        matches!(
            (*self, next),
            (Pending, Active)
                | (Pending, Canceled)
                | (Pending, PaymentFailed)
                | (Active, Finished)
                | (Active, Canceled)
                | (PaymentFailed, Canceled)
        )
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How the customer pays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    /// Checkout with the payment provider at booking time
    Online,
    /// Pay at the car park; an optional deposit may still be charged online
    OnSite,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::OnSite => "on_site",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "online" => Some(Self::Online),
            "on_site" | "onsite" => Some(Self::OnSite),
            _ => None,
        }
    }
}

/// Money state as last reported by the payment provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    None,
    Pending,
    Succeeded,
    Refunded,
    Voided,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Pending => "pending",
            Self::Succeeded => "succeeded",
            Self::Refunded => "refunded",
            Self::Voided => "voided",
            Self::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        [
            Self::None,
            Self::Pending,
            Self::Succeeded,
            Self::Refunded,
            Self::Voided,
            Self::Failed,
        ]
        .into_iter()
        .find(|p| p.as_str() == s)
    }
}

/// Status pair a conditional write expects to find in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReservationState {
    pub status: ReservationStatus,
    pub payment_status: PaymentStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerContact {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// Everything the caller supplies to book a space.
#[derive(Debug, Clone)]
pub struct ReservationDraft {
    pub contact: CustomerContact,
    pub vehicle_type_id: i32,
    pub vehicle_plate: String,
    pub vehicle_model: Option<String>,
    pub payment_method: PaymentMethod,
    pub window: TimeWindow,
    pub locale: Locale,
}

impl ReservationDraft {
    pub fn validate(&self) -> DomainResult<()> {
        if self.contact.name.trim().is_empty() {
            return Err(DomainError::invalid("name", "is required"));
        }
        let email = self.contact.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(DomainError::invalid("email", "must be a valid address"));
        }
        if self.vehicle_plate.trim().is_empty() {
            return Err(DomainError::invalid("vehicle_plate", "is required"));
        }
        Ok(())
    }
}

/// Parking reservation
#[derive(Debug, Clone)]
pub struct Reservation {
    /// Store id; 0 until inserted
    pub id: i32,
    /// External handle given to the customer
    pub code: String,
    pub contact: CustomerContact,
    pub vehicle_type_id: i32,
    pub vehicle_plate: String,
    pub vehicle_model: Option<String>,
    pub payment_method: PaymentMethod,
    pub window: TimeWindow,
    pub status: ReservationStatus,
    pub payment_status: PaymentStatus,
    /// Checkout session id at the payment provider
    pub provider_reference: Option<String>,
    /// Captured payment intent, set on confirmation
    pub payment_intent: Option<String>,
    pub total_price: Option<Decimal>,
    pub locale: Locale,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    pub fn new(
        draft: ReservationDraft,
        code: impl Into<String>,
        status: ReservationStatus,
        total_price: Option<Decimal>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            code: code.into(),
            contact: draft.contact,
            vehicle_type_id: draft.vehicle_type_id,
            vehicle_plate: draft.vehicle_plate.trim().to_uppercase(),
            vehicle_model: draft.vehicle_model,
            payment_method: draft.payment_method,
            window: draft.window,
            status,
            payment_status: PaymentStatus::None,
            provider_reference: None,
            payment_intent: None,
            total_price,
            locale: draft.locale,
            created_at: now,
            updated_at: now,
        }
    }

    fn transition(&mut self, next: ReservationStatus) -> DomainResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::invalid(
                "status",
                format!(
                    "reservation {} cannot move from {} to {}",
                    self.code, self.status, next
                ),
            ));
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn activate(&mut self) -> DomainResult<()> {
        self.transition(ReservationStatus::Active)
    }

    /// Cancelling an already cancelled reservation is a no-op.
    pub fn cancel(&mut self) -> DomainResult<()> {
        if self.status == ReservationStatus::Canceled {
            return Ok(());
        }
        self.transition(ReservationStatus::Canceled)
    }

    pub fn fail_payment(&mut self) -> DomainResult<()> {
        self.transition(ReservationStatus::PaymentFailed)?;
        self.payment_status = PaymentStatus::Failed;
        Ok(())
    }

    pub fn finish(&mut self) -> DomainResult<()> {
        self.transition(ReservationStatus::Finished)
    }

    pub fn is_occupying(&self) -> bool {
        self.status.is_occupying()
    }

    pub fn state(&self) -> ReservationState {
        ReservationState {
            status: self.status,
            payment_status: self.payment_status,
        }
    }

    /// Time left before the booked window starts (negative once started).
    pub fn time_until_start(&self, now: DateTime<Utc>) -> Duration {
        self.window.start() - now
    }

    /// Email comparison used when a customer identifies a booking.
    pub fn belongs_to(&self, email: &str) -> bool {
        self.contact.email.trim().eq_ignore_ascii_case(email.trim())
    }
}

// ── Tests ──────────────────────────────────────────────────────
