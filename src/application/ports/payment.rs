//! Payment provider port
//!
//! [`PaymentGateway`] is the boundary between reservation lifecycle logic
//! and whichever provider takes the money. Every call is keyed by the opaque
//! provider reference returned from [`PaymentGateway::start_charge`].

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::reservation::Locale;
use crate::domain::DomainError;

/// Amount to collect for one reservation.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargeRequest {
    pub amount: Decimal,
    /// ISO 4217, lowercase
    pub currency: String,
    pub reservation_code: String,
    pub customer_email: String,
    pub locale: Locale,
}

/// Checkout started at the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    /// Where the customer completes payment
    pub redirect_url: String,
    pub provider_reference: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefundOutcome {
    Refunded,
    /// The provider had already returned the money. Treated as success.
    AlreadyRefunded,
}

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("payment declined: {0}")]
    Declined(String),

    #[error("unknown provider reference {0}")]
    UnknownReference(String),

    #[error("operation not allowed in current payment state: {0}")]
    InvalidState(String),

    /// Provider unreachable or returned a server error.
    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

impl PaymentError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }

    pub fn into_domain(self, operation: &str) -> DomainError {
        DomainError::UpstreamFailure {
            service: "payment",
            message: format!("{operation}: {self}"),
            retryable: self.is_retryable(),
        }
    }
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn start_charge(&self, request: ChargeRequest) -> Result<CheckoutSession, PaymentError>;

    async fn refund(&self, provider_reference: &str) -> Result<RefundOutcome, PaymentError>;

    async fn capture(&self, provider_reference: &str) -> Result<(), PaymentError>;

    /// Void a checkout that was never captured.
    async fn cancel(&self, provider_reference: &str) -> Result<(), PaymentError>;
}
