//! Sandbox payment provider
//!
//! Keeps checkout sessions in memory and moves them through the same states
//! a hosted checkout would: open, captured, voided, refunded. Used for local
//! runs and demos; the provider callback endpoint drives confirmation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::application::ports::{
    ChargeRequest, CheckoutSession, PaymentError, PaymentGateway, RefundOutcome,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SandboxChargeState {
    Open,
    Captured,
    Voided,
    Refunded,
}

#[derive(Debug, Clone)]
pub struct SandboxCharge {
    pub reservation_code: String,
    pub amount: Decimal,
    pub currency: String,
    pub state: SandboxChargeState,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct SandboxPaymentGateway {
    checkout_base_url: String,
    charges: Arc<DashMap<String, SandboxCharge>>,
}

impl SandboxPaymentGateway {
    pub fn new(checkout_base_url: impl Into<String>) -> Self {
        Self {
            checkout_base_url: checkout_base_url.into().trim_end_matches('/').to_string(),
            charges: Arc::new(DashMap::new()),
        }
    }

    pub fn charge(&self, provider_reference: &str) -> Option<SandboxCharge> {
        self.charges.get(provider_reference).map(|c| c.clone())
    }

    fn transition(
        &self,
        provider_reference: &str,
        apply: impl FnOnce(&mut SandboxCharge) -> Result<(), PaymentError>,
    ) -> Result<(), PaymentError> {
        let mut charge = self
            .charges
            .get_mut(provider_reference)
            .ok_or_else(|| PaymentError::UnknownReference(provider_reference.to_string()))?;
        apply(&mut charge)
    }
}

fn invalid_state(charge: &SandboxCharge, operation: &str) -> PaymentError {
    PaymentError::InvalidState(format!(
        "cannot {} a {:?} checkout for {}",
        operation, charge.state, charge.reservation_code
    ))
}

#[async_trait]
impl PaymentGateway for SandboxPaymentGateway {
    async fn start_charge(&self, request: ChargeRequest) -> Result<CheckoutSession, PaymentError> {
        if request.amount <= Decimal::ZERO {
            return Err(PaymentError::Declined(format!(
                "amount must be positive, got {}",
                request.amount
            )));
        }

        let provider_reference = format!("cs_sandbox_{}", Uuid::new_v4().simple());
        let redirect_url = format!(
            "{}/{}?lang={}",
            self.checkout_base_url,
            provider_reference,
            request.locale.as_str()
        );

        info!(
            code = %request.reservation_code,
            amount = %request.amount,
            currency = %request.currency,
            "🧾 Sandbox checkout opened"
        );

        self.charges.insert(
            provider_reference.clone(),
            SandboxCharge {
                reservation_code: request.reservation_code,
                amount: request.amount,
                currency: request.currency,
                state: SandboxChargeState::Open,
                created_at: Utc::now(),
            },
        );

        Ok(CheckoutSession {
            redirect_url,
            provider_reference,
        })
    }

    async fn refund(&self, provider_reference: &str) -> Result<RefundOutcome, PaymentError> {
        let mut outcome = RefundOutcome::Refunded;
        self.transition(provider_reference, |charge| match charge.state {
            SandboxChargeState::Captured => {
                charge.state = SandboxChargeState::Refunded;
                Ok(())
            }
            SandboxChargeState::Refunded => {
                outcome = RefundOutcome::AlreadyRefunded;
                Ok(())
            }
            _ => Err(invalid_state(charge, "refund")),
        })?;
        debug!(reference = provider_reference, ?outcome, "Sandbox refund");
        Ok(outcome)
    }

    async fn capture(&self, provider_reference: &str) -> Result<(), PaymentError> {
        self.transition(provider_reference, |charge| match charge.state {
            SandboxChargeState::Open => {
                charge.state = SandboxChargeState::Captured;
                Ok(())
            }
            SandboxChargeState::Captured => Ok(()),
            _ => Err(invalid_state(charge, "capture")),
        })
    }

    async fn cancel(&self, provider_reference: &str) -> Result<(), PaymentError> {
        self.transition(provider_reference, |charge| match charge.state {
            SandboxChargeState::Open => {
                charge.state = SandboxChargeState::Voided;
                Ok(())
            }
            SandboxChargeState::Voided => Ok(()),
            _ => Err(invalid_state(charge, "void")),
        })
    }
}
