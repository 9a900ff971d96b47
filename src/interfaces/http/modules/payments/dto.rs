//! Payment event DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Event reported by the payment provider, tagged by `type`
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PaymentEvent {
    /// Customer finished the checkout
    CheckoutCompleted {
        provider_reference: String,
        payment_intent: Option<String>,
    },
    PaymentFailed { provider_reference: String },
    /// Money was returned outside this service (provider dashboard)
    Refunded { provider_reference: String },
}

impl PaymentEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CheckoutCompleted { .. } => "checkout_completed",
            Self::PaymentFailed { .. } => "payment_failed",
            Self::Refunded { .. } => "refunded",
        }
    }

    pub fn provider_reference(&self) -> &str {
        match self {
            Self::CheckoutCompleted {
                provider_reference, ..
            }
            | Self::PaymentFailed { provider_reference }
            | Self::Refunded { provider_reference } => provider_reference,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaymentEventResponse {
    pub code: String,
    pub status: String,
    pub payment_status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_tagged_by_type() {
        let event: PaymentEvent = serde_json::from_str(
            r#"{"type":"checkout_completed","provider_reference":"cs_1","payment_intent":"pi_9"}"#,
        )
        .unwrap();
        assert_eq!(event.kind(), "checkout_completed");
        assert_eq!(event.provider_reference(), "cs_1");

        let event: PaymentEvent =
            serde_json::from_str(r#"{"type":"refunded","provider_reference":"cs_2"}"#).unwrap();
        assert!(matches!(event, PaymentEvent::Refunded { .. }));

        assert!(serde_json::from_str::<PaymentEvent>(r#"{"type":"disputed","provider_reference":"x"}"#).is_err());
    }
}
