//! Payment provider callback handler

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use tracing::{info, warn};

use super::dto::{PaymentEvent, PaymentEventResponse};
use crate::application::ReservationService;
use crate::infrastructure::crypto::secrets_match;
use crate::interfaces::http::common::{domain_error, error_response, ApiResponse, ApiResult};

/// Header carrying the shared secret configured at the provider
pub const WEBHOOK_SECRET_HEADER: &str = "x-webhook-secret";

#[derive(Clone)]
pub struct PaymentEventsState {
    pub service: ReservationService,
    /// When unset every callback is accepted
    pub webhook_secret: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/v1/payments/events",
    tag = "Payments",
    request_body = PaymentEvent,
    params(("x-webhook-secret" = Option<String>, Header, description = "Shared webhook secret")),
    responses(
        (status = 200, description = "Event applied", body = ApiResponse<PaymentEventResponse>),
        (status = 401, description = "Missing or wrong webhook secret"),
        (status = 404, description = "No reservation for the provider reference")
    )
)]
pub async fn payment_event(
    State(state): State<PaymentEventsState>,
    headers: HeaderMap,
    Json(event): Json<PaymentEvent>,
) -> ApiResult<PaymentEventResponse> {
    if let Some(expected) = state.webhook_secret.as_deref() {
        let provided = headers
            .get(WEBHOOK_SECRET_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if !secrets_match(expected, provided) {
            warn!(event = event.kind(), "Payment event with invalid secret rejected");
            return Err(error_response(StatusCode::UNAUTHORIZED, "Invalid webhook secret"));
        }
    }

    info!(
        event = event.kind(),
        reference = event.provider_reference(),
        "💳 Payment event received"
    );

    let result = match event {
        PaymentEvent::CheckoutCompleted {
            provider_reference,
            payment_intent,
        } => {
            state
                .service
                .confirm_payment(&provider_reference, payment_intent)
                .await
        }
        PaymentEvent::PaymentFailed { provider_reference } => {
            state.service.record_payment_failure(&provider_reference).await
        }
        PaymentEvent::Refunded { provider_reference } => {
            state.service.record_refund(&provider_reference).await
        }
    };
    let reservation = result.map_err(domain_error)?;

    Ok(Json(ApiResponse::success(PaymentEventResponse {
        code: reservation.code,
        status: reservation.status.as_str().to_string(),
        payment_status: reservation.payment_status.as_str().to_string(),
    })))
}
