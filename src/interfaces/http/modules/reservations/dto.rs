//! Reservation DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::application::CreatedReservation;
use crate::domain::reservation::{status_label, CustomerContact, ReservationDraft};
use crate::domain::{DomainError, DomainResult, Locale, PaymentMethod, Reservation, TimeWindow};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateReservationRequest {
    pub vehicle_type_id: i32,
    #[validate(length(min = 1, max = 100, message = "full_name must be 1-100 characters"))]
    pub full_name: String,
    #[validate(email(message = "invalid email format"))]
    pub email: String,
    #[validate(length(max = 30, message = "phone is too long"))]
    pub phone: Option<String>,
    #[validate(length(min = 1, max = 16, message = "vehicle_plate must be 1-16 characters"))]
    pub vehicle_plate: String,
    #[validate(length(max = 60, message = "vehicle_model is too long"))]
    pub vehicle_model: Option<String>,
    /// `online` or `on_site`
    pub payment_method: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Customer language tag (en, es, it). Defaults to English.
    pub locale: Option<String>,
    /// Fixed price override. Administrators only.
    pub total_price: Option<Decimal>,
}

impl CreateReservationRequest {
    pub fn to_draft(&self) -> DomainResult<ReservationDraft> {
        let payment_method = PaymentMethod::parse(&self.payment_method).ok_or_else(|| {
            DomainError::invalid("payment_method", "must be 'online' or 'on_site'")
        })?;

        Ok(ReservationDraft {
            contact: CustomerContact {
                name: self.full_name.trim().to_string(),
                email: self.email.trim().to_string(),
                phone: non_blank(&self.phone),
            },
            vehicle_type_id: self.vehicle_type_id,
            vehicle_plate: self.vehicle_plate.clone(),
            vehicle_model: non_blank(&self.vehicle_model),
            payment_method,
            window: TimeWindow::new(self.start_time, self.end_time)?,
            locale: self
                .locale
                .as_deref()
                .map(Locale::from_tag)
                .unwrap_or_default(),
        })
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreatedReservationResponse {
    pub code: String,
    pub status: String,
    /// Checkout page, present when a payment was started
    pub redirect_url: Option<String>,
    pub provider_reference: Option<String>,
    pub total_price: Option<Decimal>,
}

impl From<CreatedReservation> for CreatedReservationResponse {
    fn from(created: CreatedReservation) -> Self {
        Self {
            code: created.reservation.code,
            status: created.reservation.status.as_str().to_string(),
            redirect_url: created.redirect_url,
            provider_reference: created.provider_reference,
            total_price: created.reservation.total_price,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReservationDto {
    pub code: String,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub vehicle_type_id: i32,
    pub vehicle_plate: String,
    pub vehicle_model: Option<String>,
    pub payment_method: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: String,
    /// Status in the customer's language
    pub status_label: String,
    pub payment_status: String,
    pub total_price: Option<Decimal>,
    pub locale: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Reservation> for ReservationDto {
    fn from(r: Reservation) -> Self {
        Self {
            status_label: status_label(r.status, r.locale).to_string(),
            status: r.status.as_str().to_string(),
            payment_status: r.payment_status.as_str().to_string(),
            payment_method: r.payment_method.as_str().to_string(),
            start_time: r.window.start(),
            end_time: r.window.end(),
            locale: r.locale.as_str().to_string(),
            code: r.code,
            full_name: r.contact.name,
            email: r.contact.email,
            phone: r.contact.phone,
            vehicle_type_id: r.vehicle_type_id,
            vehicle_plate: r.vehicle_plate,
            vehicle_model: r.vehicle_model,
            total_price: r.total_price,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Email the reservation was made with; required to see or cancel it
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CustomerEmailParams {
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn request() -> CreateReservationRequest {
        CreateReservationRequest {
            vehicle_type_id: 3,
            full_name: " Maria Lopez ".into(),
            email: "maria@example.com".into(),
            phone: Some("   ".into()),
            vehicle_plate: "1234ABC".into(),
            vehicle_model: None,
            payment_method: "on_site".into(),
            start_time: Utc.with_ymd_and_hms(2030, 6, 1, 10, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2030, 6, 1, 12, 0, 0).unwrap(),
            locale: Some("es-ES".into()),
            total_price: None,
        }
    }

    #[test]
    fn request_becomes_a_draft() {
        let draft = request().to_draft().unwrap();
        assert_eq!(draft.contact.name, "Maria Lopez");
        assert_eq!(draft.contact.phone, None);
        assert_eq!(draft.payment_method, PaymentMethod::OnSite);
        assert_eq!(draft.locale, Locale::Es);
        assert_eq!(draft.window.duration().num_hours(), 2);
    }

    #[test]
    fn unknown_payment_method_is_rejected() {
        let mut req = request();
        req.payment_method = "cash".into();
        assert!(matches!(
            req.to_draft(),
            Err(DomainError::InvalidInput { field: "payment_method", .. })
        ));
    }

    #[test]
    fn inverted_window_is_rejected() {
        let mut req = request();
        std::mem::swap(&mut req.start_time, &mut req.end_time);
        assert!(req.to_draft().is_err());
    }
}
