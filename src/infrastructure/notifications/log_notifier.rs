//! Notifier that writes the customer message to the log
//!
//! Stands in for an email or SMS channel. The message is rendered in the
//! customer's language so the log shows exactly what would be sent.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

use crate::application::ports::{Notifier, NotifyError};
use crate::domain::{Locale, Reservation};

/// One-line localized status message for a reservation.
pub fn render_message(reservation: &Reservation, status_label: &str, locale: Locale) -> String {
    let start = reservation.window.start().format("%Y-%m-%d %H:%M");
    let end = reservation.window.end().format("%Y-%m-%d %H:%M");
    let code = &reservation.code;
    match locale {
        Locale::En => format!("Reservation {code} ({start} - {end} UTC) is now {status_label}."),
        Locale::Es => format!("La reserva {code} ({start} - {end} UTC) ahora está {status_label}."),
        Locale::It => format!("La prenotazione {code} ({start} - {end} UTC) è ora {status_label}."),
    }
}

#[derive(Clone, Default)]
pub struct LogNotifier {
    sent: Arc<AtomicU64>,
}

impl LogNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages written since startup
    pub fn sent_count(&self) -> u64 {
        self.sent.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(
        &self,
        reservation: &Reservation,
        status_label: &str,
        locale: Locale,
    ) -> Result<(), NotifyError> {
        if reservation.contact.email.trim().is_empty() {
            return Err(NotifyError::Delivery(format!(
                "reservation {} has no email address",
                reservation.code
            )));
        }

        let message = render_message(reservation, status_label, locale);
        info!(
            code = %reservation.code,
            to = %reservation.contact.email,
            locale = locale.as_str(),
            "📧 {}",
            message
        );
        self.sent.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::reservation::{
        status_label, CustomerContact, PaymentMethod, ReservationDraft, ReservationStatus,
    };
    use crate::domain::TimeWindow;
    use chrono::{TimeZone, Utc};

    fn reservation(email: &str, locale: Locale) -> Reservation {
        let start = Utc.with_ymd_and_hms(2030, 6, 1, 10, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2030, 6, 1, 13, 0, 0).unwrap();
        let draft = ReservationDraft {
            contact: CustomerContact {
                name: "Giulia".into(),
                email: email.into(),
                phone: None,
            },
            vehicle_type_id: 1,
            vehicle_plate: "AB123CD".into(),
            vehicle_model: None,
            payment_method: PaymentMethod::OnSite,
            window: TimeWindow::new(start, end).unwrap(),
            locale,
        };
        Reservation::new(draft, "0A1B2C3D", ReservationStatus::Active, None)
    }

    #[test]
    fn message_is_localized() {
        let r = reservation("giulia@example.com", Locale::It);
        let label = status_label(r.status, Locale::It);
        assert_eq!(
            render_message(&r, label, Locale::It),
            "La prenotazione 0A1B2C3D (2030-06-01 10:00 - 2030-06-01 13:00 UTC) è ora attiva."
        );
        assert!(render_message(&r, "canceled", Locale::En).starts_with("Reservation 0A1B2C3D"));
    }

    #[tokio::test]
    async fn counts_delivered_messages() {
        let notifier = LogNotifier::new();
        let r = reservation("giulia@example.com", Locale::Es);
        notifier.notify(&r, "activa", Locale::Es).await.unwrap();
        assert_eq!(notifier.sent_count(), 1);

        let blank = reservation("  ", Locale::En);
        assert!(matches!(
            notifier.notify(&blank, "active", Locale::En).await,
            Err(NotifyError::Delivery(_))
        ));
        assert_eq!(notifier.sent_count(), 1);
    }
}
