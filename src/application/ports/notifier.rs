//! Customer notification port

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::reservation::{Locale, Reservation};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification timed out")]
    Timeout,

    #[error("notification delivery failed: {0}")]
    Delivery(String),
}

/// Sends a status update to the customer. Callers never wait on the result
/// for their own outcome; failures are only logged.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(
        &self,
        reservation: &Reservation,
        status_label: &str,
        locale: Locale,
    ) -> Result<(), NotifyError>;
}
