//! Customer-facing status labels
//!
//! Presentation only. The state machine works on [`ReservationStatus`];
//! this maps a status to the word shown to the customer in their language.

use super::model::ReservationStatus;

/// Supported customer languages. Anything unrecognised falls back to English.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    Es,
    It,
}

impl Locale {
    /// Parse a language tag such as `es`, `it-IT` or `EN_us`.
    pub fn from_tag(tag: &str) -> Self {
        let primary = tag
            .trim()
            .split(|c: char| c == '-' || c == '_')
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match primary.as_str() {
            "es" => Self::Es,
            "it" => Self::It,
            _ => Self::En,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Es => "es",
            Self::It => "it",
        }
    }
}

pub fn status_label(status: ReservationStatus, locale: Locale) -> &'static str {
    use ReservationStatus::*;
    match (locale, status) {
        (Locale::En, Pending) => "pending",
        (Locale::En, Active) => "active",
        (Locale::En, Finished) => "finished",
        (Locale::En, Canceled) => "canceled",
        (Locale::En, PaymentFailed) => "payment failed",

        (Locale::Es, Pending) => "pendiente",
        (Locale::Es, Active) => "activa",
        (Locale::Es, Finished) => "finalizada",
        (Locale::Es, Canceled) => "cancelada",
        (Locale::Es, PaymentFailed) => "pago fallido",

        (Locale::It, Pending) => "in attesa",
        (Locale::It, Active) => "attiva",
        (Locale::It, Finished) => "finito",
        (Locale::It, Canceled) => "annullata",
        (Locale::It, PaymentFailed) => "pagamento non riuscito",
    }
}
