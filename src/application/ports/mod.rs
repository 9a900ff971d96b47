//! Outbound ports: contracts for the external collaborators the booking
//! core drives (payment provider, customer notifications).

pub mod notifier;
pub mod payment;

pub use notifier::{Notifier, NotifyError};
pub use payment::{
    ChargeRequest, CheckoutSession, PaymentError, PaymentGateway, RefundOutcome,
};
