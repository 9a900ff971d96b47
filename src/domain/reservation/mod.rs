//! Reservation aggregate
//!
//! Contains the Reservation entity, related types, localized labels and the
//! repository interface.

pub mod locale;
pub mod model;
pub mod repository;

pub use locale::{status_label, Locale};
pub use model::{
    CustomerContact, PaymentMethod, PaymentStatus, Reservation, ReservationDraft,
    ReservationState, ReservationStatus,
};
pub use repository::{ReservationFilter, ReservationRepository};
