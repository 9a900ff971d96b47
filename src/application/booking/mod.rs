//! Booking use cases
//!
//! - [`AvailabilityService`]: slot occupancy for a window and vehicle type
//! - [`PricingService`]: tiered unit price for a window
//! - [`ReservationService`]: create / cancel / confirm / finish lifecycle
//! - [`CatalogService`]: vehicle types, pool capacity and price table
//! - [`start_finish_sweep_task`]: periodic `active → finished` promotion and
//!   expiry of abandoned checkouts

pub mod availability;
pub mod catalog;
pub mod code;
pub mod lifecycle;
pub mod locks;
pub mod pricing;
pub mod sweep;

#[cfg(test)]
pub(crate) mod test_support;

pub use availability::{AvailabilityQuery, AvailabilityService};
pub use catalog::{CatalogService, VehicleConfig};
pub use lifecycle::{
    CancelActor, CancelReservation, CreateActor, CreateReservation, CreatedReservation,
    LifecycleSettings, ReservationService,
};
pub use pricing::{PriceQuery, PricingService};
pub use sweep::{run_finish_sweep, run_sweep, start_finish_sweep_task, SweepReport};
