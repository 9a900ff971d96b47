//! Domain layer: booking aggregates, pure engines and repository contracts.

pub mod availability;
pub mod pricing;
pub mod repositories;
pub mod reservation;
pub mod vehicle;

pub use availability::{AvailabilityResult, AvailabilitySlot, CapacityCheck, TimeWindow};
pub use pricing::{best_unit_and_count, tier_violations, BillingUnit, PriceEntry, PriceQuote};
pub use repositories::{DomainResult, RepositoryProvider};
pub use reservation::{
    Locale, PaymentMethod, PaymentStatus, Reservation, ReservationFilter, ReservationState,
    ReservationStatus,
};
pub use vehicle::{PoolMembership, PoolTopology, SpacePool, VehicleType};

pub use crate::shared::errors::DomainError;
