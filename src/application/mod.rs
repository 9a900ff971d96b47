//! Application layer: booking use cases and the ports they drive.

pub mod booking;
pub mod ports;

pub use booking::{
    run_finish_sweep, run_sweep, start_finish_sweep_task, AvailabilityQuery,
    AvailabilityService, CancelActor, CancelReservation, CatalogService, CreateActor,
    CreateReservation, CreatedReservation, LifecycleSettings, PriceQuery, PricingService,
    ReservationService, SweepReport, VehicleConfig,
};
pub use ports::{Notifier, PaymentGateway};
