//! Slot-based occupancy over a requested window

pub mod model;

pub use model::{count_overlapping, AvailabilityResult, AvailabilitySlot, CapacityCheck, TimeWindow};
