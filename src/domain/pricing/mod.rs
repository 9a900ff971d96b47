//! Tiered unit pricing (hour / day / week / month)

pub mod model;

pub use model::{best_unit_and_count, tier_violations, BillingUnit, PriceEntry, PriceQuote};
