//! Public catalog endpoints: availability, price quotes, vehicle types, prices

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
