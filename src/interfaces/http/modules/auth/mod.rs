//! Admin authentication: login and admin account creation

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
