pub mod admin;
pub mod auth;
pub mod catalog;
pub mod health;
pub mod metrics;
pub mod payments;
pub mod reservations;
