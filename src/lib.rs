//! # Parkspace
//!
//! Parking space booking service: availability over shared space pools,
//! tiered pricing, reservations with online or on-site payment and an
//! admin back office.
//!
//! ## Architecture
//!
//! - **domain**: reservations, time windows, pools, prices and repository contracts
//! - **application**: booking use cases and the payment/notification ports
//! - **infrastructure**: SeaORM persistence, sandbox payments, notifier, crypto
//! - **interfaces**: REST API with Swagger documentation
//! - **server**: runtime wiring and graceful shutdown

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};

pub use infrastructure::{init_database, run_migrations, DatabaseConfig};

pub use interfaces::http::create_api_router;
