//! Payment provider adapters

mod sandbox;

pub use sandbox::{SandboxCharge, SandboxChargeState, SandboxPaymentGateway};
