//! Infrastructure layer - external concerns

pub mod crypto;
pub mod database;
pub mod notifications;
pub mod payment;
pub mod storage;

pub use database::{init_database, run_migrations, DatabaseConfig};
pub use notifications::LogNotifier;
pub use payment::SandboxPaymentGateway;
pub use storage::InMemoryRepositoryProvider;
