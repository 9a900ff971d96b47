//! Database repository implementations
//!
//! Per-aggregate SeaORM repositories + unified RepositoryProvider.

pub mod catalog_repository;
pub mod repository_provider;
pub mod reservation_repository;

pub use catalog_repository::SeaOrmCatalogRepository;
pub use repository_provider::SeaOrmRepositoryProvider;
pub use reservation_repository::SeaOrmReservationRepository;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::domain::DomainError;

fn db_err(e: sea_orm::DbErr) -> DomainError {
    DomainError::Storage(format!("Database error: {}", e))
}

/// Money is stored as integer cents.
fn to_cents(amount: Decimal, field: &'static str) -> Result<i64, DomainError> {
    (amount * Decimal::ONE_HUNDRED)
        .round_dp(0)
        .to_i64()
        .ok_or_else(|| DomainError::invalid(field, "amount out of range"))
}

fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

#[cfg(test)]
pub(crate) async fn test_db() -> sea_orm::DatabaseConnection {
    use sea_orm_migration::MigratorTrait;

    // Every pooled connection would open its own in-memory database
    let mut options = sea_orm::ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).sqlx_logging(false);
    let db = sea_orm::Database::connect(options).await.unwrap();
    super::migrator::Migrator::up(&db, None).await.unwrap();
    db
}
