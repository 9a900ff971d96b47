//! SeaORM implementation of RepositoryProvider

use sea_orm::DatabaseConnection;

use crate::domain::repositories::RepositoryProvider;
use crate::domain::reservation::ReservationRepository;
use crate::domain::vehicle::CatalogRepository;

use super::catalog_repository::SeaOrmCatalogRepository;
use super::reservation_repository::SeaOrmReservationRepository;

/// Unified repository provider backed by SeaORM.
///
/// Holds one connection pool and exposes per-aggregate repository accessors.
///
/// ```ignore
/// let repos = SeaOrmRepositoryProvider::new(db.clone());
/// let pool = repos.catalog().find_pool(1).await?;
/// let r = repos.reservations().find_by_code("0A1B2C3D").await?;
/// ```
pub struct SeaOrmRepositoryProvider {
    catalog: SeaOrmCatalogRepository,
    reservations: SeaOrmReservationRepository,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            catalog: SeaOrmCatalogRepository::new(db.clone()),
            reservations: SeaOrmReservationRepository::new(db),
        }
    }
}

impl RepositoryProvider for SeaOrmRepositoryProvider {
    fn catalog(&self) -> &dyn CatalogRepository {
        &self.catalog
    }

    fn reservations(&self) -> &dyn ReservationRepository {
        &self.reservations
    }
}
