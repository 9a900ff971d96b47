//! Catalog repository interface (vehicle types, pools, prices)

use async_trait::async_trait;

use super::model::{SpacePool, VehicleType};
use crate::domain::pricing::{BillingUnit, PriceEntry};
use crate::domain::DomainResult;

#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn list_vehicle_types(&self) -> DomainResult<Vec<VehicleType>>;

    async fn find_pool(&self, pool_id: i32) -> DomainResult<Option<SpacePool>>;

    async fn list_pools(&self) -> DomainResult<Vec<SpacePool>>;

    async fn set_pool_capacity(&self, pool_id: i32, total_spaces: u32) -> DomainResult<()>;

    async fn find_price(
        &self,
        vehicle_type_id: i32,
        unit: BillingUnit,
    ) -> DomainResult<Option<PriceEntry>>;

    async fn list_prices(&self) -> DomainResult<Vec<PriceEntry>>;

    /// Insert or replace the price for the entry's (vehicle type, unit).
    async fn upsert_price(&self, entry: PriceEntry) -> DomainResult<()>;
}
