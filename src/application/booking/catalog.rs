//! Vehicle catalog administration: pool capacity and the price table.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::domain::{
    tier_violations, BillingUnit, DomainError, DomainResult, PoolTopology, PriceEntry,
    RepositoryProvider, SpacePool, VehicleType,
};

/// A vehicle type with its pool and configured prices.
#[derive(Debug, Clone)]
pub struct VehicleConfig {
    pub vehicle_type: VehicleType,
    pub pool: SpacePool,
    /// Ordered hour → month; missing units are absent
    pub prices: Vec<PriceEntry>,
}

#[derive(Clone)]
pub struct CatalogService {
    repos: Arc<dyn RepositoryProvider>,
    topology: Arc<PoolTopology>,
}

impl CatalogService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, topology: Arc<PoolTopology>) -> Self {
        Self { repos, topology }
    }

    pub async fn list_vehicle_types(&self) -> DomainResult<Vec<VehicleType>> {
        self.repos.catalog().list_vehicle_types().await
    }

    pub async fn list_prices(&self) -> DomainResult<Vec<PriceEntry>> {
        self.repos.catalog().list_prices().await
    }

    pub async fn list_vehicle_configs(&self) -> DomainResult<Vec<VehicleConfig>> {
        let catalog = self.repos.catalog();
        let pools = catalog.list_pools().await?;
        let prices = catalog.list_prices().await?;

        catalog
            .list_vehicle_types()
            .await?
            .into_iter()
            .map(|vehicle_type| {
                let pool = pools
                    .iter()
                    .find(|p| p.id == vehicle_type.pool_id)
                    .cloned()
                    .ok_or_else(|| pool_not_found(vehicle_type.pool_id))?;
                let prices = prices_of(&prices, vehicle_type.id);
                Ok(VehicleConfig {
                    vehicle_type,
                    pool,
                    prices,
                })
            })
            .collect()
    }

    /// Case-insensitive lookup by vehicle type name.
    pub async fn vehicle_config(&self, name: &str) -> DomainResult<VehicleConfig> {
        let membership = self.topology.resolve_name(name)?;
        let catalog = self.repos.catalog();

        let vehicle_type = catalog
            .list_vehicle_types()
            .await?
            .into_iter()
            .find(|vt| vt.id == membership.vehicle_type_id)
            .ok_or_else(|| DomainError::NotFound {
                entity: "VehicleType",
                field: "name",
                value: name.to_string(),
            })?;
        let pool = catalog
            .find_pool(membership.pool_id)
            .await?
            .ok_or_else(|| pool_not_found(membership.pool_id))?;
        let prices = prices_of(&catalog.list_prices().await?, vehicle_type.id);

        Ok(VehicleConfig {
            vehicle_type,
            pool,
            prices,
        })
    }

    /// Set the pool size shared by `name` and replace the given unit prices.
    ///
    /// A price table where a longer stay becomes cheaper is accepted but
    /// logged.
    pub async fn update_vehicle_config(
        &self,
        name: &str,
        spaces: Option<u32>,
        prices: Vec<(BillingUnit, Decimal)>,
    ) -> DomainResult<VehicleConfig> {
        let membership = self.topology.resolve_name(name)?;
        let entries = prices
            .into_iter()
            .map(|(unit, price)| PriceEntry::new(membership.vehicle_type_id, unit, price))
            .collect::<DomainResult<Vec<_>>>()?;

        let catalog = self.repos.catalog();
        if let Some(spaces) = spaces {
            catalog.set_pool_capacity(membership.pool_id, spaces).await?;
            info!(
                pool_id = membership.pool_id,
                spaces,
                shared_with = ?membership.members,
                "Pool capacity updated"
            );
        }
        for entry in entries {
            info!(
                vehicle_type_id = entry.vehicle_type_id,
                unit = %entry.unit,
                price = %entry.price,
                "Price updated"
            );
            catalog.upsert_price(entry).await?;
        }

        let config = self.vehicle_config(name).await?;
        for (lower, upper) in tier_violations(&config.prices) {
            warn!(
                vehicle_type = %config.vehicle_type.name,
                "Price table is not monotonic: a full {lower} tier costs more than one {upper}"
            );
        }
        Ok(config)
    }
}

fn prices_of(prices: &[PriceEntry], vehicle_type_id: i32) -> Vec<PriceEntry> {
    let mut own: Vec<PriceEntry> = prices
        .iter()
        .filter(|p| p.vehicle_type_id == vehicle_type_id)
        .cloned()
        .collect();
    own.sort_by_key(|p| p.unit);
    own
}

fn pool_not_found(pool_id: i32) -> DomainError {
    DomainError::NotFound {
        entity: "SpacePool",
        field: "id",
        value: pool_id.to_string(),
    }
}
