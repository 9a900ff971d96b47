//! SeaORM implementation of CatalogRepository

use async_trait::async_trait;
use log::debug;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, QueryFilter,
    QueryOrder, Set,
};

use super::{db_err, from_cents, to_cents};
use crate::domain::vehicle::CatalogRepository;
use crate::domain::{
    BillingUnit, DomainError, DomainResult, PriceEntry, SpacePool, VehicleType,
};
use crate::infrastructure::database::entities::{space_pool, vehicle_price, vehicle_type};

pub struct SeaOrmCatalogRepository {
    db: DatabaseConnection,
}

impl SeaOrmCatalogRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn vehicle_type_to_domain(m: vehicle_type::Model) -> VehicleType {
    VehicleType {
        id: m.id,
        name: m.name,
        pool_id: m.pool_id,
    }
}

fn pool_to_domain(m: space_pool::Model) -> SpacePool {
    SpacePool {
        id: m.id,
        name: m.name,
        total_spaces: m.total_spaces.and_then(|n| u32::try_from(n).ok()),
    }
}

fn price_to_domain(m: vehicle_price::Model) -> DomainResult<PriceEntry> {
    let unit = BillingUnit::from_id(m.unit_id)
        .ok_or_else(|| DomainError::Storage(format!("Unknown billing unit id {}", m.unit_id)))?;
    Ok(PriceEntry {
        vehicle_type_id: m.vehicle_type_id,
        unit,
        price: from_cents(m.price_cents),
    })
}

// ── CatalogRepository impl ──────────────────────────────────────

#[async_trait]
impl CatalogRepository for SeaOrmCatalogRepository {
    async fn list_vehicle_types(&self) -> DomainResult<Vec<VehicleType>> {
        let models = vehicle_type::Entity::find()
            .order_by_asc(vehicle_type::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(vehicle_type_to_domain).collect())
    }

    async fn find_pool(&self, pool_id: i32) -> DomainResult<Option<SpacePool>> {
        let model = space_pool::Entity::find_by_id(pool_id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(pool_to_domain))
    }

    async fn list_pools(&self) -> DomainResult<Vec<SpacePool>> {
        let models = space_pool::Entity::find()
            .order_by_asc(space_pool::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(pool_to_domain).collect())
    }

    async fn set_pool_capacity(&self, pool_id: i32, total_spaces: u32) -> DomainResult<()> {
        debug!("Setting capacity of pool {} to {}", pool_id, total_spaces);

        let total = i32::try_from(total_spaces)
            .map_err(|_| DomainError::invalid("spaces", "is too large"))?;

        let existing = space_pool::Entity::find_by_id(pool_id)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        let Some(existing) = existing else {
            return Err(DomainError::NotFound {
                entity: "SpacePool",
                field: "id",
                value: pool_id.to_string(),
            });
        };

        let mut active: space_pool::ActiveModel = existing.into();
        active.total_spaces = Set(Some(total));
        active.update(&self.db).await.map_err(db_err)?;
        Ok(())
    }

    async fn find_price(
        &self,
        vehicle_type_id: i32,
        unit: BillingUnit,
    ) -> DomainResult<Option<PriceEntry>> {
        let model = vehicle_price::Entity::find()
            .filter(vehicle_price::Column::VehicleTypeId.eq(vehicle_type_id))
            .filter(vehicle_price::Column::UnitId.eq(unit.id()))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        model.map(price_to_domain).transpose()
    }

    async fn list_prices(&self) -> DomainResult<Vec<PriceEntry>> {
        let models = vehicle_price::Entity::find()
            .order_by_asc(vehicle_price::Column::VehicleTypeId)
            .order_by_asc(vehicle_price::Column::UnitId)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models.into_iter().map(price_to_domain).collect()
    }

    async fn upsert_price(&self, entry: PriceEntry) -> DomainResult<()> {
        debug!(
            "Upserting {} price for vehicle type {}: {}",
            entry.unit, entry.vehicle_type_id, entry.price
        );

        let model = vehicle_price::ActiveModel {
            id: NotSet,
            vehicle_type_id: Set(entry.vehicle_type_id),
            unit_id: Set(entry.unit.id()),
            price_cents: Set(to_cents(entry.price, "price")?),
        };

        vehicle_price::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    vehicle_price::Column::VehicleTypeId,
                    vehicle_price::Column::UnitId,
                ])
                .update_column(vehicle_price::Column::PriceCents)
                .to_owned(),
            )
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }
}
