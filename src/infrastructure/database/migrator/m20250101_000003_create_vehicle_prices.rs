//! Create vehicle_prices table

use sea_orm_migration::prelude::*;

use super::m20250101_000002_create_vehicle_types::VehicleTypes;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(VehiclePrices::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VehiclePrices::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(VehiclePrices::VehicleTypeId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(VehiclePrices::UnitId).integer().not_null())
                    .col(
                        ColumnDef::new(VehiclePrices::PriceCents)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vehicle_prices_vehicle_type")
                            .from(VehiclePrices::Table, VehiclePrices::VehicleTypeId)
                            .to(VehicleTypes::Table, VehicleTypes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // At most one price per (vehicle type, unit)
        manager
            .create_index(
                Index::create()
                    .name("idx_vehicle_prices_type_unit")
                    .table(VehiclePrices::Table)
                    .col(VehiclePrices::VehicleTypeId)
                    .col(VehiclePrices::UnitId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VehiclePrices::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum VehiclePrices {
    Table,
    Id,
    VehicleTypeId,
    UnitId,
    PriceCents,
}
