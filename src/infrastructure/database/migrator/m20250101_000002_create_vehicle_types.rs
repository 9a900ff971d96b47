//! Create vehicle_types table
//!
//! SUVs draw from the car pool; motorcycles have their own.

use sea_orm_migration::prelude::*;

use super::m20250101_000001_create_space_pools::SpacePools;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(VehicleTypes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VehicleTypes::Id)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(VehicleTypes::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(VehicleTypes::PoolId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vehicle_types_pool")
                            .from(VehicleTypes::Table, VehicleTypes::PoolId)
                            .to(SpacePools::Table, SpacePools::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        let insert = Query::insert()
            .into_table(VehicleTypes::Table)
            .columns([VehicleTypes::Id, VehicleTypes::Name, VehicleTypes::PoolId])
            .values_panic([1.into(), "car".into(), 1.into()])
            .values_panic([2.into(), "motorcycle".into(), 2.into()])
            .values_panic([3.into(), "suv".into(), 1.into()])
            .to_owned();

        manager.exec_stmt(insert).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VehicleTypes::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum VehicleTypes {
    Table,
    Id,
    Name,
    PoolId,
}
