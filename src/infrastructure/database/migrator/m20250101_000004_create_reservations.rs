//! Create reservations table
//!
//! The unique index on `code` backs collision-free code generation. The
//! (vehicle_type_id, start_time, end_time) index serves the overlap query.

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
                    .table(Reservations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Reservations::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Reservations::Code).string().not_null())
                    .col(ColumnDef::new(Reservations::FullName).string().not_null())
                    .col(ColumnDef::new(Reservations::Email).string().not_null())
                    .col(ColumnDef::new(Reservations::Phone).string())
                    .col(
                        ColumnDef::new(Reservations::VehicleTypeId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Reservations::VehiclePlate)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Reservations::VehicleModel).string())
                    .col(
                        ColumnDef::new(Reservations::PaymentMethod)
                            .string()
                            .not_null()
                            .default("online"),
                    )
                    .col(
                        ColumnDef::new(Reservations::StartTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Reservations::EndTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Reservations::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Reservations::PaymentStatus)
                            .string()
                            .not_null()
                            .default("none"),
                    )
                    .col(ColumnDef::new(Reservations::ProviderReference).string())
                    .col(ColumnDef::new(Reservations::PaymentIntent).string())
                    .col(ColumnDef::new(Reservations::TotalPriceCents).big_integer())
                    .col(
                        ColumnDef::new(Reservations::Locale)
                            .string()
                            .not_null()
                            .default("en"),
                    )
                    .col(
                        ColumnDef::new(Reservations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Reservations::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reservations_vehicle_type")
                            .from(Reservations::Table, Reservations::VehicleTypeId)
                            .to(VehicleTypes::Table, VehicleTypes::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reservations_code")
                    .table(Reservations::Table)
                    .col(Reservations::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reservations_window")
                    .table(Reservations::Table)
                    .col(Reservations::VehicleTypeId)
                    .col(Reservations::StartTime)
                    .col(Reservations::EndTime)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reservations_provider_reference")
                    .table(Reservations::Table)
                    .col(Reservations::ProviderReference)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reservations_status")
                    .table(Reservations::Table)
                    .col(Reservations::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Reservations::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Reservations {
    Table,
    Id,
    Code,
    FullName,
    Email,
    Phone,
    VehicleTypeId,
    VehiclePlate,
    VehicleModel,
    PaymentMethod,
    StartTime,
    EndTime,
    Status,
    PaymentStatus,
    ProviderReference,
    PaymentIntent,
    TotalPriceCents,
    Locale,
    CreatedAt,
    UpdatedAt,
}
