//! Create space_pools table
//!
//! Seeds the two physical pools: `car` (shared by cars and SUVs) and
//! `motorcycle`. Capacity starts unset and is configured by an administrator.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SpacePools::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SpacePools::Id)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SpacePools::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(SpacePools::TotalSpaces).integer())
                    .to_owned(),
            )
            .await?;

        let insert = Query::insert()
            .into_table(SpacePools::Table)
            .columns([SpacePools::Id, SpacePools::Name])
            .values_panic([1.into(), "car".into()])
            .values_panic([2.into(), "motorcycle".into()])
            .to_owned();

        manager.exec_stmt(insert).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SpacePools::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum SpacePools {
    Table,
    Id,
    Name,
    TotalSpaces,
}
