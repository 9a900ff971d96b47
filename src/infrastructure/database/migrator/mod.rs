//! Database migrations module

pub use sea_orm_migration::prelude::*;

mod m20250101_000001_create_space_pools;
mod m20250101_000002_create_vehicle_types;
mod m20250101_000003_create_vehicle_prices;
mod m20250101_000004_create_reservations;
mod m20250101_000005_create_admin_users;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_space_pools::Migration),
            Box::new(m20250101_000002_create_vehicle_types::Migration),
            Box::new(m20250101_000003_create_vehicle_prices::Migration),
            Box::new(m20250101_000004_create_reservations::Migration),
            Box::new(m20250101_000005_create_admin_users::Migration),
        ]
    }
}
