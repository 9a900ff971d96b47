//! Database entities module

pub mod admin_user;
pub mod reservation;
pub mod space_pool;
pub mod vehicle_price;
pub mod vehicle_type;

pub use admin_user::Entity as AdminUser;
pub use reservation::Entity as Reservation;
pub use space_pool::Entity as SpacePool;
pub use vehicle_price::Entity as VehiclePrice;
pub use vehicle_type::Entity as VehicleType;
