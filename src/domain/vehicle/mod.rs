//! Vehicle types, space pools and the static pool topology

pub mod model;
pub mod pool;
pub mod repository;

pub use model::{SpacePool, VehicleType};
pub use pool::{PoolMembership, PoolTopology};
pub use repository::CatalogRepository;
