//! Non-persistent repository implementations

mod memory;

pub use memory::{
    InMemoryCatalogRepository, InMemoryRepositoryProvider, InMemoryReservationRepository,
};
