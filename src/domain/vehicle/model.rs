//! Vehicle catalog reference data

/// A bookable vehicle class (car, suv, motorcycle, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleType {
    pub id: i32,
    pub name: String,
    /// Pool whose spaces this vehicle type consumes.
    pub pool_id: i32,
}

/// A capacity bucket shared by one or more vehicle types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpacePool {
    pub id: i32,
    pub name: String,
    /// `None` until an administrator configures the pool.
    pub total_spaces: Option<u32>,
}

impl SpacePool {
    pub fn is_configured(&self) -> bool {
        self.total_spaces.is_some()
    }
}
