//! Space pool resolution
//!
//! Several vehicle types may park in the same physical spaces (cars and
//! SUVs share one lot, motorcycles have their own). [`PoolTopology`] is the
//! fixed classification table that answers "which pool does this vehicle
//! type draw from, and who else draws from it?". It is built once at startup
//! from the catalog and handed to the engines, so tests can inject any shape.

use std::collections::{BTreeSet, HashMap};

use super::model::VehicleType;
use crate::domain::{DomainError, DomainResult};

/// Pool lookup result for one vehicle type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolMembership {
    /// Vehicle type that was asked for.
    pub vehicle_type_id: i32,
    /// Canonical pool id used for the capacity lookup.
    pub pool_id: i32,
    /// Every vehicle type sharing the pool, the requested one included.
    /// Sorted ascending.
    pub members: Vec<i32>,
}

#[derive(Debug, Clone, Default)]
pub struct PoolTopology {
    pool_of: HashMap<i32, i32>,
    members: HashMap<i32, BTreeSet<i32>>,
    by_name: HashMap<String, i32>,
}

impl PoolTopology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `vehicle_type_id` (known as `name`) as a member of `pool_id`.
    /// Re-registering a vehicle type moves it to the new pool.
    pub fn with_member(mut self, vehicle_type_id: i32, name: &str, pool_id: i32) -> Self {
        self.insert(vehicle_type_id, name, pool_id);
        self
    }

    fn insert(&mut self, vehicle_type_id: i32, name: &str, pool_id: i32) {
        if let Some(previous) = self.pool_of.insert(vehicle_type_id, pool_id) {
            if let Some(set) = self.members.get_mut(&previous) {
                set.remove(&vehicle_type_id);
            }
        }
        self.members.entry(pool_id).or_default().insert(vehicle_type_id);
        self.by_name
            .insert(name.trim().to_lowercase(), vehicle_type_id);
    }

    pub fn from_vehicle_types<'a>(types: impl IntoIterator<Item = &'a VehicleType>) -> Self {
        let mut topology = Self::new();
        for vt in types {
            topology.insert(vt.id, &vt.name, vt.pool_id);
        }
        topology
    }

    pub fn resolve_id(&self, vehicle_type_id: i32) -> DomainResult<PoolMembership> {
        let pool_id = *self
            .pool_of
            .get(&vehicle_type_id)
            .ok_or_else(|| DomainError::NotFound {
                entity: "VehicleType",
                field: "id",
                value: vehicle_type_id.to_string(),
            })?;

        let members = self
            .members
            .get(&pool_id)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_else(|| vec![vehicle_type_id]);

        Ok(PoolMembership {
            vehicle_type_id,
            pool_id,
            members,
        })
    }

    /// Case-insensitive lookup by vehicle type name.
    pub fn resolve_name(&self, name: &str) -> DomainResult<PoolMembership> {
        let id = self
            .by_name
            .get(&name.trim().to_lowercase())
            .copied()
            .ok_or_else(|| DomainError::NotFound {
                entity: "VehicleType",
                field: "name",
                value: name.to_string(),
            })?;
        self.resolve_id(id)
    }

    pub fn vehicle_type_ids(&self) -> impl Iterator<Item = i32> + '_ {
        self.pool_of.keys().copied()
    }
}
