//! Availability and pricing DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{AvailabilityResult, AvailabilitySlot, PriceEntry, PriceQuote, VehicleType};

/// Requested stay, RFC 3339 instants
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WindowParams {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub vehicle_type_id: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SlotDto {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub is_available: bool,
    pub available_spaces: i64,
}

impl From<&AvailabilitySlot> for SlotDto {
    fn from(slot: &AvailabilitySlot) -> Self {
        Self {
            start_time: slot.window.start(),
            end_time: slot.window.end(),
            is_available: slot.is_available(),
            available_spaces: slot.remaining(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AvailabilityResponse {
    pub is_overall_available: bool,
    pub requested_start_time: DateTime<Utc>,
    pub requested_end_time: DateTime<Utc>,
    pub message: String,
    pub slot_details: Vec<SlotDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_unavailable_slot_start: Option<DateTime<Utc>>,
}

impl From<AvailabilityResult> for AvailabilityResponse {
    fn from(result: AvailabilityResult) -> Self {
        Self {
            is_overall_available: result.is_available(),
            requested_start_time: result.window.start(),
            requested_end_time: result.window.end(),
            message: result.message(),
            slot_details: result.slots.iter().map(SlotDto::from).collect(),
            first_unavailable_slot_start: result.first_unavailable(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PriceQuoteResponse {
    pub vehicle_type_id: i32,
    /// Billing unit the stay was priced in: hour, day, week or month
    pub unit: String,
    pub unit_count: u32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

impl From<PriceQuote> for PriceQuoteResponse {
    fn from(quote: PriceQuote) -> Self {
        Self {
            vehicle_type_id: quote.vehicle_type_id,
            unit: quote.unit.as_str().to_string(),
            unit_count: quote.count,
            unit_price: quote.unit_price,
            total_price: quote.total,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VehicleTypeDto {
    pub id: i32,
    pub name: String,
    pub pool_id: i32,
}

impl From<VehicleType> for VehicleTypeDto {
    fn from(vt: VehicleType) -> Self {
        Self {
            id: vt.id,
            name: vt.name,
            pool_id: vt.pool_id,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PriceDto {
    pub vehicle_type_id: i32,
    pub unit: String,
    pub price: Decimal,
}

impl From<PriceEntry> for PriceDto {
    fn from(entry: PriceEntry) -> Self {
        Self {
            vehicle_type_id: entry.vehicle_type_id,
            unit: entry.unit.as_str().to_string(),
            price: entry.price,
        }
    }
}
