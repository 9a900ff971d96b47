//! Admin DTOs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::application::{SweepReport, VehicleConfig};
use crate::domain::{BillingUnit, DomainError, DomainResult, ReservationFilter, ReservationStatus};
use crate::interfaces::http::modules::catalog::{PriceDto, VehicleTypeDto};
use crate::shared::types::PageRequest;

/// Listing filters, combined with AND
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReservationListParams {
    /// Reservations starting at or after this instant
    pub start_date: Option<DateTime<Utc>>,
    /// Reservations starting before this instant
    pub end_date: Option<DateTime<Utc>>,
    /// Code substring, case-insensitive
    pub code: Option<String>,
    pub vehicle_type_id: Option<i32>,
    /// pending, active, finished, canceled or payment_failed
    pub status: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ReservationListParams {
    pub fn to_filter(&self) -> DomainResult<ReservationFilter> {
        let status = self
            .status
            .as_deref()
            .map(|s| {
                ReservationStatus::parse(s)
                    .ok_or_else(|| DomainError::invalid("status", format!("unknown status '{s}'")))
            })
            .transpose()?;

        Ok(ReservationFilter {
            start_from: self.start_date,
            start_until: self.end_date,
            code_contains: self
                .code
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(String::from),
            vehicle_type_id: self.vehicle_type_id,
            status,
        })
    }

    pub fn page(&self) -> PageRequest {
        PageRequest::new(self.page.unwrap_or(1), self.limit.unwrap_or(50))
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct AdminCancelRequest {
    /// Void or refund the payment as well
    #[serde(default)]
    pub refund: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateVehicleConfigRequest {
    /// Size of the pool this vehicle type books from. Shared vehicle types
    /// see the change too.
    #[validate(range(max = 100000, message = "spaces must be at most 100000"))]
    pub spaces: Option<u32>,
    /// Unit name (hour, day, week, month) to price
    #[serde(default)]
    pub prices: BTreeMap<String, Decimal>,
}

impl UpdateVehicleConfigRequest {
    pub fn unit_prices(&self) -> DomainResult<Vec<(BillingUnit, Decimal)>> {
        self.prices
            .iter()
            .map(|(unit, price)| {
                BillingUnit::parse(unit)
                    .map(|u| (u, *price))
                    .ok_or_else(|| DomainError::invalid("prices", format!("unknown billing unit '{unit}'")))
            })
            .collect()
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VehicleConfigDto {
    pub vehicle_type: VehicleTypeDto,
    pub pool_name: String,
    /// `null` until configured
    pub total_spaces: Option<u32>,
    pub prices: Vec<PriceDto>,
}

impl From<VehicleConfig> for VehicleConfigDto {
    fn from(config: VehicleConfig) -> Self {
        Self {
            vehicle_type: config.vehicle_type.into(),
            pool_name: config.pool.name,
            total_spaces: config.pool.total_spaces,
            prices: config.prices.into_iter().map(PriceDto::from).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SweepResponse {
    /// Reservations moved to finished
    pub finished: u64,
    /// Abandoned checkouts released
    pub expired: u64,
}

impl From<SweepReport> for SweepResponse {
    fn from(report: SweepReport) -> Self {
        Self {
            finished: report.finished,
            expired: report.expired,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_params_build_a_filter() {
        let params = ReservationListParams {
            code: Some("  ab12 ".into()),
            status: Some("ACTIVE".into()),
            limit: Some(500),
            ..Default::default()
        };
        let filter = params.to_filter().unwrap();
        assert_eq!(filter.code_contains.as_deref(), Some("ab12"));
        assert_eq!(filter.status, Some(ReservationStatus::Active));
        assert_eq!(params.page().limit, 100);

        let bad = ReservationListParams {
            status: Some("expired".into()),
            ..Default::default()
        };
        assert!(bad.to_filter().is_err());
    }

    #[test]
    fn price_units_are_parsed() {
        let request: UpdateVehicleConfigRequest =
            serde_json::from_str(r#"{"spaces": 40, "prices": {"hour": 2.5, "day": 20}}"#).unwrap();
        let prices = request.unit_prices().unwrap();
        assert_eq!(prices.len(), 2);
        assert!(prices.contains(&(BillingUnit::Hour, Decimal::new(25, 1))));

        let bad: UpdateVehicleConfigRequest =
            serde_json::from_str(r#"{"prices": {"year": 1}}"#).unwrap();
        assert!(bad.unit_prices().is_err());
    }
}
