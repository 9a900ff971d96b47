//! Public catalog handlers

use axum::{
    extract::{Query, State},
    Json,
};

use super::dto::{AvailabilityResponse, PriceDto, PriceQuoteResponse, VehicleTypeDto, WindowParams};
use crate::application::{AvailabilityQuery, AvailabilityService, CatalogService, PriceQuery, PricingService};
use crate::interfaces::http::common::{domain_error, ApiResponse, ApiResult};

#[derive(Clone)]
pub struct CatalogHandlerState {
    pub availability: AvailabilityService,
    pub pricing: PricingService,
    pub catalog: CatalogService,
}

#[utoipa::path(
    get,
    path = "/api/v1/availability",
    tag = "Catalog",
    params(WindowParams),
    responses(
        (status = 200, description = "Per-hour availability", body = ApiResponse<AvailabilityResponse>),
        (status = 400, description = "Invalid window"),
        (status = 404, description = "Unknown vehicle type"),
        (status = 422, description = "Pool capacity not configured")
    )
)]
pub async fn check_availability(
    State(state): State<CatalogHandlerState>,
    Query(params): Query<WindowParams>,
) -> ApiResult<AvailabilityResponse> {
    let query = AvailabilityQuery::new(params.start_time, params.end_time, params.vehicle_type_id)
        .map_err(domain_error)?;
    let result = state.availability.check(query).await.map_err(domain_error)?;
    Ok(Json(ApiResponse::success(result.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/total-price",
    tag = "Catalog",
    params(WindowParams),
    responses(
        (status = 200, description = "Price for the stay", body = ApiResponse<PriceQuoteResponse>),
        (status = 400, description = "Invalid window"),
        (status = 422, description = "No price configured for the billing unit")
    )
)]
pub async fn total_price(
    State(state): State<CatalogHandlerState>,
    Query(params): Query<WindowParams>,
) -> ApiResult<PriceQuoteResponse> {
    let query = PriceQuery::new(params.start_time, params.end_time, params.vehicle_type_id)
        .map_err(domain_error)?;
    let quote = state.pricing.quote(query).await.map_err(domain_error)?;
    Ok(Json(ApiResponse::success(quote.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/vehicle-types",
    tag = "Catalog",
    responses((status = 200, description = "Bookable vehicle types", body = ApiResponse<Vec<VehicleTypeDto>>))
)]
pub async fn list_vehicle_types(
    State(state): State<CatalogHandlerState>,
) -> ApiResult<Vec<VehicleTypeDto>> {
    let types = state.catalog.list_vehicle_types().await.map_err(domain_error)?;
    Ok(Json(ApiResponse::success(
        types.into_iter().map(VehicleTypeDto::from).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/prices",
    tag = "Catalog",
    responses((status = 200, description = "Configured unit prices", body = ApiResponse<Vec<PriceDto>>))
)]
pub async fn list_prices(State(state): State<CatalogHandlerState>) -> ApiResult<Vec<PriceDto>> {
    let prices = state.catalog.list_prices().await.map_err(domain_error)?;
    Ok(Json(ApiResponse::success(
        prices.into_iter().map(PriceDto::from).collect(),
    )))
}
