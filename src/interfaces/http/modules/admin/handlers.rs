//! Admin handlers: reservation management, vehicle configuration, sweep

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::info;

use super::dto::{
    AdminCancelRequest, ReservationListParams, SweepResponse, UpdateVehicleConfigRequest,
    VehicleConfigDto,
};
use crate::application::booking::sweep;
use crate::application::{
    CancelActor, CancelReservation, CatalogService, CreateActor, CreateReservation,
    ReservationService,
};
use crate::interfaces::http::common::{
    domain_error, ApiError, ApiResponse, ApiResult, PaginatedResponse, ValidatedJson,
};
use crate::interfaces::http::middleware::AuthenticatedAdmin;
use crate::interfaces::http::modules::reservations::{
    CreateReservationRequest, CreatedReservationResponse, ReservationDto,
};

#[derive(Clone)]
pub struct AdminHandlerState {
    pub service: ReservationService,
    pub catalog: CatalogService,
}

// ── Reservations ───────────────────────────────────────────────

#[utoipa::path(
    get,
    path = "/api/v1/admin/reservations",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(ReservationListParams),
    responses(
        (status = 200, description = "Newest first", body = ApiResponse<PaginatedResponse<ReservationDto>>),
        (status = 400, description = "Unknown status filter")
    )
)]
pub async fn list_reservations(
    State(state): State<AdminHandlerState>,
    Query(params): Query<ReservationListParams>,
) -> ApiResult<PaginatedResponse<ReservationDto>> {
    let filter = params.to_filter().map_err(domain_error)?;
    let page = state
        .service
        .list(&filter, params.page())
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(page.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/reservations/{code}",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("code" = String, Path, description = "Reservation code")),
    responses(
        (status = 200, description = "Reservation", body = ApiResponse<ReservationDto>),
        (status = 404, description = "Unknown code")
    )
)]
pub async fn get_reservation(
    State(state): State<AdminHandlerState>,
    Path(code): Path<String>,
) -> ApiResult<ReservationDto> {
    let reservation = state
        .service
        .find_for_customer(&code, None)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(reservation.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/reservations",
    tag = "Admin",
    security(("bearer_auth" = [])),
    request_body = CreateReservationRequest,
    responses(
        (status = 201, description = "Created active, no online payment", body = ApiResponse<CreatedReservationResponse>),
        (status = 409, description = "No space left for the window")
    )
)]
pub async fn create_reservation(
    State(state): State<AdminHandlerState>,
    Extension(admin): Extension<AuthenticatedAdmin>,
    ValidatedJson(request): ValidatedJson<CreateReservationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CreatedReservationResponse>>), ApiError<CreatedReservationResponse>>
{
    let draft = request.to_draft().map_err(domain_error)?;
    let created = state
        .service
        .create(CreateReservation {
            draft,
            actor: CreateActor::Admin,
            total_price: request.total_price,
        })
        .await
        .map_err(domain_error)?;

    info!(code = %created.reservation.code, admin = %admin.username, "Reservation created by admin");
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created.into()))))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/reservations/{code}/cancel",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("code" = String, Path, description = "Reservation code")),
    request_body = AdminCancelRequest,
    responses(
        (status = 200, description = "Reservation canceled", body = ApiResponse<ReservationDto>),
        (status = 400, description = "Reservation already finished"),
        (status = 503, description = "Refund could not be confirmed, retry later")
    )
)]
pub async fn cancel_reservation(
    State(state): State<AdminHandlerState>,
    Extension(admin): Extension<AuthenticatedAdmin>,
    Path(code): Path<String>,
    Json(request): Json<AdminCancelRequest>,
) -> ApiResult<ReservationDto> {
    let reservation = state
        .service
        .cancel(CancelReservation {
            code,
            actor: CancelActor::Admin {
                refund: request.refund,
            },
        })
        .await
        .map_err(domain_error)?;

    info!(code = %reservation.code, admin = %admin.username, refund = request.refund, "Reservation canceled by admin");
    Ok(Json(ApiResponse::success(reservation.into())))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/reservations/{code}",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("code" = String, Path, description = "Reservation code")),
    responses(
        (status = 204, description = "Reservation deleted"),
        (status = 404, description = "Unknown code")
    )
)]
pub async fn delete_reservation(
    State(state): State<AdminHandlerState>,
    Extension(admin): Extension<AuthenticatedAdmin>,
    Path(code): Path<String>,
) -> Result<StatusCode, ApiError<()>> {
    state.service.delete(&code).await.map_err(domain_error)?;
    info!(code = %code, admin = %admin.username, "Reservation hard-deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ── Vehicle configuration ──────────────────────────────────────

#[utoipa::path(
    get,
    path = "/api/v1/admin/vehicle-config",
    tag = "Admin",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Pool size and prices per vehicle type", body = ApiResponse<Vec<VehicleConfigDto>>))
)]
pub async fn list_vehicle_configs(
    State(state): State<AdminHandlerState>,
) -> ApiResult<Vec<VehicleConfigDto>> {
    let configs = state
        .catalog
        .list_vehicle_configs()
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(
        configs.into_iter().map(VehicleConfigDto::from).collect(),
    )))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/vehicle-config/{vehicle_type}",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("vehicle_type" = String, Path, description = "Vehicle type name, e.g. car")),
    request_body = UpdateVehicleConfigRequest,
    responses(
        (status = 200, description = "Updated configuration", body = ApiResponse<VehicleConfigDto>),
        (status = 400, description = "Unknown billing unit or negative price"),
        (status = 404, description = "Unknown vehicle type")
    )
)]
pub async fn update_vehicle_config(
    State(state): State<AdminHandlerState>,
    Extension(admin): Extension<AuthenticatedAdmin>,
    Path(vehicle_type): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateVehicleConfigRequest>,
) -> ApiResult<VehicleConfigDto> {
    let prices = request.unit_prices().map_err(domain_error)?;
    let config = state
        .catalog
        .update_vehicle_config(&vehicle_type, request.spaces, prices)
        .await
        .map_err(domain_error)?;

    info!(vehicle_type = %vehicle_type, admin = %admin.username, "Vehicle configuration updated");
    Ok(Json(ApiResponse::success(config.into())))
}

// ── Maintenance ────────────────────────────────────────────────

#[utoipa::path(
    post,
    path = "/api/v1/admin/sweep",
    tag = "Admin",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Elapsed reservations finished and abandoned checkouts released", body = ApiResponse<SweepResponse>))
)]
pub async fn run_sweep(State(state): State<AdminHandlerState>) -> ApiResult<SweepResponse> {
    let report = sweep::run_sweep(&state.service)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(report.into())))
}
