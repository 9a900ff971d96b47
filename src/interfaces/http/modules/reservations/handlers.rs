//! Customer reservation handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::dto::{
    CreateReservationRequest, CreatedReservationResponse, CustomerEmailParams, ReservationDto,
};
use crate::application::{
    CancelActor, CancelReservation, CreateActor, CreateReservation, ReservationService,
};
use crate::interfaces::http::common::{domain_error, ApiError, ApiResponse, ApiResult, ValidatedJson};

#[derive(Clone)]
pub struct ReservationHandlerState {
    pub service: ReservationService,
}

#[utoipa::path(
    post,
    path = "/api/v1/reservations",
    tag = "Reservations",
    request_body = CreateReservationRequest,
    responses(
        (status = 201, description = "Reservation created", body = ApiResponse<CreatedReservationResponse>),
        (status = 400, description = "Invalid request"),
        (status = 403, description = "Price override is reserved to administrators"),
        (status = 409, description = "No space left for the window"),
        (status = 422, description = "Capacity or price not configured"),
        (status = 502, description = "Payment provider rejected the checkout")
    )
)]
pub async fn create_reservation(
    State(state): State<ReservationHandlerState>,
    ValidatedJson(request): ValidatedJson<CreateReservationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CreatedReservationResponse>>), ApiError<CreatedReservationResponse>>
{
    let draft = request.to_draft().map_err(domain_error)?;
    let created = state
        .service
        .create(CreateReservation {
            draft,
            actor: CreateActor::Customer,
            total_price: request.total_price,
        })
        .await
        .map_err(domain_error)?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(created.into()))))
}

#[utoipa::path(
    get,
    path = "/api/v1/reservations/{code}",
    tag = "Reservations",
    params(("code" = String, Path, description = "Reservation code"), CustomerEmailParams),
    responses(
        (status = 200, description = "Reservation", body = ApiResponse<ReservationDto>),
        (status = 404, description = "Unknown code or email mismatch")
    )
)]
pub async fn get_reservation(
    State(state): State<ReservationHandlerState>,
    Path(code): Path<String>,
    Query(params): Query<CustomerEmailParams>,
) -> ApiResult<ReservationDto> {
    let reservation = state
        .service
        .find_for_customer(&code, Some(&params.email))
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(reservation.into())))
}

#[utoipa::path(
    delete,
    path = "/api/v1/reservations/{code}",
    tag = "Reservations",
    params(("code" = String, Path, description = "Reservation code"), CustomerEmailParams),
    responses(
        (status = 200, description = "Reservation canceled, payment released", body = ApiResponse<ReservationDto>),
        (status = 403, description = "Too close to the start time"),
        (status = 404, description = "Unknown code or email mismatch"),
        (status = 503, description = "Refund could not be confirmed, retry later")
    )
)]
pub async fn cancel_reservation(
    State(state): State<ReservationHandlerState>,
    Path(code): Path<String>,
    Query(params): Query<CustomerEmailParams>,
) -> ApiResult<ReservationDto> {
    let reservation = state
        .service
        .cancel(CancelReservation {
            code,
            actor: CancelActor::Customer {
                email: Some(params.email),
            },
        })
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(reservation.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/reservations/session/{provider_reference}",
    tag = "Reservations",
    params(("provider_reference" = String, Path, description = "Checkout session id")),
    responses(
        (status = 200, description = "Reservation paid through this checkout", body = ApiResponse<ReservationDto>),
        (status = 404, description = "Unknown checkout session")
    )
)]
pub async fn get_by_session(
    State(state): State<ReservationHandlerState>,
    Path(provider_reference): Path<String>,
) -> ApiResult<ReservationDto> {
    let reservation = state
        .service
        .find_by_provider_reference(&provider_reference)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(reservation.into())))
}
