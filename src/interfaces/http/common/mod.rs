//! Response envelope, pagination and error mapping shared by all handlers

pub mod validated_json;

pub use validated_json::ValidatedJson;

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::DomainError;
use crate::shared::types::{PageRequest, PaginatedResult};

/// Standard API response envelope
///
/// Success: `{"success": true, "data": {...}}`,
/// failure: `{"success": false, "data": null, "error": "..."}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Handler error: status plus an error envelope.
pub type ApiError<T> = (StatusCode, Json<ApiResponse<T>>);

/// Handler result used by every JSON endpoint.
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError<T>>;

/// Empty payload for operations without return data
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EmptyData {}

/// Pagination query parameters
#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct PaginationParams {
    /// Page number, starting at 1. Default: 1
    #[serde(default = "default_page")]
    pub page: u32,
    /// Items per page (1-100). Default: 50
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    50
}

impl From<&PaginationParams> for PageRequest {
    fn from(params: &PaginationParams) -> Self {
        PageRequest::new(params.page, params.limit)
    }
}

/// One page of items plus page metadata
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    /// Total across all pages
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

impl<T, U> From<PaginatedResult<U>> for PaginatedResponse<T>
where
    T: From<U>,
{
    fn from(result: PaginatedResult<U>) -> Self {
        Self {
            items: result.items.into_iter().map(T::from).collect(),
            total: result.total,
            page: result.page,
            limit: result.limit,
            total_pages: result.total_pages,
        }
    }
}

// ── Error mapping ───────────────────────────────────────────────

pub fn status_for(error: &DomainError) -> StatusCode {
    match error {
        DomainError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::NotConfigured { .. } | DomainError::PriceNotConfigured { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        DomainError::Conflict(_) | DomainError::StaleState(_) => StatusCode::CONFLICT,
        DomainError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
        DomainError::UpstreamFailure { retryable: true, .. } => StatusCode::SERVICE_UNAVAILABLE,
        DomainError::UpstreamFailure { .. } => StatusCode::BAD_GATEWAY,
        DomainError::DuplicateCode(_) | DomainError::Storage(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Map a domain error into the error envelope. Storage details stay in the log.
pub fn domain_error<T>(error: DomainError) -> ApiError<T> {
    let status = status_for(&error);
    let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!(error = %error, "Request failed");
        "Internal server error".to_string()
    } else {
        if status.is_server_error() {
            tracing::warn!(error = %error, "Upstream failure");
        }
        error.to_string()
    };
    (status, Json(ApiResponse::error(message)))
}

pub fn error_response<T>(status: StatusCode, message: impl Into<String>) -> ApiError<T> {
    (status, Json(ApiResponse::error(message)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_statuses() {
        let cases = [
            (DomainError::invalid("start_time", "bad"), StatusCode::BAD_REQUEST),
            (
                DomainError::NotConfigured {
                    what: "space pool capacity",
                    vehicle_type: "car".into(),
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                DomainError::PriceNotConfigured {
                    vehicle_type: "car".into(),
                    unit: "day".into(),
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (DomainError::Conflict("full".into()), StatusCode::CONFLICT),
            (DomainError::Forbidden("late".into()), StatusCode::FORBIDDEN),
            (
                DomainError::UpstreamFailure {
                    service: "payment",
                    message: "timeout".into(),
                    retryable: true,
                },
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                DomainError::UpstreamFailure {
                    service: "payment",
                    message: "declined".into(),
                    retryable: false,
                },
                StatusCode::BAD_GATEWAY,
            ),
            (DomainError::Storage("io".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, expected) in cases {
            assert_eq!(status_for(&error), expected, "{error}");
        }
    }

    #[test]
    fn storage_details_are_hidden() {
        let (status, Json(body)) =
            domain_error::<()>(DomainError::Storage("Database error: disk I/O".into()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error.as_deref(), Some("Internal server error"));
        assert!(!body.success);
    }

    #[test]
    fn paginated_result_converts_items() {
        let page = PaginatedResult::new(vec![1_i32, 2], 5, PageRequest::new(1, 2));
        let response: PaginatedResponse<i64> = page.into();
        assert_eq!(response.items, vec![1_i64, 2]);
        assert_eq!(response.total_pages, 3);
    }
}
