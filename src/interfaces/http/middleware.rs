//! Admin authentication middleware for Axum

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use super::common::ApiResponse;
use crate::infrastructure::crypto::{verify_token, JwtConfig, TokenClaims};

/// Authentication error types
#[derive(Debug, PartialEq, Eq)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    InsufficientPermissions,
}

#[derive(Clone)]
pub struct AuthState {
    pub jwt_config: JwtConfig,
}

/// Admin identity taken from a verified token, available to handlers as an
/// `Extension`.
#[derive(Clone, Debug)]
pub struct AuthenticatedAdmin {
    pub user_id: String,
    pub username: String,
}

impl From<TokenClaims> for AuthenticatedAdmin {
    fn from(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.sub,
            username: claims.username,
        }
    }
}

fn extract_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Resolve the `Authorization` header into an admin identity.
pub fn authenticate(
    auth_header: Option<&str>,
    jwt_config: &JwtConfig,
) -> Result<AuthenticatedAdmin, AuthError> {
    let auth_header = auth_header.ok_or(AuthError::MissingToken)?;
    let token = extract_token(auth_header).ok_or(AuthError::InvalidToken)?;
    let claims = verify_token(token, jwt_config).map_err(|_| AuthError::InvalidToken)?;
    if !claims.is_admin() {
        return Err(AuthError::InsufficientPermissions);
    }
    Ok(claims.into())
}

/// Bearer JWT middleware guarding the admin routes
pub async fn admin_auth_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    match authenticate(auth_header, &auth_state.jwt_config) {
        Ok(admin) => {
            request.extensions_mut().insert(admin);
            next.run(request).await
        }
        Err(error) => auth_error_response(error),
    }
}

fn auth_error_response(error: AuthError) -> Response {
    let (status, message) = match error {
        AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "Missing authentication token"),
        AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid or expired token"),
        AuthError::InsufficientPermissions => (StatusCode::FORBIDDEN, "Admin role required"),
    };

    (status, Json(ApiResponse::<()>::error(message))).into_response()
}
