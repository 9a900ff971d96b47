//! Authentication API handlers

use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set};
use tracing::{info, warn};

use super::dto::{AdminInfo, CreateAdminRequest, LoginRequest, LoginResponse};
use crate::infrastructure::crypto::jwt::ADMIN_ROLE;
use crate::infrastructure::crypto::{create_token, hash_password, verify_password, JwtConfig};
use crate::infrastructure::database::entities::admin_user;
use crate::interfaces::http::common::{error_response, ApiError, ApiResponse, ApiResult, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedAdmin;

/// Auth state
#[derive(Clone)]
pub struct AuthHandlerState {
    pub db: DatabaseConnection,
    pub jwt_config: JwtConfig,
}

fn db_error<T>(e: DbErr) -> ApiError<T> {
    tracing::error!(error = %e, "Admin store error");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}

pub async fn find_admin(
    db: &DatabaseConnection,
    username: &str,
) -> Result<Option<admin_user::Model>, DbErr> {
    admin_user::Entity::find()
        .filter(admin_user::Column::Username.eq(username))
        .one(db)
        .await
}

/// Store a new admin account with an already hashed password.
pub async fn insert_admin(
    db: &DatabaseConnection,
    username: &str,
    password_hash: String,
) -> Result<admin_user::Model, DbErr> {
    admin_user::ActiveModel {
        id: Set(uuid::Uuid::new_v4().to_string()),
        username: Set(username.to_string()),
        password_hash: Set(password_hash),
        created_at: Set(Utc::now()),
        last_login_at: Set(None),
    }
    .insert(db)
    .await
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Successful login", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AuthHandlerState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let admin = find_admin(&state.db, request.username.trim())
        .await
        .map_err(db_error)?;

    let Some(admin) = admin else {
        warn!(username = %request.username, "Login for unknown admin");
        return Err(error_response(StatusCode::UNAUTHORIZED, "Invalid credentials"));
    };

    let password_valid = verify_password(&request.password, &admin.password_hash).unwrap_or(false);
    if !password_valid {
        warn!(username = %admin.username, "Login with wrong password");
        return Err(error_response(StatusCode::UNAUTHORIZED, "Invalid credentials"));
    }

    let mut active: admin_user::ActiveModel = admin.clone().into();
    active.last_login_at = Set(Some(Utc::now()));
    active.update(&state.db).await.ok();

    let token = create_token(&admin.id, &admin.username, ADMIN_ROLE, &state.jwt_config)
        .map_err(|e| error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    info!(username = %admin.username, "Admin logged in");

    Ok(Json(ApiResponse::success(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_config.expires_in_secs(),
        admin: AdminInfo {
            id: admin.id,
            username: admin.username,
        },
    })))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/users",
    tag = "Admin",
    security(("bearer_auth" = [])),
    request_body = CreateAdminRequest,
    responses(
        (status = 201, description = "Admin created", body = ApiResponse<AdminInfo>),
        (status = 409, description = "Username already taken"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn create_admin(
    State(state): State<AuthHandlerState>,
    Extension(caller): Extension<AuthenticatedAdmin>,
    ValidatedJson(request): ValidatedJson<CreateAdminRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AdminInfo>>), ApiError<AdminInfo>> {
    let username = request.username.trim();

    if find_admin(&state.db, username).await.map_err(db_error)?.is_some() {
        return Err(error_response(StatusCode::CONFLICT, "Username already exists"));
    }

    let password_hash = hash_password(&request.password)
        .map_err(|e| error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    let admin = insert_admin(&state.db, username, password_hash)
        .await
        .map_err(db_error)?;

    info!(username = %admin.username, created_by = %caller.username, "Admin account created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(AdminInfo {
            id: admin.id,
            username: admin.username,
        })),
    ))
}
