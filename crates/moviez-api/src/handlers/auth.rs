//! Auth handlers: register, login, me.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use moviez_core::error::AppError;

use crate::dto::request::{LoginRequest, RegisterRequest};
use crate::dto::response::{ApiResponse, IdentityResponse, LoginResponse, UserResponse};
use crate::extractors::{AuthUser, ValidJson};
use crate::state::AppState;

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), AppError> {
    let user = state
        .user_service
        .register(&req.username, &req.email, &req.password)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(user.into()))))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, AppError> {
    let result = state
        .user_service
        .login(&req.username, &req.password)
        .await?;

    Ok(Json(ApiResponse::ok(LoginResponse {
        access_token: result.token.access_token,
        token_type: "Bearer".to_string(),
        expires_at: result.token.expires_at,
        user: result.user.into(),
    })))
}

/// GET /api/auth/me
pub async fn me(auth: AuthUser) -> Json<ApiResponse<IdentityResponse>> {
    Json(ApiResponse::ok(IdentityResponse::from(auth.context())))
}
