//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use moviez_core::types::UserId;
use moviez_entity::user::{User, UserRole};
use moviez_service::context::RequestContext;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Login response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Access token.
    pub access_token: String,
    /// Always `Bearer`.
    pub token_type: String,
    /// Access token expiration.
    pub expires_at: DateTime<Utc>,
    /// User info.
    pub user: UserResponse,
}

/// User summary for responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    /// User ID.
    pub id: UserId,
    /// Username.
    pub username: String,
    /// Email.
    pub email: String,
    /// Role.
    pub role: UserRole,
    /// Created at.
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

/// Identity carried by the caller's token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityResponse {
    /// User ID.
    pub user_id: UserId,
    /// Username.
    pub username: String,
    /// Role.
    pub role: UserRole,
}

impl From<&RequestContext> for IdentityResponse {
    fn from(ctx: &RequestContext) -> Self {
        Self {
            user_id: ctx.user_id,
            username: ctx.username.clone(),
            role: ctx.role,
        }
    }
}

/// Simple message response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Message.
    pub message: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status.
    pub status: String,
    /// Version.
    pub version: String,
    /// Storage backend status.
    pub database: String,
}
