//! Request context carrying the authenticated user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use moviez_core::types::UserId;
use moviez_entity::user::UserRole;

/// Who is performing the current operation.
///
/// Built by the API layer from a verified access token and passed into
/// every service method that acts on behalf of a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: UserId,
    /// The user's role at the time the token was issued.
    pub role: UserRole,
    /// The username (from the token claims).
    pub username: String,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context stamped with the current time.
    pub fn new(user_id: UserId, role: UserRole, username: impl Into<String>) -> Self {
        Self {
            user_id,
            role,
            username: username.into(),
            request_time: Utc::now(),
        }
    }

    /// Returns whether the current user is an admin.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
