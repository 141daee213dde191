//! JWT claims carried by every access token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use moviez_core::types::UserId;
use moviez_entity::user::UserRole;

/// Access token payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user ID.
    pub sub: UserId,
    /// Role at the time of issuance.
    pub role: UserRole,
    /// Username for display and logging.
    pub username: String,
    /// Issued-at (seconds since epoch).
    pub iat: i64,
    /// Expiration (seconds since epoch).
    pub exp: i64,
    /// Unique token ID.
    pub jti: Uuid,
}

impl Claims {
    /// The authenticated user.
    pub fn user_id(&self) -> UserId {
        self.sub
    }

    /// Expiration as a timestamp.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Whether the token is past its expiry at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}
