//! Access token signing.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use moviez_core::config::AuthConfig;
use moviez_core::error::AppError;
use moviez_core::types::UserId;
use moviez_entity::user::UserRole;

use super::claims::Claims;

/// Signs HS256 access tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    encoding_key: EncodingKey,
    access_ttl: Duration,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("access_ttl", &self.access_ttl)
            .finish()
    }
}

/// A freshly signed access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedToken {
    /// The compact JWT.
    pub access_token: String,
    /// When it stops being accepted.
    pub expires_at: DateTime<Utc>,
}

impl JwtEncoder {
    /// Creates an encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            access_ttl: Duration::minutes(config.jwt_access_ttl_minutes as i64),
        }
    }

    /// Issues an access token for the given user.
    pub fn issue_access_token(
        &self,
        user_id: UserId,
        role: UserRole,
        username: &str,
    ) -> Result<IssuedToken, AppError> {
        let now = Utc::now();
        let expires_at = now + self.access_ttl;

        let claims = Claims {
            sub: user_id,
            role,
            username: username.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4(),
        };

        let access_token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode access token: {e}")))?;

        Ok(IssuedToken {
            access_token,
            expires_at,
        })
    }
}
