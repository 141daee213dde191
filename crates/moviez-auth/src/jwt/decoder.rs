//! Access token validation.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use moviez_core::config::AuthConfig;
use moviez_core::error::AppError;

use super::claims::Claims;

/// Clock-skew tolerance in seconds.
const LEEWAY_SECONDS: u64 = 5;

/// Verifies signature and expiry of access tokens.
#[derive(Clone)]
pub struct JwtDecoder {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = LEEWAY_SECONDS;

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Decodes and validates an access token.
    pub fn decode_access_token(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::unauthorized("Token has expired")
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AppError::unauthorized("Invalid token signature")
                }
                _ => AppError::unauthorized(format!("Token validation failed: {e}")),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::JwtEncoder;
    use moviez_core::ErrorKind;
    use moviez_core::types::UserId;
    use moviez_entity::user::UserRole;

    fn config(secret: &str) -> AuthConfig {
        AuthConfig {
            jwt_secret: secret.to_string(),
            ..AuthConfig::default()
        }
    }

    #[test]
    fn test_issued_token_decodes() {
        let cfg = config("test-secret");
        let user = UserId::new();
        let issued = JwtEncoder::new(&cfg)
            .issue_access_token(user, UserRole::Admin, "root")
            .unwrap();

        let claims = JwtDecoder::new(&cfg)
            .decode_access_token(&issued.access_token)
            .unwrap();
        assert_eq!(claims.user_id(), user);
        assert_eq!(claims.role, UserRole::Admin);
        assert_eq!(claims.username, "root");
    }

    #[test]
    fn test_wrong_secret_is_unauthorized() {
        let issued = JwtEncoder::new(&config("one"))
            .issue_access_token(UserId::new(), UserRole::User, "alice")
            .unwrap();

        let err = JwtDecoder::new(&config("two"))
            .decode_access_token(&issued.access_token)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unauthorized);
    }

    #[test]
    fn test_garbage_is_unauthorized() {
        let err = JwtDecoder::new(&config("x"))
            .decode_access_token("not.a.jwt")
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unauthorized);
    }
}
