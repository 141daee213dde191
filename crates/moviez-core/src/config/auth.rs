//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Authentication and credential configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for JWT signing (HMAC-SHA256).
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Access token TTL in minutes.
    #[serde(default = "default_access_ttl")]
    pub jwt_access_ttl_minutes: u64,
    /// Minimum password length.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
    /// Administrator account created at startup if missing.
    #[serde(default)]
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

/// Credentials of the administrator seeded on startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapAdmin {
    /// Login name.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Plaintext password, hashed before storage.
    pub password: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            jwt_access_ttl_minutes: default_access_ttl(),
            password_min_length: default_password_min(),
            bootstrap_admin: None,
        }
    }
}

fn default_jwt_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}

fn default_access_ttl() -> u64 {
    60
}

fn default_password_min() -> usize {
    8
}
