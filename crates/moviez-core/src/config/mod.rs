//! Application configuration schemas.
//!
//! Configuration is merged from `config/default.toml`, an optional
//! `config/{env}.toml` overlay and `MOVIEZ__*` environment variables.
//! Every field carries a serde default so a bare environment still yields
//! a runnable (in-memory) configuration.

pub mod app;
pub mod auth;
pub mod database;
pub mod logging;
pub mod reservation;

use serde::{Deserialize, Serialize};

pub use self::app::{CorsConfig, ServerConfig};
pub use self::auth::{AuthConfig, BootstrapAdmin};
pub use self::database::{DatabaseConfig, StoreBackend};
pub use self::logging::LoggingConfig;
pub use self::reservation::ReservationConfig;

use crate::error::AppError;

/// Environment variable prefix for overrides (`MOVIEZ__SERVER__PORT=9000`).
pub const ENV_PREFIX: &str = "MOVIEZ";

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Persistence backend settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Authentication settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Seat reservation settings.
    #[serde(default)]
    pub reservation: ReservationConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration for the given environment name.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        loaded.validate()?;
        Ok(loaded)
    }

    /// Reject settings the reservation core cannot operate with.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.reservation.default_capacity < 1 {
            return Err(AppError::configuration(
                "reservation.default_capacity must be at least 1",
            ));
        }
        if self.reservation.max_seats_per_request < 1 {
            return Err(AppError::configuration(
                "reservation.max_seats_per_request must be at least 1",
            ));
        }
        if self.database.backend == StoreBackend::Postgres && self.database.url.is_empty() {
            return Err(AppError::configuration(
                "database.url is required for the postgres backend",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_usable() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.reservation.default_capacity, 100);
        assert_eq!(cfg.reservation.max_seats_per_request, 10);
        assert_eq!(cfg.reservation.guard_timeout_ms, 2000);
        assert_eq!(cfg.reservation.cancellation_lead_minutes, 60);
        assert!(cfg.reservation.cache_ledger);
        assert_eq!(cfg.database.backend, StoreBackend::Memory);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_postgres_requires_url() {
        let mut cfg = AppConfig::default();
        cfg.database.backend = StoreBackend::Postgres;
        let err = cfg.validate().unwrap_err();
        assert_eq!(err.kind, crate::ErrorKind::Configuration);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let raw = r#"
            [reservation]
            max_seats_per_request = 4

            [database]
            backend = "postgres"
            url = "postgres://localhost/moviez"
        "#;
        let cfg: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()
            .and_then(|c| c.try_deserialize())
            .expect("config should parse");

        assert_eq!(cfg.reservation.max_seats_per_request, 4);
        assert_eq!(cfg.reservation.default_capacity, 100);
        assert_eq!(cfg.database.backend, StoreBackend::Postgres);
        assert_eq!(cfg.server.port, 8080);
    }
}
