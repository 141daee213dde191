//! Application builder: wires stores, services and the router.

use std::sync::Arc;

use axum::Router;
use tracing::info;

use moviez_auth::jwt::{JwtDecoder, JwtEncoder};
use moviez_auth::password::{PasswordHasher, PasswordValidator};
use moviez_auth::rbac::RbacEnforcer;
use moviez_core::config::AppConfig;
use moviez_core::result::AppResult;
use moviez_database::Stores;
use moviez_service::{MovieService, ReservationService, ShowtimeService, UserService};

use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}

/// Constructs every service over `stores` and seeds the bootstrap
/// administrator when one is configured.
pub async fn build_state(config: AppConfig, stores: Stores) -> AppResult<AppState> {
    // ── Auth ─────────────────────────────────────────────────────
    let password_hasher = Arc::new(PasswordHasher::new());
    let password_validator = Arc::new(PasswordValidator::new(&config.auth));
    let jwt_encoder = Arc::new(JwtEncoder::new(&config.auth));
    let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth));
    let rbac = Arc::new(RbacEnforcer::new());

    // ── Services ─────────────────────────────────────────────────
    let user_service = Arc::new(UserService::new(
        Arc::clone(&stores.users),
        password_hasher,
        password_validator,
        jwt_encoder,
    ));
    let movie_service = Arc::new(MovieService::new(
        Arc::clone(&stores.catalog),
        Arc::clone(&rbac),
    ));
    let reservation_service = Arc::new(ReservationService::new(
        Arc::clone(&stores.catalog),
        Arc::clone(&stores.reservations),
        Arc::clone(&rbac),
        &config.reservation,
    ));
    let showtime_service = Arc::new(ShowtimeService::new(
        Arc::clone(&stores.catalog),
        Arc::clone(&stores.reservations),
        reservation_service.guard(),
        rbac,
        &config.reservation,
    ));

    if let Some(admin) = &config.auth.bootstrap_admin {
        user_service.ensure_admin(admin).await?;
    }

    info!(
        postgres = stores.pool.is_some(),
        cache_ledger = config.reservation.cache_ledger,
        guard_timeout_ms = config.reservation.guard_timeout_ms,
        "Application state initialized"
    );

    Ok(AppState {
        config: Arc::new(config),
        stores,
        jwt_decoder,
        user_service,
        movie_service,
        showtime_service,
        reservation_service,
    })
}
