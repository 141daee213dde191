//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use moviez_auth::jwt::JwtDecoder;
use moviez_core::config::AppConfig;
use moviez_database::Stores;
use moviez_service::{MovieService, ReservationService, ShowtimeService, UserService};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// Persistence backends
    pub stores: Stores,

    // ── Auth ─────────────────────────────────────────────────
    /// JWT token decoder and validator
    pub jwt_decoder: Arc<JwtDecoder>,

    // ── Services ─────────────────────────────────────────────
    /// Registration, login and profile
    pub user_service: Arc<UserService>,
    /// Movie catalog
    pub movie_service: Arc<MovieService>,
    /// Showtime scheduling
    pub showtime_service: Arc<ShowtimeService>,
    /// Seat reservation core
    pub reservation_service: Arc<ReservationService>,
}
