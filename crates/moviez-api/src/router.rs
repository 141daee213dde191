//! Route definitions for the Moviez HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`.
//! The router receives `AppState` and passes it to all handlers via Axum's `State` extractor.

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(auth_routes())
        .merge(movie_routes())
        .merge(showtime_routes())
        .merge(reservation_routes())
        .merge(admin_routes())
        .merge(health_routes());

    let cors = middleware::cors::build_cors_layer(&state.config.server.cors);

    Router::new()
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(axum_middleware::from_fn(
                    middleware::logging::request_logging,
                )),
        )
        .with_state(state)
}

/// Auth endpoints: register, login, me
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/me", get(handlers::auth::me))
}

/// Movie catalog
fn movie_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/movies",
            get(handlers::movie::list_movies).post(handlers::movie::create_movie),
        )
        .route(
            "/movies/{id}",
            get(handlers::movie::get_movie)
                .put(handlers::movie::update_movie)
                .delete(handlers::movie::delete_movie),
        )
        .route(
            "/movies/{id}/showtimes",
            get(handlers::movie::list_movie_showtimes),
        )
}

/// Showtime scheduling and seat maps
fn showtime_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/showtimes",
            get(handlers::showtime::list_showtimes).post(handlers::showtime::create_showtime),
        )
        .route(
            "/showtimes/{id}",
            get(handlers::showtime::get_showtime).delete(handlers::showtime::delete_showtime),
        )
        .route("/showtimes/{id}/seats", get(handlers::showtime::get_seats))
        .route(
            "/showtimes/{id}/reservations",
            post(handlers::reservation::reserve_seats),
        )
}

/// Reservation lookup and cancellation
fn reservation_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/reservations",
            get(handlers::reservation::list_my_reservations),
        )
        .route(
            "/reservations/{id}",
            get(handlers::reservation::get_reservation),
        )
        .route(
            "/reservations/{id}/cancel",
            post(handlers::reservation::cancel_reservation),
        )
}

/// Admin-only operations
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/admin/showtimes/{id}/reservations",
            get(handlers::admin::list_showtime_reservations),
        )
        .route(
            "/admin/ledger/reconcile",
            post(handlers::admin::reconcile_ledger),
        )
}

/// Health check
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
