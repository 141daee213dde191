//! Health check handler.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health(
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiResponse<HealthResponse>>) {
    let (status, database) = match state.stores.health_check().await {
        Ok(()) if state.stores.pool.is_some() => (StatusCode::OK, "connected"),
        Ok(()) => (StatusCode::OK, "memory"),
        Err(e) => {
            tracing::warn!(error = %e, "Health check: storage unreachable");
            (StatusCode::SERVICE_UNAVAILABLE, "unreachable")
        }
    };

    let overall = if status == StatusCode::OK { "ok" } else { "degraded" };

    (
        status,
        Json(ApiResponse::ok(HealthResponse {
            status: overall.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            database: database.to_string(),
        })),
    )
}
