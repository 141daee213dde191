//! Administrative handlers.

use axum::Json;
use axum::extract::{Path, State};

use moviez_core::error::AppError;
use moviez_core::types::ShowtimeId;
use moviez_entity::reservation::Reservation;
use moviez_service::reservation::ReconcileReport;

use crate::dto::request::ReconcileRequest;
use crate::dto::response::ApiResponse;
use crate::extractors::{AuthUser, ValidJson};
use crate::state::AppState;

/// GET /api/admin/showtimes/{id}/reservations
pub async fn list_showtime_reservations(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<ShowtimeId>,
) -> Result<Json<ApiResponse<Vec<Reservation>>>, AppError> {
    let reservations = state
        .reservation_service
        .list_for_showtime(&auth, id)
        .await?;
    Ok(Json(ApiResponse::ok(reservations)))
}

/// POST /api/admin/ledger/reconcile
///
/// The body is optional; an empty body reconciles every tracked showtime.
pub async fn reconcile_ledger(
    State(state): State<AppState>,
    auth: AuthUser,
    body: Option<ValidJson<ReconcileRequest>>,
) -> Result<Json<ApiResponse<Vec<ReconcileReport>>>, AppError> {
    let req = body.map(|ValidJson(req)| req).unwrap_or_default();
    let reports = state
        .reservation_service
        .reconcile(&auth, req.showtime_id)
        .await?;
    Ok(Json(ApiResponse::ok(reports)))
}
