//! Reservation handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use moviez_core::error::AppError;
use moviez_core::types::{ReservationId, ShowtimeId};
use moviez_entity::reservation::Reservation;

use crate::dto::request::ReserveSeatsRequest;
use crate::dto::response::ApiResponse;
use crate::extractors::{AuthUser, ValidJson};
use crate::state::AppState;

/// POST /api/showtimes/{id}/reservations
pub async fn reserve_seats(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(showtime_id): Path<ShowtimeId>,
    ValidJson(req): ValidJson<ReserveSeatsRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Reservation>>), AppError> {
    let reservation = state
        .reservation_service
        .reserve(&auth, showtime_id, req.seat_numbers)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(reservation))))
}

/// GET /api/reservations
pub async fn list_my_reservations(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<Reservation>>>, AppError> {
    let reservations = state.reservation_service.list_mine(&auth).await?;
    Ok(Json(ApiResponse::ok(reservations)))
}

/// GET /api/reservations/{id}
pub async fn get_reservation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<ReservationId>,
) -> Result<Json<ApiResponse<Reservation>>, AppError> {
    let reservation = state.reservation_service.get(&auth, id).await?;
    Ok(Json(ApiResponse::ok(reservation)))
}

/// POST /api/reservations/{id}/cancel
pub async fn cancel_reservation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<ReservationId>,
) -> Result<Json<ApiResponse<Reservation>>, AppError> {
    let reservation = state.reservation_service.cancel(&auth, id).await?;
    Ok(Json(ApiResponse::ok(reservation)))
}
