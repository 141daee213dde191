//! Showtime handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;

use moviez_core::error::AppError;
use moviez_core::types::ShowtimeId;
use moviez_entity::showtime::Showtime;
use moviez_service::reservation::SeatAvailability;

use crate::dto::request::{CreateShowtimeRequest, ShowtimeWindowQuery};
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::extractors::{AuthUser, ValidJson};
use crate::state::AppState;

/// GET /api/showtimes?from=&to=
pub async fn list_showtimes(
    State(state): State<AppState>,
    Query(window): Query<ShowtimeWindowQuery>,
) -> Result<Json<ApiResponse<Vec<Showtime>>>, AppError> {
    let showtimes = state
        .showtime_service
        .between(window.from, window.to)
        .await?;
    Ok(Json(ApiResponse::ok(showtimes)))
}

/// GET /api/showtimes/{id}
pub async fn get_showtime(
    State(state): State<AppState>,
    Path(id): Path<ShowtimeId>,
) -> Result<Json<ApiResponse<Showtime>>, AppError> {
    let showtime = state.showtime_service.get(id).await?;
    Ok(Json(ApiResponse::ok(showtime)))
}

/// POST /api/showtimes
pub async fn create_showtime(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(req): ValidJson<CreateShowtimeRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Showtime>>), AppError> {
    let showtime = state
        .showtime_service
        .create(&auth, req.movie_id, req.start_time, req.end_time, req.capacity)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(showtime))))
}

/// DELETE /api/showtimes/{id}
pub async fn delete_showtime(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<ShowtimeId>,
) -> Result<Json<ApiResponse<MessageResponse>>, AppError> {
    state.showtime_service.delete(&auth, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse {
        message: "Showtime deleted".to_string(),
    })))
}

/// GET /api/showtimes/{id}/seats
pub async fn get_seats(
    State(state): State<AppState>,
    Path(id): Path<ShowtimeId>,
) -> Result<Json<ApiResponse<SeatAvailability>>, AppError> {
    let availability = state.reservation_service.availability(id).await?;
    Ok(Json(ApiResponse::ok(availability)))
}
