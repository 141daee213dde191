//! Movie catalog handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;

use moviez_core::error::AppError;
use moviez_core::types::{MovieId, PageResponse};
use moviez_entity::movie::Movie;
use moviez_entity::showtime::Showtime;

use crate::dto::request::{CreateMovieRequest, UpdateMovieRequest};
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::extractors::{AuthUser, PaginationParams, ValidJson};
use crate::state::AppState;

/// GET /api/movies
pub async fn list_movies(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PageResponse<Movie>>>, AppError> {
    let page = state
        .movie_service
        .list(params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /api/movies/{id}
pub async fn get_movie(
    State(state): State<AppState>,
    Path(id): Path<MovieId>,
) -> Result<Json<ApiResponse<Movie>>, AppError> {
    let movie = state.movie_service.get(id).await?;
    Ok(Json(ApiResponse::ok(movie)))
}

/// POST /api/movies
pub async fn create_movie(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(req): ValidJson<CreateMovieRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Movie>>), AppError> {
    let movie = state.movie_service.create(&auth, req.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(movie))))
}

/// PUT /api/movies/{id}
pub async fn update_movie(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<MovieId>,
    ValidJson(req): ValidJson<UpdateMovieRequest>,
) -> Result<Json<ApiResponse<Movie>>, AppError> {
    let movie = state.movie_service.update(&auth, id, req.into()).await?;
    Ok(Json(ApiResponse::ok(movie)))
}

/// DELETE /api/movies/{id}
pub async fn delete_movie(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<MovieId>,
) -> Result<Json<ApiResponse<MessageResponse>>, AppError> {
    state.movie_service.delete(&auth, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse {
        message: "Movie deleted".to_string(),
    })))
}

/// GET /api/movies/{id}/showtimes
pub async fn list_movie_showtimes(
    State(state): State<AppState>,
    Path(id): Path<MovieId>,
) -> Result<Json<ApiResponse<Vec<Showtime>>>, AppError> {
    let showtimes = state.showtime_service.for_movie(id).await?;
    Ok(Json(ApiResponse::ok(showtimes)))
}
