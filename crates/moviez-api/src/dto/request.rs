//! Request DTOs with validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use moviez_core::error::AppError;
use moviez_core::types::{MovieId, ShowtimeId};
use moviez_entity::movie::{CreateMovie, UpdateMovie};
use moviez_entity::reservation::SeatNumber;

/// Runs `validator` rules and folds every failure into one
/// `INVALID_REQUEST` error.
pub fn validate_request<T: Validate>(req: &T) -> Result<(), AppError> {
    req.validate().map_err(|errors| {
        let mut fields: Vec<String> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let reason = errs
                    .iter()
                    .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
                    .unwrap_or_else(|| "is invalid".to_string());
                format!("{field}: {reason}")
            })
            .collect();
        fields.sort();
        AppError::validation(fields.join("; "))
    })
}

/// Registration request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Username.
    #[validate(length(min = 3, max = 64, message = "must be 3-64 characters"))]
    pub username: String,
    /// Email.
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    /// Password.
    #[validate(length(min = 1, message = "is required"))]
    pub password: String,
}

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username.
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Create movie request (admin).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateMovieRequest {
    /// Title.
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    /// Synopsis.
    #[validate(length(max = 4000))]
    pub description: Option<String>,
    /// Poster image URL.
    #[validate(url)]
    pub poster_image_url: Option<String>,
    /// Genre.
    #[validate(length(min = 1, max = 100))]
    pub genre: String,
}

impl From<CreateMovieRequest> for CreateMovie {
    fn from(req: CreateMovieRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            poster_image_url: req.poster_image_url,
            genre: req.genre,
        }
    }
}

/// Update movie request (admin). Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateMovieRequest {
    /// New title.
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    /// New synopsis.
    #[validate(length(max = 4000))]
    pub description: Option<String>,
    /// New poster image URL.
    #[validate(url)]
    pub poster_image_url: Option<String>,
    /// New genre.
    #[validate(length(min = 1, max = 100))]
    pub genre: Option<String>,
}

impl From<UpdateMovieRequest> for UpdateMovie {
    fn from(req: UpdateMovieRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            poster_image_url: req.poster_image_url,
            genre: req.genre,
        }
    }
}

/// Schedule showtime request (admin).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateShowtimeRequest {
    /// Movie being screened.
    pub movie_id: MovieId,
    /// Screening start.
    pub start_time: DateTime<Utc>,
    /// Screening end.
    pub end_time: DateTime<Utc>,
    /// Seat count; the configured default applies when absent.
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub capacity: Option<i32>,
}

/// `GET /showtimes?from=&to=` window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowtimeWindowQuery {
    /// Earliest start (inclusive).
    pub from: DateTime<Utc>,
    /// Latest start (inclusive).
    pub to: DateTime<Utc>,
}

/// Seat reservation request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReserveSeatsRequest {
    /// Requested seat numbers (1-based).
    #[validate(length(min = 1, message = "at least one seat is required"))]
    pub seat_numbers: Vec<SeatNumber>,
}

/// Ledger reconciliation request (admin).
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ReconcileRequest {
    /// Showtime to reconcile; every tracked showtime when absent.
    pub showtime_id: Option<ShowtimeId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_rejects_bad_email() {
        let req = RegisterRequest {
            username: "alice".into(),
            email: "not-an-email".into(),
            password: "secret123".into(),
        };
        let err = validate_request(&req).unwrap_err();
        assert!(err.message.contains("email"));
    }

    #[test]
    fn test_reserve_request_requires_seats() {
        let req = ReserveSeatsRequest {
            seat_numbers: vec![],
        };
        assert!(validate_request(&req).is_err());
        let req = ReserveSeatsRequest {
            seat_numbers: vec![25, 26],
        };
        assert!(validate_request(&req).is_ok());
    }

    #[test]
    fn test_showtime_capacity_must_be_positive() {
        let req = CreateShowtimeRequest {
            movie_id: MovieId::new(),
            start_time: Utc::now(),
            end_time: Utc::now(),
            capacity: Some(0),
        };
        assert!(validate_request(&req).is_err());
    }
}
