//! HTTP rendering of [`AppError`].
//!
//! Lives next to the error type so handlers across the workspace can return
//! `AppResult<T>` directly from Axum routes.

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{AppError, ErrorDetail, ErrorKind};

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
    /// Optional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// HTTP status for an error kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::InvalidState | ErrorKind::SeatConflict => StatusCode::CONFLICT,
        ErrorKind::Busy => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::Database
        | ErrorKind::Configuration
        | ErrorKind::Serialization
        | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = status_for(self.kind);

        if status.is_server_error() && self.kind != ErrorKind::Busy {
            tracing::error!(kind = %self.kind, error = %self, "Request failed");
        }

        let details = self.detail.as_ref().map(|detail| match detail {
            ErrorDetail::ConflictingSeats { seats } => json!({ "conflicting_seats": seats }),
            ErrorDetail::RetryAfter { millis } => json!({ "retry_after_ms": millis }),
        });

        // Storage and internal failures never leak their messages.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            "Internal server error".to_string()
        } else {
            self.message.clone()
        };

        let body = ApiErrorResponse {
            error: self.kind.to_string(),
            message,
            details,
        };

        let mut response = (status, Json(body)).into_response();

        if let Some(ErrorDetail::RetryAfter { millis }) = &self.detail {
            let seconds = millis.div_ceil(1000).max(1);
            if let Ok(value) = HeaderValue::from_str(&seconds.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seat_conflict_maps_to_409_with_seats() {
        let response = AppError::seat_conflict([27, 26]).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_busy_sets_retry_after_header() {
        let response = AppError::busy("Showtime is busy", 2500).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            response.headers().get(header::RETRY_AFTER).unwrap(),
            "3"
        );
    }

    #[test]
    fn test_busy_retry_after_rounds_up_to_one_second() {
        let response = AppError::busy("Showtime is busy", 100).into_response();
        assert_eq!(
            response.headers().get(header::RETRY_AFTER).unwrap(),
            "1"
        );
    }

    #[test]
    fn test_kind_status_table() {
        assert_eq!(status_for(ErrorKind::Validation), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::InvalidState), StatusCode::CONFLICT);
        assert_eq!(status_for(ErrorKind::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(
            status_for(ErrorKind::Database),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
