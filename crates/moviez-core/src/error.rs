//! Unified application error types for Moviez.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator. Reservation outcomes that callers
//! are expected to retry (`SeatConflict`, `Busy`) are ordinary error kinds
//! here, not panics or logged failures.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The requested resource was not found.
    NotFound,
    /// Authentication failed (missing, invalid, or expired token).
    Unauthorized,
    /// The caller is authenticated but not allowed to perform the action.
    Forbidden,
    /// The request is malformed (bad seat numbers, missing fields, ...).
    Validation,
    /// The target is in a state that does not allow the operation.
    InvalidState,
    /// Requested seats are already held by an active reservation.
    SeatConflict,
    /// The per-showtime guard could not be acquired in time.
    Busy,
    /// A persistence-layer failure.
    Database,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal server error occurred.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Unauthorized => write!(f, "UNAUTHORIZED"),
            Self::Forbidden => write!(f, "FORBIDDEN"),
            Self::Validation => write!(f, "INVALID_REQUEST"),
            Self::InvalidState => write!(f, "INVALID_STATE"),
            Self::SeatConflict => write!(f, "SEAT_CONFLICT"),
            Self::Busy => write!(f, "BUSY"),
            Self::Database => write!(f, "STORAGE_ERROR"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// Structured payload attached to some errors so callers can react
/// without parsing the message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorDetail {
    /// Seats that are already held, sorted ascending.
    ConflictingSeats {
        /// The conflicting seat numbers.
        seats: Vec<i32>,
    },
    /// Suggested delay before retrying.
    RetryAfter {
        /// Delay in milliseconds.
        millis: u64,
    },
}

/// The unified application error used throughout Moviez.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional machine-readable payload.
    pub detail: Option<ErrorDetail>,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            detail: None,
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            detail: None,
            source: Some(Box::new(source)),
        }
    }

    /// Attach a structured detail payload.
    pub fn with_detail(mut self, detail: ErrorDetail) -> Self {
        self.detail = Some(detail);
        self
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create an unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    /// Create a forbidden error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, message)
    }

    /// Create a validation (invalid request) error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create an invalid-state error.
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidState, message)
    }

    /// Create a seat-conflict error naming the seats that are already held.
    pub fn seat_conflict(seats: impl IntoIterator<Item = i32>) -> Self {
        let mut seats: Vec<i32> = seats.into_iter().collect();
        seats.sort_unstable();
        seats.dedup();

        let listed = seats
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(", ");

        Self::new(
            ErrorKind::SeatConflict,
            format!("Seats already reserved: {listed}"),
        )
        .with_detail(ErrorDetail::ConflictingSeats { seats })
    }

    /// Create a busy error carrying a retry hint.
    pub fn busy(message: impl Into<String>, retry_after_millis: u64) -> Self {
        Self::new(ErrorKind::Busy, message).with_detail(ErrorDetail::RetryAfter {
            millis: retry_after_millis,
        })
    }

    /// Create a database (storage) error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Whether the caller may reasonably retry the same operation
    /// (possibly with a different seat selection).
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind, ErrorKind::SeatConflict | ErrorKind::Busy)
    }

    /// The conflicting seats, when this is a seat conflict.
    pub fn conflicting_seats(&self) -> Option<&[i32]> {
        match &self.detail {
            Some(ErrorDetail::ConflictingSeats { seats }) => Some(seats),
            _ => None,
        }
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            detail: self.detail.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seat_conflict_sorts_and_names_seats() {
        let err = AppError::seat_conflict([27, 26, 26]);
        assert_eq!(err.kind, ErrorKind::SeatConflict);
        assert_eq!(err.conflicting_seats(), Some(&[26, 27][..]));
        assert!(err.message.contains("26, 27"));
    }

    #[test]
    fn test_retryable_kinds() {
        assert!(AppError::seat_conflict([1]).is_retryable());
        assert!(AppError::busy("guard timeout", 100).is_retryable());
        assert!(!AppError::validation("bad seat").is_retryable());
        assert!(!AppError::database("down").is_retryable());
    }

    #[test]
    fn test_clone_keeps_detail_drops_source() {
        let io = std::io::Error::other("disk");
        let err = AppError::with_source(ErrorKind::Database, "write failed", io)
            .with_detail(ErrorDetail::RetryAfter { millis: 5 });
        let cloned = err.clone();
        assert_eq!(cloned.kind, ErrorKind::Database);
        assert_eq!(cloned.detail, Some(ErrorDetail::RetryAfter { millis: 5 }));
        assert!(cloned.source.is_none());
    }

    #[test]
    fn test_display_uses_kind_code() {
        let err = AppError::busy("showtime is busy", 250);
        assert_eq!(err.to_string(), "BUSY: showtime is busy");
    }
}
