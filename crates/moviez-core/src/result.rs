//! Convenience result type alias for Moviez.

use crate::error::AppError;

/// A specialized `Result` type for Moviez operations.
pub type AppResult<T> = Result<T, AppError>;
