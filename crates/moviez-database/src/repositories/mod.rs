//! PostgreSQL implementations of the store traits.

pub mod catalog;
pub mod reservation;
pub mod user;

pub use catalog::CatalogRepository;
pub use reservation::ReservationRepository;
pub use user::UserRepository;

use moviez_core::error::{AppError, ErrorKind};

/// SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// Whether `err` is a unique-constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == UNIQUE_VIOLATION)
}

/// Wrap a sqlx error as a storage failure.
pub(crate) fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Database, context, e)
}
