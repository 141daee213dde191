//! # moviez-entity
//!
//! Domain entity models for the Moviez reservation backend. Every struct in
//! this crate represents a database table row or a domain value object.
//! Row types derive `sqlx::FromRow`; enums map to PostgreSQL enum types.

pub mod movie;
pub mod reservation;
pub mod showtime;
pub mod user;
