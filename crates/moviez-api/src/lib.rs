//! # moviez-api
//!
//! HTTP API layer for Moviez built on Axum.
//!
//! Provides the REST endpoints, the logging and CORS middleware, the
//! `AuthUser` and `ValidJson` extractors, and the request/response DTOs.

pub mod app;
pub mod dto;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, build_state};
pub use state::AppState;
