//! # moviez-core
//!
//! Core crate for the Moviez reservation backend. Contains configuration
//! schemas, typed identifiers, pagination types, and the unified error
//! system shared by every other crate, along with its HTTP rendering.
//!
//! This crate has **no** internal dependencies on other Moviez crates.

pub mod config;
pub mod error;
pub mod response;
pub mod result;
pub mod types;

pub use error::{AppError, ErrorDetail, ErrorKind};
pub use result::AppResult;
