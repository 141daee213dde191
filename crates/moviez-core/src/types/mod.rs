//! Core type definitions used across the Moviez workspace.

pub mod id;
pub mod pagination;

pub use id::*;
pub use pagination::{PageRequest, PageResponse};
