//! Movie catalog entities.

pub mod model;

pub use model::{CreateMovie, Movie, UpdateMovie};
