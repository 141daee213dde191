//! # moviez-database
//!
//! Persistence for the Moviez backend. The services depend only on the
//! store traits in [`store`]; [`repositories`] implements them against
//! PostgreSQL and [`memory`] implements them with process-local maps for
//! tests and single-node development.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use store::{CatalogStore, ReservationStore, Stores, UserStore};
