//! # moviez-service
//!
//! Business logic for the Moviez backend. Services take their collaborators
//! at construction time as `Arc` references and receive a
//! [`RequestContext`] describing who is acting.
//!
//! The [`reservation`] module is the heart of the system: it guarantees
//! that no seat of a showtime is ever held by two active reservations.

pub mod catalog;
pub mod context;
pub mod reservation;
pub mod user;

pub use catalog::{MovieService, ShowtimeService};
pub use context::RequestContext;
pub use reservation::{
    LedgerReconciler, ReservationAllocator, ReservationService, SeatLedger, ShowtimeGuard,
};
pub use user::UserService;
