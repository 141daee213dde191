//! Reservation entities and the seat-number value type.

pub mod model;
pub mod status;

pub use model::{NewReservation, Reservation, SeatNumber};
pub use status::ReservationStatus;
