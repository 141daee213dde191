//! Reservation lifecycle status.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a reservation. Only `Active` reservations hold seats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "reservation_status", rename_all = "lowercase")]
#[serde(rename_all = "UPPERCASE")]
pub enum ReservationStatus {
    /// Seats are held.
    Active,
    /// Seats were released; terminal.
    Cancelled,
}

impl ReservationStatus {
    /// Whether the reservation holds its seats.
    pub fn holds_seats(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Return the status as an uppercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
