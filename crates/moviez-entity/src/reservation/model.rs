//! Reservation entity model.

use chrono::{DateTime, Utc};
use moviez_core::types::{ReservationId, ShowtimeId, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::status::ReservationStatus;

/// A seat number within a showtime, `1..=capacity`.
pub type SeatNumber = i32;

/// A booking of one or more seats for a showtime.
///
/// The seat set is fixed at creation; cancellation changes only `status`
/// and `cancelled_at`. Rows are never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Reservation {
    /// Unique reservation identifier.
    pub id: ReservationId,
    /// Owning user.
    pub user_id: UserId,
    /// Showtime the seats belong to.
    pub showtime_id: ShowtimeId,
    /// Reserved seats, ascending and unique.
    pub seat_numbers: Vec<SeatNumber>,
    /// Lifecycle state.
    pub status: ReservationStatus,
    /// When the reservation was made.
    pub booked_at: DateTime<Utc>,
    /// When the reservation was cancelled.
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl Reservation {
    /// Whether the reservation currently holds its seats.
    pub fn is_active(&self) -> bool {
        self.status.holds_seats()
    }

    /// Whether `user_id` owns this reservation.
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }
}

/// A validated reservation ready to be persisted as `Active`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReservation {
    /// Pre-generated identifier.
    pub id: ReservationId,
    /// Owning user.
    pub user_id: UserId,
    /// Target showtime.
    pub showtime_id: ShowtimeId,
    /// Seats, ascending and unique.
    pub seat_numbers: Vec<SeatNumber>,
    /// Booking timestamp.
    pub booked_at: DateTime<Utc>,
}

impl NewReservation {
    /// Build a new reservation, normalizing the seat order.
    pub fn new(user_id: UserId, showtime_id: ShowtimeId, mut seats: Vec<SeatNumber>) -> Self {
        seats.sort_unstable();
        Self {
            id: ReservationId::new(),
            user_id,
            showtime_id,
            seat_numbers: seats,
            booked_at: Utc::now(),
        }
    }

    /// The row as it looks once stored.
    pub fn into_reservation(self) -> Reservation {
        Reservation {
            id: self.id,
            user_id: self.user_id,
            showtime_id: self.showtime_id,
            seat_numbers: self.seat_numbers,
            status: ReservationStatus::Active,
            booked_at: self.booked_at,
            cancelled_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_reservation_sorts_seats() {
        let new = NewReservation::new(UserId::new(), ShowtimeId::new(), vec![27, 3, 12]);
        assert_eq!(new.seat_numbers, vec![3, 12, 27]);

        let stored = new.into_reservation();
        assert!(stored.is_active());
        assert!(stored.cancelled_at.is_none());
    }

    #[test]
    fn test_status_serializes_uppercase() {
        let json = serde_json::to_string(&ReservationStatus::Cancelled).unwrap();
        assert_eq!(json, "\"CANCELLED\"");
    }
}
