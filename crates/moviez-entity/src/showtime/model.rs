//! Showtime entity model.

use chrono::{DateTime, Duration, Utc};
use moviez_core::types::{MovieId, ShowtimeId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A scheduled screening with a fixed seat capacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Showtime {
    /// Unique showtime identifier.
    pub id: ShowtimeId,
    /// The movie being screened.
    pub movie_id: MovieId,
    /// Screening start.
    pub start_time: DateTime<Utc>,
    /// Screening end.
    pub end_time: DateTime<Utc>,
    /// Total seats; valid seat numbers are `1..=capacity`.
    pub capacity: i32,
    /// When the showtime was scheduled.
    pub created_at: DateTime<Utc>,
}

impl Showtime {
    /// Whether the screening has started at `now`.
    pub fn has_started(&self, now: DateTime<Utc>) -> bool {
        self.start_time <= now
    }

    /// Whether the start is no later than `now + lead`.
    pub fn starts_within(&self, now: DateTime<Utc>, lead: Duration) -> bool {
        self.start_time <= now + lead
    }

    /// Whether `seat` is a valid seat number for this showtime.
    pub fn contains_seat(&self, seat: i32) -> bool {
        (1..=self.capacity).contains(&seat)
    }
}

/// Data required to schedule a showtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateShowtime {
    /// The movie being screened.
    pub movie_id: MovieId,
    /// Screening start.
    pub start_time: DateTime<Utc>,
    /// Screening end; must be after `start_time`.
    pub end_time: DateTime<Utc>,
    /// Seat capacity.
    pub capacity: i32,
}
