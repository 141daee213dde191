//! The reservation allocator: validates a seat request and commits it
//! atomically with respect to every other writer of the same showtime.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use moviez_core::config::ReservationConfig;
use moviez_core::error::AppError;
use moviez_core::result::AppResult;
use moviez_core::types::{ShowtimeId, UserId};
use moviez_database::{CatalogStore, ReservationStore};
use moviez_entity::reservation::{NewReservation, Reservation, SeatNumber};
use moviez_entity::showtime::Showtime;

use super::guard::ShowtimeGuard;
use super::ledger::SeatLedger;

/// Grants or rejects seat requests.
#[derive(Clone)]
pub struct ReservationAllocator {
    catalog: Arc<dyn CatalogStore>,
    store: Arc<dyn ReservationStore>,
    ledger: SeatLedger,
    guard: Arc<ShowtimeGuard>,
    max_seats_per_request: usize,
}

impl std::fmt::Debug for ReservationAllocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReservationAllocator")
            .field("ledger", &self.ledger)
            .field("max_seats_per_request", &self.max_seats_per_request)
            .finish()
    }
}

impl ReservationAllocator {
    /// Creates an allocator sharing `guard` with the other ledger writers.
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        store: Arc<dyn ReservationStore>,
        ledger: SeatLedger,
        guard: Arc<ShowtimeGuard>,
        config: &ReservationConfig,
    ) -> Self {
        Self {
            catalog,
            store,
            ledger,
            guard,
            max_seats_per_request: config.max_seats_per_request,
        }
    }

    /// Reserve `seats` of `showtime_id` for `user_id`.
    ///
    /// Checks run in this order: request shape, showtime existence, seat
    /// range, start time, then (under the showtime guard) that the showtime
    /// still exists, conflicts with held seats and remaining capacity.
    /// Exactly one of two concurrent overlapping requests can succeed.
    pub async fn reserve(
        &self,
        showtime_id: ShowtimeId,
        user_id: UserId,
        seats: Vec<SeatNumber>,
    ) -> AppResult<Reservation> {
        self.validate_shape(&seats)?;

        let showtime = self.load_showtime(showtime_id).await?;

        validate_range(&showtime, &seats)?;

        if showtime.has_started(Utc::now()) {
            return Err(AppError::invalid_state(format!(
                "Showtime {showtime_id} has already started"
            )));
        }

        let mut lock = self.guard.acquire(showtime_id).await?;

        // A deletion queued ahead of us on the guard may have removed it.
        let showtime = self.load_showtime(showtime_id).await?;

        let held = self.ledger.current(&mut lock, showtime_id).await?;
        let conflicts = held.conflicts(&seats);
        if !conflicts.is_empty() {
            info!(
                showtime_id = %showtime_id,
                user_id = %user_id,
                seats = ?conflicts,
                "Seat request conflicts with held seats"
            );
            return Err(AppError::seat_conflict(conflicts));
        }

        check_capacity(&showtime, held.len(), seats.len())?;

        match self
            .store
            .insert(NewReservation::new(user_id, showtime_id, seats))
            .await
        {
            Ok(reservation) => {
                lock.record_hold(&reservation.seat_numbers);
                info!(
                    showtime_id = %showtime_id,
                    reservation_id = %reservation.id,
                    user_id = %user_id,
                    seats = ?reservation.seat_numbers,
                    "Reservation committed"
                );
                Ok(reservation)
            }
            Err(e) => {
                lock.invalidate();
                warn!(
                    showtime_id = %showtime_id,
                    user_id = %user_id,
                    error = %e,
                    "Reservation not committed; ledger cache invalidated"
                );
                Err(e)
            }
        }
    }

    async fn load_showtime(&self, showtime_id: ShowtimeId) -> AppResult<Showtime> {
        self.catalog
            .find_showtime(showtime_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Showtime {showtime_id} not found")))
    }

    /// Empty, duplicate and oversize requests are rejected before any lookup.
    fn validate_shape(&self, seats: &[SeatNumber]) -> AppResult<()> {
        if seats.is_empty() {
            return Err(AppError::validation("At least one seat must be requested"));
        }

        if seats.len() > self.max_seats_per_request {
            return Err(AppError::validation(format!(
                "At most {} seats may be reserved at once",
                self.max_seats_per_request
            )));
        }

        let mut seen = HashSet::with_capacity(seats.len());
        let mut duplicates: Vec<SeatNumber> =
            seats.iter().copied().filter(|s| !seen.insert(*s)).collect();
        if !duplicates.is_empty() {
            duplicates.sort_unstable();
            duplicates.dedup();
            return Err(AppError::validation(format!(
                "Duplicate seat numbers in request: {duplicates:?}"
            )));
        }

        Ok(())
    }
}

fn validate_range(showtime: &Showtime, seats: &[SeatNumber]) -> AppResult<()> {
    let mut invalid: Vec<SeatNumber> = seats
        .iter()
        .copied()
        .filter(|s| !showtime.contains_seat(*s))
        .collect();
    if invalid.is_empty() {
        return Ok(());
    }
    invalid.sort_unstable();
    Err(AppError::validation(format!(
        "Seat numbers out of range 1..={}: {invalid:?}",
        showtime.capacity
    )))
}

fn check_capacity(showtime: &Showtime, held: usize, requested: usize) -> AppResult<()> {
    let capacity = usize::try_from(showtime.capacity).unwrap_or(0);
    if held + requested > capacity {
        return Err(AppError::invalid_state(format!(
            "Showtime {} is sold out: {held} of {} seats held",
            showtime.id, showtime.capacity
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Duration;
    use moviez_core::error::ErrorKind;
    use moviez_core::types::MovieId;

    fn showtime(capacity: i32) -> Showtime {
        let start = Utc::now() + Duration::days(1);
        Showtime {
            id: ShowtimeId::new(),
            movie_id: MovieId::new(),
            start_time: start,
            end_time: start + Duration::hours(2),
            capacity,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_capacity_allows_filling_the_last_seat() {
        assert!(check_capacity(&showtime(3), 2, 1).is_ok());
    }

    #[test]
    fn test_capacity_rejects_sold_out_showtime() {
        let err = check_capacity(&showtime(3), 3, 1).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidState);
        assert!(err.message.contains("sold out"));
    }

    #[test]
    fn test_range_reports_sorted_out_of_range_seats() {
        let err = validate_range(&showtime(10), &[11, 0, 5]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(err.message.contains("[0, 11]"));
    }
}
