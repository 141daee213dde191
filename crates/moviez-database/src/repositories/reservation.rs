//! Reservation repository.
//!
//! Writes run in a transaction that first takes a transaction-scoped
//! advisory lock keyed by the showtime, then re-reads the held seats from
//! `reservation_seats`. This keeps two server processes with independent
//! in-memory ledgers from double-booking; the partial unique index on
//! `reservation_seats` is the final backstop.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, warn};

use moviez_core::error::AppError;
use moviez_core::result::AppResult;
use moviez_core::types::{ReservationId, ShowtimeId, UserId};
use moviez_entity::reservation::{NewReservation, Reservation, ReservationStatus, SeatNumber};

use super::{db_error, is_unique_violation};
use crate::store::ReservationStore;

/// PostgreSQL-backed [`ReservationStore`].
#[derive(Debug, Clone)]
pub struct ReservationRepository {
    pool: PgPool,
}

impl ReservationRepository {
    /// Create a new reservation repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Serialize writers for one showtime across all connections.
    async fn lock_showtime(
        tx: &mut Transaction<'_, Postgres>,
        showtime_id: ShowtimeId,
    ) -> AppResult<()> {
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(advisory_key(showtime_id))
            .execute(&mut **tx)
            .await
            .map_err(db_error("Failed to acquire showtime lock"))?;
        Ok(())
    }
}

/// Fold a showtime UUID into the 64-bit advisory lock key space.
fn advisory_key(showtime_id: ShowtimeId) -> i64 {
    let (hi, lo) = showtime_id.0.as_u64_pair();
    (hi ^ lo) as i64
}

#[async_trait]
impl ReservationStore for ReservationRepository {
    async fn load_active_seat_sets(
        &self,
        showtime_id: ShowtimeId,
    ) -> AppResult<Vec<Vec<SeatNumber>>> {
        sqlx::query_scalar::<_, Vec<SeatNumber>>(
            "SELECT seat_numbers FROM reservations WHERE showtime_id = $1 AND status = 'active'",
        )
        .bind(showtime_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to load active seat sets"))
    }

    async fn insert(&self, reservation: NewReservation) -> AppResult<Reservation> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin reservation transaction"))?;

        Self::lock_showtime(&mut tx, reservation.showtime_id).await?;

        let taken: Vec<SeatNumber> = sqlx::query_scalar(
            r#"SELECT seat_number FROM reservation_seats
               WHERE showtime_id = $1 AND active AND seat_number = ANY($2)
               ORDER BY seat_number"#,
        )
        .bind(reservation.showtime_id)
        .bind(&reservation.seat_numbers)
        .fetch_all(&mut *tx)
        .await
        .map_err(db_error("Failed to check held seats"))?;

        if !taken.is_empty() {
            warn!(
                showtime_id = %reservation.showtime_id,
                seats = ?taken,
                "Stored seats already held; cached ledger was stale"
            );
            return Err(AppError::seat_conflict(taken));
        }

        let row = sqlx::query_as::<_, Reservation>(
            r#"INSERT INTO reservations (id, user_id, showtime_id, seat_numbers, status, booked_at)
               VALUES ($1, $2, $3, $4, 'active', $5)
               RETURNING *"#,
        )
        .bind(reservation.id)
        .bind(reservation.user_id)
        .bind(reservation.showtime_id)
        .bind(&reservation.seat_numbers)
        .bind(reservation.booked_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to insert reservation"))?;

        sqlx::query(
            r#"INSERT INTO reservation_seats (showtime_id, seat_number, reservation_id, active)
               SELECT $1, seat, $2, TRUE FROM UNNEST($3::INTEGER[]) AS seat"#,
        )
        .bind(reservation.showtime_id)
        .bind(reservation.id)
        .bind(&reservation.seat_numbers)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::seat_conflict(reservation.seat_numbers.iter().copied())
            } else {
                AppError::with_source(
                    moviez_core::ErrorKind::Database,
                    "Failed to record reserved seats",
                    e,
                )
            }
        })?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit reservation"))?;

        debug!(reservation_id = %row.id, "Reservation persisted");
        Ok(row)
    }

    async fn update_status(
        &self,
        id: ReservationId,
        status: ReservationStatus,
        changed_at: DateTime<Utc>,
    ) -> AppResult<Option<Reservation>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin status transaction"))?;

        let showtime_id: Option<ShowtimeId> =
            sqlx::query_scalar("SELECT showtime_id FROM reservations WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(db_error("Failed to find reservation"))?;

        let Some(showtime_id) = showtime_id else {
            return Ok(None);
        };

        Self::lock_showtime(&mut tx, showtime_id).await?;

        let cancelled_at = (status == ReservationStatus::Cancelled).then_some(changed_at);
        let row = sqlx::query_as::<_, Reservation>(
            r#"UPDATE reservations SET status = $2, cancelled_at = $3
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(status)
        .bind(cancelled_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to update reservation status"))?;

        sqlx::query("UPDATE reservation_seats SET active = $2 WHERE reservation_id = $1")
            .bind(id)
            .bind(status.holds_seats())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::seat_conflict(row.seat_numbers.iter().copied())
                } else {
                    AppError::with_source(
                        moviez_core::ErrorKind::Database,
                        "Failed to update reserved seats",
                        e,
                    )
                }
            })?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit status change"))?;

        Ok(Some(row))
    }

    async fn find_by_id(&self, id: ReservationId) -> AppResult<Option<Reservation>> {
        sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find reservation"))
    }

    async fn find_by_user(&self, user_id: UserId) -> AppResult<Vec<Reservation>> {
        sqlx::query_as::<_, Reservation>(
            "SELECT * FROM reservations WHERE user_id = $1 ORDER BY booked_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list reservations for user"))
    }

    async fn find_by_showtime(&self, showtime_id: ShowtimeId) -> AppResult<Vec<Reservation>> {
        sqlx::query_as::<_, Reservation>(
            "SELECT * FROM reservations WHERE showtime_id = $1 ORDER BY booked_at",
        )
        .bind(showtime_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list reservations for showtime"))
    }
}
