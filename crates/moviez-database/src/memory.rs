//! In-memory store implementations for tests and single-node development.
//!
//! Each store keeps its rows behind a Tokio mutex. The reservation store
//! enforces the same "one active holder per seat" rule as the unique index
//! in the PostgreSQL schema.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::warn;

use moviez_core::error::AppError;
use moviez_core::result::AppResult;
use moviez_core::types::{MovieId, PageRequest, PageResponse, ReservationId, ShowtimeId, UserId};
use moviez_entity::movie::{CreateMovie, Movie};
use moviez_entity::reservation::{NewReservation, Reservation, ReservationStatus, SeatNumber};
use moviez_entity::showtime::{CreateShowtime, Showtime};
use moviez_entity::user::{CreateUser, User};

use crate::store::{CatalogStore, ReservationStore, UserStore};

#[derive(Debug, Default)]
struct CatalogState {
    movies: HashMap<MovieId, Movie>,
    showtimes: HashMap<ShowtimeId, Showtime>,
}

/// In-memory [`CatalogStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalogStore {
    state: Arc<Mutex<CatalogState>>,
}

impl MemoryCatalogStore {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn create_movie(&self, movie: CreateMovie) -> AppResult<Movie> {
        let row = Movie {
            id: MovieId::new(),
            title: movie.title,
            description: movie.description,
            poster_image_url: movie.poster_image_url,
            genre: movie.genre,
            created_at: Utc::now(),
        };
        self.state.lock().await.movies.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_movie(&self, id: MovieId) -> AppResult<Option<Movie>> {
        Ok(self.state.lock().await.movies.get(&id).cloned())
    }

    async fn list_movies(&self, page: &PageRequest) -> AppResult<PageResponse<Movie>> {
        let state = self.state.lock().await;
        let mut movies: Vec<Movie> = state.movies.values().cloned().collect();
        movies.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(PageResponse::from_all(movies, page))
    }

    async fn update_movie(&self, movie: &Movie) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        match state.movies.get_mut(&movie.id) {
            Some(existing) => {
                *existing = movie.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_movie(&self, id: MovieId) -> AppResult<bool> {
        Ok(self.state.lock().await.movies.remove(&id).is_some())
    }

    async fn create_showtime(&self, showtime: CreateShowtime) -> AppResult<Showtime> {
        let mut state = self.state.lock().await;
        if !state.movies.contains_key(&showtime.movie_id) {
            return Err(AppError::not_found(format!(
                "Movie {} not found",
                showtime.movie_id
            )));
        }
        let row = Showtime {
            id: ShowtimeId::new(),
            movie_id: showtime.movie_id,
            start_time: showtime.start_time,
            end_time: showtime.end_time,
            capacity: showtime.capacity,
            created_at: Utc::now(),
        };
        state.showtimes.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_showtime(&self, id: ShowtimeId) -> AppResult<Option<Showtime>> {
        Ok(self.state.lock().await.showtimes.get(&id).cloned())
    }

    async fn showtimes_for_movie(&self, movie_id: MovieId) -> AppResult<Vec<Showtime>> {
        let state = self.state.lock().await;
        let mut rows: Vec<Showtime> = state
            .showtimes
            .values()
            .filter(|s| s.movie_id == movie_id)
            .cloned()
            .collect();
        rows.sort_by_key(|s| s.start_time);
        Ok(rows)
    }

    async fn find_showtimes_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<Showtime>> {
        let state = self.state.lock().await;
        let mut rows: Vec<Showtime> = state
            .showtimes
            .values()
            .filter(|s| s.start_time >= from && s.start_time <= to)
            .cloned()
            .collect();
        rows.sort_by_key(|s| s.start_time);
        Ok(rows)
    }

    async fn delete_showtime(&self, id: ShowtimeId) -> AppResult<bool> {
        Ok(self.state.lock().await.showtimes.remove(&id).is_some())
    }
}

#[derive(Debug, Default)]
struct ReservationState {
    rows: HashMap<ReservationId, Reservation>,
    /// Seats held by active reservations, per showtime.
    held: HashMap<ShowtimeId, BTreeSet<SeatNumber>>,
}

/// In-memory [`ReservationStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryReservationStore {
    state: Arc<Mutex<ReservationState>>,
}

impl MemoryReservationStore {
    /// Create an empty reservation store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReservationStore for MemoryReservationStore {
    async fn load_active_seat_sets(
        &self,
        showtime_id: ShowtimeId,
    ) -> AppResult<Vec<Vec<SeatNumber>>> {
        let state = self.state.lock().await;
        Ok(state
            .rows
            .values()
            .filter(|r| r.showtime_id == showtime_id && r.is_active())
            .map(|r| r.seat_numbers.clone())
            .collect())
    }

    async fn insert(&self, reservation: NewReservation) -> AppResult<Reservation> {
        let mut state = self.state.lock().await;
        let held = state.held.entry(reservation.showtime_id).or_default();

        let taken: Vec<SeatNumber> = reservation
            .seat_numbers
            .iter()
            .copied()
            .filter(|seat| held.contains(seat))
            .collect();
        if !taken.is_empty() {
            warn!(
                showtime_id = %reservation.showtime_id,
                seats = ?taken,
                "Stored seats already held"
            );
            return Err(AppError::seat_conflict(taken));
        }

        held.extend(reservation.seat_numbers.iter().copied());
        let row = reservation.into_reservation();
        state.rows.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_status(
        &self,
        id: ReservationId,
        status: ReservationStatus,
        changed_at: DateTime<Utc>,
    ) -> AppResult<Option<Reservation>> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        let Some(row) = state.rows.get_mut(&id) else {
            return Ok(None);
        };

        let held = state.held.entry(row.showtime_id).or_default();
        match (row.status.holds_seats(), status.holds_seats()) {
            (true, false) => {
                for seat in &row.seat_numbers {
                    held.remove(seat);
                }
            }
            (false, true) => {
                let taken: Vec<SeatNumber> = row
                    .seat_numbers
                    .iter()
                    .copied()
                    .filter(|seat| held.contains(seat))
                    .collect();
                if !taken.is_empty() {
                    return Err(AppError::seat_conflict(taken));
                }
                held.extend(row.seat_numbers.iter().copied());
            }
            _ => {}
        }

        row.status = status;
        row.cancelled_at = (status == ReservationStatus::Cancelled).then_some(changed_at);
        Ok(Some(row.clone()))
    }

    async fn find_by_id(&self, id: ReservationId) -> AppResult<Option<Reservation>> {
        Ok(self.state.lock().await.rows.get(&id).cloned())
    }

    async fn find_by_user(&self, user_id: UserId) -> AppResult<Vec<Reservation>> {
        let state = self.state.lock().await;
        let mut rows: Vec<Reservation> = state
            .rows
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.booked_at.cmp(&a.booked_at));
        Ok(rows)
    }

    async fn find_by_showtime(&self, showtime_id: ShowtimeId) -> AppResult<Vec<Reservation>> {
        let state = self.state.lock().await;
        let mut rows: Vec<Reservation> = state
            .rows
            .values()
            .filter(|r| r.showtime_id == showtime_id)
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.booked_at);
        Ok(rows)
    }
}

/// In-memory [`UserStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryUserStore {
    users: Arc<Mutex<HashMap<UserId, User>>>,
}

impl MemoryUserStore {
    /// Create an empty user store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, user: CreateUser) -> AppResult<User> {
        let mut users = self.users.lock().await;
        let clash = users.values().any(|u| {
            u.username.eq_ignore_ascii_case(&user.username)
                || u.email.eq_ignore_ascii_case(&user.email)
        });
        if clash {
            return Err(AppError::invalid_state(
                "Username or email is already registered",
            ));
        }

        let row = User {
            id: UserId::new(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            created_at: Utc::now(),
        };
        users.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        Ok(self.users.lock().await.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let users = self.users.lock().await;
        Ok(users
            .values()
            .find(|u| u.username.eq_ignore_ascii_case(username))
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let users = self.users.lock().await;
        Ok(users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moviez_core::ErrorKind;

    fn booking(showtime_id: ShowtimeId, seats: &[SeatNumber]) -> NewReservation {
        NewReservation::new(UserId::new(), showtime_id, seats.to_vec())
    }

    #[tokio::test]
    async fn test_insert_rejects_held_seats() {
        let store = MemoryReservationStore::new();
        let show = ShowtimeId::new();

        store.insert(booking(show, &[25, 26])).await.unwrap();
        let err = store.insert(booking(show, &[27, 26])).await.unwrap_err();

        assert_eq!(err.kind, ErrorKind::SeatConflict);
        assert_eq!(err.conflicting_seats(), Some(&[26][..]));
        assert_eq!(store.load_active_seat_sets(show).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_cancel_frees_seats() {
        let store = MemoryReservationStore::new();
        let show = ShowtimeId::new();

        let first = store.insert(booking(show, &[1, 2])).await.unwrap();
        let cancelled = store
            .update_status(first.id, ReservationStatus::Cancelled, Utc::now())
            .await
            .unwrap()
            .unwrap();
        assert!(cancelled.cancelled_at.is_some());

        store.insert(booking(show, &[2])).await.unwrap();
        assert_eq!(store.load_active_seat_sets(show).await.unwrap(), vec![vec![2]]);
    }

    #[tokio::test]
    async fn test_same_seat_on_other_showtime_is_free() {
        let store = MemoryReservationStore::new();
        store.insert(booking(ShowtimeId::new(), &[5])).await.unwrap();
        store.insert(booking(ShowtimeId::new(), &[5])).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_unknown_reservation_is_none() {
        let store = MemoryReservationStore::new();
        let result = store
            .update_status(ReservationId::new(), ReservationStatus::Cancelled, Utc::now())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_showtime_window_is_inclusive() {
        let catalog = MemoryCatalogStore::new();
        let movie = catalog
            .create_movie(CreateMovie {
                title: "Heat".into(),
                description: None,
                poster_image_url: None,
                genre: "Crime".into(),
            })
            .await
            .unwrap();

        let start = Utc::now() + chrono::Duration::days(1);
        catalog
            .create_showtime(CreateShowtime {
                movie_id: movie.id,
                start_time: start,
                end_time: start + chrono::Duration::hours(3),
                capacity: 50,
            })
            .await
            .unwrap();

        let hits = catalog.find_showtimes_between(start, start).await.unwrap();
        assert_eq!(hits.len(), 1);
        let misses = catalog
            .find_showtimes_between(start + chrono::Duration::seconds(1), start + chrono::Duration::days(1))
            .await
            .unwrap();
        assert!(misses.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_username_is_rejected() {
        let users = MemoryUserStore::new();
        let make = |name: &str, email: &str| CreateUser {
            username: name.into(),
            email: email.into(),
            password_hash: "hash".into(),
            role: moviez_entity::user::UserRole::User,
        };

        users.create(make("alice", "a@example.com")).await.unwrap();
        let err = users
            .create(make("ALICE", "other@example.com"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidState);
    }
}
