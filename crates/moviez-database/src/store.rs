//! Store traits consumed by the service layer.
//!
//! Implementations must be safe to share across tasks. The reservation
//! store is the source of truth for seat ownership: `insert` must refuse a
//! reservation whose seats are already held by an active reservation of
//! the same showtime, returning `SeatConflict`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;

use moviez_core::config::{DatabaseConfig, StoreBackend};
use moviez_core::result::AppResult;
use moviez_core::types::{MovieId, PageRequest, PageResponse, ReservationId, ShowtimeId, UserId};
use moviez_entity::movie::{CreateMovie, Movie};
use moviez_entity::reservation::{NewReservation, Reservation, ReservationStatus, SeatNumber};
use moviez_entity::showtime::{CreateShowtime, Showtime};
use moviez_entity::user::{CreateUser, User};

use crate::connection::DatabasePool;
use crate::memory::{MemoryCatalogStore, MemoryReservationStore, MemoryUserStore};
use crate::migration::run_migrations;
use crate::repositories::{CatalogRepository, ReservationRepository, UserRepository};

/// Movies and showtimes.
#[async_trait]
pub trait CatalogStore: Send + Sync + 'static {
    /// Insert a new movie.
    async fn create_movie(&self, movie: CreateMovie) -> AppResult<Movie>;

    /// Look up a movie.
    async fn find_movie(&self, id: MovieId) -> AppResult<Option<Movie>>;

    /// List movies, newest first.
    async fn list_movies(&self, page: &PageRequest) -> AppResult<PageResponse<Movie>>;

    /// Persist every field of an existing movie. Returns `false` if it is gone.
    async fn update_movie(&self, movie: &Movie) -> AppResult<bool>;

    /// Delete a movie. Returns `false` if it did not exist.
    async fn delete_movie(&self, id: MovieId) -> AppResult<bool>;

    /// Insert a new showtime.
    async fn create_showtime(&self, showtime: CreateShowtime) -> AppResult<Showtime>;

    /// Look up a showtime.
    async fn find_showtime(&self, id: ShowtimeId) -> AppResult<Option<Showtime>>;

    /// Showtimes of one movie, ordered by start time.
    async fn showtimes_for_movie(&self, movie_id: MovieId) -> AppResult<Vec<Showtime>>;

    /// Showtimes whose start lies in `[from, to]`, ordered by start time.
    async fn find_showtimes_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<Showtime>>;

    /// Delete a showtime. Returns `false` if it did not exist.
    async fn delete_showtime(&self, id: ShowtimeId) -> AppResult<bool>;
}

/// Reservation records, the persisted truth behind every seat ledger.
#[async_trait]
pub trait ReservationStore: Send + Sync + 'static {
    /// Seat sets of all active reservations for a showtime.
    async fn load_active_seat_sets(&self, showtime_id: ShowtimeId)
    -> AppResult<Vec<Vec<SeatNumber>>>;

    /// Atomically persist an active reservation.
    async fn insert(&self, reservation: NewReservation) -> AppResult<Reservation>;

    /// Change the status of a reservation, stamping `cancelled_at` when it
    /// becomes cancelled. Returns the updated row, or `None` if unknown.
    async fn update_status(
        &self,
        id: ReservationId,
        status: ReservationStatus,
        changed_at: DateTime<Utc>,
    ) -> AppResult<Option<Reservation>>;

    /// Look up a reservation.
    async fn find_by_id(&self, id: ReservationId) -> AppResult<Option<Reservation>>;

    /// All reservations of a user, newest first.
    async fn find_by_user(&self, user_id: UserId) -> AppResult<Vec<Reservation>>;

    /// All reservations for a showtime, oldest first.
    async fn find_by_showtime(&self, showtime_id: ShowtimeId) -> AppResult<Vec<Reservation>>;
}

/// User accounts.
#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    /// Insert a new user. Fails with `InvalidState` if the username or
    /// email is taken.
    async fn create(&self, user: CreateUser) -> AppResult<User>;

    /// Look up by id.
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>>;

    /// Look up by username, case-insensitively.
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Look up by email, case-insensitively.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;
}

/// The full set of stores selected by configuration.
#[derive(Clone)]
pub struct Stores {
    /// Movie and showtime store.
    pub catalog: Arc<dyn CatalogStore>,
    /// Reservation store.
    pub reservations: Arc<dyn ReservationStore>,
    /// User store.
    pub users: Arc<dyn UserStore>,
    /// The pool behind the PostgreSQL stores, if that backend is active.
    pub pool: Option<DatabasePool>,
}

impl Stores {
    /// Open the backend named in `config`, applying migrations for
    /// PostgreSQL when enabled.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        match config.backend {
            StoreBackend::Memory => {
                info!("Using in-memory stores; data will not survive a restart");
                Ok(Self::in_memory())
            }
            StoreBackend::Postgres => {
                let db = DatabasePool::connect(config).await?;
                if config.run_migrations {
                    run_migrations(db.pool()).await?;
                }
                Ok(Self::postgres(db))
            }
        }
    }

    /// Stores backed by process-local maps.
    pub fn in_memory() -> Self {
        Self {
            catalog: Arc::new(MemoryCatalogStore::new()),
            reservations: Arc::new(MemoryReservationStore::new()),
            users: Arc::new(MemoryUserStore::new()),
            pool: None,
        }
    }

    /// Stores backed by PostgreSQL.
    pub fn postgres(db: DatabasePool) -> Self {
        let pool = db.pool().clone();
        Self {
            catalog: Arc::new(CatalogRepository::new(pool.clone())),
            reservations: Arc::new(ReservationRepository::new(pool.clone())),
            users: Arc::new(UserRepository::new(pool)),
            pool: Some(db),
        }
    }

    /// Check that the backend is reachable.
    pub async fn health_check(&self) -> AppResult<()> {
        match &self.pool {
            Some(db) => db.ping().await,
            None => Ok(()),
        }
    }

    /// Release backend resources.
    pub async fn close(&self) {
        if let Some(db) = &self.pool {
            db.close().await;
        }
    }
}

impl std::fmt::Debug for Stores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stores")
            .field("postgres", &self.pool.is_some())
            .finish()
    }
}
