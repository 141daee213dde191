//! Showtime scheduling and lookup.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use moviez_auth::rbac::{Permission, RbacEnforcer};
use moviez_core::config::ReservationConfig;
use moviez_core::error::AppError;
use moviez_core::result::AppResult;
use moviez_core::types::{MovieId, ShowtimeId};
use moviez_database::{CatalogStore, ReservationStore};
use moviez_entity::showtime::{CreateShowtime, Showtime};

use crate::context::RequestContext;
use crate::reservation::ShowtimeGuard;

/// Schedules, lists and removes showtimes.
#[derive(Clone)]
pub struct ShowtimeService {
    catalog: Arc<dyn CatalogStore>,
    reservations: Arc<dyn ReservationStore>,
    guard: Arc<ShowtimeGuard>,
    rbac: Arc<RbacEnforcer>,
    default_capacity: i32,
}

impl std::fmt::Debug for ShowtimeService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShowtimeService")
            .field("default_capacity", &self.default_capacity)
            .finish()
    }
}

impl ShowtimeService {
    /// Creates a showtime service. `guard` must be the one used by the
    /// reservation core so deletion cannot race a booking.
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        reservations: Arc<dyn ReservationStore>,
        guard: Arc<ShowtimeGuard>,
        rbac: Arc<RbacEnforcer>,
        config: &ReservationConfig,
    ) -> Self {
        Self {
            catalog,
            reservations,
            guard,
            rbac,
            default_capacity: config.default_capacity,
        }
    }

    /// Schedules a showtime (administrators only). `capacity` falls back
    /// to the configured default.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        movie_id: MovieId,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        capacity: Option<i32>,
    ) -> AppResult<Showtime> {
        self.rbac
            .require_permission(&ctx.role, &Permission::ShowtimeManage)?;

        if end_time <= start_time {
            return Err(AppError::validation(
                "Showtime end_time must be after start_time",
            ));
        }

        let capacity = capacity.unwrap_or(self.default_capacity);
        if capacity < 1 {
            return Err(AppError::validation("Showtime capacity must be at least 1"));
        }

        if self.catalog.find_movie(movie_id).await?.is_none() {
            return Err(AppError::not_found(format!("Movie {movie_id} not found")));
        }

        let showtime = self
            .catalog
            .create_showtime(CreateShowtime {
                movie_id,
                start_time,
                end_time,
                capacity,
            })
            .await?;

        info!(
            showtime_id = %showtime.id,
            movie_id = %movie_id,
            start_time = %showtime.start_time,
            capacity,
            "Showtime scheduled"
        );
        Ok(showtime)
    }

    /// Looks up a showtime.
    pub async fn get(&self, id: ShowtimeId) -> AppResult<Showtime> {
        self.catalog
            .find_showtime(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Showtime {id} not found")))
    }

    /// Showtimes of a movie, by start time.
    pub async fn for_movie(&self, movie_id: MovieId) -> AppResult<Vec<Showtime>> {
        if self.catalog.find_movie(movie_id).await?.is_none() {
            return Err(AppError::not_found(format!("Movie {movie_id} not found")));
        }
        self.catalog.showtimes_for_movie(movie_id).await
    }

    /// Showtimes starting within `[from, to]`.
    pub async fn between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<Showtime>> {
        if from > to {
            return Err(AppError::validation("'from' must not be after 'to'"));
        }
        self.catalog.find_showtimes_between(from, to).await
    }

    /// Removes a showtime with no active reservations (administrators only).
    pub async fn delete(&self, ctx: &RequestContext, id: ShowtimeId) -> AppResult<()> {
        self.rbac
            .require_permission(&ctx.role, &Permission::ShowtimeManage)?;
        self.get(id).await?;

        {
            let mut lock = self.guard.acquire(id).await?;

            let active = self.reservations.load_active_seat_sets(id).await?;
            if !active.is_empty() {
                return Err(AppError::invalid_state(format!(
                    "Showtime {id} has {} active reservation(s)",
                    active.len()
                )));
            }

            if !self.catalog.delete_showtime(id).await? {
                return Err(AppError::not_found(format!("Showtime {id} not found")));
            }
            lock.invalidate();
        }
        self.guard.forget(id);

        info!(showtime_id = %id, deleted_by = %ctx.user_id, "Showtime deleted");
        Ok(())
    }
}
