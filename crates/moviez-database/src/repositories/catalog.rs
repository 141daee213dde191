//! Movie and showtime repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use moviez_core::result::AppResult;
use moviez_core::types::{MovieId, PageRequest, PageResponse, ShowtimeId};
use moviez_entity::movie::{CreateMovie, Movie};
use moviez_entity::showtime::{CreateShowtime, Showtime};

use super::db_error;
use crate::store::CatalogStore;

/// PostgreSQL-backed [`CatalogStore`].
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    /// Create a new catalog repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStore for CatalogRepository {
    async fn create_movie(&self, movie: CreateMovie) -> AppResult<Movie> {
        sqlx::query_as::<_, Movie>(
            r#"INSERT INTO movies (id, title, description, poster_image_url, genre)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING *"#,
        )
        .bind(MovieId::new())
        .bind(&movie.title)
        .bind(&movie.description)
        .bind(&movie.poster_image_url)
        .bind(&movie.genre)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to create movie"))
    }

    async fn find_movie(&self, id: MovieId) -> AppResult<Option<Movie>> {
        sqlx::query_as::<_, Movie>("SELECT * FROM movies WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find movie"))
    }

    async fn list_movies(&self, page: &PageRequest) -> AppResult<PageResponse<Movie>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM movies")
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count movies"))?;

        let movies = sqlx::query_as::<_, Movie>(
            "SELECT * FROM movies ORDER BY created_at DESC, id LIMIT $1 OFFSET $2",
        )
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list movies"))?;

        Ok(PageResponse::new(movies, page, total as u64))
    }

    async fn update_movie(&self, movie: &Movie) -> AppResult<bool> {
        let result = sqlx::query(
            r#"UPDATE movies
               SET title = $2, description = $3, poster_image_url = $4, genre = $5
               WHERE id = $1"#,
        )
        .bind(movie.id)
        .bind(&movie.title)
        .bind(&movie.description)
        .bind(&movie.poster_image_url)
        .bind(&movie.genre)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to update movie"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_movie(&self, id: MovieId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM movies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete movie"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn create_showtime(&self, showtime: CreateShowtime) -> AppResult<Showtime> {
        sqlx::query_as::<_, Showtime>(
            r#"INSERT INTO showtimes (id, movie_id, start_time, end_time, capacity)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING *"#,
        )
        .bind(ShowtimeId::new())
        .bind(showtime.movie_id)
        .bind(showtime.start_time)
        .bind(showtime.end_time)
        .bind(showtime.capacity)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to create showtime"))
    }

    async fn find_showtime(&self, id: ShowtimeId) -> AppResult<Option<Showtime>> {
        sqlx::query_as::<_, Showtime>("SELECT * FROM showtimes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find showtime"))
    }

    async fn showtimes_for_movie(&self, movie_id: MovieId) -> AppResult<Vec<Showtime>> {
        sqlx::query_as::<_, Showtime>(
            "SELECT * FROM showtimes WHERE movie_id = $1 ORDER BY start_time",
        )
        .bind(movie_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list showtimes for movie"))
    }

    async fn find_showtimes_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<Showtime>> {
        sqlx::query_as::<_, Showtime>(
            "SELECT * FROM showtimes WHERE start_time BETWEEN $1 AND $2 ORDER BY start_time",
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list showtimes in window"))
    }

    async fn delete_showtime(&self, id: ShowtimeId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM showtimes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete showtime"))?;

        Ok(result.rows_affected() > 0)
    }
}
