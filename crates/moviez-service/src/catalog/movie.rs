//! Movie catalog operations.

use std::sync::Arc;

use tracing::info;

use moviez_auth::rbac::{Permission, RbacEnforcer};
use moviez_core::error::AppError;
use moviez_core::result::AppResult;
use moviez_core::types::{MovieId, PageRequest, PageResponse};
use moviez_database::CatalogStore;
use moviez_entity::movie::{CreateMovie, Movie, UpdateMovie};

use crate::context::RequestContext;

/// Reads and manages movies.
#[derive(Clone)]
pub struct MovieService {
    catalog: Arc<dyn CatalogStore>,
    rbac: Arc<RbacEnforcer>,
}

impl std::fmt::Debug for MovieService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MovieService").finish()
    }
}

impl MovieService {
    /// Creates a new movie service.
    pub fn new(catalog: Arc<dyn CatalogStore>, rbac: Arc<RbacEnforcer>) -> Self {
        Self { catalog, rbac }
    }

    /// Adds a movie (administrators only).
    pub async fn create(&self, ctx: &RequestContext, req: CreateMovie) -> AppResult<Movie> {
        self.rbac
            .require_permission(&ctx.role, &Permission::MovieManage)?;

        let req = CreateMovie {
            title: require_text("title", &req.title)?,
            genre: require_text("genre", &req.genre)?,
            ..req
        };

        let movie = self.catalog.create_movie(req).await?;
        info!(movie_id = %movie.id, title = %movie.title, created_by = %ctx.user_id, "Movie created");
        Ok(movie)
    }

    /// Looks up a movie.
    pub async fn get(&self, id: MovieId) -> AppResult<Movie> {
        self.catalog
            .find_movie(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Movie {id} not found")))
    }

    /// Lists movies, newest first.
    pub async fn list(&self, page: PageRequest) -> AppResult<PageResponse<Movie>> {
        self.catalog.list_movies(&page.normalized()).await
    }

    /// Applies a partial update (administrators only).
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: MovieId,
        patch: UpdateMovie,
    ) -> AppResult<Movie> {
        self.rbac
            .require_permission(&ctx.role, &Permission::MovieManage)?;

        if patch.is_empty() {
            return Err(AppError::validation("No fields to update"));
        }
        if let Some(title) = &patch.title {
            require_text("title", title)?;
        }
        if let Some(genre) = &patch.genre {
            require_text("genre", genre)?;
        }

        let mut movie = self.get(id).await?;
        patch.apply_to(&mut movie);

        if !self.catalog.update_movie(&movie).await? {
            return Err(AppError::not_found(format!("Movie {id} not found")));
        }

        info!(movie_id = %id, updated_by = %ctx.user_id, "Movie updated");
        Ok(movie)
    }

    /// Deletes a movie that has no showtimes (administrators only).
    pub async fn delete(&self, ctx: &RequestContext, id: MovieId) -> AppResult<()> {
        self.rbac
            .require_permission(&ctx.role, &Permission::MovieManage)?;

        self.get(id).await?;
        let scheduled = self.catalog.showtimes_for_movie(id).await?;
        if !scheduled.is_empty() {
            return Err(AppError::invalid_state(format!(
                "Movie {id} still has {} scheduled showtime(s)",
                scheduled.len()
            )));
        }

        if !self.catalog.delete_movie(id).await? {
            return Err(AppError::not_found(format!("Movie {id} not found")));
        }

        info!(movie_id = %id, deleted_by = %ctx.user_id, "Movie deleted");
        Ok(())
    }
}

fn require_text(field: &str, value: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(format!("Movie {field} must not be empty")));
    }
    Ok(trimmed.to_string())
}
