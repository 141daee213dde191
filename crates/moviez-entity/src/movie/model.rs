//! Movie entity model.

use chrono::{DateTime, Utc};
use moviez_core::types::MovieId;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A film in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Movie {
    /// Unique movie identifier.
    pub id: MovieId,
    /// Display title.
    pub title: String,
    /// Synopsis.
    pub description: Option<String>,
    /// Poster image URL.
    pub poster_image_url: Option<String>,
    /// Genre label.
    pub genre: String,
    /// When the movie was added.
    pub created_at: DateTime<Utc>,
}

/// Data required to add a movie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMovie {
    /// Display title.
    pub title: String,
    /// Synopsis.
    pub description: Option<String>,
    /// Poster image URL.
    pub poster_image_url: Option<String>,
    /// Genre label.
    pub genre: String,
}

/// Partial update of a movie. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateMovie {
    /// New title.
    pub title: Option<String>,
    /// New synopsis.
    pub description: Option<String>,
    /// New poster image URL.
    pub poster_image_url: Option<String>,
    /// New genre.
    pub genre: Option<String>,
}

impl UpdateMovie {
    /// Apply this patch to an existing movie.
    pub fn apply_to(&self, movie: &mut Movie) {
        if let Some(title) = &self.title {
            movie.title = title.clone();
        }
        if let Some(description) = &self.description {
            movie.description = Some(description.clone());
        }
        if let Some(url) = &self.poster_image_url {
            movie.poster_image_url = Some(url.clone());
        }
        if let Some(genre) = &self.genre {
            movie.genre = genre.clone();
        }
    }

    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.poster_image_url.is_none()
            && self.genre.is_none()
    }
}
