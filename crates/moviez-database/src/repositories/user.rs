//! User repository.

use async_trait::async_trait;
use sqlx::PgPool;

use moviez_core::error::{AppError, ErrorKind};
use moviez_core::result::AppResult;
use moviez_core::types::UserId;
use moviez_entity::user::{CreateUser, User};

use super::{db_error, is_unique_violation};
use crate::store::UserStore;

/// PostgreSQL-backed [`UserStore`].
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn create(&self, user: CreateUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"INSERT INTO users (id, username, email, password_hash, role)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING *"#,
        )
        .bind(UserId::new())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::invalid_state("Username or email is already registered")
            } else {
                AppError::with_source(ErrorKind::Database, "Failed to create user", e)
            }
        })
    }

    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find user by id"))
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(username) = LOWER($1)")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find user by username"))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find user by email"))
    }
}
