//! Account registration, login and profile lookup.

use std::sync::Arc;

use tracing::{info, warn};

use moviez_auth::jwt::{IssuedToken, JwtEncoder};
use moviez_auth::password::{PasswordHasher, PasswordValidator};
use moviez_core::config::BootstrapAdmin;
use moviez_core::error::AppError;
use moviez_core::result::AppResult;
use moviez_database::UserStore;
use moviez_entity::user::{CreateUser, User, UserRole};

use crate::context::RequestContext;

/// Successful login: the account and its access token.
#[derive(Debug, Clone)]
pub struct LoginResult {
    /// The authenticated account.
    pub user: User,
    /// Signed access token.
    pub token: IssuedToken,
}

/// Handles account lifecycle and credential checks.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
    hasher: Arc<PasswordHasher>,
    validator: Arc<PasswordValidator>,
    encoder: Arc<JwtEncoder>,
}

impl std::fmt::Debug for UserService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserService").finish()
    }
}

impl UserService {
    /// Creates a new user service.
    pub fn new(
        users: Arc<dyn UserStore>,
        hasher: Arc<PasswordHasher>,
        validator: Arc<PasswordValidator>,
        encoder: Arc<JwtEncoder>,
    ) -> Self {
        Self {
            users,
            hasher,
            validator,
            encoder,
        }
    }

    /// Registers a regular (`USER`) account.
    pub async fn register(&self, username: &str, email: &str, password: &str) -> AppResult<User> {
        self.create_account(username, email, password, UserRole::User)
            .await
    }

    /// Verifies credentials and issues an access token.
    pub async fn login(&self, username: &str, password: &str) -> AppResult<LoginResult> {
        let user = self
            .users
            .find_by_username(username.trim())
            .await?
            .ok_or_else(|| AppError::unauthorized("Invalid username or password"))?;

        if !self.hasher.verify_password(password, &user.password_hash)? {
            warn!(user_id = %user.id, "Login rejected: wrong password");
            return Err(AppError::unauthorized("Invalid username or password"));
        }

        let token = self
            .encoder
            .issue_access_token(user.id, user.role, &user.username)?;

        info!(user_id = %user.id, role = %user.role, "Login successful");
        Ok(LoginResult { user, token })
    }

    /// The caller's account.
    pub async fn profile(&self, ctx: &RequestContext) -> AppResult<User> {
        self.users
            .find_by_id(ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    /// Creates the configured administrator if no account has its username.
    pub async fn ensure_admin(&self, admin: &BootstrapAdmin) -> AppResult<User> {
        if let Some(existing) = self.users.find_by_username(&admin.username).await? {
            if !existing.is_admin() {
                warn!(
                    username = %existing.username,
                    "Bootstrap admin username belongs to a non-admin account"
                );
            }
            return Ok(existing);
        }

        let user = self
            .create_account(&admin.username, &admin.email, &admin.password, UserRole::Admin)
            .await?;
        info!(user_id = %user.id, username = %user.username, "Bootstrap admin created");
        Ok(user)
    }

    async fn create_account(
        &self,
        username: &str,
        email: &str,
        password: &str,
        role: UserRole,
    ) -> AppResult<User> {
        let username = username.trim();
        let email = email.trim();

        if username.len() < 3 || username.len() > 64 {
            return Err(AppError::validation(
                "Username must be between 3 and 64 characters",
            ));
        }
        if !email.contains('@') {
            return Err(AppError::validation("Invalid email format"));
        }
        self.validator.validate(password)?;

        if self.users.find_by_username(username).await?.is_some() {
            return Err(AppError::invalid_state("Username is already taken"));
        }
        if self.users.find_by_email(email).await?.is_some() {
            return Err(AppError::invalid_state("Email is already registered"));
        }

        let password_hash = self.hasher.hash_password(password)?;
        let user = self
            .users
            .create(CreateUser {
                username: username.to_string(),
                email: email.to_string(),
                password_hash,
                role,
            })
            .await?;

        info!(user_id = %user.id, username = %user.username, role = %role, "Account registered");
        Ok(user)
    }
}
