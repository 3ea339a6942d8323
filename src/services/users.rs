//! Authentication and user account service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{LoginForm, RegisterForm, User, UserClaims},
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Register a new account and return it with a session token
    pub async fn register(&self, form: RegisterForm) -> AppResult<(String, User)> {
        form.validate()?;

        if self.repository.users.username_exists(&form.username).await? {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }

        let hash = hash_password(&form.password)?;
        let user = self
            .repository
            .users
            .create(&form.username, form.email.as_deref(), &hash)
            .await?;

        tracing::info!(user_id = user.id, username = %user.username, "User registered");

        let token = self.create_token_for_user(&user)?;
        Ok((token, user))
    }

    /// Authenticate by username and password and return a session token
    pub async fn authenticate(&self, form: LoginForm) -> AppResult<(String, User)> {
        form.validate()?;

        let user = self
            .repository
            .users
            .get_by_username(&form.username)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid username or password".to_string()))?;

        if !verify_password(&user, &form.password)? {
            tracing::warn!(username = %form.username, "Failed login attempt");
            return Err(AppError::Authentication("Invalid username or password".to_string()));
        }

        let token = self.create_token_for_user(&user)?;
        Ok((token, user))
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    /// Create JWT token for a user
    fn create_token_for_user(&self, user: &User) -> AppResult<String> {
        UserClaims::for_user(user, self.config.jwt_expiration_hours)
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

/// Verify user password
fn verify_password(user: &User, password: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
