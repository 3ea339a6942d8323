//! Users repository for database operations

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::user::User,
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, email, password_hash, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Get user by username (case-insensitive)
    pub async fn get_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            WHERE LOWER(username) = LOWER($1)
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Check if username already exists
    pub async fn username_exists(&self, username: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(username) = LOWER($1))")
                .bind(username)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Create a new user
    pub async fn create(
        &self,
        username: &str,
        email: Option<&str>,
        password_hash: &str,
    ) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, email, password_hash, created_at
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            // Lost a race with a concurrent registration of the same name
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::Conflict("Username already exists".to_string())
            }
            e => AppError::Database(e),
        })
    }
}
