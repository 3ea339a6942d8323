//! Repository layer for database operations

pub mod books;
pub mod loans;
pub mod users;

use sqlx::{Pool, Postgres};

use crate::error::AppResult;

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub books: books::BooksRepository,
    pub loans: loans::LoansRepository,
    pub users: users::UsersRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: books::BooksRepository::new(pool.clone()),
            loans: loans::LoansRepository::new(pool.clone()),
            users: users::UsersRepository::new(pool.clone()),
            pool,
        }
    }

    /// Round-trip a trivial query to check database connectivity
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
