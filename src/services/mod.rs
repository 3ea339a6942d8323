//! Business logic services

pub mod catalog;
pub mod loans;
pub mod users;

use crate::{config::AuthConfig, error::AppResult, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub loans: loans::LoansService,
    pub users: users::UsersService,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig) -> Self {
        Self {
            catalog: catalog::CatalogService::new(repository.clone()),
            loans: loans::LoansService::new(repository.clone()),
            users: users::UsersService::new(repository.clone(), auth_config),
            repository,
        }
    }

    /// Check that the database answers
    pub async fn ready(&self) -> AppResult<()> {
        self.repository.ping().await
    }
}
