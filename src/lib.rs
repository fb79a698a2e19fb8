pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod services;

// Make test_utils available for both unit tests and integration tests
pub mod test_utils;

use repositories::{SqliteUserRepository, UserRepository};
use services::{AccessService, AuthService, UserService};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub auth_service: Arc<AuthService>,
    pub access_service: Arc<AccessService>,
}

impl AppState {
    /// Wires every service to one SQLite-backed repository.
    pub fn from_pool(pool: sqlx::SqlitePool) -> Self {
        let user_repository: Arc<dyn UserRepository> =
            Arc::new(SqliteUserRepository::new(pool));

        AppState {
            user_service: Arc::new(UserService::new(user_repository.clone())),
            auth_service: Arc::new(AuthService::new(user_repository.clone())),
            access_service: Arc::new(AccessService::new(user_repository)),
        }
    }
}
