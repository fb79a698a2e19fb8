use crate::models::user::User;
use crate::repositories::user_repository::{RepositoryError, UserRepository};
use crate::services::{password, user_service::normalize_email};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument, warn};

#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    #[error("Email and password are required")]
    MissingCredentials,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Account is blocked")]
    AccountBlocked,
    #[error("Repository error: {0}")]
    RepositoryError(#[from] RepositoryError),
}

pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub struct AuthService {
    user_repository: Arc<dyn UserRepository>,
}

impl AuthService {
    pub fn new(user_repository: Arc<dyn UserRepository>) -> Self {
        Self { user_repository }
    }

    /// Checks credentials and stamps `last_login_time`.
    ///
    /// An unknown email and a wrong password produce the same
    /// `InvalidCredentials`. A blocked account is refused before the password
    /// is looked at.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn authenticate(&self, request: LoginRequest) -> Result<User, AuthServiceError> {
        let email = normalize_email(&request.email);
        if email.is_empty() || request.password.is_empty() {
            return Err(AuthServiceError::MissingCredentials);
        }

        let mut user = self
            .user_repository
            .find_by_email(&email)
            .await?
            .ok_or(AuthServiceError::InvalidCredentials)?;

        if !user.is_active() {
            warn!(user_id = user.id, "login refused for blocked user");
            return Err(AuthServiceError::AccountBlocked);
        }

        if !password::verify_password(&request.password, &user.password_hash) {
            return Err(AuthServiceError::InvalidCredentials);
        }

        let now = Utc::now();
        match self.user_repository.record_login(user.id, now).await {
            Ok(()) => {}
            // Deleted between the lookup and the update.
            Err(RepositoryError::NotFound) => return Err(AuthServiceError::InvalidCredentials),
            Err(e) => return Err(e.into()),
        }
        user.last_login_time = Some(now);

        info!(user_id = user.id, "user logged in");
        Ok(user)
    }
}
