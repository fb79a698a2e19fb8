use crate::repositories::user_repository::RepositoryError;
use crate::services::{AuthServiceError, BulkActionError, UserServiceError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

const GENERIC_SERVER_ERROR: &str = "Server error";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("User not found")]
    UserNotFound,

    /// Backend failure; `message` is what the client sees, `detail` is only logged.
    #[error("{message}: {detail}")]
    Storage {
        message: &'static str,
        detail: String,
    },
}

impl AppError {
    fn storage(message: &'static str, err: impl std::fmt::Display) -> Self {
        AppError::Storage {
            message,
            detail: err.to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::UserNotFound => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => AppError::UserNotFound,
            RepositoryError::AlreadyExists => AppError::Conflict("Email already registered".into()),
            RepositoryError::Database(e) => AppError::Database(e),
        }
    }
}

impl From<UserServiceError> for AppError {
    fn from(err: UserServiceError) -> Self {
        match err {
            UserServiceError::MissingFields => AppError::Validation(err.to_string()),
            UserServiceError::EmailTaken => AppError::Conflict(err.to_string()),
            UserServiceError::HashingError(_) => AppError::storage(GENERIC_SERVER_ERROR, err),
            UserServiceError::RepositoryError(e) => e.into(),
        }
    }
}

impl From<AuthServiceError> for AppError {
    fn from(err: AuthServiceError) -> Self {
        match err {
            AuthServiceError::MissingCredentials => AppError::Validation(err.to_string()),
            AuthServiceError::InvalidCredentials => AppError::InvalidCredentials,
            AuthServiceError::AccountBlocked => {
                AppError::Forbidden("Your account is blocked".into())
            }
            AuthServiceError::RepositoryError(e) => e.into(),
        }
    }
}

impl From<BulkActionError> for AppError {
    fn from(err: BulkActionError) -> Self {
        match err {
            BulkActionError::MissingActor | BulkActionError::InvalidTargets => {
                AppError::Validation(err.to_string())
            }
            BulkActionError::NotAuthorized => AppError::Forbidden(err.to_string()),
            BulkActionError::AuthorizationCheck(_) => AppError::storage(GENERIC_SERVER_ERROR, err),
            BulkActionError::Storage { action, .. } => {
                AppError::storage(action.failure_message(), err)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_message = match self {
            AppError::InvalidCredentials => "Invalid email or password".to_string(),
            AppError::UserNotFound => "User not found".to_string(),
            AppError::Validation(msg) | AppError::Forbidden(msg) | AppError::Conflict(msg) => msg,
            AppError::Database(ref e) => {
                tracing::error!(error = %e, "database error");
                GENERIC_SERVER_ERROR.to_string()
            }
            AppError::Storage { message, ref detail } => {
                tracing::error!(error = %detail, "{}", message);
                message.to_string()
            }
        };

        (status, Json(json!({ "error": error_message }))).into_response()
    }
}
