use crate::error::AppError;
use crate::handlers::extract::{JsonBody, JsonRequestBody};
use crate::handlers::MessageResponse;
use crate::models::user::UserProfile;
use crate::services::{AuthServiceError, CreateUserRequest, LoginRequest, UserServiceError};
use crate::AppState;
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::instrument;

#[derive(Deserialize)]
pub struct RegisterBody {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl JsonRequestBody for RegisterBody {
    fn rejected() -> AppError {
        UserServiceError::MissingFields.into()
    }
}

#[derive(Deserialize)]
pub struct LoginBody {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl JsonRequestBody for LoginBody {
    fn rejected() -> AppError {
        AuthServiceError::MissingCredentials.into()
    }
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub user: UserProfile,
}

#[instrument(skip_all)]
pub async fn register_handler(
    State(app_state): State<AppState>,
    JsonBody(body): JsonBody<RegisterBody>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let request = CreateUserRequest {
        name: body.name.unwrap_or_default(),
        email: body.email.unwrap_or_default(),
        password: body.password.unwrap_or_default(),
    };

    app_state.user_service.create_user(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User registered successfully")),
    ))
}

#[instrument(skip_all)]
pub async fn login_handler(
    State(app_state): State<AppState>,
    JsonBody(body): JsonBody<LoginBody>,
) -> Result<Json<LoginResponse>, AppError> {
    let request = LoginRequest {
        email: body.email.unwrap_or_default(),
        password: body.password.unwrap_or_default(),
    };

    let user = app_state.auth_service.authenticate(request).await?;

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        user: user.into(),
    }))
}
