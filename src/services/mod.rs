pub mod access_service;
pub mod auth_service;
pub mod password;
pub mod user_service;

pub use access_service::{AccessService, BulkActionError, BulkOutcome};
pub use auth_service::{AuthService, AuthServiceError, LoginRequest};
pub use user_service::{CreateUserRequest, UserService, UserServiceError};
