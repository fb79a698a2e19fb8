use crate::models::user::User;
use crate::repositories::user_repository::{RepositoryError, UserRepository};
use crate::services::password;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument};

#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    #[error("Name, email and password are required")]
    MissingFields,
    #[error("Email already registered")]
    EmailTaken,
    #[error("Password hashing failed: {0}")]
    HashingError(String),
    #[error("Repository error: {0}")]
    RepositoryError(#[from] RepositoryError),
}

pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

pub struct UserService {
    repository: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }

    /// Registers a new user with status `active`.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn create_user(&self, request: CreateUserRequest) -> Result<User, UserServiceError> {
        let name = request.name.trim();
        let email = normalize_email(&request.email);

        if name.is_empty() || email.is_empty() || request.password.is_empty() {
            return Err(UserServiceError::MissingFields);
        }

        let password_hash = password::hash_password(&request.password)
            .map_err(|e| UserServiceError::HashingError(e.to_string()))?;

        match self
            .repository
            .create_user(name, &email, &password_hash, Utc::now())
            .await
        {
            Ok(user) => {
                info!(user_id = user.id, "user registered");
                Ok(user)
            }
            Err(RepositoryError::AlreadyExists) => Err(UserServiceError::EmailTaken),
            Err(e) => Err(UserServiceError::RepositoryError(e)),
        }
    }

    pub async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, UserServiceError> {
        Ok(self.repository.find_by_id(id).await?)
    }

    /// All users, most recent login first; never-logged-in users last.
    pub async fn list_users(&self) -> Result<Vec<User>, UserServiceError> {
        Ok(self.repository.list_users().await?)
    }
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::UserStatus;
    use crate::repositories::user_repository::MockUserRepository;

    fn stored_user(email: &str) -> User {
        User {
            id: 1,
            name: "Test".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            status: UserStatus::Active,
            registration_time: Utc::now(),
            last_login_time: None,
        }
    }

    #[tokio::test]
    async fn test_create_user_success() {
        let mut mock_repo = MockUserRepository::new();

        let user = stored_user("test@example.com");
        mock_repo
            .expect_create_user()
            .withf(|name, email, hash, _| {
                name == "Test" && email == "test@example.com" && hash.starts_with("$argon2")
            })
            .times(1)
            .returning(move |_, _, _, _| {
                let user = user.clone();
                Box::pin(async move { Ok(user) })
            });

        let service = UserService::new(Arc::new(mock_repo));

        let request = CreateUserRequest {
            name: " Test ".to_string(),
            email: "  Test@Example.com ".to_string(),
            password: "password123".to_string(),
        };

        let user = service.create_user(request).await.expect("Expected Ok result");
        assert_eq!(user.email, "test@example.com");
        assert_eq!(user.status, UserStatus::Active);
    }

    #[tokio::test]
    async fn test_create_user_missing_fields() {
        let mock_repo = MockUserRepository::new();
        let service = UserService::new(Arc::new(mock_repo));

        for (name, email, password) in [
            ("", "a@example.com", "pw"),
            ("A", "   ", "pw"),
            ("A", "a@example.com", ""),
        ] {
            let request = CreateUserRequest {
                name: name.to_string(),
                email: email.to_string(),
                password: password.to_string(),
            };
            let result = service.create_user(request).await;
            assert!(matches!(result, Err(UserServiceError::MissingFields)));
        }
    }

    #[tokio::test]
    async fn test_create_user_duplicate_email() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_create_user()
            .times(1)
            .returning(|_, _, _, _| Box::pin(async move { Err(RepositoryError::AlreadyExists) }));

        let service = UserService::new(Arc::new(mock_repo));
        let request = CreateUserRequest {
            name: "Dup".to_string(),
            email: "dup@example.com".to_string(),
            password: "secret".to_string(),
        };

        let result = service.create_user(request).await;
        assert!(matches!(result, Err(UserServiceError::EmailTaken)));
    }
}
