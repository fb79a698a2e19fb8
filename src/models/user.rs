use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Blocked,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Blocked => "blocked",
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub status: UserStatus,
    pub registration_time: DateTime<Utc>,
    pub last_login_time: Option<DateTime<Utc>>,
}

impl User {
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}

// Returned by a successful login
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub status: UserStatus,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        UserProfile {
            id: user.id,
            name: user.name,
            email: user.email,
            status: user.status,
        }
    }
}

// Row of the user table view
#[derive(Debug, Clone, Serialize)]
pub struct UserListing {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub status: UserStatus,
    pub registration_time: DateTime<Utc>,
    pub last_login_time: Option<DateTime<Utc>>,
}

impl From<User> for UserListing {
    fn from(user: User) -> Self {
        UserListing {
            id: user.id,
            name: user.name,
            email: user.email,
            status: user.status,
            registration_time: user.registration_time,
            last_login_time: user.last_login_time,
        }
    }
}
