use crate::models::user::{User, UserStatus};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("User not found")]
    NotFound,
    #[error("User already exists")]
    AlreadyExists,
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait UserRepository: Send + Sync {
    async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        registered_at: DateTime<Utc>,
    ) -> RepositoryResult<User>;
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<User>>;
    /// Current status of a user, `None` when no row has this id.
    async fn find_status(&self, id: i64) -> RepositoryResult<Option<UserStatus>>;
    async fn record_login(&self, id: i64, at: DateTime<Utc>) -> RepositoryResult<()>;
    async fn list_users(&self) -> RepositoryResult<Vec<User>>;
    /// Sets `status` on every listed row in one statement; returns rows matched.
    async fn set_status(&self, ids: &[i64], status: UserStatus) -> RepositoryResult<u64>;
    /// Removes every listed row in one statement; returns rows removed.
    async fn delete_users(&self, ids: &[i64]) -> RepositoryResult<u64>;
}

const USER_COLUMNS: &str =
    "id, name, email, password_hash, status, registration_time, last_login_time";

// Fixed width, so text order in SQLite matches time order.
pub(crate) fn encode_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.is_unique_violation(),
        _ => false,
    }
}

pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        registered_at: DateTime<Utc>,
    ) -> RepositoryResult<User> {
        let result = sqlx::query(
            "INSERT INTO users (name, email, password_hash, status, registration_time) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(UserStatus::Active)
        .bind(encode_timestamp(registered_at))
        .execute(&self.pool)
        .await;

        match result {
            Ok(res) => {
                let id = res.last_insert_rowid();
                self.find_by_id(id).await?.ok_or(RepositoryError::NotFound)
            }
            Err(e) if is_unique_violation(&e) => Err(RepositoryError::AlreadyExists),
            Err(e) => Err(RepositoryError::Database(e)),
        }
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_status(&self, id: i64) -> RepositoryResult<Option<UserStatus>> {
        let status = sqlx::query_scalar::<_, UserStatus>("SELECT status FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(status)
    }

    async fn record_login(&self, id: i64, at: DateTime<Utc>) -> RepositoryResult<()> {
        let result = sqlx::query("UPDATE users SET last_login_time = ? WHERE id = ?")
            .bind(encode_timestamp(at))
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn list_users(&self) -> RepositoryResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY last_login_time DESC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn set_status(&self, ids: &[i64], status: UserStatus) -> RepositoryResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut query = QueryBuilder::<Sqlite>::new("UPDATE users SET status = ");
        query.push_bind(status).push(" WHERE id IN (");
        let mut separated = query.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let result = query.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn delete_users(&self, ids: &[i64]) -> RepositoryResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut query = QueryBuilder::<Sqlite>::new("DELETE FROM users WHERE id IN (");
        let mut separated = query.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let result = query.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamps_are_fixed_width() {
        let whole = Utc.with_ymd_and_hms(2024, 3, 1, 9, 5, 0).unwrap();
        let later = whole + chrono::Duration::microseconds(1);
        assert_eq!(encode_timestamp(whole), "2024-03-01T09:05:00.000000Z");
        assert_eq!(encode_timestamp(later), "2024-03-01T09:05:00.000001Z");
        assert!(encode_timestamp(whole) < encode_timestamp(later));
    }

    async fn repository() -> SqliteUserRepository {
        SqliteUserRepository::new(crate::test_utils::create_test_pool().await)
    }

    #[tokio::test]
    async fn duplicate_email_is_already_exists() {
        let repo = repository().await;
        repo.create_user("A", "a@example.com", "h", Utc::now())
            .await
            .unwrap();

        let result = repo.create_user("B", "a@example.com", "h", Utc::now()).await;
        assert!(matches!(result, Err(RepositoryError::AlreadyExists)));
    }

    #[tokio::test]
    async fn new_users_start_active_without_login() {
        let repo = repository().await;
        let user = repo
            .create_user("A", "a@example.com", "h", Utc::now())
            .await
            .unwrap();

        assert_eq!(user.status, UserStatus::Active);
        assert!(user.last_login_time.is_none());
        assert_eq!(repo.find_status(user.id).await.unwrap(), Some(UserStatus::Active));
        assert_eq!(repo.find_status(user.id + 100).await.unwrap(), None);
    }

    #[tokio::test]
    async fn bulk_writes_ignore_unknown_ids() {
        let repo = repository().await;
        let a = repo.create_user("A", "a@example.com", "h", Utc::now()).await.unwrap();
        let b = repo.create_user("B", "b@example.com", "h", Utc::now()).await.unwrap();

        let matched = repo
            .set_status(&[a.id, b.id, 9_999], UserStatus::Blocked)
            .await
            .unwrap();
        assert_eq!(matched, 2);
        assert_eq!(repo.find_status(b.id).await.unwrap(), Some(UserStatus::Blocked));

        let removed = repo.delete_users(&[a.id, 9_999]).await.unwrap();
        assert_eq!(removed, 1);
        assert!(repo.find_by_id(a.id).await.unwrap().is_none());
        assert!(repo.find_by_id(b.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let repo = repository().await;
        let first = repo.create_user("A", "a@example.com", "h", Utc::now()).await.unwrap();
        repo.delete_users(&[first.id]).await.unwrap();

        let second = repo.create_user("A", "a@example.com", "h", Utc::now()).await.unwrap();
        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn list_orders_by_last_login_with_never_logged_in_last() {
        let repo = repository().await;
        let never = repo.create_user("N", "n@example.com", "h", Utc::now()).await.unwrap();
        let early = repo.create_user("E", "e@example.com", "h", Utc::now()).await.unwrap();
        let late = repo.create_user("L", "l@example.com", "h", Utc::now()).await.unwrap();

        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
        repo.record_login(early.id, t0).await.unwrap();
        repo.record_login(late.id, t0 + chrono::Duration::milliseconds(5))
            .await
            .unwrap();

        let ids: Vec<i64> = repo.list_users().await.unwrap().iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![late.id, early.id, never.id]);
    }

    #[tokio::test]
    async fn record_login_for_missing_user() {
        let repo = repository().await;
        let result = repo.record_login(42, Utc::now()).await;
        assert!(matches!(result, Err(RepositoryError::NotFound)));
    }

    #[test]
    fn encoded_timestamps_parse_back() {
        let at = Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap();
        let parsed = DateTime::parse_from_rfc3339(&encode_timestamp(at)).unwrap();
        assert_eq!(parsed.with_timezone(&Utc), at);
    }
}
