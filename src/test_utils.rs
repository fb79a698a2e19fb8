pub mod test_helpers {
    use crate::{app, models::user::UserStatus, AppState};
    use axum::Router;
    use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
    use tempfile::NamedTempFile;

    /// Create a new in-memory SQLite database for testing
    pub async fn create_test_db() -> Result<SqlitePool, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        // Run migrations
        crate::db::run_migrations(&pool).await?;

        Ok(pool)
    }

    /// Create a temporary file-based SQLite database for testing
    /// Useful when several connections must see the same data
    pub async fn create_test_db_file() -> Result<(SqlitePool, NamedTempFile), sqlx::Error> {
        let temp_file = NamedTempFile::new().map_err(sqlx::Error::Io)?;
        let db_path = temp_file
            .path()
            .to_str()
            .ok_or_else(|| sqlx::Error::Configuration("Invalid database path".into()))?;
        let database_url = format!("sqlite://{}", db_path);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect(&database_url)
            .await?;

        crate::db::run_migrations(&pool).await?;

        Ok((pool, temp_file))
    }

    /// Router over a fresh in-memory database, plus the pool behind it.
    pub async fn create_test_app() -> Result<(Router, SqlitePool), sqlx::Error> {
        let pool = create_test_db().await?;
        let router = app::build_router(AppState::from_pool(pool.clone()), "*");
        Ok((router, pool))
    }

    /// Insert a test user with hashed password and the given status
    pub async fn insert_test_user(
        pool: &SqlitePool,
        name: &str,
        email: &str,
        password: &str,
        status: UserStatus,
    ) -> Result<i64, sqlx::Error> {
        let password_hash = crate::services::password::hash_password(password).map_err(|e| {
            sqlx::Error::Configuration(format!("Password hashing failed: {}", e).into())
        })?;
        let registered_at =
            crate::repositories::user_repository::encode_timestamp(chrono::Utc::now());

        let result = sqlx::query(
            "INSERT INTO users (name, email, password_hash, status, registration_time) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(status)
        .bind(registered_at)
        .execute(pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn user_status(
        pool: &SqlitePool,
        id: i64,
    ) -> Result<Option<UserStatus>, sqlx::Error> {
        sqlx::query_scalar::<_, UserStatus>("SELECT status FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn count_users(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await
    }
}

// Note: This is test-only code. Panic on error is acceptable in tests.
#[cfg(test)]
pub async fn create_test_pool() -> sqlx::SqlitePool {
    match test_helpers::create_test_db().await {
        Ok(pool) => pool,
        Err(e) => panic!("Failed to create test pool: {}", e),
    }
}
