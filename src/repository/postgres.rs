use super::{DESCRIPTION_TAKEN, EMAIL_TAKEN, Repository, RepositoryError, RepositoryResult};
use crate::models::{NewUser, Opinion, Topic, User, UserCredentials};
use async_trait::async_trait;
use sqlx::PgPool;

/// PostgresRepository
///
/// The `Repository` implementation backed by PostgreSQL. Uniqueness of topic
/// descriptions and user emails is held by `UNIQUE` constraints (see
/// `migrations/0001_init.sql`); a violation surfaces as `RepositoryError::Conflict`.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Logs a failed query and wraps it. Used where the statement cannot hit a
/// unique constraint.
fn query_error(context: &str, err: sqlx::Error) -> RepositoryError {
    tracing::error!("{} error: {:?}", context, err);
    RepositoryError::Database(err)
}

/// Maps a unique violation to `Conflict`; anything else is logged as a fault.
fn write_error(context: &str, err: sqlx::Error, conflict: &str) -> RepositoryError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() {
            tracing::debug!("{} conflict: {}", context, db_err.message());
            return RepositoryError::Conflict(conflict.to_string());
        }
    }
    tracing::error!("{} error: {:?}", context, err);
    RepositoryError::Database(err)
}

#[async_trait]
impl Repository for PostgresRepository {
    // --- TOPICS ---

    async fn get_all_topics(&self) -> RepositoryResult<Vec<Topic>> {
        sqlx::query_as::<_, Topic>("SELECT id, description, created_at FROM topics ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| query_error("get_all_topics", e))
    }

    async fn get_topic_by_id(&self, id: i64) -> RepositoryResult<Option<Topic>> {
        sqlx::query_as::<_, Topic>("SELECT id, description, created_at FROM topics WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_error("get_topic_by_id", e))
    }

    async fn get_topic_by_description(&self, description: &str) -> RepositoryResult<Option<Topic>> {
        sqlx::query_as::<_, Topic>(
            "SELECT id, description, created_at FROM topics WHERE description = $1",
        )
        .bind(description)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| query_error("get_topic_by_description", e))
    }

    /// create_topic
    ///
    /// Plain insert; the unique constraint decides whether the description is free.
    async fn create_topic(&self, description: &str) -> RepositoryResult<i64> {
        sqlx::query_scalar::<_, i64>("INSERT INTO topics (description) VALUES ($1) RETURNING id")
            .bind(description)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| write_error("create_topic", e, DESCRIPTION_TAKEN))
    }

    async fn update_topic(&self, id: i64, description: &str) -> RepositoryResult<bool> {
        let result = sqlx::query(
            "UPDATE topics SET description = $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(description)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error("update_topic", e, DESCRIPTION_TAKEN))?;

        Ok(result.rows_affected() > 0)
    }

    // --- USERS ---

    async fn create_user(&self, user: NewUser) -> RepositoryResult<i64> {
        sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO users (user_name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(&user.user_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error("create_user", e, EMAIL_TAKEN))
    }

    async fn get_users(&self) -> RepositoryResult<Vec<User>> {
        sqlx::query_as::<_, User>("SELECT id, user_name, email, created_at FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| query_error("get_users", e))
    }

    async fn get_user_by_id(&self, id: i64) -> RepositoryResult<Option<User>> {
        sqlx::query_as::<_, User>(
            "SELECT id, user_name, email, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| query_error("get_user_by_id", e))
    }

    /// get_credentials_by_email
    ///
    /// The only query that reads `password_hash`.
    async fn get_credentials_by_email(&self, email: &str) -> RepositoryResult<Option<UserCredentials>> {
        sqlx::query_as::<_, UserCredentials>(
            "SELECT id, password_hash FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| query_error("get_credentials_by_email", e))
    }

    async fn update_user_profile(&self, id: i64, user_name: &str, email: &str) -> RepositoryResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET user_name = $1, email = $2, updated_at = NOW()
            WHERE id = $3
            "#,
        )
        .bind(user_name)
        .bind(email)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error("update_user_profile", e, EMAIL_TAKEN))?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_user_password(&self, id: i64, password_hash: &str) -> RepositoryResult<bool> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(password_hash)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| query_error("update_user_password", e))?;

        Ok(result.rows_affected() > 0)
    }

    // --- OPINIONS ---

    async fn get_opinions_by_user_id(&self, user_id: i64) -> RepositoryResult<Vec<Opinion>> {
        sqlx::query_as::<_, Opinion>(
            r#"
            SELECT id, user_id, topic_id, text, created_at
            FROM opinions
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| query_error("get_opinions_by_user_id", e))
    }
}
