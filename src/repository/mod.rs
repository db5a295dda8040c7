use crate::models::{NewUser, Opinion, Topic, User, UserCredentials};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

mod memory;
mod postgres;

pub use memory::InMemoryRepository;
pub use postgres::PostgresRepository;

/// RepositoryError
///
/// Failures a repository can report. `Conflict` is raised when a write violates a
/// uniqueness constraint held by the store; callers treat it as the authoritative
/// answer to "is this value already taken", not the lookup they may have done first.
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Repository Trait
///
/// The persistence contract used by the handlers: one method per query or mutation.
/// Lookups return `Ok(None)` for an absent record; `Err` is reserved for store faults
/// and constraint conflicts.
///
/// **Send + Sync + async_trait** make `Arc<dyn Repository>` shareable across Axum's
/// task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Topics ---
    async fn get_all_topics(&self) -> RepositoryResult<Vec<Topic>>;
    async fn get_topic_by_id(&self, id: i64) -> RepositoryResult<Option<Topic>>;
    async fn get_topic_by_description(&self, description: &str) -> RepositoryResult<Option<Topic>>;
    /// Inserts a topic and returns its id. `Conflict` if the description is taken.
    async fn create_topic(&self, description: &str) -> RepositoryResult<i64>;
    /// Renames a topic. `Ok(false)` if the id does not exist, `Conflict` if another
    /// topic holds the description.
    async fn update_topic(&self, id: i64, description: &str) -> RepositoryResult<bool>;

    // --- Users ---
    /// Inserts a user and returns its id. `Conflict` if the email is taken.
    async fn create_user(&self, user: NewUser) -> RepositoryResult<i64>;
    async fn get_users(&self) -> RepositoryResult<Vec<User>>;
    async fn get_user_by_id(&self, id: i64) -> RepositoryResult<Option<User>>;
    async fn get_credentials_by_email(&self, email: &str) -> RepositoryResult<Option<UserCredentials>>;
    /// `Ok(false)` if the id does not exist, `Conflict` if the email is taken.
    async fn update_user_profile(&self, id: i64, user_name: &str, email: &str) -> RepositoryResult<bool>;
    async fn update_user_password(&self, id: i64, password_hash: &str) -> RepositoryResult<bool>;

    // --- Opinions ---
    async fn get_opinions_by_user_id(&self, user_id: i64) -> RepositoryResult<Vec<Opinion>>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// Conflict message for a topic description already held by another topic.
pub const DESCRIPTION_TAKEN: &str = "A topic with the new description already exists";
/// Conflict message for an email already registered to another user.
pub const EMAIL_TAKEN: &str = "A user with that email already exists";
