use super::{DESCRIPTION_TAKEN, EMAIL_TAKEN, Repository, RepositoryError, RepositoryResult};
use crate::models::{NewUser, Opinion, Topic, User, UserCredentials};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Mutex, MutexGuard};

struct StoredUser {
    user: User,
    password_hash: String,
}

#[derive(Default)]
struct Store {
    topics: Vec<Topic>,
    users: Vec<StoredUser>,
    opinions: Vec<Opinion>,
    last_topic_id: i64,
    last_user_id: i64,
    last_opinion_id: i64,
}

/// InMemoryRepository
///
/// Process-local `Repository` used when the service runs locally without
/// `DATABASE_URL`, and by the test suites. Every uniqueness check and the write it
/// guards happen under one lock, so the same `Conflict` semantics as the Postgres
/// constraints hold under concurrent requests. Ids start at 1, like `BIGSERIAL`.
#[derive(Default)]
pub struct InMemoryRepository {
    store: Mutex<Store>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn store(&self) -> MutexGuard<'_, Store> {
        // A panic while holding the lock cannot leave a half-applied write behind,
        // so the data is still consistent.
        self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// insert_opinion
    ///
    /// Opinions are written by another part of the system; this seeds one directly.
    pub fn insert_opinion(&self, user_id: i64, topic_id: i64, text: &str) -> Opinion {
        let mut store = self.store();
        store.last_opinion_id += 1;
        let opinion = Opinion {
            id: store.last_opinion_id,
            user_id,
            topic_id,
            text: text.to_string(),
            created_at: Utc::now(),
        };
        store.opinions.push(opinion.clone());
        opinion
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn get_all_topics(&self) -> RepositoryResult<Vec<Topic>> {
        Ok(self.store().topics.clone())
    }

    async fn get_topic_by_id(&self, id: i64) -> RepositoryResult<Option<Topic>> {
        Ok(self.store().topics.iter().find(|t| t.id == id).cloned())
    }

    async fn get_topic_by_description(&self, description: &str) -> RepositoryResult<Option<Topic>> {
        Ok(self
            .store()
            .topics
            .iter()
            .find(|t| t.description == description)
            .cloned())
    }

    async fn create_topic(&self, description: &str) -> RepositoryResult<i64> {
        let mut store = self.store();
        if store.topics.iter().any(|t| t.description == description) {
            return Err(RepositoryError::Conflict(DESCRIPTION_TAKEN.to_string()));
        }
        store.last_topic_id += 1;
        let id = store.last_topic_id;
        store.topics.push(Topic {
            id,
            description: description.to_string(),
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn update_topic(&self, id: i64, description: &str) -> RepositoryResult<bool> {
        let mut store = self.store();
        if store
            .topics
            .iter()
            .any(|t| t.description == description && t.id != id)
        {
            return Err(RepositoryError::Conflict(DESCRIPTION_TAKEN.to_string()));
        }
        match store.topics.iter_mut().find(|t| t.id == id) {
            Some(topic) => {
                topic.description = description.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn create_user(&self, user: NewUser) -> RepositoryResult<i64> {
        let mut store = self.store();
        if store.users.iter().any(|u| u.user.email == user.email) {
            return Err(RepositoryError::Conflict(EMAIL_TAKEN.to_string()));
        }
        store.last_user_id += 1;
        let id = store.last_user_id;
        store.users.push(StoredUser {
            user: User {
                id,
                user_name: user.user_name,
                email: user.email,
                created_at: Utc::now(),
            },
            password_hash: user.password_hash,
        });
        Ok(id)
    }

    async fn get_users(&self) -> RepositoryResult<Vec<User>> {
        Ok(self.store().users.iter().map(|u| u.user.clone()).collect())
    }

    async fn get_user_by_id(&self, id: i64) -> RepositoryResult<Option<User>> {
        Ok(self
            .store()
            .users
            .iter()
            .find(|u| u.user.id == id)
            .map(|u| u.user.clone()))
    }

    async fn get_credentials_by_email(&self, email: &str) -> RepositoryResult<Option<UserCredentials>> {
        Ok(self
            .store()
            .users
            .iter()
            .find(|u| u.user.email == email)
            .map(|u| UserCredentials {
                id: u.user.id,
                password_hash: u.password_hash.clone(),
            }))
    }

    async fn update_user_profile(&self, id: i64, user_name: &str, email: &str) -> RepositoryResult<bool> {
        let mut store = self.store();
        if store
            .users
            .iter()
            .any(|u| u.user.email == email && u.user.id != id)
        {
            return Err(RepositoryError::Conflict(EMAIL_TAKEN.to_string()));
        }
        match store.users.iter_mut().find(|u| u.user.id == id) {
            Some(stored) => {
                stored.user.user_name = user_name.to_string();
                stored.user.email = email.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_user_password(&self, id: i64, password_hash: &str) -> RepositoryResult<bool> {
        let mut store = self.store();
        match store.users.iter_mut().find(|u| u.user.id == id) {
            Some(stored) => {
                stored.password_hash = password_hash.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn get_opinions_by_user_id(&self, user_id: i64) -> RepositoryResult<Vec<Opinion>> {
        Ok(self
            .store()
            .opinions
            .iter()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            user_name: "ana".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn test_topic_ids_are_sequential_from_one() {
        let repo = InMemoryRepository::new();
        assert_eq!(repo.create_topic("first").await.unwrap(), 1);
        assert_eq!(repo.create_topic("second").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_description_is_a_conflict() {
        let repo = InMemoryRepository::new();
        repo.create_topic("rust").await.unwrap();

        let result = repo.create_topic("rust").await;
        assert!(matches!(result, Err(RepositoryError::Conflict(_))));
        assert_eq!(repo.get_all_topics().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rename_to_own_description_is_allowed() {
        let repo = InMemoryRepository::new();
        let id = repo.create_topic("rust").await.unwrap();

        assert!(repo.update_topic(id, "rust").await.unwrap());
    }

    #[tokio::test]
    async fn test_rename_to_taken_description_leaves_topic_unchanged() {
        let repo = InMemoryRepository::new();
        let a = repo.create_topic("a").await.unwrap();
        repo.create_topic("b").await.unwrap();

        let result = repo.update_topic(a, "b").await;
        assert!(matches!(result, Err(RepositoryError::Conflict(_))));
        let topic = repo.get_topic_by_id(a).await.unwrap().unwrap();
        assert_eq!(topic.description, "a");
    }

    #[tokio::test]
    async fn test_update_missing_topic_reports_false() {
        let repo = InMemoryRepository::new();
        assert!(!repo.update_topic(42, "x").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_a_conflict() {
        let repo = InMemoryRepository::new();
        repo.create_user(new_user("ana@x.com")).await.unwrap();

        let result = repo.create_user(new_user("ana@x.com")).await;
        assert!(matches!(result, Err(RepositoryError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_credentials_lookup_returns_stored_hash() {
        let repo = InMemoryRepository::new();
        let id = repo.create_user(new_user("ana@x.com")).await.unwrap();
        repo.update_user_password(id, "new-hash").await.unwrap();

        let creds = repo.get_credentials_by_email("ana@x.com").await.unwrap().unwrap();
        assert_eq!(creds.id, id);
        assert_eq!(creds.password_hash, "new-hash");
        assert!(repo.get_credentials_by_email("nobody@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_opinions_are_filtered_by_user() {
        let repo = InMemoryRepository::new();
        repo.insert_opinion(1, 1, "yes");
        repo.insert_opinion(2, 1, "no");
        repo.insert_opinion(1, 2, "maybe");

        let opinions = repo.get_opinions_by_user_id(1).await.unwrap();
        assert_eq!(opinions.len(), 2);
        assert!(opinions.iter().all(|o| o.user_id == 1));
    }
}
