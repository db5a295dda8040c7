use chrono::Utc;
use opinions_api::{
    models::NewUser,
    repository::{PostgresRepository, Repository, RepositoryError},
};
use sqlx::PgPool;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::test;

// --- Test Context and Setup ---

/// Holds the pool for one test. Tests share a database, so every description and
/// email they write is made unique with `unique()`.
struct DbTestContext {
    pool: PgPool,
}

impl DbTestContext {
    async fn setup() -> Self {
        dotenv::dotenv().ok();

        let db_url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set to run integration tests");

        let pool = PgPool::connect(&db_url)
            .await
            .expect("Failed to connect to database for integration tests.");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run database migrations.");

        DbTestContext { pool }
    }

    fn repository(&self) -> PostgresRepository {
        PostgresRepository::new(self.pool.clone())
    }
}

static COUNTER: AtomicU64 = AtomicU64::new(0);

fn unique(prefix: &str) -> String {
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{}-{}-{}", prefix, nanos, n)
}

fn new_user(email: &str) -> NewUser {
    NewUser {
        user_name: "repo_user".to_string(),
        email: email.to_string(),
        password_hash: "$2b$04$not-a-real-hash".to_string(),
    }
}

// --- Topic Tests ---

#[test]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn test_create_and_find_topic() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let description = unique("topic");

    let id = repo.create_topic(&description).await.unwrap();

    let by_id = repo.get_topic_by_id(id).await.unwrap().expect("topic by id");
    assert_eq!(by_id.description, description);

    let by_description = repo
        .get_topic_by_description(&description)
        .await
        .unwrap()
        .expect("topic by description");
    assert_eq!(by_description.id, id);

    let all = repo.get_all_topics().await.unwrap();
    assert!(all.iter().any(|topic| topic.id == id));
}

#[test]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn test_duplicate_topic_description_is_conflict() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let description = unique("dup");

    repo.create_topic(&description).await.unwrap();
    let result = repo.create_topic(&description).await;

    assert!(matches!(result, Err(RepositoryError::Conflict(_))));
}

#[test]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn test_update_topic() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let id = repo.create_topic(&unique("before")).await.unwrap();
    let renamed = unique("after");

    assert!(repo.update_topic(id, &renamed).await.unwrap());
    assert_eq!(repo.get_topic_by_id(id).await.unwrap().unwrap().description, renamed);

    // Missing id
    assert!(!repo.update_topic(i64::MAX, &unique("ghost")).await.unwrap());
}

#[test]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn test_update_topic_into_taken_description_is_conflict() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let original = unique("original");
    let taken = unique("taken");
    let id = repo.create_topic(&original).await.unwrap();
    repo.create_topic(&taken).await.unwrap();

    let result = repo.update_topic(id, &taken).await;

    assert!(matches!(result, Err(RepositoryError::Conflict(_))));
    assert_eq!(repo.get_topic_by_id(id).await.unwrap().unwrap().description, original);
}

#[test]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn test_missing_topic_is_none() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();

    assert!(repo.get_topic_by_id(i64::MAX).await.unwrap().is_none());
}

// --- User Tests ---

#[test]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn test_create_user_and_read_back() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let email = unique("user") + "@x.com";

    let id = repo.create_user(new_user(&email)).await.unwrap();

    let user = repo.get_user_by_id(id).await.unwrap().expect("user");
    assert_eq!(user.email, email);
    assert_eq!(user.user_name, "repo_user");

    let creds = repo
        .get_credentials_by_email(&email)
        .await
        .unwrap()
        .expect("credentials");
    assert_eq!(creds.id, id);
    assert_eq!(creds.password_hash, "$2b$04$not-a-real-hash");

    let users = repo.get_users().await.unwrap();
    assert!(users.iter().any(|u| u.id == id));
}

#[test]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn test_duplicate_email_is_conflict() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let email = unique("twice") + "@x.com";

    repo.create_user(new_user(&email)).await.unwrap();
    let result = repo.create_user(new_user(&email)).await;

    assert!(matches!(result, Err(RepositoryError::Conflict(_))));
}

#[test]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn test_update_profile_and_password() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let email = unique("profile") + "@x.com";
    let id = repo.create_user(new_user(&email)).await.unwrap();
    let new_email = unique("moved") + "@x.com";

    assert!(repo.update_user_profile(id, "renamed", &new_email).await.unwrap());
    let user = repo.get_user_by_id(id).await.unwrap().unwrap();
    assert_eq!(user.user_name, "renamed");
    assert_eq!(user.email, new_email);

    assert!(repo.update_user_password(id, "$2b$04$another").await.unwrap());
    let creds = repo.get_credentials_by_email(&new_email).await.unwrap().unwrap();
    assert_eq!(creds.password_hash, "$2b$04$another");

    assert!(!repo.update_user_profile(i64::MAX, "ghost", &unique("ghost")).await.unwrap());
    assert!(!repo.update_user_password(i64::MAX, "x").await.unwrap());
}

#[test]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn test_update_profile_to_taken_email_is_conflict() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let taken = unique("taken") + "@x.com";
    repo.create_user(new_user(&taken)).await.unwrap();
    let id = repo.create_user(new_user(&(unique("mine") + "@x.com"))).await.unwrap();

    let result = repo.update_user_profile(id, "repo_user", &taken).await;

    assert!(matches!(result, Err(RepositoryError::Conflict(_))));
}

// --- Opinion Tests ---

#[test]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn test_opinions_by_user() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let author = repo.create_user(new_user(&(unique("author") + "@x.com"))).await.unwrap();
    let other = repo.create_user(new_user(&(unique("other") + "@x.com"))).await.unwrap();
    let topic = repo.create_topic(&unique("opinions")).await.unwrap();

    // Opinions are written elsewhere; seed them directly.
    for (user_id, text) in [(author, "first"), (author, "second"), (other, "not mine")] {
        sqlx::query("INSERT INTO opinions (user_id, topic_id, text) VALUES ($1, $2, $3)")
            .bind(user_id)
            .bind(topic)
            .bind(text)
            .execute(&ctx.pool)
            .await
            .unwrap();
    }

    let opinions = repo.get_opinions_by_user_id(author).await.unwrap();

    assert_eq!(opinions.len(), 2);
    assert!(opinions.iter().all(|o| o.user_id == author && o.topic_id == topic));
}
