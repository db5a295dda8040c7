use crate::{AppState, handlers::{topics, users}};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints that need no token: the topic catalogue, registration, login, and
/// read access to user records.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness check for load balancers.
        .route("/health", get(|| async { "ok" }))
        // GET/POST /topics
        .route(
            "/topics",
            get(topics::get_all_topics).post(topics::create_topic),
        )
        // GET/PUT /topics/{id}
        // A non-numeric id answers 404, same as an unknown one.
        .route(
            "/topics/{id}",
            get(topics::get_topic_by_id).put(topics::update_topic),
        )
        // GET /users, POST /users (registration)
        .route("/users", get(users::get_users).post(users::register_user))
        // POST /users/login
        // Returns a 30-day bearer token.
        .route("/users/login", post(users::login))
        // GET /users/{id}
        // PUT on the same path is registered by the authenticated router.
        .route("/users/{id}", get(users::get_user))
}
