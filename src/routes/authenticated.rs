use crate::{AppState, handlers::users};
use axum::{
    Router,
    routing::{get, put},
};

/// Authenticated Router Module
///
/// Every route here sits behind the `auth_middleware` layer applied in
/// `create_router`, and each handler also takes `AuthUser` to learn who is calling.
/// Static segments (`/users/me`) take precedence over `/users/{id}`.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /users/me
        // The caller's own profile.
        .route("/users/me", get(users::get_me))
        // PUT /users/me/password
        // Always targets the caller; there is no id to tamper with.
        .route("/users/me/password", put(users::update_password))
        // PUT /users/{id}
        // Owner-only: the handler refuses with 403 when the token's id differs.
        .route("/users/{id}", put(users::update_user))
        // GET /users/{id}/opinions
        .route("/users/{id}/opinions", get(users::get_user_opinions))
}
