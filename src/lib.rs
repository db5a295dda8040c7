use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod password;
pub mod repository;

// Routing split by access level (Public, Authenticated).
pub mod routes;
use auth::AuthUser;
use routes::{authenticated, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use repository::{InMemoryRepository, PostgresRepository, RepositoryState};

/// ApiDoc
///
/// OpenAPI document aggregated from the `#[utoipa::path]` handlers and the
/// `ToSchema` models. Served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::topics::get_all_topics, handlers::topics::get_topic_by_id,
        handlers::topics::create_topic, handlers::topics::update_topic,
        handlers::users::register_user, handlers::users::get_users, handlers::users::get_user,
        handlers::users::get_me, handlers::users::get_user_opinions, handlers::users::login,
        handlers::users::update_user, handlers::users::update_password,
    ),
    components(
        schemas(
            models::Topic, models::User, models::Opinion,
            models::TopicRequest, models::RegisterUserRequest, models::LoginRequest,
            models::UpdateProfileRequest, models::UpdatePasswordRequest,
            models::TopicListResponse, models::TopicWriteResponse, models::ExistingTopicResponse,
            models::CreateTopicResponse, models::UserCreatedResponse, models::UserResponse,
            models::UserListResponse, models::OpinionListResponse, models::TokenResponse,
            models::MessageResponse, error::ErrorBody,
        )
    ),
    tags(
        (name = "opinions-api", description = "Topics and users API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single shared container for everything a request may need. Cloned per
/// request; both fields are cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Repository Layer: Postgres in deployments, in-memory locally and in tests.
    pub repo: RepositoryState,
    /// Configuration: loaded once at startup, never re-read.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// Let extractors (notably `AuthUser`) pull just the piece of state they need.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Guards the authenticated router. Extracting `AuthUser` does the work: if the
/// token (or local bypass header) does not resolve to an existing user, the
/// extractor's `AppError::Unauthorized` is returned and the handler never runs.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// Answers unknown routes in the same JSON shape as every other error.
async fn not_found_fallback() -> AppError {
    AppError::NotFound("Not found".to_string())
}

/// create_router
///
/// Assembles routes, scoped middleware, state, and the observability layers.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .fallback(not_found_fallback)
        .with_state(state);

    // Outermost first: every request gets an id before the trace span is opened,
    // and the id is echoed back on the response.
    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Opens the per-request span with method, uri and the `x-request-id`, so every
/// log line emitted while serving a request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
