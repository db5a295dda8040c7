use crate::{
    AppState,
    auth::{AuthUser, issue_token},
    error::{AppError, AppResult},
    models::{
        LoginRequest, MessageResponse, NewUser, OpinionListResponse, RegisterUserRequest,
        TokenResponse, UpdatePasswordRequest, UpdateProfileRequest, UserCreatedResponse,
        UserListResponse, UserResponse,
    },
    password::{hash_password, verify_password},
};
use axum::{
    Json,
    extract::{Path, State},
};
use validator::Validate;

use super::{STATUS_OK, parse_id};

pub const USER_NOT_FOUND: &str = "The user with the given ID was not found";
pub const LOGIN_FIELDS_REQUIRED: &str = "Email and password are required";
/// Same message whether the email or the password was wrong.
pub const INVALID_CREDENTIALS: &str = "Invalid email or password";
pub const NOT_PROFILE_OWNER: &str = "You cannot modify another user's data";

/// register_user
///
/// [Public Route] Creates an account. The password is bcrypt-hashed before it is
/// handed to the repository; a duplicate email is a 409 from the store.
#[utoipa::path(
    post,
    path = "/users",
    request_body = RegisterUserRequest,
    responses(
        (status = 200, description = "Registered", body = UserCreatedResponse),
        (status = 400, description = "Invalid payload", body = crate::error::ErrorBody),
        (status = 409, description = "Email already registered", body = crate::error::ErrorBody)
    )
)]
pub async fn register_user(
    State(state): State<AppState>,
    Json(payload): Json<RegisterUserRequest>,
) -> AppResult<Json<UserCreatedResponse>> {
    payload.validate()?;
    let RegisterUserRequest {
        user_name,
        email,
        password,
    } = payload;

    let password_hash = hash_password(password, state.config.bcrypt_cost).await?;

    let id = state
        .repo
        .create_user(NewUser {
            user_name,
            email,
            password_hash,
        })
        .await?;

    tracing::info!(user_id = id, "user registered");

    Ok(Json(UserCreatedResponse {
        status: STATUS_OK.to_string(),
        message: format!("User created with id: {}", id),
        id,
    }))
}

/// get_users
///
/// [Public Route] Lists every user (public projection, no password hashes).
#[utoipa::path(
    get,
    path = "/users",
    responses((status = 200, description = "All users", body = UserListResponse))
)]
pub async fn get_users(State(state): State<AppState>) -> AppResult<Json<UserListResponse>> {
    let users = state.repo.get_users().await?;
    Ok(Json(UserListResponse {
        status: STATUS_OK.to_string(),
        data: users,
    }))
}

/// get_user
///
/// [Public Route] Returns a single user.
#[utoipa::path(
    get,
    path = "/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "Found", body = UserResponse),
        (status = 404, description = "Not Found", body = crate::error::ErrorBody)
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<Json<UserResponse>> {
    let id = parse_id(&raw_id, USER_NOT_FOUND)?;
    load_user(&state, id).await
}

/// get_me
///
/// [Authenticated Route] Same as `get_user`, with the id taken from the token.
#[utoipa::path(
    get,
    path = "/users/me",
    responses(
        (status = 200, description = "Profile", body = UserResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorBody)
    )
)]
pub async fn get_me(
    AuthUser { id }: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<UserResponse>> {
    load_user(&state, id).await
}

async fn load_user(state: &AppState, id: i64) -> AppResult<Json<UserResponse>> {
    match state.repo.get_user_by_id(id).await? {
        Some(user) => Ok(Json(UserResponse {
            status: STATUS_OK.to_string(),
            data: user,
        })),
        None => Err(AppError::NotFound(USER_NOT_FOUND.to_string())),
    }
}

/// get_user_opinions
///
/// [Authenticated Route] Lists the opinions written by the given user.
#[utoipa::path(
    get,
    path = "/users/{id}/opinions",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "Opinions", body = OpinionListResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorBody)
    )
)]
pub async fn get_user_opinions(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<Json<OpinionListResponse>> {
    let id = parse_id(&raw_id, USER_NOT_FOUND)?;
    let opinions = state.repo.get_opinions_by_user_id(id).await?;
    Ok(Json(OpinionListResponse {
        status: STATUS_OK.to_string(),
        data: opinions,
    }))
}

/// login
///
/// [Public Route] Exchanges email + password for a signed token valid for 30 days.
///
/// An unknown email and a wrong password produce the same 401, so the response
/// does not reveal which accounts exist.
#[utoipa::path(
    post,
    path = "/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Missing email or password", body = crate::error::ErrorBody),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorBody)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let (email, password) = match (payload.email, payload.password) {
        (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
            (email, password)
        }
        _ => return Err(AppError::BadRequest(LOGIN_FIELDS_REQUIRED.to_string())),
    };

    let Some(credentials) = state.repo.get_credentials_by_email(&email).await? else {
        tracing::info!("login rejected: unknown email");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    };

    if !verify_password(password, credentials.password_hash).await? {
        tracing::info!(user_id = credentials.id, "login rejected: wrong password");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    let token = issue_token(credentials.id, &state.config.jwt_secret)?;

    Ok(Json(TokenResponse {
        status: STATUS_OK.to_string(),
        data: token,
    }))
}

/// update_user
///
/// [Authenticated Route] Changes username and email. Only the owner of the
/// profile may do so; anyone else gets a 403 and the record is left as it was.
/// Ownership is settled before the body is validated, so a non-owner sees the
/// same 403 whatever they send.
#[utoipa::path(
    put,
    path = "/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated", body = MessageResponse),
        (status = 400, description = "Invalid payload", body = crate::error::ErrorBody),
        (status = 403, description = "Not the profile owner", body = crate::error::ErrorBody),
        (status = 404, description = "Not Found", body = crate::error::ErrorBody),
        (status = 409, description = "Email already registered", body = crate::error::ErrorBody)
    )
)]
pub async fn update_user(
    AuthUser { id: caller_id }: AuthUser,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Json(payload): Json<UpdateProfileRequest>,
) -> AppResult<Json<MessageResponse>> {
    let id = parse_id(&raw_id, USER_NOT_FOUND)?;

    let target = state
        .repo
        .get_user_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(USER_NOT_FOUND.to_string()))?;

    if target.id != caller_id {
        tracing::warn!(caller_id, target_id = target.id, "profile update refused");
        return Err(AppError::Forbidden(NOT_PROFILE_OWNER.to_string()));
    }

    payload.validate()?;

    if !state
        .repo
        .update_user_profile(id, &payload.user_name, &payload.email)
        .await?
    {
        return Err(AppError::NotFound(USER_NOT_FOUND.to_string()));
    }

    Ok(Json(MessageResponse::ok("The user has been updated")))
}

/// update_password
///
/// [Authenticated Route] Replaces the caller's password. There is no path id: the
/// only account this can touch is the one named by the token.
#[utoipa::path(
    put,
    path = "/users/me/password",
    request_body = UpdatePasswordRequest,
    responses(
        (status = 200, description = "Updated", body = MessageResponse),
        (status = 400, description = "Invalid payload", body = crate::error::ErrorBody),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorBody)
    )
)]
pub async fn update_password(
    AuthUser { id }: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<UpdatePasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    payload.validate()?;

    let password_hash = hash_password(payload.password, state.config.bcrypt_cost).await?;

    if !state.repo.update_user_password(id, &password_hash).await? {
        return Err(AppError::NotFound(USER_NOT_FOUND.to_string()));
    }

    tracing::info!(user_id = id, "password updated");

    Ok(Json(MessageResponse::ok("The password has been updated")))
}
