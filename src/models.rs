use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use validator::Validate;

// --- Core Application Schemas (Mapped to Database) ---

/// Topic
///
/// A named category from the `topics` table. `description` is unique across all
/// topics (store-level `UNIQUE` constraint).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Topic {
    pub id: i64,
    pub description: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// User
///
/// Public projection of a row in the `users` table. The password hash is
/// deliberately absent: this is the only user shape that reaches a response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct User {
    pub id: i64,
    pub user_name: String,
    pub email: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// UserCredentials
///
/// Internal row used only by the login flow to compare a supplied password.
#[derive(Debug, Clone, FromRow)]
pub struct UserCredentials {
    pub id: i64,
    pub password_hash: String,
}

/// NewUser
///
/// Insert payload for the repository. The password has already been hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub user_name: String,
    pub email: String,
    pub password_hash: String,
}

/// Opinion
///
/// A user's opinion on a topic, from the `opinions` table. Owned by another part
/// of the system; this service only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Opinion {
    pub id: i64,
    pub user_id: i64,
    pub topic_id: i64,
    pub text: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// --- Request Payloads (Input Schemas) ---
///
/// Missing string fields default to empty so they fail validation with a 400
/// instead of being rejected by the JSON extractor.

/// TopicRequest
///
/// Body for both creating (POST /topics) and renaming (PUT /topics/{id}) a topic.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[ts(export)]
pub struct TopicRequest {
    #[serde(default)]
    #[validate(length(
        min = 1,
        max = 255,
        message = "description must be between 1 and 255 characters"
    ))]
    #[schema(example = "Climate policy")]
    pub description: String,
}

/// RegisterUserRequest
///
/// Body for POST /users. The password is hashed before it reaches the repository
/// and is never logged.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RegisterUserRequest {
    #[serde(default)]
    #[validate(length(min = 2, max = 20, message = "userName must be between 2 and 20 characters"))]
    pub user_name: String,
    #[serde(default)]
    #[validate(
        email(message = "email is not a valid address"),
        length(max = 255, message = "email must be at most 255 characters")
    )]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
}

/// LoginRequest
///
/// Body for POST /users/login. Both fields are optional at the type level so the
/// handler can answer a missing field with its own 400 message.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// UpdateProfileRequest
///
/// Body for PUT /users/{id}. Same constraints as registration.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    #[validate(length(min = 2, max = 20, message = "userName must be between 2 and 20 characters"))]
    pub user_name: String,
    #[serde(default)]
    #[validate(
        email(message = "email is not a valid address"),
        length(max = 255, message = "email must be at most 255 characters")
    )]
    pub email: String,
}

/// UpdatePasswordRequest
///
/// Body for PUT /users/me/password. The target is always the caller.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[ts(export)]
pub struct UpdatePasswordRequest {
    #[serde(default)]
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
}

/// --- Response Envelopes (Output Schemas) ---

/// TopicListResponse
///
/// `{ "status": "ok", "topics": [...] }` for GET /topics.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct TopicListResponse {
    pub status: String,
    pub topics: Vec<Topic>,
}

/// TopicWriteResponse
///
/// Returned after a topic is created or renamed; `topic` is the affected id.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct TopicWriteResponse {
    pub status: String,
    pub message: String,
    pub topic: i64,
}

/// ExistingTopicResponse
///
/// Returned by POST /topics when the description is already taken: the request
/// succeeds and echoes the topic that already holds it.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ExistingTopicResponse {
    pub status: String,
    pub message: String,
    pub topic: Topic,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UserCreatedResponse {
    pub status: String,
    pub message: String,
    pub id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UserResponse {
    pub status: String,
    pub data: User,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UserListResponse {
    pub status: String,
    pub data: Vec<User>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct OpinionListResponse {
    pub status: String,
    pub data: Vec<Opinion>,
}

/// TokenResponse
///
/// Successful login: `data` is the signed JWT.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct TokenResponse {
    pub status: String,
    pub data: String,
}

/// MessageResponse
///
/// Plain acknowledgement for mutations that return nothing else.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct MessageResponse {
    pub status: String,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
        }
    }
}

/// CreateTopicResponse
///
/// POST /topics answers 200 either way: with the new id, or with the topic that
/// already holds the description.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(untagged)]
#[ts(export)]
pub enum CreateTopicResponse {
    Created(TopicWriteResponse),
    Existing(ExistingTopicResponse),
}
