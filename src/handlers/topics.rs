use crate::{
    AppState,
    error::{AppError, AppResult},
    models::{
        CreateTopicResponse, ExistingTopicResponse, Topic, TopicListResponse, TopicRequest,
        TopicWriteResponse,
    },
    repository::{DESCRIPTION_TAKEN, RepositoryError},
};
use axum::{
    Json,
    extract::{Path, State},
};
use validator::Validate;

use super::{STATUS_OK, parse_id};

pub const TOPIC_NOT_FOUND: &str = "The topic with the given ID was not found";

fn existing_topic(topic: Topic) -> CreateTopicResponse {
    CreateTopicResponse::Existing(ExistingTopicResponse {
        status: STATUS_OK.to_string(),
        message: "The topic already exists".to_string(),
        topic,
    })
}

/// get_all_topics
///
/// [Public Route] Lists every topic.
#[utoipa::path(
    get,
    path = "/topics",
    responses((status = 200, description = "All topics", body = TopicListResponse))
)]
pub async fn get_all_topics(State(state): State<AppState>) -> AppResult<Json<TopicListResponse>> {
    let topics = state.repo.get_all_topics().await?;
    Ok(Json(TopicListResponse {
        status: STATUS_OK.to_string(),
        topics,
    }))
}

/// get_topic_by_id
///
/// [Public Route] Returns a single topic record.
#[utoipa::path(
    get,
    path = "/topics/{id}",
    params(("id" = i64, Path, description = "Topic ID")),
    responses(
        (status = 200, description = "Found", body = Topic),
        (status = 404, description = "Not Found", body = crate::error::ErrorBody)
    )
)]
pub async fn get_topic_by_id(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<Json<Topic>> {
    let id = parse_id(&raw_id, TOPIC_NOT_FOUND)?;

    match state.repo.get_topic_by_id(id).await? {
        Some(topic) => Ok(Json(topic)),
        None => Err(AppError::NotFound(TOPIC_NOT_FOUND.to_string())),
    }
}

/// create_topic
///
/// [Public Route] Creates a topic unless its description is already taken, in which
/// case the existing topic is returned instead of an error.
///
/// The lookup is only a fast path: if a concurrent request inserts the same
/// description in between, the store's unique constraint rejects our insert and
/// the winner's topic is returned.
#[utoipa::path(
    post,
    path = "/topics",
    request_body = TopicRequest,
    responses(
        (status = 200, description = "Created, or the topic already holding the description", body = CreateTopicResponse),
        (status = 400, description = "Invalid description", body = crate::error::ErrorBody)
    )
)]
pub async fn create_topic(
    State(state): State<AppState>,
    Json(payload): Json<TopicRequest>,
) -> AppResult<Json<CreateTopicResponse>> {
    payload.validate()?;
    let description = payload.description;

    if let Some(topic) = state.repo.get_topic_by_description(&description).await? {
        return Ok(Json(existing_topic(topic)));
    }

    match state.repo.create_topic(&description).await {
        Ok(id) => {
            tracing::info!(topic_id = id, "topic created");
            Ok(Json(CreateTopicResponse::Created(TopicWriteResponse {
                status: STATUS_OK.to_string(),
                message: format!("The topic with the ID: {} has been created", id),
                topic: id,
            })))
        }
        Err(RepositoryError::Conflict(_)) => {
            let topic = state
                .repo
                .get_topic_by_description(&description)
                .await?
                .ok_or_else(|| {
                    AppError::Internal("topic conflict reported but no holder found".to_string())
                })?;
            Ok(Json(existing_topic(topic)))
        }
        Err(e) => Err(e.into()),
    }
}

/// update_topic
///
/// [Public Route] Renames a topic. A description held by a *different* topic is a
/// 409 and the target is left unchanged; renaming a topic to its current
/// description succeeds as a no-op.
#[utoipa::path(
    put,
    path = "/topics/{id}",
    params(("id" = i64, Path, description = "Topic ID")),
    request_body = TopicRequest,
    responses(
        (status = 200, description = "Updated", body = TopicWriteResponse),
        (status = 400, description = "Invalid description", body = crate::error::ErrorBody),
        (status = 404, description = "Not Found", body = crate::error::ErrorBody),
        (status = 409, description = "Description already taken", body = crate::error::ErrorBody)
    )
)]
pub async fn update_topic(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Json(payload): Json<TopicRequest>,
) -> AppResult<Json<TopicWriteResponse>> {
    let id = parse_id(&raw_id, TOPIC_NOT_FOUND)?;
    payload.validate()?;
    let description = payload.description;

    if state.repo.get_topic_by_id(id).await?.is_none() {
        return Err(AppError::NotFound(TOPIC_NOT_FOUND.to_string()));
    }

    if let Some(holder) = state.repo.get_topic_by_description(&description).await? {
        if holder.id != id {
            return Err(AppError::Conflict(DESCRIPTION_TAKEN.to_string()));
        }
    }

    // The store may still report a conflict if another request claimed the
    // description after the lookup above.
    if !state.repo.update_topic(id, &description).await? {
        return Err(AppError::NotFound(TOPIC_NOT_FOUND.to_string()));
    }

    tracing::info!(topic_id = id, "topic updated");

    Ok(Json(TopicWriteResponse {
        status: STATUS_OK.to_string(),
        message: format!("The topic with the ID: {} has been updated", id),
        topic: id,
    }))
}
