use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::story::{CompleteStoryRequest, StoryInput, StorySummary},
    error::AppError,
    services::story_service,
    session::SessionContext,
    state::SharedState,
};

/// Story backlog and lifecycle endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/stories", get(list_stories).post(add_story))
        .route("/stories/{id}", put(update_story).delete(delete_story))
        .route("/stories/{id}/activate", post(activate_story))
        .route("/stories/{id}/complete", post(complete_story))
}

#[utoipa::path(
    get,
    path = "/stories",
    tag = "story",
    responses((status = 200, description = "Backlog of the caller's room", body = [StorySummary]))
)]
/// List the room's stories in creation order.
pub async fn list_stories(
    State(state): State<SharedState>,
    ctx: SessionContext,
) -> Result<Json<Vec<StorySummary>>, AppError> {
    Ok(Json(story_service::list_stories(&state, ctx).await?))
}

#[utoipa::path(
    post,
    path = "/stories",
    tag = "story",
    request_body = StoryInput,
    responses((status = 200, description = "Story added", body = StorySummary))
)]
/// Host-only: add a story to the backlog.
pub async fn add_story(
    State(state): State<SharedState>,
    ctx: SessionContext,
    Json(payload): Json<StoryInput>,
) -> Result<Json<StorySummary>, AppError> {
    payload.validate()?;
    Ok(Json(story_service::add_story(&state, ctx, payload).await?))
}

#[utoipa::path(
    put,
    path = "/stories/{id}",
    tag = "story",
    params(("id" = Uuid, Path, description = "Story to edit")),
    request_body = StoryInput,
    responses((status = 200, description = "Story updated", body = StorySummary))
)]
/// Host-only: edit a story. Completed stories are immutable.
pub async fn update_story(
    State(state): State<SharedState>,
    ctx: SessionContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<StoryInput>,
) -> Result<Json<StorySummary>, AppError> {
    payload.validate()?;
    Ok(Json(
        story_service::update_story(&state, ctx, id, payload).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/stories/{id}",
    tag = "story",
    params(("id" = Uuid, Path, description = "Story to delete")),
    responses((status = 204, description = "Story deleted"))
)]
/// Host-only: delete a story, cascading its votes.
pub async fn delete_story(
    State(state): State<SharedState>,
    ctx: SessionContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    story_service::delete_story(&state, ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/stories/{id}/activate",
    tag = "story",
    params(("id" = Uuid, Path, description = "Story to make active")),
    responses((status = 200, description = "Story is now the estimation subject", body = StorySummary))
)]
/// Host-only: make a story the room's single active estimation subject.
pub async fn activate_story(
    State(state): State<SharedState>,
    ctx: SessionContext,
    Path(id): Path<Uuid>,
) -> Result<Json<StorySummary>, AppError> {
    Ok(Json(
        story_service::activate_story(&state, ctx, id).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/stories/{id}/complete",
    tag = "story",
    params(("id" = Uuid, Path, description = "Story to complete")),
    request_body = CompleteStoryRequest,
    responses((status = 200, description = "Story completed and scored", body = StorySummary))
)]
/// Host-only: finish the active story, scoring it from the tally or a manual
/// override.
pub async fn complete_story(
    State(state): State<SharedState>,
    ctx: SessionContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<CompleteStoryRequest>,
) -> Result<Json<StorySummary>, AppError> {
    Ok(Json(
        story_service::complete_story(&state, ctx, id, payload).await?,
    ))
}
