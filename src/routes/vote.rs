use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, post},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        sse::RevealedVote,
        vote::{SubmitVoteRequest, VoteTallyResponse},
    },
    error::AppError,
    services::vote_service,
    session::SessionContext,
    state::SharedState,
};

/// Vote ledger endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/votes", post(submit_vote))
        .route("/votes/{story_id}", delete(remove_vote))
        .route("/stories/{id}/reveal", post(reveal_votes))
        .route("/stories/{id}/reset", post(reset_votes))
}

#[utoipa::path(
    post,
    path = "/votes",
    tag = "vote",
    request_body = SubmitVoteRequest,
    responses(
        (status = 200, description = "Vote recorded; tally returned", body = VoteTallyResponse),
        (status = 409, description = "Story is not the active one"),
        (status = 422, description = "Value is not a card of the deck")
    )
)]
/// Cast or overwrite the caller's vote on the active story.
pub async fn submit_vote(
    State(state): State<SharedState>,
    ctx: SessionContext,
    Json(payload): Json<SubmitVoteRequest>,
) -> Result<Json<VoteTallyResponse>, AppError> {
    payload.validate()?;
    Ok(Json(
        vote_service::submit_vote(&state, ctx, payload).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/votes/{story_id}",
    tag = "vote",
    params(("story_id" = Uuid, Path, description = "Story whose vote to retract")),
    responses((status = 204, description = "Vote retracted"))
)]
/// Retract the caller's vote, regardless of story state.
pub async fn remove_vote(
    State(state): State<SharedState>,
    ctx: SessionContext,
    Path(story_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    vote_service::remove_vote(&state, ctx, story_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/stories/{id}/reveal",
    tag = "vote",
    params(("id" = Uuid, Path, description = "Story whose votes to reveal")),
    responses((status = 200, description = "Votes revealed; the full list is returned", body = [RevealedVote]))
)]
/// Host-only: make vote values visible to everyone.
pub async fn reveal_votes(
    State(state): State<SharedState>,
    ctx: SessionContext,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<RevealedVote>>, AppError> {
    Ok(Json(vote_service::reveal_votes(&state, ctx, id).await?))
}

#[utoipa::path(
    post,
    path = "/stories/{id}/reset",
    tag = "vote",
    params(("id" = Uuid, Path, description = "Story whose votes to discard")),
    responses((status = 204, description = "Votes discarded and hidden"))
)]
/// Host-only: discard the story's votes and start a fresh round.
pub async fn reset_votes(
    State(state): State<SharedState>,
    ctx: SessionContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    vote_service::reset_votes(&state, ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
