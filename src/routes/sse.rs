use std::convert::Infallible;

use axum::{Router, extract::State, response::sse::Sse, routing::get};
use futures::Stream;
use tracing::info;

use crate::{
    error::AppError, services::sse_service, session::SessionContext, state::SharedState,
};

#[utoipa::path(
    get,
    path = "/sse/room",
    tag = "sse",
    responses((status = 200, description = "Room SSE stream", content_type = "text/event-stream", body = String))
)]
/// Stream the caller's room events; subscribing announces presence and
/// disconnecting announces departure.
pub async fn room_stream(
    State(state): State<SharedState>,
    ctx: SessionContext,
) -> Result<Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>>, AppError> {
    let receiver = sse_service::subscribe_room(&state, ctx).await?;
    info!(room_id = %ctx.room_id, player_id = %ctx.player_id, "new room SSE connection");
    Ok(sse_service::to_sse_stream(receiver, state, ctx))
}

/// Configure the SSE endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/sse/room", get(room_stream))
}
