use axum::Router;

use crate::state::SharedState;

/// Swagger UI and OpenAPI document.
pub mod docs;
/// Health check endpoints.
pub mod health;
/// Room membership and settings endpoints.
pub mod room;
/// Server-sent events stream.
pub mod sse;
/// Story backlog endpoints.
pub mod story;
/// Vote ledger endpoints.
pub mod vote;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(sse::router())
        .merge(room::router())
        .merge(story::router())
        .merge(vote::router());

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}
