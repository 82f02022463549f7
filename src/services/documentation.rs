use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the planning poker backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::room_stream,
        crate::routes::room::create_room,
        crate::routes::room::join_room,
        crate::routes::room::current_snapshot,
        crate::routes::room::update_profile,
        crate::routes::room::leave_room,
        crate::routes::room::kick_player,
        crate::routes::room::update_room_name,
        crate::routes::room::update_settings,
        crate::routes::room::set_celebrations,
        crate::routes::room::set_emojis,
        crate::routes::room::update_deck,
        crate::routes::room::send_reaction,
        crate::routes::room::send_emoji,
        crate::routes::story::list_stories,
        crate::routes::story::add_story,
        crate::routes::story::update_story,
        crate::routes::story::delete_story,
        crate::routes::story::activate_story,
        crate::routes::story::complete_story,
        crate::routes::vote::submit_vote,
        crate::routes::vote::remove_vote,
        crate::routes::vote::reveal_votes,
        crate::routes::vote::reset_votes,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dao::models::StoryStatus,
            crate::dto::room::RoomSummary,
            crate::dto::room::PlayerSummary,
            crate::dto::room::RoomSnapshot,
            crate::dto::story::StorySummary,
            crate::dto::vote::VoteTallyResponse,
            crate::dto::sse::VotesRevealedEvent,
            crate::dto::sse::VoteSubmittedEvent,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "room", description = "Room membership and settings"),
        (name = "story", description = "Story backlog and lifecycle"),
        (name = "vote", description = "Vote ledger operations"),
        (name = "sse", description = "Server-sent events stream"),
    )
)]
pub struct ApiDoc;
