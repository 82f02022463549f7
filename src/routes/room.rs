use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header::SET_COOKIE},
    response::AppendHeaders,
    routing::{post, put},
};
use validator::Validate;

use crate::{
    dto::room::{
        CreateRoomRequest, EmojiRequest, JoinRoomRequest, JoinedRoomResponse, KickPlayerRequest,
        LeaveRoomRequest, PlayerSummary, ReactionRequest, RoomSnapshot, RoomSummary, ToggleRequest,
        UpdateDeckRequest, UpdateProfileRequest, UpdateRoomNameRequest, UpdateSettingsRequest,
    },
    error::AppError,
    services::room_service,
    session::{self, SessionContext},
    state::SharedState,
};

/// Room membership and settings endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/rooms", post(create_room))
        .route("/rooms/join", post(join_room))
        .route("/rooms/current", axum::routing::get(current_snapshot))
        .route("/rooms/leave", post(leave_room))
        .route("/rooms/kick", post(kick_player))
        .route("/rooms/name", put(update_room_name))
        .route("/rooms/settings", put(update_settings))
        .route("/rooms/celebrations", put(set_celebrations))
        .route("/rooms/emojis", put(set_emojis))
        .route("/rooms/deck", put(update_deck))
        .route("/players/me", put(update_profile))
        .route("/reactions", post(send_reaction))
        .route("/emojis", post(send_emoji))
}

type SessionCookies = AppendHeaders<[(axum::http::HeaderName, String); 3]>;

/// Cookies carrying the session identity, attached on create and join.
fn session_cookies(response: &JoinedRoomResponse) -> SessionCookies {
    // Cookie values must stay header-safe; the name is informational only.
    let safe_name: String = response
        .player
        .name
        .chars()
        .filter(|c| c.is_ascii_graphic() && *c != ';' && *c != ',')
        .collect();
    AppendHeaders([
        (
            SET_COOKIE,
            format!(
                "{}={}; Path=/; SameSite=Lax",
                session::PLAYER_COOKIE,
                response.player.id
            ),
        ),
        (
            SET_COOKIE,
            format!(
                "{}={}; Path=/; SameSite=Lax",
                session::ROOM_COOKIE,
                response.room.id
            ),
        ),
        (
            SET_COOKIE,
            format!(
                "{}={}; Path=/; SameSite=Lax",
                session::NAME_COOKIE,
                safe_name
            ),
        ),
    ])
}

#[utoipa::path(
    post,
    path = "/rooms",
    tag = "room",
    request_body = CreateRoomRequest,
    responses((status = 200, description = "Room created; session cookies attached", body = JoinedRoomResponse))
)]
/// Create a fresh room and become its host.
pub async fn create_room(
    State(state): State<SharedState>,
    Json(payload): Json<CreateRoomRequest>,
) -> Result<(SessionCookies, Json<JoinedRoomResponse>), AppError> {
    payload.validate()?;
    let response = room_service::create_room(&state, payload).await?;
    Ok((session_cookies(&response), Json(response)))
}

#[utoipa::path(
    post,
    path = "/rooms/join",
    tag = "room",
    request_body = JoinRoomRequest,
    responses((status = 200, description = "Joined the room; session cookies attached", body = JoinedRoomResponse))
)]
/// Join an existing room by its join code.
pub async fn join_room(
    State(state): State<SharedState>,
    Json(payload): Json<JoinRoomRequest>,
) -> Result<(SessionCookies, Json<JoinedRoomResponse>), AppError> {
    payload.validate()?;
    let response = room_service::join_room(&state, payload).await?;
    Ok((session_cookies(&response), Json(response)))
}

#[utoipa::path(
    get,
    path = "/rooms/current",
    tag = "room",
    responses((status = 200, description = "Full snapshot of the caller's room", body = RoomSnapshot))
)]
/// Full-room snapshot used to seed and resync the client view.
pub async fn current_snapshot(
    State(state): State<SharedState>,
    ctx: SessionContext,
) -> Result<Json<RoomSnapshot>, AppError> {
    Ok(Json(room_service::current_snapshot(&state, ctx).await?))
}

#[utoipa::path(
    put,
    path = "/players/me",
    tag = "room",
    request_body = UpdateProfileRequest,
    responses((status = 200, description = "Profile updated", body = PlayerSummary))
)]
/// Update the caller's display name and avatar.
pub async fn update_profile(
    State(state): State<SharedState>,
    ctx: SessionContext,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<PlayerSummary>, AppError> {
    payload.validate()?;
    Ok(Json(
        room_service::update_profile(&state, ctx, payload).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/rooms/leave",
    tag = "room",
    request_body = LeaveRoomRequest,
    responses((status = 204, description = "Left the room"))
)]
/// Leave the room; a departing host must designate a successor unless alone.
pub async fn leave_room(
    State(state): State<SharedState>,
    ctx: SessionContext,
    Json(payload): Json<LeaveRoomRequest>,
) -> Result<StatusCode, AppError> {
    room_service::leave_room(&state, ctx, payload).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/rooms/kick",
    tag = "room",
    request_body = KickPlayerRequest,
    responses((status = 204, description = "Player removed"))
)]
/// Host-only: remove a player from the room.
pub async fn kick_player(
    State(state): State<SharedState>,
    ctx: SessionContext,
    Json(payload): Json<KickPlayerRequest>,
) -> Result<StatusCode, AppError> {
    room_service::kick_player(&state, ctx, payload).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/rooms/name",
    tag = "room",
    request_body = UpdateRoomNameRequest,
    responses((status = 200, description = "Room renamed", body = RoomSummary))
)]
/// Host-only: rename the room.
pub async fn update_room_name(
    State(state): State<SharedState>,
    ctx: SessionContext,
    Json(payload): Json<UpdateRoomNameRequest>,
) -> Result<Json<RoomSummary>, AppError> {
    payload.validate()?;
    Ok(Json(
        room_service::update_room_name(&state, ctx, payload).await?,
    ))
}

#[utoipa::path(
    put,
    path = "/rooms/settings",
    tag = "room",
    request_body = UpdateSettingsRequest,
    responses((status = 200, description = "Settings updated", body = RoomSummary))
)]
/// Host-only: change the auto-reveal setting.
pub async fn update_settings(
    State(state): State<SharedState>,
    ctx: SessionContext,
    Json(payload): Json<UpdateSettingsRequest>,
) -> Result<Json<RoomSummary>, AppError> {
    Ok(Json(
        room_service::update_settings(&state, ctx, payload).await?,
    ))
}

#[utoipa::path(
    put,
    path = "/rooms/celebrations",
    tag = "room",
    request_body = ToggleRequest,
    responses((status = 200, description = "Celebrations toggled", body = RoomSummary))
)]
/// Host-only: toggle consensus celebrations.
pub async fn set_celebrations(
    State(state): State<SharedState>,
    ctx: SessionContext,
    Json(payload): Json<ToggleRequest>,
) -> Result<Json<RoomSummary>, AppError> {
    Ok(Json(
        room_service::set_celebrations(&state, ctx, payload).await?,
    ))
}

#[utoipa::path(
    put,
    path = "/rooms/emojis",
    tag = "room",
    request_body = ToggleRequest,
    responses((status = 200, description = "Emoji messages toggled", body = RoomSummary))
)]
/// Host-only: toggle ephemeral emoji messages.
pub async fn set_emojis(
    State(state): State<SharedState>,
    ctx: SessionContext,
    Json(payload): Json<ToggleRequest>,
) -> Result<Json<RoomSummary>, AppError> {
    Ok(Json(room_service::set_emojis(&state, ctx, payload).await?))
}

#[utoipa::path(
    put,
    path = "/rooms/deck",
    tag = "room",
    request_body = UpdateDeckRequest,
    responses((status = 200, description = "Deck updated", body = RoomSummary))
)]
/// Host-only: switch to a deck preset or a custom card list.
pub async fn update_deck(
    State(state): State<SharedState>,
    ctx: SessionContext,
    Json(payload): Json<UpdateDeckRequest>,
) -> Result<Json<RoomSummary>, AppError> {
    payload.validate()?;
    Ok(Json(
        room_service::update_deck(&state, ctx, payload).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/reactions",
    tag = "room",
    request_body = ReactionRequest,
    responses((status = 202, description = "Reaction relayed"))
)]
/// Relay an ephemeral reaction to another player.
pub async fn send_reaction(
    State(state): State<SharedState>,
    ctx: SessionContext,
    Json(payload): Json<ReactionRequest>,
) -> Result<StatusCode, AppError> {
    room_service::send_reaction(&state, ctx, payload).await?;
    Ok(StatusCode::ACCEPTED)
}

#[utoipa::path(
    post,
    path = "/emojis",
    tag = "room",
    request_body = EmojiRequest,
    responses((status = 202, description = "Emoji relayed"))
)]
/// Relay an ephemeral emoji to the whole room.
pub async fn send_emoji(
    State(state): State<SharedState>,
    ctx: SessionContext,
    Json(payload): Json<EmojiRequest>,
) -> Result<StatusCode, AppError> {
    room_service::send_emoji(&state, ctx, payload).await?;
    Ok(StatusCode::ACCEPTED)
}
