//! Room session coordination: create/join, presence-independent membership,
//! host handover, kicks, and room settings.
//!
//! Authorization is re-verified on every call by re-reading the caller's
//! player row from the record store; nothing about privileges is ever cached
//! on the session.

use std::{sync::Arc, time::SystemTime};

use rand::{Rng, rng};
use uuid::Uuid;

use crate::{
    config::DeckPreset,
    dao::{
        models::{PlayerEntity, RoomEntity},
        room_store::RoomStore,
    },
    dto::{
        room::{
            CreateRoomRequest, EmojiRequest, JoinRoomRequest, JoinedRoomResponse,
            KickPlayerRequest, LeaveRoomRequest, PlayerSummary, ReactionRequest, RoomSnapshot,
            RoomSummary, ToggleRequest, UpdateDeckRequest, UpdateProfileRequest,
            UpdateRoomNameRequest, UpdateSettingsRequest, VoteStatus,
        },
        validation::{JOIN_CODE_ALPHABET, JOIN_CODE_LENGTH},
    },
    error::ServiceError,
    services::sse_events,
    session::SessionContext,
    state::SharedState,
};

/// Fallback avatar style used when the client does not pick one.
const DEFAULT_AVATAR_STYLE: &str = "bottts";
/// Attempts made to find an unclaimed join code before giving up.
const JOIN_CODE_ATTEMPTS: usize = 32;

/// Look the caller's room up, failing with `NotFound` when it is gone.
pub(crate) async fn require_room(
    store: &Arc<dyn RoomStore>,
    room_id: Uuid,
) -> Result<RoomEntity, ServiceError> {
    store
        .find_room(room_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("room `{room_id}` not found")))
}

/// Re-read the caller's player row; the session is only as good as that row.
pub(crate) async fn require_member(
    store: &Arc<dyn RoomStore>,
    ctx: SessionContext,
) -> Result<PlayerEntity, ServiceError> {
    store
        .find_player(ctx.room_id, ctx.player_id)
        .await?
        .ok_or_else(|| {
            ServiceError::Unauthenticated("session does not resolve to a room member".into())
        })
}

/// Like [`require_member`], additionally demanding the host flag.
pub(crate) async fn require_host(
    store: &Arc<dyn RoomStore>,
    ctx: SessionContext,
) -> Result<PlayerEntity, ServiceError> {
    let player = require_member(store, ctx).await?;
    if !player.is_host {
        return Err(ServiceError::Unauthorized(
            "this action is reserved to the room host".into(),
        ));
    }
    Ok(player)
}

fn random_join_code() -> String {
    let mut generator = rng();
    (0..JOIN_CODE_LENGTH)
        .map(|_| {
            let index = generator.random_range(0..JOIN_CODE_ALPHABET.len());
            JOIN_CODE_ALPHABET[index] as char
        })
        .collect()
}

async fn allocate_join_code(store: &Arc<dyn RoomStore>) -> Result<String, ServiceError> {
    for _ in 0..JOIN_CODE_ATTEMPTS {
        let code = random_join_code();
        if store.find_room_by_code(code.clone()).await?.is_none() {
            return Ok(code);
        }
    }
    Err(ServiceError::InvalidState(
        "could not allocate a unique join code".into(),
    ))
}

fn build_player(
    room_id: Uuid,
    name: &str,
    is_host: bool,
    avatar_style: Option<String>,
    avatar_seed: Option<String>,
) -> PlayerEntity {
    PlayerEntity {
        id: Uuid::new_v4(),
        room_id,
        name: name.trim().to_string(),
        is_host,
        avatar_style: avatar_style.unwrap_or_else(|| DEFAULT_AVATAR_STYLE.to_string()),
        avatar_seed: avatar_seed.unwrap_or_else(|| Uuid::new_v4().simple().to_string()),
        created_at: SystemTime::now(),
    }
}

/// Open a new room; the caller becomes its host.
pub async fn create_room(
    state: &SharedState,
    request: CreateRoomRequest,
) -> Result<JoinedRoomResponse, ServiceError> {
    let store = state.require_room_store().await?;

    let preset: &DeckPreset = match &request.deck_type {
        Some(deck_type) => state.config().preset(deck_type).ok_or_else(|| {
            ServiceError::InvalidInput(format!("unknown deck preset `{deck_type}`"))
        })?,
        None => state.config().default_preset(),
    };

    let code = allocate_join_code(&store).await?;
    let now = SystemTime::now();
    let room = RoomEntity {
        id: Uuid::new_v4(),
        code,
        name: request.room_name.trim().to_string(),
        deck_type: preset.deck_type.clone(),
        deck: preset.encoded_cards(),
        deck_theme: preset.theme.clone(),
        active_story_id: None,
        auto_reveal_votes: true,
        celebrations_enabled: true,
        emojis_enabled: true,
        created_at: now,
        updated_at: now,
    };
    let host = build_player(
        room.id,
        &request.player_name,
        true,
        request.avatar_style,
        request.avatar_seed,
    );

    store.insert_room(room.clone()).await?;
    store.insert_player(host.clone()).await?;

    Ok(JoinedRoomResponse {
        room: room.into(),
        player: PlayerSummary::from_entity(host, false),
    })
}

/// Join an existing room by code.
pub async fn join_room(
    state: &SharedState,
    request: JoinRoomRequest,
) -> Result<JoinedRoomResponse, ServiceError> {
    let store = state.require_room_store().await?;

    let code = request.normalized_code();
    let Some(room) = store.find_room_by_code(code.clone()).await? else {
        return Err(ServiceError::NotFound(format!(
            "no room with join code `{code}`"
        )));
    };

    let player = build_player(
        room.id,
        &request.player_name,
        false,
        request.avatar_style,
        request.avatar_seed,
    );
    store.insert_player(player.clone()).await?;
    sse_events::broadcast_player_joined(state, &player);

    Ok(JoinedRoomResponse {
        room: room.into(),
        player: PlayerSummary::from_entity(player, false),
    })
}

/// Full-room snapshot used to seed the client view at page load and to
/// resync after missed events.
pub async fn current_snapshot(
    state: &SharedState,
    ctx: SessionContext,
) -> Result<RoomSnapshot, ServiceError> {
    let store = state.require_room_store().await?;
    let room = require_room(&store, ctx.room_id).await?;
    require_member(&store, ctx).await?;

    let online = state.bus().online_members(ctx.room_id);
    let players: Vec<PlayerSummary> = store
        .list_players(ctx.room_id)
        .await?
        .into_iter()
        .map(|player| {
            let is_online = online.contains(&player.id);
            PlayerSummary::from_entity(player, is_online)
        })
        .collect();

    let stories = store.list_stories(ctx.room_id).await?;

    let votes = match room.active_story_id {
        Some(story_id) => {
            let revealed = stories
                .iter()
                .find(|story| story.id == story_id)
                .map(|story| story.votes_revealed)
                .unwrap_or(false);
            store
                .list_votes(story_id)
                .await?
                .into_iter()
                .map(|vote| VoteStatus {
                    player_id: vote.player_id,
                    has_voted: true,
                    value: revealed.then_some(vote.value),
                })
                .collect()
        }
        None => Vec::new(),
    };

    Ok(RoomSnapshot {
        room: room.into(),
        players,
        stories: stories.into_iter().map(Into::into).collect(),
        votes,
    })
}

/// Update the caller's display name and avatar.
pub async fn update_profile(
    state: &SharedState,
    ctx: SessionContext,
    request: UpdateProfileRequest,
) -> Result<PlayerSummary, ServiceError> {
    let store = state.require_room_store().await?;
    let mut player = require_member(&store, ctx).await?;

    if let Some(name) = request.name {
        player.name = name.trim().to_string();
    }
    if let Some(style) = request.avatar_style {
        player.avatar_style = style;
    }
    if let Some(seed) = request.avatar_seed {
        player.avatar_seed = seed;
    }
    store.update_player(player.clone()).await?;
    sse_events::broadcast_player_updated(state, &player);

    let online = state.bus().online_members(ctx.room_id).contains(&player.id);
    Ok(PlayerSummary::from_entity(player, online))
}

/// Leave the room.
///
/// Non-host: plain removal. Host with others remaining: a successor must be
/// designated and the host flag flips atomically before the old row goes.
/// Host alone: the whole room is deleted, cascading players, stories, and
/// votes, and the room's runtime state is torn down.
pub async fn leave_room(
    state: &SharedState,
    ctx: SessionContext,
    request: LeaveRoomRequest,
) -> Result<(), ServiceError> {
    let store = state.require_room_store().await?;
    let gate = state.room_gate(ctx.room_id);
    let _guard = gate.lock().await;

    require_room(&store, ctx.room_id).await?;
    let caller = require_member(&store, ctx).await?;
    let players = store.list_players(ctx.room_id).await?;
    let remaining: Vec<&PlayerEntity> =
        players.iter().filter(|player| player.id != caller.id).collect();

    if !caller.is_host {
        store.remove_player(ctx.room_id, caller.id).await?;
        sse_events::broadcast_player_left(state, ctx.room_id, caller.id, caller.name);
        return Ok(());
    }

    if remaining.is_empty() {
        store.delete_room(ctx.room_id).await?;
        state.drop_room_state(ctx.room_id);
        return Ok(());
    }

    // Validate the handover completely before touching any row.
    let new_host_id = request.new_host_id.ok_or_else(|| {
        ServiceError::InvalidState(
            "the host must designate a successor before leaving".into(),
        )
    })?;
    if !remaining.iter().any(|player| player.id == new_host_id) {
        return Err(ServiceError::InvalidState(
            "the designated successor is not a member of this room".into(),
        ));
    }

    if !store
        .transfer_host(ctx.room_id, caller.id, new_host_id)
        .await?
    {
        return Err(ServiceError::InvalidState(
            "host handover failed; the room roster changed".into(),
        ));
    }
    store.remove_player(ctx.room_id, caller.id).await?;

    let new_host = store
        .find_player(ctx.room_id, new_host_id)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!("player `{new_host_id}` not found"))
        })?;
    sse_events::broadcast_host_transferred(state, ctx.room_id, caller.id, &new_host);
    sse_events::broadcast_player_left(state, ctx.room_id, caller.id, caller.name);
    Ok(())
}

/// Host-only: remove another player, cascading their votes.
pub async fn kick_player(
    state: &SharedState,
    ctx: SessionContext,
    request: KickPlayerRequest,
) -> Result<(), ServiceError> {
    let store = state.require_room_store().await?;
    let gate = state.room_gate(ctx.room_id);
    let _guard = gate.lock().await;

    let caller = require_host(&store, ctx).await?;
    if request.player_id == caller.id {
        return Err(ServiceError::InvalidInput(
            "the host cannot kick themselves; leave the room instead".into(),
        ));
    }

    // The name must be captured before the row is deleted.
    let victim = store
        .find_player(ctx.room_id, request.player_id)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!("player `{}` not found", request.player_id))
        })?;

    store.remove_player(ctx.room_id, victim.id).await?;
    sse_events::broadcast_player_kicked(state, ctx.room_id, victim.id, victim.name);
    Ok(())
}

/// Host-only: rename the room.
pub async fn update_room_name(
    state: &SharedState,
    ctx: SessionContext,
    request: UpdateRoomNameRequest,
) -> Result<RoomSummary, ServiceError> {
    let store = state.require_room_store().await?;
    require_host(&store, ctx).await?;

    let mut room = require_room(&store, ctx.room_id).await?;
    room.name = request.name.trim().to_string();
    room.updated_at = SystemTime::now();
    store.update_room(room.clone()).await?;
    sse_events::broadcast_room_name_updated(state, &room);
    Ok(room.into())
}

/// Host-only: change the auto-reveal setting.
pub async fn update_settings(
    state: &SharedState,
    ctx: SessionContext,
    request: UpdateSettingsRequest,
) -> Result<RoomSummary, ServiceError> {
    let store = state.require_room_store().await?;
    require_host(&store, ctx).await?;

    let mut room = require_room(&store, ctx.room_id).await?;
    room.auto_reveal_votes = request.auto_reveal_votes;
    room.updated_at = SystemTime::now();
    store.update_room(room.clone()).await?;
    sse_events::broadcast_room_settings_updated(state, &room);
    Ok(room.into())
}

/// Host-only: toggle consensus celebrations.
pub async fn set_celebrations(
    state: &SharedState,
    ctx: SessionContext,
    request: ToggleRequest,
) -> Result<RoomSummary, ServiceError> {
    let store = state.require_room_store().await?;
    require_host(&store, ctx).await?;

    let mut room = require_room(&store, ctx.room_id).await?;
    room.celebrations_enabled = request.enabled;
    room.updated_at = SystemTime::now();
    store.update_room(room.clone()).await?;
    sse_events::broadcast_celebrations_enabled(state, &room);
    Ok(room.into())
}

/// Host-only: toggle ephemeral emoji messages.
pub async fn set_emojis(
    state: &SharedState,
    ctx: SessionContext,
    request: ToggleRequest,
) -> Result<RoomSummary, ServiceError> {
    let store = state.require_room_store().await?;
    require_host(&store, ctx).await?;

    let mut room = require_room(&store, ctx.room_id).await?;
    room.emojis_enabled = request.enabled;
    room.updated_at = SystemTime::now();
    store.update_room(room.clone()).await?;
    sse_events::broadcast_emojis_enabled(state, &room);
    Ok(room.into())
}

/// Host-only: switch decks, either to a configured preset or to an explicit
/// custom card list.
pub async fn update_deck(
    state: &SharedState,
    ctx: SessionContext,
    request: UpdateDeckRequest,
) -> Result<RoomSummary, ServiceError> {
    let store = state.require_room_store().await?;
    require_host(&store, ctx).await?;

    let mut room = require_room(&store, ctx.room_id).await?;
    match request.deck {
        Some(cards) => {
            room.deck = serde_json::to_string(&cards)
                .map_err(|err| ServiceError::InvalidInput(format!("unencodable deck: {err}")))?;
            room.deck_type = request.deck_type;
            room.deck_theme = request.deck_theme;
        }
        None => {
            let preset = state.config().preset(&request.deck_type).ok_or_else(|| {
                ServiceError::InvalidInput(format!(
                    "unknown deck preset `{}`",
                    request.deck_type
                ))
            })?;
            room.deck = preset.encoded_cards();
            room.deck_type = preset.deck_type.clone();
            room.deck_theme = request.deck_theme.or_else(|| preset.theme.clone());
        }
    }
    room.updated_at = SystemTime::now();
    store.update_room(room.clone()).await?;
    sse_events::broadcast_deck_updated(state, &room);
    Ok(room.into())
}

/// Relay an ephemeral reaction to another player. Nothing is persisted.
pub async fn send_reaction(
    state: &SharedState,
    ctx: SessionContext,
    request: ReactionRequest,
) -> Result<(), ServiceError> {
    let store = state.require_room_store().await?;
    let caller = require_member(&store, ctx).await?;

    if store
        .find_player(ctx.room_id, request.to_player_id)
        .await?
        .is_none()
    {
        return Err(ServiceError::NotFound(format!(
            "player `{}` not found",
            request.to_player_id
        )));
    }

    sse_events::broadcast_player_reaction(
        state,
        ctx.room_id,
        caller.id,
        request.to_player_id,
        request.emoji,
    );
    Ok(())
}

/// Relay an ephemeral emoji to the whole room. Honours the room toggle.
pub async fn send_emoji(
    state: &SharedState,
    ctx: SessionContext,
    request: EmojiRequest,
) -> Result<(), ServiceError> {
    let store = state.require_room_store().await?;
    let caller = require_member(&store, ctx).await?;
    let room = require_room(&store, ctx.room_id).await?;

    if !room.emojis_enabled {
        return Err(ServiceError::InvalidState(
            "emoji messages are disabled in this room".into(),
        ));
    }

    sse_events::broadcast_emoji_sent(state, ctx.room_id, request.emoji, caller.name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AppConfig,
        dao::room_store::memory::MemoryRoomStore,
        dto::validation::validate_join_code,
        state::AppState,
    };

    async fn state_with_store() -> (crate::state::SharedState, Arc<dyn RoomStore>) {
        let state = AppState::new(AppConfig::default());
        let store = MemoryRoomStore::new_shared();
        state.install_room_store(store.clone()).await;
        (state, store)
    }

    fn create_request(room: &str, player: &str) -> CreateRoomRequest {
        CreateRoomRequest {
            room_name: room.into(),
            player_name: player.into(),
            deck_type: None,
            avatar_style: None,
            avatar_seed: None,
        }
    }

    async fn joined(
        state: &crate::state::SharedState,
        code: &str,
        name: &str,
    ) -> JoinedRoomResponse {
        join_room(
            state,
            JoinRoomRequest {
                code: code.into(),
                player_name: name.into(),
                avatar_style: None,
                avatar_seed: None,
            },
        )
        .await
        .unwrap()
    }

    fn ctx_of(response: &JoinedRoomResponse) -> SessionContext {
        SessionContext {
            player_id: response.player.id,
            room_id: response.room.id,
        }
    }

    #[tokio::test]
    async fn create_room_makes_the_caller_host_with_a_valid_code() {
        let (state, _store) = state_with_store().await;
        let response = create_room(&state, create_request("sprint", "ada"))
            .await
            .unwrap();

        assert!(response.player.is_host);
        assert!(validate_join_code(&response.room.code).is_ok());
        assert_eq!(response.room.deck_type, "fibonacci");
        assert!(response.room.deck.contains(&"13".to_string()));
    }

    #[tokio::test]
    async fn unknown_deck_preset_is_rejected() {
        let (state, _store) = state_with_store().await;
        let err = create_room(
            &state,
            CreateRoomRequest {
                deck_type: Some("planets".into()),
                ..create_request("sprint", "ada")
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn join_accepts_lowercase_codes_and_unknown_codes_fail() {
        let (state, _store) = state_with_store().await;
        let created = create_room(&state, create_request("sprint", "ada"))
            .await
            .unwrap();

        let response = joined(&state, &created.room.code.to_lowercase(), "bob").await;
        assert_eq!(response.room.id, created.room.id);
        assert!(!response.player.is_host);

        let err = join_room(
            &state,
            JoinRoomRequest {
                code: "ZZZZZZ".into(),
                player_name: "eve".into(),
                avatar_style: None,
                avatar_seed: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn host_leave_without_successor_fails_and_mutates_nothing() {
        let (state, store) = state_with_store().await;
        let created = create_room(&state, create_request("sprint", "ada"))
            .await
            .unwrap();
        let bob = joined(&state, &created.room.code, "bob").await;
        let _carol = joined(&state, &created.room.code, "carol").await;

        let err = leave_room(&state, ctx_of(&created), LeaveRoomRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));

        // Nothing changed: room alive, three players, host intact.
        let room = store.find_room(created.room.id).await.unwrap().unwrap();
        assert_eq!(room.id, created.room.id);
        let players = store.list_players(created.room.id).await.unwrap();
        assert_eq!(players.len(), 3);
        assert!(
            players
                .iter()
                .any(|player| player.id == created.player.id && player.is_host)
        );

        // A successor outside the room is rejected too.
        let err = leave_room(
            &state,
            ctx_of(&created),
            LeaveRoomRequest {
                new_host_id: Some(Uuid::new_v4()),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));

        // With a valid successor the handover goes through atomically.
        leave_room(
            &state,
            ctx_of(&created),
            LeaveRoomRequest {
                new_host_id: Some(bob.player.id),
            },
        )
        .await
        .unwrap();

        let players = store.list_players(created.room.id).await.unwrap();
        assert_eq!(players.len(), 2);
        let hosts: Vec<_> = players.iter().filter(|player| player.is_host).collect();
        assert_eq!(hosts.len(), 1);
        assert_eq!(hosts[0].id, bob.player.id);
    }

    #[tokio::test]
    async fn host_alone_leaving_deletes_the_room() {
        let (state, store) = state_with_store().await;
        let created = create_room(&state, create_request("sprint", "ada"))
            .await
            .unwrap();

        leave_room(&state, ctx_of(&created), LeaveRoomRequest::default())
            .await
            .unwrap();

        assert!(store.find_room(created.room.id).await.unwrap().is_none());
        assert!(
            store
                .list_players(created.room.id)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn kick_is_host_only_and_removes_the_target() {
        let (state, store) = state_with_store().await;
        let created = create_room(&state, create_request("sprint", "ada"))
            .await
            .unwrap();
        let bob = joined(&state, &created.room.code, "bob").await;

        let err = kick_player(
            &state,
            ctx_of(&bob),
            KickPlayerRequest {
                player_id: created.player.id,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));

        kick_player(
            &state,
            ctx_of(&created),
            KickPlayerRequest {
                player_id: bob.player.id,
            },
        )
        .await
        .unwrap();
        assert!(
            store
                .find_player(created.room.id, bob.player.id)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn deck_update_switches_preset_or_custom_cards() {
        let (state, _store) = state_with_store().await;
        let created = create_room(&state, create_request("sprint", "ada"))
            .await
            .unwrap();

        let room = update_deck(
            &state,
            ctx_of(&created),
            UpdateDeckRequest {
                deck_type: "tshirt".into(),
                deck: None,
                deck_theme: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(room.deck_type, "tshirt");
        assert!(room.deck.contains(&"XL".to_string()));
        assert_eq!(room.deck_theme.as_deref(), Some("fabric"));

        let room = update_deck(
            &state,
            ctx_of(&created),
            UpdateDeckRequest {
                deck_type: "custom".into(),
                deck: Some(vec!["1".into(), "10".into(), "100".into()]),
                deck_theme: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(room.deck, vec!["1", "10", "100"]);
    }

    #[tokio::test]
    async fn emoji_respects_the_room_toggle() {
        let (state, _store) = state_with_store().await;
        let created = create_room(&state, create_request("sprint", "ada"))
            .await
            .unwrap();

        set_emojis(
            &state,
            ctx_of(&created),
            ToggleRequest { enabled: false },
        )
        .await
        .unwrap();

        let err = send_emoji(
            &state,
            ctx_of(&created),
            EmojiRequest { emoji: "🎉".into() },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[tokio::test]
    async fn snapshot_hides_values_until_reveal() {
        let (state, store) = state_with_store().await;
        let created = create_room(&state, create_request("sprint", "ada"))
            .await
            .unwrap();
        let ctx = ctx_of(&created);

        let story = crate::services::story_service::add_story(
            &state,
            ctx,
            crate::dto::story::StoryInput {
                title: "story".into(),
                description: String::new(),
            },
        )
        .await
        .unwrap();
        crate::services::story_service::activate_story(&state, ctx, story.id)
            .await
            .unwrap();
        store
            .upsert_vote(crate::dao::models::VoteEntity {
                player_id: created.player.id,
                story_id: story.id,
                value: "5".into(),
                cast_at: SystemTime::now(),
            })
            .await
            .unwrap();

        let snapshot = current_snapshot(&state, ctx).await.unwrap();
        assert_eq!(snapshot.votes.len(), 1);
        assert!(snapshot.votes[0].has_voted);
        assert_eq!(snapshot.votes[0].value, None);

        crate::services::vote_service::reveal_votes(&state, ctx, story.id)
            .await
            .unwrap();
        let snapshot = current_snapshot(&state, ctx).await.unwrap();
        assert_eq!(snapshot.votes[0].value.as_deref(), Some("5"));
    }
}
