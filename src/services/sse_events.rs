//! Emitters for the room event catalogue.
//!
//! Publishing is fire-and-forget relative to the store mutation that produced
//! the event: a failed serialization or an empty channel is logged, never
//! surfaced to the mutating caller. Clients recover from missed events via
//! the snapshot resync path.

use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::{
    dao::models::{PlayerEntity, RoomEntity, StoryEntity},
    dto::sse::{
        ActiveStoryChangedEvent, CelebrationsEnabledUpdatedEvent, DeckUpdatedEvent, EmojiSentEvent,
        EmojisEnabledUpdatedEvent, HostTransferredEvent, PlayerJoinedEvent, PlayerKickedEvent,
        PlayerLeftEvent,
        PlayerReactionEvent, PlayerUpdatedEvent, RevealedVote, RoomNameUpdatedEvent,
        RoomSettingsUpdatedEvent, ServerEvent, StoryAddedEvent, StoryCompletedEvent,
        StoryDeletedEvent, StoryUpdatedEvent, VoteRemovedEvent, VoteSubmittedEvent,
        VotesResetEvent, VotesRevealedEvent, names,
    },
    state::SharedState,
};

fn send_room_event(state: &SharedState, room_id: Uuid, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => state.bus().publish(room_id, event),
        Err(err) => warn!(event, error = %err, "failed to serialize room event payload"),
    }
}

/// Announce a freshly joined player.
pub fn broadcast_player_joined(state: &SharedState, player: &PlayerEntity) {
    let payload = PlayerJoinedEvent {
        player_id: player.id,
        player_name: player.name.clone(),
        avatar_style: player.avatar_style.clone(),
        avatar_seed: player.avatar_seed.clone(),
    };
    send_room_event(state, player.room_id, names::PLAYER_JOINED, &payload);
}

/// Announce a profile change.
pub fn broadcast_player_updated(state: &SharedState, player: &PlayerEntity) {
    let payload = PlayerUpdatedEvent {
        id: player.id,
        name: player.name.clone(),
        avatar_style: player.avatar_style.clone(),
        avatar_seed: player.avatar_seed.clone(),
    };
    send_room_event(state, player.room_id, names::PLAYER_UPDATED, &payload);
}

/// Announce that the host removed a player. The name travels in the payload
/// because the row is already gone.
pub fn broadcast_player_kicked(
    state: &SharedState,
    room_id: Uuid,
    player_id: Uuid,
    player_name: String,
) {
    let payload = PlayerKickedEvent {
        player_id,
        player_name,
    };
    send_room_event(state, room_id, names::PLAYER_KICKED, &payload);
}

/// Announce a voluntary departure.
pub fn broadcast_player_left(
    state: &SharedState,
    room_id: Uuid,
    player_id: Uuid,
    player_name: String,
) {
    let payload = PlayerLeftEvent {
        player_id,
        player_name,
    };
    send_room_event(state, room_id, names::PLAYER_LEFT, &payload);
}

/// Announce a host handover.
pub fn broadcast_host_transferred(
    state: &SharedState,
    room_id: Uuid,
    old_host_id: Uuid,
    new_host: &PlayerEntity,
) {
    let payload = HostTransferredEvent {
        new_host_id: new_host.id,
        old_host_id,
        new_host_name: new_host.name.clone(),
    };
    send_room_event(state, room_id, names::HOST_TRANSFERRED, &payload);
}

/// Announce a new backlog story.
pub fn broadcast_story_added(state: &SharedState, story: &StoryEntity) {
    let payload = StoryAddedEvent {
        id: story.id,
        title: story.title.clone(),
        description: story.description.clone(),
    };
    send_room_event(state, story.room_id, names::STORY_ADDED, &payload);
}

/// Announce a story edit.
pub fn broadcast_story_updated(state: &SharedState, story: &StoryEntity) {
    let payload = StoryUpdatedEvent {
        id: story.id,
        title: story.title.clone(),
        description: story.description.clone(),
    };
    send_room_event(state, story.room_id, names::STORY_UPDATED, &payload);
}

/// Announce the new active story.
pub fn broadcast_active_story_changed(state: &SharedState, story: &StoryEntity) {
    let payload = ActiveStoryChangedEvent {
        id: story.id,
        title: story.title.clone(),
        description: story.description.clone(),
        status: story.status,
        votes_revealed: story.votes_revealed,
    };
    send_room_event(state, story.room_id, names::ACTIVE_STORY_CHANGED, &payload);
}

/// Announce a completed story; every client clears its current-story view.
pub fn broadcast_story_completed(state: &SharedState, story: &StoryEntity) {
    let payload = StoryCompletedEvent {
        id: story.id,
        final_score: story.final_score,
        status: story.status,
        reset_current_story: true,
    };
    send_room_event(state, story.room_id, names::STORY_COMPLETED, &payload);
}

/// Announce a deleted story.
pub fn broadcast_story_deleted(state: &SharedState, room_id: Uuid, story_id: Uuid) {
    let payload = StoryDeletedEvent { id: story_id };
    send_room_event(state, room_id, names::STORY_DELETED, &payload);
}

/// Announce a vote upsert with the running tally.
pub fn broadcast_vote_submitted(
    state: &SharedState,
    room_id: Uuid,
    payload: &VoteSubmittedEvent,
) {
    send_room_event(state, room_id, names::VOTE_SUBMITTED, payload);
}

/// Announce a retracted vote.
pub fn broadcast_vote_removed(state: &SharedState, room_id: Uuid, player_id: Uuid, story_id: Uuid) {
    let payload = VoteRemovedEvent {
        player_id,
        story_id,
    };
    send_room_event(state, room_id, names::VOTE_REMOVED, &payload);
}

/// Announce the full authoritative vote list at reveal time.
pub fn broadcast_votes_revealed(
    state: &SharedState,
    room_id: Uuid,
    story_id: Uuid,
    votes: Vec<RevealedVote>,
) {
    let payload = VotesRevealedEvent { story_id, votes };
    send_room_event(state, room_id, names::VOTES_REVEALED, &payload);
}

/// Announce that the story's votes were discarded.
pub fn broadcast_votes_reset(state: &SharedState, room_id: Uuid, story_id: Uuid) {
    let payload = VotesResetEvent { story_id };
    send_room_event(state, room_id, names::VOTES_RESET, &payload);
}

/// Announce a deck switch.
pub fn broadcast_deck_updated(state: &SharedState, room: &RoomEntity) {
    let payload = DeckUpdatedEvent {
        deck_type: room.deck_type.clone(),
        deck: room.deck_labels(),
        deck_theme: room.deck_theme.clone(),
    };
    send_room_event(state, room.id, names::DECK_UPDATED, &payload);
}

/// Announce a change of the auto-reveal setting.
pub fn broadcast_room_settings_updated(state: &SharedState, room: &RoomEntity) {
    let payload = RoomSettingsUpdatedEvent {
        auto_reveal_votes: room.auto_reveal_votes,
    };
    send_room_event(state, room.id, names::ROOM_SETTINGS_UPDATED, &payload);
}

/// Announce a renamed room.
pub fn broadcast_room_name_updated(state: &SharedState, room: &RoomEntity) {
    let payload = RoomNameUpdatedEvent {
        name: room.name.clone(),
    };
    send_room_event(state, room.id, names::ROOM_NAME_UPDATED, &payload);
}

/// Announce the celebrations toggle.
pub fn broadcast_celebrations_enabled(state: &SharedState, room: &RoomEntity) {
    let payload = CelebrationsEnabledUpdatedEvent {
        enabled: room.celebrations_enabled,
    };
    send_room_event(state, room.id, names::CELEBRATIONS_ENABLED_UPDATED, &payload);
}

/// Announce the emoji toggle.
pub fn broadcast_emojis_enabled(state: &SharedState, room: &RoomEntity) {
    let payload = EmojisEnabledUpdatedEvent {
        enabled: room.emojis_enabled,
    };
    send_room_event(state, room.id, names::EMOJIS_ENABLED_UPDATED, &payload);
}

/// Relay an ephemeral reaction; nothing is persisted.
pub fn broadcast_player_reaction(
    state: &SharedState,
    room_id: Uuid,
    from_player_id: Uuid,
    to_player_id: Uuid,
    emoji: String,
) {
    let payload = PlayerReactionEvent {
        from_player_id,
        to_player_id,
        emoji,
    };
    send_room_event(state, room_id, names::PLAYER_REACTION, &payload);
}

/// Relay an ephemeral emoji; nothing is persisted.
pub fn broadcast_emoji_sent(state: &SharedState, room_id: Uuid, emoji: String, sender: String) {
    let payload = EmojiSentEvent { emoji, sender };
    send_room_event(state, room_id, names::EMOJI_SENT, &payload);
}
