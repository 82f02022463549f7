use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::dao::models::StoryStatus;

/// Wire-level names of every event published on a room channel.
///
/// This is the contract shared by the server-side emitters and the
/// client-side reconciler; both sides reference these constants instead of
/// repeating string literals.
pub mod names {
    /// A player joined the room.
    pub const PLAYER_JOINED: &str = "player-joined";
    /// A player changed name or avatar.
    pub const PLAYER_UPDATED: &str = "player-updated";
    /// The host removed a player.
    pub const PLAYER_KICKED: &str = "player-kicked";
    /// A player left on their own.
    pub const PLAYER_LEFT: &str = "player-left";
    /// Host privileges moved to another player.
    pub const HOST_TRANSFERRED: &str = "host-transferred";
    /// A story was added to the backlog.
    pub const STORY_ADDED: &str = "story-added";
    /// A story's title or description changed.
    pub const STORY_UPDATED: &str = "story-updated";
    /// A different story became the room's estimation subject.
    pub const ACTIVE_STORY_CHANGED: &str = "active-story-changed";
    /// The active story was completed and scored.
    pub const STORY_COMPLETED: &str = "story-completed";
    /// A story was deleted.
    pub const STORY_DELETED: &str = "story-deleted";
    /// A vote was cast or overwritten.
    pub const VOTE_SUBMITTED: &str = "vote-submitted";
    /// A vote was retracted.
    pub const VOTE_REMOVED: &str = "vote-removed";
    /// Vote values became visible; payload carries the full authoritative list.
    pub const VOTES_REVEALED: &str = "votes-revealed";
    /// All votes for the story were discarded.
    pub const VOTES_RESET: &str = "votes-reset";
    /// The room switched decks.
    pub const DECK_UPDATED: &str = "deck-updated";
    /// Auto-reveal setting changed.
    pub const ROOM_SETTINGS_UPDATED: &str = "room-settings-updated";
    /// The room was renamed.
    pub const ROOM_NAME_UPDATED: &str = "room-name-updated";
    /// Celebrations toggle changed.
    pub const CELEBRATIONS_ENABLED_UPDATED: &str = "celebrations-enabled-updated";
    /// Emoji toggle changed.
    pub const EMOJIS_ENABLED_UPDATED: &str = "emojis-enabled-updated";
    /// Ephemeral reaction aimed at a player.
    pub const PLAYER_REACTION: &str = "player-reaction";
    /// Ephemeral emoji broadcast to the room.
    pub const EMOJI_SENT: &str = "emoji-sent";
    /// Bus presence primitive: a subscriber came online.
    pub const MEMBER_ADDED: &str = "member-added";
    /// Bus presence primitive: a subscriber went offline.
    pub const MEMBER_REMOVED: &str = "member-removed";
}

#[derive(Clone, Debug)]
/// Dispatched payload carried across a room's SSE channel.
pub struct ServerEvent {
    /// Event name, when the message is a named event.
    pub event: Option<String>,
    /// Serialized JSON payload.
    pub data: String,
}

impl ServerEvent {
    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Broadcast when a player joins the room.
pub struct PlayerJoinedEvent {
    pub player_id: Uuid,
    pub player_name: String,
    pub avatar_style: String,
    pub avatar_seed: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Broadcast when a player updates their profile.
pub struct PlayerUpdatedEvent {
    pub id: Uuid,
    pub name: String,
    pub avatar_style: String,
    pub avatar_seed: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Broadcast when the host removes a player. The name is captured before the
/// row is deleted.
pub struct PlayerKickedEvent {
    pub player_id: Uuid,
    pub player_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Broadcast when a player leaves the room.
pub struct PlayerLeftEvent {
    pub player_id: Uuid,
    pub player_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Broadcast when host privileges move to another player.
pub struct HostTransferredEvent {
    pub new_host_id: Uuid,
    pub old_host_id: Uuid,
    pub new_host_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Broadcast when a story enters the backlog.
pub struct StoryAddedEvent {
    pub id: Uuid,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Broadcast when a story's content changes.
pub struct StoryUpdatedEvent {
    pub id: Uuid,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Broadcast when a story becomes the room's estimation subject.
pub struct ActiveStoryChangedEvent {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: StoryStatus,
    pub votes_revealed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Broadcast when the active story is completed and scored.
pub struct StoryCompletedEvent {
    pub id: Uuid,
    pub final_score: Option<f64>,
    pub status: StoryStatus,
    /// Always true: every client clears its current-story view.
    pub reset_current_story: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Broadcast when a story is removed from the backlog.
pub struct StoryDeletedEvent {
    pub id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Broadcast after every vote upsert, carrying the running tally.
pub struct VoteSubmittedEvent {
    pub player_id: Uuid,
    pub player_name: String,
    /// Card label. Clients keep it hidden until votes are revealed.
    pub value: String,
    pub total_votes: u64,
    pub total_players: u64,
    pub is_complete: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Broadcast when a player retracts a vote.
pub struct VoteRemovedEvent {
    pub player_id: Uuid,
    pub story_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// One entry of a revealed vote list.
pub struct RevealedVote {
    pub player_id: Uuid,
    pub player_name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Broadcast at reveal time with the complete vote list as stored. A player
/// absent from `votes` did not vote; this is a replacement, not a delta.
pub struct VotesRevealedEvent {
    pub story_id: Uuid,
    pub votes: Vec<RevealedVote>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Broadcast when all votes for a story are discarded.
pub struct VotesResetEvent {
    pub story_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Broadcast when the room switches decks.
pub struct DeckUpdatedEvent {
    pub deck_type: String,
    pub deck: Vec<String>,
    pub deck_theme: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Broadcast when the auto-reveal setting changes.
pub struct RoomSettingsUpdatedEvent {
    pub auto_reveal_votes: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Broadcast when the room is renamed.
pub struct RoomNameUpdatedEvent {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Broadcast when the celebrations toggle changes.
pub struct CelebrationsEnabledUpdatedEvent {
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Broadcast when the emoji toggle changes.
pub struct EmojisEnabledUpdatedEvent {
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Ephemeral reaction aimed at a specific player. Never persisted.
pub struct PlayerReactionEvent {
    pub from_player_id: Uuid,
    pub to_player_id: Uuid,
    pub emoji: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Ephemeral emoji broadcast to the whole room. Never persisted.
pub struct EmojiSentEvent {
    pub emoji: String,
    pub sender: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Presence primitive emitted by the bus when a subscriber comes online.
pub struct MemberAddedEvent {
    pub player_id: Uuid,
    pub player_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Presence primitive emitted by the bus when a subscriber goes offline.
pub struct MemberRemovedEvent {
    pub player_id: Uuid,
}
