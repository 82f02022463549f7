use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::{
    dao::models::{PlayerEntity, RoomEntity},
    dto::{
        format_system_time,
        story::StorySummary,
        validation::{validate_display_name, validate_join_code},
    },
};

/// Payload used to open a brand-new room; the caller becomes its host.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRoomRequest {
    /// Display name of the room.
    pub room_name: String,
    /// Display name of the host player.
    pub player_name: String,
    /// Deck preset to start with; the configured default when omitted.
    #[serde(default)]
    pub deck_type: Option<String>,
    /// Avatar style identifier; a default is picked when omitted.
    #[serde(default)]
    pub avatar_style: Option<String>,
    /// Avatar seed; a random one is generated when omitted.
    #[serde(default)]
    pub avatar_seed: Option<String>,
}

impl Validate for CreateRoomRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Err(err) = validate_display_name(&self.room_name) {
            errors.add("room_name", err);
        }
        if let Err(err) = validate_display_name(&self.player_name) {
            errors.add("player_name", err);
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Payload used to join an existing room by its code.
#[derive(Debug, Deserialize, ToSchema)]
pub struct JoinRoomRequest {
    /// Six-character join code; matched case-insensitively.
    pub code: String,
    /// Display name of the joining player.
    pub player_name: String,
    /// Avatar style identifier.
    #[serde(default)]
    pub avatar_style: Option<String>,
    /// Avatar seed.
    #[serde(default)]
    pub avatar_seed: Option<String>,
}

impl JoinRoomRequest {
    /// Join codes are stored uppercase; accept whatever casing the user typed.
    pub fn normalized_code(&self) -> String {
        self.code.trim().to_ascii_uppercase()
    }
}

impl Validate for JoinRoomRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Err(err) = validate_join_code(&self.normalized_code()) {
            errors.add("code", err);
        }
        if let Err(err) = validate_display_name(&self.player_name) {
            errors.add("player_name", err);
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Partial profile update for the calling player.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    /// New display name, when changing it.
    #[serde(default)]
    pub name: Option<String>,
    /// New avatar style, when changing it.
    #[serde(default)]
    pub avatar_style: Option<String>,
    /// New avatar seed, when changing it.
    #[serde(default)]
    pub avatar_seed: Option<String>,
}

impl Validate for UpdateProfileRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(name) = &self.name {
            if let Err(err) = validate_display_name(name) {
                errors.add("name", err);
            }
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Payload accompanying a leave request.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct LeaveRoomRequest {
    /// Successor when the departing player is the host and others remain.
    #[serde(default)]
    pub new_host_id: Option<Uuid>,
}

/// Host request to remove a player from the room.
#[derive(Debug, Deserialize, ToSchema)]
pub struct KickPlayerRequest {
    /// Player to remove.
    pub player_id: Uuid,
}

/// Host request to rename the room.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRoomNameRequest {
    /// New room name.
    pub name: String,
}

impl Validate for UpdateRoomNameRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Err(err) = validate_display_name(&self.name) {
            errors.add("name", err);
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Host request to change room settings.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSettingsRequest {
    /// Reveal automatically once every player has voted.
    pub auto_reveal_votes: bool,
}

/// Host request flipping a boolean room feature.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ToggleRequest {
    /// Desired state of the feature.
    pub enabled: bool,
}

/// Host request to switch decks.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateDeckRequest {
    /// Preset identifier, or a label for a custom deck.
    pub deck_type: String,
    /// Explicit card labels for a custom deck; resolved from the preset when
    /// omitted.
    #[serde(default)]
    pub deck: Option<Vec<String>>,
    /// Optional visual theme.
    #[serde(default)]
    pub deck_theme: Option<String>,
}

impl Validate for UpdateDeckRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.deck_type.trim().is_empty() {
            errors.add("deck_type", validator::ValidationError::new("blank"));
        }
        if let Some(cards) = &self.deck {
            if cards.is_empty() || cards.iter().any(|card| card.trim().is_empty()) {
                errors.add("deck", validator::ValidationError::new("empty_cards"));
            }
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Ephemeral reaction aimed at another player.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReactionRequest {
    /// Recipient of the reaction.
    pub to_player_id: Uuid,
    /// Emoji glyph.
    pub emoji: String,
}

/// Ephemeral emoji broadcast to the whole room.
#[derive(Debug, Deserialize, ToSchema)]
pub struct EmojiRequest {
    /// Emoji glyph.
    pub emoji: String,
}

/// Public projection of a player exposed to REST and snapshot consumers.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlayerSummary {
    /// Player id.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Whether this player drives the room.
    pub is_host: bool,
    /// Avatar style identifier.
    pub avatar_style: String,
    /// Avatar seed.
    pub avatar_seed: String,
    /// Whether the player currently has a live bus subscription.
    pub online: bool,
}

impl PlayerSummary {
    /// Project a player row together with its presence flag.
    pub fn from_entity(entity: PlayerEntity, online: bool) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            is_host: entity.is_host,
            avatar_style: entity.avatar_style,
            avatar_seed: entity.avatar_seed,
            online,
        }
    }
}

/// Public projection of a room.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RoomSummary {
    /// Room id.
    pub id: Uuid,
    /// Join code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Deck preset identifier.
    pub deck_type: String,
    /// Decoded card labels.
    pub deck: Vec<String>,
    /// Optional deck theme.
    pub deck_theme: Option<String>,
    /// Currently active story, when any.
    pub active_story_id: Option<Uuid>,
    /// Auto-reveal setting.
    pub auto_reveal_votes: bool,
    /// Celebrations toggle.
    pub celebrations_enabled: bool,
    /// Emoji toggle.
    pub emojis_enabled: bool,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
}

impl From<RoomEntity> for RoomSummary {
    fn from(entity: RoomEntity) -> Self {
        let deck = entity.deck_labels();
        Self {
            id: entity.id,
            code: entity.code,
            name: entity.name,
            deck_type: entity.deck_type,
            deck,
            deck_theme: entity.deck_theme,
            active_story_id: entity.active_story_id,
            auto_reveal_votes: entity.auto_reveal_votes,
            celebrations_enabled: entity.celebrations_enabled,
            emojis_enabled: entity.emojis_enabled,
            created_at: format_system_time(entity.created_at),
        }
    }
}

/// Per-player vote visibility inside a snapshot. The value is present only
/// when the active story has been revealed.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VoteStatus {
    /// Voter.
    pub player_id: Uuid,
    /// Whether a vote exists for the active story.
    pub has_voted: bool,
    /// The card label, exposed only after reveal.
    pub value: Option<String>,
}

/// Full-room snapshot used to seed and resync client state.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RoomSnapshot {
    /// Room projection.
    pub room: RoomSummary,
    /// All players with presence flags.
    pub players: Vec<PlayerSummary>,
    /// Backlog in creation order.
    pub stories: Vec<StorySummary>,
    /// Vote visibility for the active story; empty when none is active.
    pub votes: Vec<VoteStatus>,
}

/// Response returned after creating or joining a room.
#[derive(Debug, Serialize, ToSchema)]
pub struct JoinedRoomResponse {
    /// The room that was created or joined.
    pub room: RoomSummary,
    /// The caller's own player row.
    pub player: PlayerSummary,
}
