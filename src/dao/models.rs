use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use utoipa::ToSchema;
use uuid::Uuid;

/// Lifecycle status of a story as persisted by the record store.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StoryStatus {
    /// Story is waiting in the backlog.
    Idle,
    /// Story is the one currently being estimated. At most one per room.
    Active,
    /// Estimation finished; the story is immutable except for deletion.
    Completed,
}

/// Room aggregate persisted by the record store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoomEntity {
    /// Primary key of the room.
    pub id: Uuid,
    /// Unique six-character join code.
    pub code: String,
    /// Display name of the room.
    pub name: String,
    /// Identifier of the deck preset in use (e.g. `fibonacci`).
    pub deck_type: String,
    /// JSON-encoded ordered list of card labels. Parsed defensively; a
    /// malformed value yields an empty deck rather than a crash.
    pub deck: String,
    /// Optional visual theme for the deck.
    pub deck_theme: Option<String>,
    /// Story currently being estimated, when any.
    pub active_story_id: Option<Uuid>,
    /// Reveal automatically once every player has voted.
    pub auto_reveal_votes: bool,
    /// Whether consensus celebrations are enabled.
    pub celebrations_enabled: bool,
    /// Whether ephemeral emoji messages are enabled.
    pub emojis_enabled: bool,
    /// Creation timestamp for auditing/debugging.
    pub created_at: SystemTime,
    /// Last time the room row was updated.
    pub updated_at: SystemTime,
}

impl RoomEntity {
    /// Decode the stored deck into its ordered card labels.
    ///
    /// Accepts either a plain array of strings or an array of objects with a
    /// `label` field; anything else decodes to an empty deck.
    pub fn deck_labels(&self) -> Vec<String> {
        if let Ok(labels) = serde_json::from_str::<Vec<String>>(&self.deck) {
            return labels;
        }

        #[derive(Deserialize)]
        struct Card {
            label: String,
        }

        serde_json::from_str::<Vec<Card>>(&self.deck)
            .map(|cards| cards.into_iter().map(|card| card.label).collect())
            .unwrap_or_default()
    }
}

/// Player row owned by a room.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerEntity {
    /// Primary key of the player.
    pub id: Uuid,
    /// Owning room.
    pub room_id: Uuid,
    /// Display name chosen by the player.
    pub name: String,
    /// Exactly one player per room carries this flag at all times.
    pub is_host: bool,
    /// Avatar style identifier.
    pub avatar_style: String,
    /// Seed driving avatar generation.
    pub avatar_seed: String,
    /// Creation timestamp.
    pub created_at: SystemTime,
}

/// Story row owned by a room.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoryEntity {
    /// Primary key of the story.
    pub id: Uuid,
    /// Owning room.
    pub room_id: Uuid,
    /// Short estimation subject.
    pub title: String,
    /// Longer free-form description.
    pub description: String,
    /// Lifecycle status.
    pub status: StoryStatus,
    /// Whether submitted votes are visible to everyone.
    pub votes_revealed: bool,
    /// Final score, set only at completion.
    pub final_score: Option<f64>,
    /// True when the host supplied the score directly instead of the tally.
    pub manual_override: bool,
    /// Creation timestamp.
    pub created_at: SystemTime,
    /// Last time the story row was updated.
    pub updated_at: SystemTime,
}

/// Vote row, composite-keyed by `(player_id, story_id)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoteEntity {
    /// Voter. Weak reference; votes are purged when the player is removed.
    pub player_id: Uuid,
    /// Story the vote belongs to.
    pub story_id: Uuid,
    /// Card label, validated against the room deck at submission time.
    pub value: String,
    /// First time this player voted on this story (kept across overwrites).
    pub cast_at: SystemTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room_with_deck(deck: &str) -> RoomEntity {
        RoomEntity {
            id: Uuid::new_v4(),
            code: "ABCDEF".into(),
            name: "sprint 12".into(),
            deck_type: "custom".into(),
            deck: deck.into(),
            deck_theme: None,
            active_story_id: None,
            auto_reveal_votes: false,
            celebrations_enabled: true,
            emojis_enabled: true,
            created_at: SystemTime::now(),
            updated_at: SystemTime::now(),
        }
    }

    #[test]
    fn deck_labels_decodes_plain_strings() {
        let room = room_with_deck(r#"["1","2","3","?"]"#);
        assert_eq!(room.deck_labels(), vec!["1", "2", "3", "?"]);
    }

    #[test]
    fn deck_labels_decodes_labelled_cards() {
        let room = room_with_deck(r#"[{"label":"XS"},{"label":"M"}]"#);
        assert_eq!(room.deck_labels(), vec!["XS", "M"]);
    }

    #[test]
    fn deck_labels_tolerates_garbage() {
        assert!(room_with_deck("not json").deck_labels().is_empty());
        assert!(room_with_deck("{\"deck\":1}").deck_labels().is_empty());
        assert!(room_with_deck("").deck_labels().is_empty());
    }
}
