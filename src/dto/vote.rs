use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

/// Payload submitting (or overwriting) the caller's vote on a story.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitVoteRequest {
    /// Story being voted on; must be the room's active story.
    pub story_id: Uuid,
    /// Card label taken from the room's deck.
    pub value: String,
}

impl Validate for SubmitVoteRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.value.trim().is_empty() {
            errors.add("value", validator::ValidationError::new("blank"));
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Running tally returned to the submitter.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VoteTallyResponse {
    /// Votes currently stored for the story.
    pub total_votes: u64,
    /// Players currently in the room.
    pub total_players: u64,
    /// Whether everybody has voted.
    pub is_complete: bool,
    /// True when this submission triggered the automatic reveal.
    pub auto_revealed: bool,
}
