use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::{
    dao::models::{StoryEntity, StoryStatus},
    dto::{format_system_time, validation::validate_display_name},
};

/// Payload for adding or editing a story.
#[derive(Debug, Deserialize, ToSchema)]
pub struct StoryInput {
    /// Short estimation subject.
    pub title: String,
    /// Longer free-form description.
    #[serde(default)]
    pub description: String,
}

impl Validate for StoryInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Err(err) = validate_display_name(&self.title) {
            errors.add("title", err);
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Host payload completing the active story. When `final_score` is set the
/// tally is bypassed and the story is marked as manually overridden.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CompleteStoryRequest {
    /// Manual override score.
    #[serde(default)]
    pub final_score: Option<f64>,
}

/// Public projection of a story.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StorySummary {
    /// Story id.
    pub id: Uuid,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Lifecycle status.
    pub status: StoryStatus,
    /// Whether votes are currently visible.
    pub votes_revealed: bool,
    /// Final score, set at completion.
    pub final_score: Option<f64>,
    /// Whether the score was supplied by the host instead of the tally.
    pub manual_override: bool,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
}

impl From<StoryEntity> for StorySummary {
    fn from(entity: StoryEntity) -> Self {
        Self {
            id: entity.id,
            title: entity.title,
            description: entity.description,
            status: entity.status,
            votes_revealed: entity.votes_revealed,
            final_score: entity.final_score,
            manual_override: entity.manual_override,
            created_at: format_system_time(entity.created_at),
        }
    }
}
