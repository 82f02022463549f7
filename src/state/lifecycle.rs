use thiserror::Error;

use crate::dao::models::{StoryEntity, StoryStatus};

/// Lifecycle phase of a story, including the reveal sub-state while active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoryPhase {
    /// Waiting in the backlog.
    Idle,
    /// Currently being estimated.
    Active {
        /// Whether submitted votes are visible to everyone.
        votes_revealed: bool,
    },
    /// Terminal: estimation finished, the story is immutable.
    Completed,
}

impl StoryPhase {
    /// Derive the phase from a persisted story row.
    pub fn of(story: &StoryEntity) -> Self {
        match story.status {
            StoryStatus::Idle => StoryPhase::Idle,
            StoryStatus::Active => StoryPhase::Active {
                votes_revealed: story.votes_revealed,
            },
            StoryStatus::Completed => StoryPhase::Completed,
        }
    }

    /// Write the phase back onto a story row.
    pub fn write_back(self, story: &mut StoryEntity) {
        match self {
            StoryPhase::Idle => {
                story.status = StoryStatus::Idle;
                story.votes_revealed = false;
            }
            StoryPhase::Active { votes_revealed } => {
                story.status = StoryStatus::Active;
                story.votes_revealed = votes_revealed;
            }
            StoryPhase::Completed => {
                story.status = StoryStatus::Completed;
            }
        }
    }
}

/// Events that drive the story lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoryEvent {
    /// Make the story the room's current estimation subject.
    Activate,
    /// Make submitted votes visible. Fires at most once per voting round.
    Reveal,
    /// Hide and discard submitted votes, returning to a fresh round.
    Reset,
    /// Finish estimation and freeze the story.
    Complete,
}

/// Error returned when an event cannot be applied from the current phase.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// Phase the story was in when the invalid event was received.
    pub from: StoryPhase,
    /// The rejected event.
    pub event: StoryEvent,
}

/// Compute the phase an event leads to, or reject it.
///
/// Re-activation of an already-active story is allowed and lands on a fresh
/// unrevealed round; the coordinator treats it as defensive cleanup. A second
/// `Reveal` on an already-revealed story is rejected so the reveal event is
/// emitted exactly once per round.
pub fn next_phase(from: StoryPhase, event: StoryEvent) -> Result<StoryPhase, InvalidTransition> {
    let next = match (from, event) {
        (StoryPhase::Idle, StoryEvent::Activate) => StoryPhase::Active {
            votes_revealed: false,
        },
        (StoryPhase::Active { .. }, StoryEvent::Activate) => StoryPhase::Active {
            votes_revealed: false,
        },
        (
            StoryPhase::Active {
                votes_revealed: false,
            },
            StoryEvent::Reveal,
        ) => StoryPhase::Active {
            votes_revealed: true,
        },
        (StoryPhase::Active { .. }, StoryEvent::Reset) => StoryPhase::Active {
            votes_revealed: false,
        },
        (StoryPhase::Active { .. }, StoryEvent::Complete) => StoryPhase::Completed,
        (from, event) => return Err(InvalidTransition { from, event }),
    };

    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HIDDEN: StoryPhase = StoryPhase::Active {
        votes_revealed: false,
    };
    const REVEALED: StoryPhase = StoryPhase::Active {
        votes_revealed: true,
    };

    #[test]
    fn happy_path_through_estimation() {
        let phase = next_phase(StoryPhase::Idle, StoryEvent::Activate).unwrap();
        assert_eq!(phase, HIDDEN);
        let phase = next_phase(phase, StoryEvent::Reveal).unwrap();
        assert_eq!(phase, REVEALED);
        let phase = next_phase(phase, StoryEvent::Complete).unwrap();
        assert_eq!(phase, StoryPhase::Completed);
    }

    #[test]
    fn reset_returns_to_hidden_from_either_reveal_state() {
        assert_eq!(next_phase(REVEALED, StoryEvent::Reset).unwrap(), HIDDEN);
        assert_eq!(next_phase(HIDDEN, StoryEvent::Reset).unwrap(), HIDDEN);
    }

    #[test]
    fn reveal_fires_only_once() {
        let err = next_phase(REVEALED, StoryEvent::Reveal).unwrap_err();
        assert_eq!(err.from, REVEALED);
        assert_eq!(err.event, StoryEvent::Reveal);
    }

    #[test]
    fn reactivation_clears_reveal_state() {
        assert_eq!(next_phase(REVEALED, StoryEvent::Activate).unwrap(), HIDDEN);
    }

    #[test]
    fn completed_is_terminal() {
        for event in [
            StoryEvent::Activate,
            StoryEvent::Reveal,
            StoryEvent::Reset,
            StoryEvent::Complete,
        ] {
            assert!(next_phase(StoryPhase::Completed, event).is_err());
        }
    }

    #[test]
    fn idle_only_accepts_activation() {
        for event in [StoryEvent::Reveal, StoryEvent::Reset, StoryEvent::Complete] {
            assert!(next_phase(StoryPhase::Idle, event).is_err());
        }
    }

    #[test]
    fn phase_round_trips_through_entity() {
        use std::time::SystemTime;
        use uuid::Uuid;

        let mut story = StoryEntity {
            id: Uuid::new_v4(),
            room_id: Uuid::new_v4(),
            title: "t".into(),
            description: String::new(),
            status: StoryStatus::Idle,
            votes_revealed: false,
            final_score: None,
            manual_override: false,
            created_at: SystemTime::now(),
            updated_at: SystemTime::now(),
        };

        REVEALED.write_back(&mut story);
        assert_eq!(story.status, StoryStatus::Active);
        assert!(story.votes_revealed);
        assert_eq!(StoryPhase::of(&story), REVEALED);
    }
}
