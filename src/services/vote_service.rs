//! Vote ledger: submit, retract, reveal, and reset.
//!
//! Every mutating operation runs under the room's gate, so the
//! submit/count/maybe-reveal sequence executes as one logical transaction and
//! concurrent votes from different players never lose updates.

use std::time::SystemTime;

use uuid::Uuid;

use crate::{
    dao::models::{PlayerEntity, StoryStatus, VoteEntity},
    dto::{
        sse::{RevealedVote, VoteSubmittedEvent},
        vote::{SubmitVoteRequest, VoteTallyResponse},
    },
    error::ServiceError,
    services::{room_service, sse_events},
    session::SessionContext,
    state::{
        SharedState,
        lifecycle::{StoryEvent, StoryPhase, next_phase},
    },
};

/// Upsert the caller's vote on the active story and emit the running tally.
///
/// When the vote completes the round and the room has auto-reveal enabled,
/// the reveal transition happens here as well — no separate reveal call — and
/// `votes-revealed` fires exactly once.
pub async fn submit_vote(
    state: &SharedState,
    ctx: SessionContext,
    request: SubmitVoteRequest,
) -> Result<VoteTallyResponse, ServiceError> {
    let store = state.require_room_store().await?;
    let gate = state.room_gate(ctx.room_id);
    let _guard = gate.lock().await;

    let room = room_service::require_room(&store, ctx.room_id).await?;
    let caller = room_service::require_member(&store, ctx).await?;

    let Some(mut story) = store.find_story(ctx.room_id, request.story_id).await? else {
        return Err(ServiceError::NotFound(format!(
            "story `{}` not found in this room",
            request.story_id
        )));
    };
    if story.status != StoryStatus::Active {
        return Err(ServiceError::InvalidState(
            "votes can only be cast on the active story".into(),
        ));
    }

    let deck = room.deck_labels();
    if !deck.iter().any(|label| label == &request.value) {
        return Err(ServiceError::InvalidVote(format!(
            "`{}` is not a card of the current deck",
            request.value
        )));
    }

    store
        .upsert_vote(VoteEntity {
            player_id: caller.id,
            story_id: story.id,
            value: request.value.clone(),
            cast_at: SystemTime::now(),
        })
        .await?;

    let total_votes = store.count_votes(story.id).await?;
    let players = store.list_players(ctx.room_id).await?;
    let total_players = players.len() as u64;
    let is_complete = total_players > 0 && total_votes >= total_players;

    sse_events::broadcast_vote_submitted(
        state,
        ctx.room_id,
        &VoteSubmittedEvent {
            player_id: caller.id,
            player_name: caller.name,
            value: request.value,
            total_votes,
            total_players,
            is_complete,
        },
    );

    let mut auto_revealed = false;
    if is_complete && room.auto_reveal_votes && !story.votes_revealed {
        let phase = next_phase(StoryPhase::of(&story), StoryEvent::Reveal)?;
        phase.write_back(&mut story);
        story.updated_at = SystemTime::now();
        store.update_story(story.clone()).await?;

        let votes = store.list_votes(story.id).await?;
        sse_events::broadcast_votes_revealed(
            state,
            ctx.room_id,
            story.id,
            revealed_votes(&players, votes),
        );
        auto_revealed = true;
    }

    Ok(VoteTallyResponse {
        total_votes,
        total_players,
        is_complete,
        auto_revealed,
    })
}

/// Unconditionally retract the caller's vote on a story.
///
/// No lifecycle precondition: a player may retract even when the story is no
/// longer active.
pub async fn remove_vote(
    state: &SharedState,
    ctx: SessionContext,
    story_id: Uuid,
) -> Result<(), ServiceError> {
    let store = state.require_room_store().await?;
    let gate = state.room_gate(ctx.room_id);
    let _guard = gate.lock().await;

    let caller = room_service::require_member(&store, ctx).await?;
    store.remove_vote(story_id, caller.id).await?;
    sse_events::broadcast_vote_removed(state, ctx.room_id, caller.id, story_id);
    Ok(())
}

/// Host-only: make vote values visible to everyone.
///
/// The emitted payload carries the full vote list as stored at this moment —
/// clients replace their view wholesale rather than merging.
pub async fn reveal_votes(
    state: &SharedState,
    ctx: SessionContext,
    story_id: Uuid,
) -> Result<Vec<RevealedVote>, ServiceError> {
    let store = state.require_room_store().await?;
    let gate = state.room_gate(ctx.room_id);
    let _guard = gate.lock().await;

    room_service::require_host(&store, ctx).await?;

    let Some(mut story) = store.find_story(ctx.room_id, story_id).await? else {
        return Err(ServiceError::NotFound(format!(
            "story `{story_id}` not found in this room"
        )));
    };

    let phase = next_phase(StoryPhase::of(&story), StoryEvent::Reveal)?;
    phase.write_back(&mut story);
    story.updated_at = SystemTime::now();
    store.update_story(story.clone()).await?;

    let players = store.list_players(ctx.room_id).await?;
    let votes = store.list_votes(story.id).await?;
    let revealed = revealed_votes(&players, votes);

    sse_events::broadcast_votes_revealed(state, ctx.room_id, story.id, revealed.clone());
    Ok(revealed)
}

/// Host-only: hide and discard every vote for the story, starting a fresh
/// round.
pub async fn reset_votes(
    state: &SharedState,
    ctx: SessionContext,
    story_id: Uuid,
) -> Result<(), ServiceError> {
    let store = state.require_room_store().await?;
    let gate = state.room_gate(ctx.room_id);
    let _guard = gate.lock().await;

    room_service::require_host(&store, ctx).await?;

    let Some(mut story) = store.find_story(ctx.room_id, story_id).await? else {
        return Err(ServiceError::NotFound(format!(
            "story `{story_id}` not found in this room"
        )));
    };

    let phase = next_phase(StoryPhase::of(&story), StoryEvent::Reset)?;
    phase.write_back(&mut story);
    story.updated_at = SystemTime::now();
    store.update_story(story.clone()).await?;
    store.clear_votes(story.id).await?;

    sse_events::broadcast_votes_reset(state, ctx.room_id, story.id);
    Ok(())
}

/// Join votes with player names, in first-cast order. Votes of players that
/// vanished mid-flight are dropped rather than shown nameless.
fn revealed_votes(players: &[PlayerEntity], votes: Vec<VoteEntity>) -> Vec<RevealedVote> {
    votes
        .into_iter()
        .filter_map(|vote| {
            players
                .iter()
                .find(|player| player.id == vote.player_id)
                .map(|player| RevealedVote {
                    player_id: vote.player_id,
                    player_name: player.name.clone(),
                    value: vote.value,
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AppConfig,
        dao::{
            models::{PlayerEntity, RoomEntity, StoryEntity},
            room_store::{RoomStore, memory::MemoryRoomStore},
        },
        dto::sse::names,
        state::AppState,
    };
    use std::sync::Arc;
    use tokio::sync::broadcast;

    struct Fixture {
        state: crate::state::SharedState,
        store: Arc<dyn RoomStore>,
        room_id: Uuid,
        story_id: Uuid,
        players: Vec<Uuid>,
    }

    async fn fixture(auto_reveal: bool, player_count: usize) -> Fixture {
        let state = AppState::new(AppConfig::default());
        let store = MemoryRoomStore::new_shared();
        state.install_room_store(store.clone()).await;

        let room_id = Uuid::new_v4();
        store
            .insert_room(RoomEntity {
                id: room_id,
                code: "ABCDEF".into(),
                name: "room".into(),
                deck_type: "fibonacci".into(),
                deck: r#"["1","2","3","5","8"]"#.into(),
                deck_theme: None,
                active_story_id: None,
                auto_reveal_votes: auto_reveal,
                celebrations_enabled: true,
                emojis_enabled: true,
                created_at: SystemTime::now(),
                updated_at: SystemTime::now(),
            })
            .await
            .unwrap();

        let mut players = Vec::new();
        for index in 0..player_count {
            let id = Uuid::new_v4();
            store
                .insert_player(PlayerEntity {
                    id,
                    room_id,
                    name: format!("player-{index}"),
                    is_host: index == 0,
                    avatar_style: "bottts".into(),
                    avatar_seed: "seed".into(),
                    created_at: SystemTime::now(),
                })
                .await
                .unwrap();
            players.push(id);
        }

        let story_id = Uuid::new_v4();
        store
            .insert_story(StoryEntity {
                id: story_id,
                room_id,
                title: "story".into(),
                description: String::new(),
                status: StoryStatus::Idle,
                votes_revealed: false,
                final_score: None,
                manual_override: false,
                created_at: SystemTime::now(),
                updated_at: SystemTime::now(),
            })
            .await
            .unwrap();
        store.activate_story(room_id, story_id).await.unwrap();

        Fixture {
            state,
            store,
            room_id,
            story_id,
            players,
        }
    }

    fn ctx(fixture: &Fixture, index: usize) -> SessionContext {
        SessionContext {
            player_id: fixture.players[index],
            room_id: fixture.room_id,
        }
    }

    fn submit(fixture: &Fixture, value: &str) -> SubmitVoteRequest {
        SubmitVoteRequest {
            story_id: fixture.story_id,
            value: value.into(),
        }
    }

    fn drain_event_names(
        receiver: &mut broadcast::Receiver<crate::dto::sse::ServerEvent>,
    ) -> Vec<String> {
        let mut seen = Vec::new();
        while let Ok(event) = receiver.try_recv() {
            if let Some(name) = event.event {
                seen.push(name);
            }
        }
        seen
    }

    #[tokio::test]
    async fn invalid_value_fails_and_leaves_votes_unchanged() {
        let fx = fixture(false, 2).await;

        let err = submit_vote(&fx.state, ctx(&fx, 0), submit(&fx, "42"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidVote(_)));
        assert_eq!(fx.store.count_votes(fx.story_id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn voting_on_inactive_story_is_invalid_state() {
        let fx = fixture(false, 2).await;
        let idle_story = Uuid::new_v4();
        fx.store
            .insert_story(StoryEntity {
                id: idle_story,
                room_id: fx.room_id,
                title: "idle".into(),
                description: String::new(),
                status: StoryStatus::Idle,
                votes_revealed: false,
                final_score: None,
                manual_override: false,
                created_at: SystemTime::now(),
                updated_at: SystemTime::now(),
            })
            .await
            .unwrap();

        let err = submit_vote(
            &fx.state,
            ctx(&fx, 0),
            SubmitVoteRequest {
                story_id: idle_story,
                value: "3".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[tokio::test]
    async fn resubmission_overwrites_instead_of_duplicating() {
        let fx = fixture(false, 2).await;

        submit_vote(&fx.state, ctx(&fx, 0), submit(&fx, "3"))
            .await
            .unwrap();
        let tally = submit_vote(&fx.state, ctx(&fx, 0), submit(&fx, "8"))
            .await
            .unwrap();

        assert_eq!(tally.total_votes, 1);
        let votes = fx.store.list_votes(fx.story_id).await.unwrap();
        assert_eq!(votes.len(), 1);
        assert_eq!(votes[0].value, "8");
    }

    #[tokio::test]
    async fn auto_reveal_fires_exactly_once_on_the_last_vote() {
        let fx = fixture(true, 3).await;
        let mut receiver =
            fx.state
                .bus()
                .subscribe(fx.room_id, Uuid::new_v4(), "observer".into());

        let first = submit_vote(&fx.state, ctx(&fx, 0), submit(&fx, "3"))
            .await
            .unwrap();
        assert!(!first.is_complete);
        assert!(!first.auto_revealed);

        submit_vote(&fx.state, ctx(&fx, 1), submit(&fx, "5"))
            .await
            .unwrap();
        let last = submit_vote(&fx.state, ctx(&fx, 2), submit(&fx, "5"))
            .await
            .unwrap();
        assert!(last.is_complete);
        assert!(last.auto_revealed);

        let story = fx
            .store
            .find_story(fx.room_id, fx.story_id)
            .await
            .unwrap()
            .unwrap();
        assert!(story.votes_revealed);

        let events = drain_event_names(&mut receiver);
        let reveals = events
            .iter()
            .filter(|name| name.as_str() == names::VOTES_REVEALED)
            .count();
        assert_eq!(reveals, 1);
    }

    #[tokio::test]
    async fn auto_reveal_does_not_refire_on_overwrite_after_completion() {
        let fx = fixture(true, 2).await;
        let mut receiver =
            fx.state
                .bus()
                .subscribe(fx.room_id, Uuid::new_v4(), "observer".into());

        submit_vote(&fx.state, ctx(&fx, 0), submit(&fx, "3"))
            .await
            .unwrap();
        submit_vote(&fx.state, ctx(&fx, 1), submit(&fx, "5"))
            .await
            .unwrap();
        // Round is already revealed; an overwrite must not reveal again.
        let overwrite = submit_vote(&fx.state, ctx(&fx, 0), submit(&fx, "8"))
            .await
            .unwrap();
        assert!(!overwrite.auto_revealed);

        let events = drain_event_names(&mut receiver);
        let reveals = events
            .iter()
            .filter(|name| name.as_str() == names::VOTES_REVEALED)
            .count();
        assert_eq!(reveals, 1);
    }

    #[tokio::test]
    async fn reveal_requires_host() {
        let fx = fixture(false, 2).await;
        let err = reveal_votes(&fx.state, ctx(&fx, 1), fx.story_id)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn reveal_returns_the_stored_vote_set() {
        let fx = fixture(false, 3).await;
        submit_vote(&fx.state, ctx(&fx, 0), submit(&fx, "3"))
            .await
            .unwrap();
        submit_vote(&fx.state, ctx(&fx, 2), submit(&fx, "5"))
            .await
            .unwrap();

        let revealed = reveal_votes(&fx.state, ctx(&fx, 0), fx.story_id)
            .await
            .unwrap();
        assert_eq!(revealed.len(), 2);
        assert_eq!(revealed[0].player_id, fx.players[0]);
        assert_eq!(revealed[1].value, "5");

        // Revealing a second time is rejected.
        let err = reveal_votes(&fx.state, ctx(&fx, 0), fx.story_id)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[tokio::test]
    async fn reset_clears_votes_and_reveal_flag() {
        let fx = fixture(false, 2).await;
        submit_vote(&fx.state, ctx(&fx, 0), submit(&fx, "3"))
            .await
            .unwrap();
        reveal_votes(&fx.state, ctx(&fx, 0), fx.story_id)
            .await
            .unwrap();

        reset_votes(&fx.state, ctx(&fx, 0), fx.story_id)
            .await
            .unwrap();

        assert!(fx.store.list_votes(fx.story_id).await.unwrap().is_empty());
        let story = fx
            .store
            .find_story(fx.room_id, fx.story_id)
            .await
            .unwrap()
            .unwrap();
        assert!(!story.votes_revealed);
        assert_eq!(story.status, StoryStatus::Active);
    }

    #[tokio::test]
    async fn remove_vote_is_unconditional() {
        let fx = fixture(false, 2).await;
        submit_vote(&fx.state, ctx(&fx, 1), submit(&fx, "3"))
            .await
            .unwrap();

        remove_vote(&fx.state, ctx(&fx, 1), fx.story_id)
            .await
            .unwrap();
        assert_eq!(fx.store.count_votes(fx.story_id).await.unwrap(), 0);

        // Retracting an absent vote still succeeds.
        remove_vote(&fx.state, ctx(&fx, 1), fx.story_id)
            .await
            .unwrap();
    }
}
