//! Story backlog management and lifecycle transitions, host-driven.

use std::time::SystemTime;

use uuid::Uuid;

use crate::{
    dao::models::{StoryEntity, StoryStatus},
    dto::story::{CompleteStoryRequest, StoryInput, StorySummary},
    error::ServiceError,
    services::{room_service, scoring, sse_events},
    session::SessionContext,
    state::{
        SharedState,
        lifecycle::{StoryEvent, StoryPhase, next_phase},
    },
};

/// Backlog of the caller's room, in creation order.
pub async fn list_stories(
    state: &SharedState,
    ctx: SessionContext,
) -> Result<Vec<StorySummary>, ServiceError> {
    let store = state.require_room_store().await?;
    room_service::require_member(&store, ctx).await?;
    let stories = store.list_stories(ctx.room_id).await?;
    Ok(stories.into_iter().map(Into::into).collect())
}

/// Host-only: add a story to the backlog.
pub async fn add_story(
    state: &SharedState,
    ctx: SessionContext,
    input: StoryInput,
) -> Result<StorySummary, ServiceError> {
    let store = state.require_room_store().await?;
    room_service::require_host(&store, ctx).await?;

    let now = SystemTime::now();
    let story = StoryEntity {
        id: Uuid::new_v4(),
        room_id: ctx.room_id,
        title: input.title.trim().to_string(),
        description: input.description,
        status: StoryStatus::Idle,
        votes_revealed: false,
        final_score: None,
        manual_override: false,
        created_at: now,
        updated_at: now,
    };
    store.insert_story(story.clone()).await?;
    sse_events::broadcast_story_added(state, &story);
    Ok(story.into())
}

/// Host-only: edit a story's content. Completed stories are immutable.
pub async fn update_story(
    state: &SharedState,
    ctx: SessionContext,
    story_id: Uuid,
    input: StoryInput,
) -> Result<StorySummary, ServiceError> {
    let store = state.require_room_store().await?;
    room_service::require_host(&store, ctx).await?;

    let Some(mut story) = store.find_story(ctx.room_id, story_id).await? else {
        return Err(story_not_found(story_id));
    };
    if story.status == StoryStatus::Completed {
        return Err(ServiceError::InvalidState(
            "a completed story can no longer be edited".into(),
        ));
    }

    story.title = input.title.trim().to_string();
    story.description = input.description;
    story.updated_at = SystemTime::now();
    store.update_story(story.clone()).await?;
    sse_events::broadcast_story_updated(state, &story);
    Ok(story.into())
}

/// Host-only: remove a story. Votes cascade; the room's active pointer is
/// cleared when it referenced this story.
pub async fn delete_story(
    state: &SharedState,
    ctx: SessionContext,
    story_id: Uuid,
) -> Result<(), ServiceError> {
    let store = state.require_room_store().await?;
    let gate = state.room_gate(ctx.room_id);
    let _guard = gate.lock().await;

    room_service::require_host(&store, ctx).await?;

    if !store.delete_story(ctx.room_id, story_id).await? {
        return Err(story_not_found(story_id));
    }
    sse_events::broadcast_story_deleted(state, ctx.room_id, story_id);
    Ok(())
}

/// Host-only: make a story the room's estimation subject.
///
/// Any previously active story drops back to idle, the reveal flag is
/// cleared, and pre-existing votes for the target are purged, all within one
/// store transaction.
pub async fn activate_story(
    state: &SharedState,
    ctx: SessionContext,
    story_id: Uuid,
) -> Result<StorySummary, ServiceError> {
    let store = state.require_room_store().await?;
    let gate = state.room_gate(ctx.room_id);
    let _guard = gate.lock().await;

    room_service::require_host(&store, ctx).await?;

    let Some(story) = store.find_story(ctx.room_id, story_id).await? else {
        return Err(story_not_found(story_id));
    };
    // Rejects activation of a completed story.
    next_phase(StoryPhase::of(&story), StoryEvent::Activate)?;

    if !store.activate_story(ctx.room_id, story_id).await? {
        return Err(story_not_found(story_id));
    }
    let Some(story) = store.find_story(ctx.room_id, story_id).await? else {
        return Err(story_not_found(story_id));
    };

    sse_events::broadcast_active_story_changed(state, &story);
    Ok(story.into())
}

/// Host-only: finish the active story and freeze its score.
///
/// The score comes from the deterministic tally unless the host supplies a
/// manual override. The room's active pointer is cleared and the story's
/// votes are purged — they only ever exist for an active story.
pub async fn complete_story(
    state: &SharedState,
    ctx: SessionContext,
    story_id: Uuid,
    request: CompleteStoryRequest,
) -> Result<StorySummary, ServiceError> {
    let store = state.require_room_store().await?;
    let gate = state.room_gate(ctx.room_id);
    let _guard = gate.lock().await;

    room_service::require_host(&store, ctx).await?;

    let Some(mut story) = store.find_story(ctx.room_id, story_id).await? else {
        return Err(story_not_found(story_id));
    };
    let phase = next_phase(StoryPhase::of(&story), StoryEvent::Complete)?;

    let (final_score, manual_override) = match request.final_score {
        Some(score) => (Some(score), true),
        None => {
            let votes = store.list_votes(story.id).await?;
            let values: Vec<String> = votes.into_iter().map(|vote| vote.value).collect();
            (scoring::final_score(&values), false)
        }
    };

    phase.write_back(&mut story);
    story.final_score = final_score;
    story.manual_override = manual_override;
    story.updated_at = SystemTime::now();
    store.update_story(story.clone()).await?;
    store.clear_votes(story.id).await?;

    let mut room = room_service::require_room(&store, ctx.room_id).await?;
    if room.active_story_id == Some(story.id) {
        room.active_story_id = None;
        room.updated_at = SystemTime::now();
        store.update_room(room).await?;
    }

    sse_events::broadcast_story_completed(state, &story);
    Ok(story.into())
}

fn story_not_found(story_id: Uuid) -> ServiceError {
    ServiceError::NotFound(format!("story `{story_id}` not found in this room"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AppConfig,
        dao::{
            models::{PlayerEntity, RoomEntity, VoteEntity},
            room_store::{RoomStore, memory::MemoryRoomStore},
        },
        state::AppState,
    };
    use std::sync::Arc;

    struct Fixture {
        state: crate::state::SharedState,
        store: Arc<dyn RoomStore>,
        room_id: Uuid,
        host: Uuid,
        guest: Uuid,
    }

    async fn fixture() -> Fixture {
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
                auto_reveal_votes: false,
                celebrations_enabled: true,
                emojis_enabled: true,
                created_at: SystemTime::now(),
                updated_at: SystemTime::now(),
            })
            .await
            .unwrap();

        let host = Uuid::new_v4();
        let guest = Uuid::new_v4();
        for (id, is_host) in [(host, true), (guest, false)] {
            store
                .insert_player(PlayerEntity {
                    id,
                    room_id,
                    name: if is_host { "host" } else { "guest" }.into(),
                    is_host,
                    avatar_style: "bottts".into(),
                    avatar_seed: "seed".into(),
                    created_at: SystemTime::now(),
                })
                .await
                .unwrap();
        }

        Fixture {
            state,
            store,
            room_id,
            host,
            guest,
        }
    }

    fn host_ctx(fx: &Fixture) -> SessionContext {
        SessionContext {
            player_id: fx.host,
            room_id: fx.room_id,
        }
    }

    fn guest_ctx(fx: &Fixture) -> SessionContext {
        SessionContext {
            player_id: fx.guest,
            room_id: fx.room_id,
        }
    }

    fn input(title: &str) -> StoryInput {
        StoryInput {
            title: title.into(),
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn story_crud_is_host_only() {
        let fx = fixture().await;

        let err = add_story(&fx.state, guest_ctx(&fx), input("nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));

        let story = add_story(&fx.state, host_ctx(&fx), input("login page"))
            .await
            .unwrap();
        assert_eq!(story.status, StoryStatus::Idle);
    }

    #[tokio::test]
    async fn activation_switches_the_single_active_story() {
        let fx = fixture().await;
        let first = add_story(&fx.state, host_ctx(&fx), input("first"))
            .await
            .unwrap();
        let second = add_story(&fx.state, host_ctx(&fx), input("second"))
            .await
            .unwrap();

        activate_story(&fx.state, host_ctx(&fx), first.id)
            .await
            .unwrap();
        activate_story(&fx.state, host_ctx(&fx), second.id)
            .await
            .unwrap();

        let stories = fx.store.list_stories(fx.room_id).await.unwrap();
        let active: Vec<_> = stories
            .iter()
            .filter(|story| story.status == StoryStatus::Active)
            .collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, second.id);

        let room = fx.store.find_room(fx.room_id).await.unwrap().unwrap();
        assert_eq!(room.active_story_id, Some(second.id));
    }

    #[tokio::test]
    async fn completion_scores_clears_pointer_and_purges_votes() {
        let fx = fixture().await;
        let story = add_story(&fx.state, host_ctx(&fx), input("story"))
            .await
            .unwrap();
        activate_story(&fx.state, host_ctx(&fx), story.id)
            .await
            .unwrap();

        for (player, value) in [(fx.host, "3"), (fx.guest, "3")] {
            fx.store
                .upsert_vote(VoteEntity {
                    player_id: player,
                    story_id: story.id,
                    value: value.into(),
                    cast_at: SystemTime::now(),
                })
                .await
                .unwrap();
        }

        let completed = complete_story(
            &fx.state,
            host_ctx(&fx),
            story.id,
            CompleteStoryRequest::default(),
        )
        .await
        .unwrap();

        assert_eq!(completed.status, StoryStatus::Completed);
        assert_eq!(completed.final_score, Some(3.0));
        assert!(!completed.manual_override);
        assert_eq!(fx.store.count_votes(story.id).await.unwrap(), 0);

        let room = fx.store.find_room(fx.room_id).await.unwrap().unwrap();
        assert_eq!(room.active_story_id, None);
    }

    #[tokio::test]
    async fn manual_override_bypasses_the_tally() {
        let fx = fixture().await;
        let story = add_story(&fx.state, host_ctx(&fx), input("story"))
            .await
            .unwrap();
        activate_story(&fx.state, host_ctx(&fx), story.id)
            .await
            .unwrap();

        let completed = complete_story(
            &fx.state,
            host_ctx(&fx),
            story.id,
            CompleteStoryRequest {
                final_score: Some(13.0),
            },
        )
        .await
        .unwrap();

        assert_eq!(completed.final_score, Some(13.0));
        assert!(completed.manual_override);
    }

    #[tokio::test]
    async fn completed_stories_are_terminal() {
        let fx = fixture().await;
        let story = add_story(&fx.state, host_ctx(&fx), input("story"))
            .await
            .unwrap();
        activate_story(&fx.state, host_ctx(&fx), story.id)
            .await
            .unwrap();
        complete_story(
            &fx.state,
            host_ctx(&fx),
            story.id,
            CompleteStoryRequest::default(),
        )
        .await
        .unwrap();

        let err = activate_story(&fx.state, host_ctx(&fx), story.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));

        let err = update_story(&fx.state, host_ctx(&fx), story.id, input("edit"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[tokio::test]
    async fn completing_an_idle_story_is_rejected() {
        let fx = fixture().await;
        let story = add_story(&fx.state, host_ctx(&fx), input("backlog"))
            .await
            .unwrap();

        let err = complete_story(
            &fx.state,
            host_ctx(&fx),
            story.id,
            CompleteStoryRequest::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }
}
