//! In-memory record store backend.
//!
//! Serves as the default backend: a single mutex guards the whole dataset, so
//! every trait method — including the compound ones — runs as one atomic
//! transaction with full isolation. Insertion-ordered maps keep player and
//! vote listings stable (join order, first-cast order).

use std::{collections::HashMap, sync::Arc};

use futures::future::BoxFuture;
use indexmap::IndexMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::dao::{
    models::{PlayerEntity, RoomEntity, StoryEntity, StoryStatus, VoteEntity},
    room_store::RoomStore,
    storage::StorageResult,
};

#[derive(Default)]
struct MemoryState {
    rooms: HashMap<Uuid, RoomEntity>,
    /// Keyed by `(room_id, player_id)`, in join order.
    players: IndexMap<(Uuid, Uuid), PlayerEntity>,
    /// Keyed by `(room_id, story_id)`, in creation order.
    stories: IndexMap<(Uuid, Uuid), StoryEntity>,
    /// Keyed by `(story_id, player_id)`, in first-cast order. An upsert keeps
    /// the original slot, so reveal listings preserve cast order.
    votes: IndexMap<(Uuid, Uuid), VoteEntity>,
}

impl MemoryState {
    fn story_ids_of_room(&self, room_id: Uuid) -> Vec<Uuid> {
        self.stories
            .keys()
            .filter(|(room, _)| *room == room_id)
            .map(|(_, story)| *story)
            .collect()
    }

    fn purge_votes_for_stories(&mut self, story_ids: &[Uuid]) {
        self.votes
            .retain(|(story, _), _| !story_ids.contains(story));
    }
}

/// Record store backend holding everything in process memory.
#[derive(Clone, Default)]
pub struct MemoryRoomStore {
    inner: Arc<Mutex<MemoryState>>,
}

impl MemoryRoomStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store behind the trait object used by the app state.
    pub fn new_shared() -> Arc<dyn RoomStore> {
        Arc::new(Self::new())
    }
}

impl RoomStore for MemoryRoomStore {
    fn insert_room(&self, room: RoomEntity) -> BoxFuture<'static, StorageResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut state = inner.lock().await;
            state.rooms.insert(room.id, room);
            Ok(())
        })
    }

    fn find_room(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<RoomEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let state = inner.lock().await;
            Ok(state.rooms.get(&id).cloned())
        })
    }

    fn find_room_by_code(
        &self,
        code: String,
    ) -> BoxFuture<'static, StorageResult<Option<RoomEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let state = inner.lock().await;
            Ok(state
                .rooms
                .values()
                .find(|room| room.code == code)
                .cloned())
        })
    }

    fn update_room(&self, room: RoomEntity) -> BoxFuture<'static, StorageResult<bool>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut state = inner.lock().await;
            match state.rooms.get_mut(&room.id) {
                Some(slot) => {
                    *slot = room;
                    Ok(true)
                }
                None => Ok(false),
            }
        })
    }

    fn delete_room(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut state = inner.lock().await;
            if state.rooms.remove(&id).is_none() {
                return Ok(false);
            }
            let stories = state.story_ids_of_room(id);
            state.purge_votes_for_stories(&stories);
            state.stories.retain(|(room, _), _| *room != id);
            state.players.retain(|(room, _), _| *room != id);
            Ok(true)
        })
    }

    fn insert_player(&self, player: PlayerEntity) -> BoxFuture<'static, StorageResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut state = inner.lock().await;
            state
                .players
                .insert((player.room_id, player.id), player);
            Ok(())
        })
    }

    fn find_player(
        &self,
        room_id: Uuid,
        player_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let state = inner.lock().await;
            Ok(state.players.get(&(room_id, player_id)).cloned())
        })
    }

    fn list_players(&self, room_id: Uuid) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let state = inner.lock().await;
            Ok(state
                .players
                .iter()
                .filter(|((room, _), _)| *room == room_id)
                .map(|(_, player)| player.clone())
                .collect())
        })
    }

    fn update_player(&self, player: PlayerEntity) -> BoxFuture<'static, StorageResult<bool>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut state = inner.lock().await;
            match state.players.get_mut(&(player.room_id, player.id)) {
                Some(slot) => {
                    *slot = player;
                    Ok(true)
                }
                None => Ok(false),
            }
        })
    }

    fn remove_player(
        &self,
        room_id: Uuid,
        player_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut state = inner.lock().await;
            if state.players.shift_remove(&(room_id, player_id)).is_none() {
                return Ok(false);
            }
            // Orphaned votes are purged here, never left dangling.
            let stories = state.story_ids_of_room(room_id);
            state.votes.retain(|(story, voter), _| {
                !(*voter == player_id && stories.contains(story))
            });
            Ok(true)
        })
    }

    fn transfer_host(
        &self,
        room_id: Uuid,
        old_host_id: Uuid,
        new_host_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut state = inner.lock().await;
            let old_is_host = state
                .players
                .get(&(room_id, old_host_id))
                .map(|player| player.is_host);
            let new_exists = state.players.contains_key(&(room_id, new_host_id));

            if old_is_host != Some(true) || !new_exists || old_host_id == new_host_id {
                return Ok(false);
            }

            if let Some(old) = state.players.get_mut(&(room_id, old_host_id)) {
                old.is_host = false;
            }
            if let Some(new) = state.players.get_mut(&(room_id, new_host_id)) {
                new.is_host = true;
            }
            Ok(true)
        })
    }

    fn insert_story(&self, story: StoryEntity) -> BoxFuture<'static, StorageResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut state = inner.lock().await;
            state.stories.insert((story.room_id, story.id), story);
            Ok(())
        })
    }

    fn find_story(
        &self,
        room_id: Uuid,
        story_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<StoryEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let state = inner.lock().await;
            Ok(state.stories.get(&(room_id, story_id)).cloned())
        })
    }

    fn list_stories(&self, room_id: Uuid) -> BoxFuture<'static, StorageResult<Vec<StoryEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let state = inner.lock().await;
            Ok(state
                .stories
                .iter()
                .filter(|((room, _), _)| *room == room_id)
                .map(|(_, story)| story.clone())
                .collect())
        })
    }

    fn update_story(&self, story: StoryEntity) -> BoxFuture<'static, StorageResult<bool>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut state = inner.lock().await;
            match state.stories.get_mut(&(story.room_id, story.id)) {
                Some(slot) => {
                    *slot = story;
                    Ok(true)
                }
                None => Ok(false),
            }
        })
    }

    fn delete_story(
        &self,
        room_id: Uuid,
        story_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut state = inner.lock().await;
            if state.stories.shift_remove(&(room_id, story_id)).is_none() {
                return Ok(false);
            }
            state.votes.retain(|(story, _), _| *story != story_id);
            if let Some(room) = state.rooms.get_mut(&room_id) {
                if room.active_story_id == Some(story_id) {
                    room.active_story_id = None;
                }
            }
            Ok(true)
        })
    }

    fn activate_story(
        &self,
        room_id: Uuid,
        story_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut state = inner.lock().await;
            if !state.stories.contains_key(&(room_id, story_id)) {
                return Ok(false);
            }

            // Demote any other active story; completed ones stay terminal.
            for ((room, id), story) in state.stories.iter_mut() {
                if *room == room_id && *id != story_id && story.status == StoryStatus::Active {
                    story.status = StoryStatus::Idle;
                    story.votes_revealed = false;
                }
            }

            if let Some(story) = state.stories.get_mut(&(room_id, story_id)) {
                story.status = StoryStatus::Active;
                story.votes_revealed = false;
            }
            state.votes.retain(|(story, _), _| *story != story_id);
            if let Some(room) = state.rooms.get_mut(&room_id) {
                room.active_story_id = Some(story_id);
            }
            Ok(true)
        })
    }

    fn upsert_vote(&self, vote: VoteEntity) -> BoxFuture<'static, StorageResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut state = inner.lock().await;
            let key = (vote.story_id, vote.player_id);
            match state.votes.get_mut(&key) {
                Some(existing) => existing.value = vote.value,
                None => {
                    state.votes.insert(key, vote);
                }
            }
            Ok(())
        })
    }

    fn remove_vote(
        &self,
        story_id: Uuid,
        player_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut state = inner.lock().await;
            Ok(state.votes.shift_remove(&(story_id, player_id)).is_some())
        })
    }

    fn list_votes(&self, story_id: Uuid) -> BoxFuture<'static, StorageResult<Vec<VoteEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let state = inner.lock().await;
            Ok(state
                .votes
                .iter()
                .filter(|((story, _), _)| *story == story_id)
                .map(|(_, vote)| vote.clone())
                .collect())
        })
    }

    fn clear_votes(&self, story_id: Uuid) -> BoxFuture<'static, StorageResult<u64>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut state = inner.lock().await;
            let before = state.votes.len();
            state.votes.retain(|(story, _), _| *story != story_id);
            Ok((before - state.votes.len()) as u64)
        })
    }

    fn count_votes(&self, story_id: Uuid) -> BoxFuture<'static, StorageResult<u64>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let state = inner.lock().await;
            Ok(state
                .votes
                .keys()
                .filter(|(story, _)| *story == story_id)
                .count() as u64)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}
