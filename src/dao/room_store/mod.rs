/// In-memory transactional backend.
pub mod memory;

use futures::future::BoxFuture;
use uuid::Uuid;

use crate::dao::models::{PlayerEntity, RoomEntity, StoryEntity, VoteEntity};
use crate::dao::storage::StorageResult;

/// Abstraction over the transactional record store holding rooms, players,
/// stories, and votes.
///
/// Every method is atomic on its own; compound methods (`activate_story`,
/// `transfer_host`, the cascading deletes) perform their multi-step updates
/// inside a single store transaction so callers never observe intermediate
/// states.
pub trait RoomStore: Send + Sync {
    /// Persist a new room row.
    fn insert_room(&self, room: RoomEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Look a room up by primary key.
    fn find_room(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<RoomEntity>>>;
    /// Look a room up by its join code.
    fn find_room_by_code(&self, code: String)
    -> BoxFuture<'static, StorageResult<Option<RoomEntity>>>;
    /// Overwrite a room row. Returns false when the room does not exist.
    fn update_room(&self, room: RoomEntity) -> BoxFuture<'static, StorageResult<bool>>;
    /// Delete a room and cascade to its players, stories, and votes.
    fn delete_room(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;

    /// Persist a new player row.
    fn insert_player(&self, player: PlayerEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Look a player up by `(room, player)`.
    fn find_player(
        &self,
        room_id: Uuid,
        player_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>>;
    /// All players of a room in join order.
    fn list_players(&self, room_id: Uuid) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>>;
    /// Overwrite a player row. Returns false when it does not exist.
    fn update_player(&self, player: PlayerEntity) -> BoxFuture<'static, StorageResult<bool>>;
    /// Delete a player and purge every vote the player cast in the room.
    fn remove_player(
        &self,
        room_id: Uuid,
        player_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<bool>>;
    /// Atomically flip the host flag from one player to another.
    ///
    /// Returns false (and changes nothing) unless both rows exist in the room
    /// and the old player currently holds the flag.
    fn transfer_host(
        &self,
        room_id: Uuid,
        old_host_id: Uuid,
        new_host_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<bool>>;

    /// Persist a new story row.
    fn insert_story(&self, story: StoryEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Look a story up by `(room, story)`.
    fn find_story(
        &self,
        room_id: Uuid,
        story_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<StoryEntity>>>;
    /// All stories of a room in creation order.
    fn list_stories(&self, room_id: Uuid) -> BoxFuture<'static, StorageResult<Vec<StoryEntity>>>;
    /// Overwrite a story row. Returns false when it does not exist.
    fn update_story(&self, story: StoryEntity) -> BoxFuture<'static, StorageResult<bool>>;
    /// Delete a story, cascade its votes, and clear the room's active pointer
    /// when it referenced this story.
    fn delete_story(
        &self,
        room_id: Uuid,
        story_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<bool>>;
    /// Make a story the single active one of its room: demote any other
    /// active story to idle, clear the reveal flag, purge pre-existing votes
    /// for the target, and point the room at it — all in one transaction.
    fn activate_story(
        &self,
        room_id: Uuid,
        story_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<bool>>;

    /// Insert or overwrite the vote keyed by `(player, story)` in one atomic
    /// step. Never creates a duplicate row.
    fn upsert_vote(&self, vote: VoteEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Delete a single vote. Returns false when no row existed.
    fn remove_vote(
        &self,
        story_id: Uuid,
        player_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<bool>>;
    /// All votes for a story in first-cast order.
    fn list_votes(&self, story_id: Uuid) -> BoxFuture<'static, StorageResult<Vec<VoteEntity>>>;
    /// Delete every vote for a story, returning how many were removed.
    fn clear_votes(&self, story_id: Uuid) -> BoxFuture<'static, StorageResult<u64>>;
    /// Number of votes currently stored for a story.
    fn count_votes(&self, story_id: Uuid) -> BoxFuture<'static, StorageResult<u64>>;

    /// Probe backend connectivity.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Attempt to re-establish a dropped backend connection.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
