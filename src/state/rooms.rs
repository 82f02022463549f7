use std::sync::{Arc, Mutex, PoisonError};

use dashmap::DashMap;
use indexmap::IndexMap;
use tokio::sync::broadcast;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::dto::sse::{MemberAddedEvent, MemberRemovedEvent, ServerEvent, names};

/// Per-room broadcast channel with presence tracking.
///
/// Created lazily on first use and torn down when the last subscriber is gone
/// or the room is deleted, so no process-wide channel outlives its room.
pub struct RoomChannel {
    sender: broadcast::Sender<ServerEvent>,
    members: Mutex<IndexMap<Uuid, String>>,
}

impl RoomChannel {
    fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self {
            sender,
            members: Mutex::new(IndexMap::new()),
        }
    }

    /// Send an event to all current subscribers, ignoring delivery errors.
    pub fn broadcast(&self, event: ServerEvent) {
        let _ = self.sender.send(event);
    }

    fn members(&self) -> std::sync::MutexGuard<'_, IndexMap<Uuid, String>> {
        self.members.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Registry of room channels: the realtime bus, one channel per room.
pub struct RoomBus {
    channels: DashMap<Uuid, Arc<RoomChannel>>,
    capacity: usize,
}

impl RoomBus {
    /// Build the bus with a per-channel buffer capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: DashMap::new(),
            capacity,
        }
    }

    fn channel(&self, room_id: Uuid) -> Arc<RoomChannel> {
        self.channels
            .entry(room_id)
            .or_insert_with(|| Arc::new(RoomChannel::new(self.capacity)))
            .value()
            .clone()
    }

    /// Publish an event to a room's subscribers.
    ///
    /// Fire-and-forget relative to the mutation that produced the event: a
    /// room without any live channel simply drops the message, and clients
    /// recover through the snapshot resync path.
    pub fn publish(&self, room_id: Uuid, event: ServerEvent) {
        match self.channels.get(&room_id) {
            Some(channel) => channel.broadcast(event),
            None => debug!(%room_id, event = ?event.event, "no live channel for room; event dropped"),
        }
    }

    /// Register a subscriber and announce its presence.
    pub fn subscribe(
        &self,
        room_id: Uuid,
        player_id: Uuid,
        player_name: String,
    ) -> broadcast::Receiver<ServerEvent> {
        let channel = self.channel(room_id);
        let receiver = channel.sender.subscribe();

        channel.members().insert(player_id, player_name.clone());
        match ServerEvent::json(
            Some(names::MEMBER_ADDED.to_string()),
            &MemberAddedEvent {
                player_id,
                player_name,
            },
        ) {
            Ok(event) => channel.broadcast(event),
            Err(err) => warn!(error = %err, "failed to serialize presence payload"),
        }

        receiver
    }

    /// Unregister a subscriber, announce its departure, and drop the channel
    /// once nobody is listening anymore.
    pub fn disconnect(&self, room_id: Uuid, player_id: Uuid) {
        let Some(channel) = self.channels.get(&room_id).map(|entry| entry.value().clone())
        else {
            return;
        };

        let removed = channel.members().shift_remove(&player_id).is_some();
        if removed {
            match ServerEvent::json(
                Some(names::MEMBER_REMOVED.to_string()),
                &MemberRemovedEvent { player_id },
            ) {
                Ok(event) => channel.broadcast(event),
                Err(err) => warn!(error = %err, "failed to serialize presence payload"),
            }
        }

        if channel.members().is_empty() && channel.sender.receiver_count() == 0 {
            self.channels.remove(&room_id);
        }
    }

    /// Player ids currently online in a room.
    pub fn online_members(&self, room_id: Uuid) -> Vec<Uuid> {
        self.channels
            .get(&room_id)
            .map(|channel| channel.members().keys().copied().collect())
            .unwrap_or_default()
    }

    /// Tear a room's channel down entirely (room deletion).
    pub fn drop_room(&self, room_id: Uuid) {
        self.channels.remove(&room_id);
    }
}
