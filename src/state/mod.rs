/// Story lifecycle state machine.
pub mod lifecycle;
/// Per-room realtime bus with presence.
pub mod rooms;

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, RwLock, watch};
use uuid::Uuid;

use crate::{config::AppConfig, dao::room_store::RoomStore, error::ServiceError};

pub use self::rooms::RoomBus;

/// Shared handle to the central application state.
pub type SharedState = Arc<AppState>;

/// Buffer capacity of each room's broadcast channel.
const ROOM_CHANNEL_CAPACITY: usize = 32;

/// Central application state: record store handle, realtime bus, and the
/// per-room mutation gates that serialize logical transactions.
pub struct AppState {
    room_store: RwLock<Option<Arc<dyn RoomStore>>>,
    bus: RoomBus,
    /// One gate per room. Every mutating operation for a room runs under its
    /// gate, making submit/count/maybe-reveal one logical transaction.
    gates: DashMap<Uuid, Arc<Mutex<()>>>,
    degraded: watch::Sender<bool>,
    config: AppConfig,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a record store is installed.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            room_store: RwLock::new(None),
            bus: RoomBus::new(ROOM_CHANNEL_CAPACITY),
            gates: DashMap::new(),
            degraded: degraded_tx,
            config,
        })
    }

    /// Obtain a handle to the current record store, if one is installed.
    pub async fn room_store(&self) -> Option<Arc<dyn RoomStore>> {
        let guard = self.room_store.read().await;
        guard.as_ref().cloned()
    }

    /// Record store handle, or the degraded-mode error when none is installed.
    pub async fn require_room_store(&self) -> Result<Arc<dyn RoomStore>, ServiceError> {
        self.room_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a record store implementation and leave degraded mode.
    pub async fn install_room_store(&self, store: Arc<dyn RoomStore>) {
        {
            let mut guard = self.room_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false);
    }

    /// Remove the current record store and enter degraded mode.
    pub async fn clear_room_store(&self) {
        {
            let mut guard = self.room_store.write().await;
            guard.take();
        }
        self.update_degraded(true);
    }

    /// Current degraded flag.
    pub async fn is_degraded(&self) -> bool {
        let guard = self.room_store.read().await;
        guard.is_none()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Broadcast the degraded flag when the value changes.
    pub fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            let changed = *current != value;
            *current = value;
            changed
        });
    }

    /// The realtime bus carrying room events and presence.
    pub fn bus(&self) -> &RoomBus {
        &self.bus
    }

    /// Immutable runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Mutation gate for a room, created on first use.
    pub fn room_gate(&self, room_id: Uuid) -> Arc<Mutex<()>> {
        self.gates
            .entry(room_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone()
    }

    /// Drop all per-room runtime state (gate and bus channel) after the room
    /// row is gone from the store.
    pub fn drop_room_state(&self, room_id: Uuid) {
        self.gates.remove(&room_id);
        self.bus.drop_room(room_id);
    }
}
