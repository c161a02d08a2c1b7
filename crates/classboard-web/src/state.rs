//! Application state.

use classboard_api::MemoryBackend;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// WebSocket message types.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(tag = "type", content = "data")]
pub enum BoardEvent {
    WorkItemUpdated { work_item_id: u64, status: String },
    SprintUpdated { sprint_id: u64, status: String },
    BoardRefresh,
}

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<MemoryBackend>,
    pub tx: broadcast::Sender<BoardEvent>,
}

impl AppState {
    pub fn new(backend: Arc<MemoryBackend>) -> Self {
        let (tx, _rx) = broadcast::channel(100);
        Self { backend, tx }
    }

    /// Broadcast an event to all WebSocket clients.
    pub fn broadcast(&self, event: BoardEvent) {
        let _ = self.tx.send(event);
    }
}
