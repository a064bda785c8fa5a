//! UseCase: サーバーの稼働状況（ヘルスチェック用）

use std::sync::Arc;

use codesync_shared::time::{Clock, timestamp_to_rfc3339};
use serde::Serialize;

use crate::domain::{MessagePusher, RoomRegistry, RoomStore};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerStatus {
    pub status: &'static str,
    pub timestamp: String,
    pub database: &'static str,
    pub active_rooms: usize,
    pub active_connections: usize,
}

pub struct ServerStatusUseCase {
    store: Arc<dyn RoomStore>,
    registry: Arc<dyn RoomRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl ServerStatusUseCase {
    pub fn new(
        store: Arc<dyn RoomStore>,
        registry: Arc<dyn RoomRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            registry,
            message_pusher,
            clock,
        }
    }

    pub async fn execute(&self) -> ServerStatus {
        let database = if self.store.ping().await {
            "connected"
        } else {
            "disconnected"
        };
        ServerStatus {
            status: "healthy",
            timestamp: timestamp_to_rfc3339(self.clock.now_millis()),
            database,
            active_rooms: self.registry.count_rooms().await,
            active_connections: self.message_pusher.count_clients().await,
        }
    }
}
