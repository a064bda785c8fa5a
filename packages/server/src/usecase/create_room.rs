//! UseCase: Room の作成
//!
//! 永続化した後、すぐにメモリ上にもキャッシュする。

use std::sync::Arc;

use codesync_shared::time::Clock;

use crate::domain::{RoomId, RoomRegistry, RoomStore, StoredRoom, Timestamp};

use super::error::CreateRoomError;

/// 言語が指定されなかった場合の既定値
pub const DEFAULT_LANGUAGE: &str = "javascript";

pub struct CreateRoomUseCase {
    store: Arc<dyn RoomStore>,
    registry: Arc<dyn RoomRegistry>,
    clock: Arc<dyn Clock>,
}

impl CreateRoomUseCase {
    pub fn new(
        store: Arc<dyn RoomStore>,
        registry: Arc<dyn RoomRegistry>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            registry,
            clock,
        }
    }

    pub async fn execute(
        &self,
        name: String,
        language: Option<String>,
    ) -> Result<StoredRoom, CreateRoomError> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(CreateRoomError::EmptyName);
        }
        let language = language
            .filter(|language| !language.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

        tracing::info!("Creating room: {} with language: {}", name, language);

        let room = StoredRoom::new(
            RoomId::generate(),
            name,
            language,
            Timestamp::new(self.clock.now_millis()),
        );
        self.store.create_room(room.clone()).await?;
        self.registry.ensure_loaded(room.clone()).await;

        tracing::info!("Room created successfully with ID: {}", room.id);
        Ok(room)
    }
}
