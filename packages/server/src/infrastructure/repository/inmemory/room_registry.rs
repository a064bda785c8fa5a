//! InMemory RoomRegistry 実装
//!
//! ドメイン層が定義する RoomRegistry trait の具体的な実装。
//! プロセス全体で 1 つの `HashMap<RoomId, RoomState>` を単一のロックで保護します。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    CHAT_HISTORY_CAPACITY, ChatMessage, CursorPosition, Departure, DisplayName, Participant,
    ParticipantId, RegistryError, RoomId, RoomRegistry, RoomSnapshot, RoomState, StoredRoom,
    Timestamp, TypingIndicator,
};

/// インメモリ RoomRegistry 実装
pub struct InMemoryRoomRegistry {
    rooms: Mutex<HashMap<RoomId, RoomState>>,
    chat_capacity: usize,
}

impl InMemoryRoomRegistry {
    pub fn new() -> Self {
        Self::with_chat_capacity(CHAT_HISTORY_CAPACITY)
    }

    /// チャット履歴の保持件数を指定して作成
    pub fn with_chat_capacity(chat_capacity: usize) -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
            chat_capacity,
        }
    }

    /// Room を 1 つロックした状態で `f` を実行する
    async fn with_room<R>(
        &self,
        room_id: &RoomId,
        f: impl FnOnce(&mut RoomState) -> Result<R, RegistryError>,
    ) -> Result<R, RegistryError> {
        let mut rooms = self.rooms.lock().await;
        let room = rooms
            .get_mut(room_id)
            .ok_or_else(|| RegistryError::RoomNotFound(room_id.clone()))?;
        f(room)
    }
}

impl Default for InMemoryRoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RoomRegistry for InMemoryRoomRegistry {
    async fn ensure_loaded(&self, seed: StoredRoom) {
        let mut rooms = self.rooms.lock().await;
        if rooms.contains_key(&seed.id) {
            return;
        }
        tracing::info!("Initializing room in memory: {}", seed.id);
        let chat_capacity = self.chat_capacity;
        rooms.insert(
            seed.id.clone(),
            RoomState::with_capacity(seed.id, seed.name, seed.language, seed.code, chat_capacity),
        );
    }

    async fn contains(&self, room_id: &RoomId) -> bool {
        self.rooms.lock().await.contains_key(room_id)
    }

    async fn join(
        &self,
        room_id: &RoomId,
        participant: Participant,
    ) -> Result<RoomSnapshot, RegistryError> {
        self.with_room(room_id, |room| {
            room.add_participant(participant);
            Ok(room.snapshot())
        })
        .await
    }

    async fn update_document(&self, room_id: &RoomId, text: String) -> Result<(), RegistryError> {
        self.with_room(room_id, |room| {
            room.replace_document(text);
            Ok(())
        })
        .await
    }

    async fn document(&self, room_id: &RoomId) -> Result<String, RegistryError> {
        self.with_room(room_id, |room| Ok(room.document.clone()))
            .await
    }

    async fn update_cursor(
        &self,
        room_id: &RoomId,
        participant_id: &ParticipantId,
        name: DisplayName,
        position: CursorPosition,
    ) -> Result<(), RegistryError> {
        self.with_room(room_id, |room| room.set_cursor(participant_id, name, position))
            .await
    }

    async fn set_typing(
        &self,
        room_id: &RoomId,
        participant_id: &ParticipantId,
        name: DisplayName,
        is_typing: bool,
        now: Timestamp,
    ) -> Result<Vec<TypingIndicator>, RegistryError> {
        self.with_room(room_id, |room| {
            room.set_typing(participant_id, name, is_typing, now)
        })
        .await
    }

    async fn append_chat(
        &self,
        room_id: &RoomId,
        message: ChatMessage,
    ) -> Result<(), RegistryError> {
        self.with_room(room_id, |room| {
            room.append_chat(message);
            Ok(())
        })
        .await
    }

    async fn leave(
        &self,
        room_id: &RoomId,
        participant_id: &ParticipantId,
    ) -> Result<Departure, RegistryError> {
        self.with_room(room_id, |room| {
            let removed = room.remove_participant(participant_id);
            Ok(Departure {
                removed,
                remaining: room.participants(),
            })
        })
        .await
    }

    async fn participant_ids(&self, room_id: &RoomId) -> Result<Vec<ParticipantId>, RegistryError> {
        self.with_room(room_id, |room| Ok(room.participant_ids()))
            .await
    }

    async fn participants(&self, room_id: &RoomId) -> Result<Vec<Participant>, RegistryError> {
        self.with_room(room_id, |room| Ok(room.participants()))
            .await
    }

    async fn snapshot(&self, room_id: &RoomId) -> Result<RoomSnapshot, RegistryError> {
        self.with_room(room_id, |room| Ok(room.snapshot())).await
    }

    async fn expired_typing(
        &self,
        room_id: &RoomId,
        cutoff: Timestamp,
    ) -> Result<Vec<ParticipantId>, RegistryError> {
        self.with_room(room_id, |room| Ok(room.expired_typing(cutoff)))
            .await
    }

    async fn clear_typing(
        &self,
        room_id: &RoomId,
        participant_id: &ParticipantId,
    ) -> Result<Vec<TypingIndicator>, RegistryError> {
        self.with_room(room_id, |room| {
            room.clear_typing(participant_id);
            Ok(room.typing_users())
        })
        .await
    }

    async fn room_ids(&self) -> Vec<RoomId> {
        let rooms = self.rooms.lock().await;
        let mut ids: Vec<RoomId> = rooms.keys().cloned().collect();
        ids.sort();
        ids
    }

    async fn count_rooms(&self) -> usize {
        self.rooms.lock().await.len()
    }
}
