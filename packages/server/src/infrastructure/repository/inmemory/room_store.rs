//! InMemory RoomStore 実装
//!
//! ## 技術的負債
//!
//! プロセスを再起動すると Room は失われます。
//! 永続化が必要になった場合は RoomStore trait を DB で実装して差し替えます。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{RoomId, RoomStore, StoreError, StoredRoom, Timestamp};

/// インメモリ RoomStore 実装
#[derive(Default)]
pub struct InMemoryRoomStore {
    rooms: Mutex<HashMap<RoomId, StoredRoom>>,
}

impl InMemoryRoomStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomStore for InMemoryRoomStore {
    async fn create_room(&self, room: StoredRoom) -> Result<(), StoreError> {
        let mut rooms = self.rooms.lock().await;
        if rooms.contains_key(&room.id) {
            return Err(StoreError::AlreadyExists(room.id));
        }
        rooms.insert(room.id.clone(), room);
        Ok(())
    }

    async fn find_room(&self, room_id: &RoomId) -> Result<Option<StoredRoom>, StoreError> {
        Ok(self.rooms.lock().await.get(room_id).cloned())
    }

    async fn persist_code(
        &self,
        room_id: &RoomId,
        code: &str,
        updated_at: Timestamp,
    ) -> Result<(), StoreError> {
        let mut rooms = self.rooms.lock().await;
        // 存在しない Room への書き込みは無視する
        if let Some(room) = rooms.get_mut(room_id) {
            room.code = code.to_string();
            room.updated_at = Some(updated_at);
        }
        Ok(())
    }

    async fn ping(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored(id: &str) -> StoredRoom {
        StoredRoom::new(
            RoomId::new(id.to_string()).unwrap(),
            "Test".to_string(),
            "javascript".to_string(),
            Timestamp::new(0),
        )
    }

    #[tokio::test]
    async fn test_create_then_find() {
        // テスト項目: 作成した Room を ID で取得できる
        // given (前提条件):
        let store = InMemoryRoomStore::new();
        store.create_room(stored("r1")).await.unwrap();

        // when (操作):
        let found = store
            .find_room(&RoomId::new("r1".to_string()).unwrap())
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(found, Some(stored("r1")));
    }

    #[tokio::test]
    async fn test_create_duplicate_fails() {
        // テスト項目: 同じ ID の Room は二重に作成できない
        // given (前提条件):
        let store = InMemoryRoomStore::new();
        store.create_room(stored("r1")).await.unwrap();

        // when (操作):
        let result = store.create_room(stored("r1")).await;

        // then (期待する結果):
        assert!(matches!(result, Err(StoreError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_persist_code_updates_room() {
        // テスト項目: persist_code でコードと更新時刻が保存される
        // given (前提条件):
        let store = InMemoryRoomStore::new();
        store.create_room(stored("r1")).await.unwrap();
        let room_id = RoomId::new("r1".to_string()).unwrap();

        // when (操作):
        store
            .persist_code(&room_id, "print(1)", Timestamp::new(42))
            .await
            .unwrap();

        // then (期待する結果):
        let room = store.find_room(&room_id).await.unwrap().unwrap();
        assert_eq!(room.code, "print(1)");
        assert_eq!(room.updated_at, Some(Timestamp::new(42)));
    }
}
