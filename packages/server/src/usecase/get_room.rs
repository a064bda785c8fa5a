//! UseCase: 永続化された Room の取得

use std::sync::Arc;

use crate::domain::{RoomId, RoomStore, StoredRoom};

use super::error::RoomActionError;

pub struct GetRoomUseCase {
    store: Arc<dyn RoomStore>,
}

impl GetRoomUseCase {
    pub fn new(store: Arc<dyn RoomStore>) -> Self {
        Self { store }
    }

    pub async fn execute(&self, room_id: RoomId) -> Result<StoredRoom, RoomActionError> {
        tracing::info!("Getting room details for room_id: {}", room_id);
        match self.store.find_room(&room_id).await? {
            Some(room) => Ok(room),
            None => {
                tracing::warn!("Room not found: {}", room_id);
                Err(RoomActionError::RoomNotFound)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecase::test_support::TestContext;

    #[tokio::test]
    async fn test_get_room() {
        // テスト項目: 保存済みの Room は取得でき、未知の Room は RoomNotFound
        // given (前提条件):
        let ctx = TestContext::new();
        let room_id = ctx.stored_room("r1").await;
        let usecase = GetRoomUseCase::new(ctx.store.clone());

        // when (操作):
        let found = usecase.execute(room_id.clone()).await;
        let missing = usecase
            .execute(RoomId::new("missing".to_string()).unwrap())
            .await;

        // then (期待する結果):
        assert_eq!(found.unwrap().id, room_id);
        assert_eq!(missing, Err(RoomActionError::RoomNotFound));
    }
}
