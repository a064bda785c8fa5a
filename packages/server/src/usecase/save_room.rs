//! UseCase: メモリ上のドキュメントを明示的に保存する
//!
//! 通常の更新と違い、永続化の完了を待って結果を返す。

use std::sync::Arc;

use codesync_shared::time::Clock;

use crate::domain::{RoomId, RoomRegistry, RoomStore, Timestamp};

use super::error::RoomActionError;

pub struct SaveRoomUseCase {
    store: Arc<dyn RoomStore>,
    registry: Arc<dyn RoomRegistry>,
    clock: Arc<dyn Clock>,
}

impl SaveRoomUseCase {
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

    pub async fn execute(&self, room_id: RoomId) -> Result<(), RoomActionError> {
        let document = self.registry.document(&room_id).await?;
        self.store
            .persist_code(
                &room_id,
                &document,
                Timestamp::new(self.clock.now_millis()),
            )
            .await?;
        tracing::info!("Room {} saved ({} bytes)", room_id, document.len());
        Ok(())
    }
}
