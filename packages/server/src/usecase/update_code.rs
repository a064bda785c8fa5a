//! UseCase: 共有ドキュメントの更新（last-write-wins）
//!
//! メモリ上のドキュメントを置き換えた後、永続化は待たずにバックグラウンドで行い、
//! 他の参加者に `code_updated` を送ります。ブロードキャストは永続化の成否に依存しません。

use std::sync::Arc;

use codesync_shared::time::Clock;

use crate::domain::{
    DisplayName, ParticipantId, RoomEvent, RoomId, RoomRegistry, RoomStore, SessionIndex,
    Timestamp, event::CodeUpdatedPayload,
};

use super::{Broadcaster, error::RoomActionError};

pub struct UpdateCodeUseCase {
    store: Arc<dyn RoomStore>,
    registry: Arc<dyn RoomRegistry>,
    sessions: Arc<dyn SessionIndex>,
    broadcaster: Arc<Broadcaster>,
    clock: Arc<dyn Clock>,
}

impl UpdateCodeUseCase {
    pub fn new(
        store: Arc<dyn RoomStore>,
        registry: Arc<dyn RoomRegistry>,
        sessions: Arc<dyn SessionIndex>,
        broadcaster: Arc<Broadcaster>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            registry,
            sessions,
            broadcaster,
            clock,
        }
    }

    pub async fn execute(
        &self,
        room_id: RoomId,
        participant_id: ParticipantId,
        name: Option<DisplayName>,
        code: String,
    ) -> Result<(), RoomActionError> {
        self.registry
            .update_document(&room_id, code.clone())
            .await?;

        let name = self.sessions.resolve_name(&participant_id, name).await;

        self.persist_in_background(room_id.clone(), code.clone());

        let event = RoomEvent::CodeUpdated(CodeUpdatedPayload {
            code,
            user_id: participant_id.as_str().to_string(),
            user_name: name.into_string(),
        });
        self.broadcaster
            .publish(&room_id, &event, Some(&participant_id))
            .await;

        Ok(())
    }

    fn persist_in_background(&self, room_id: RoomId, code: String) {
        let store = self.store.clone();
        let updated_at = Timestamp::new(self.clock.now_millis());
        tokio::spawn(async move {
            if let Err(e) = store.persist_code(&room_id, &code, updated_at).await {
                tracing::warn!("Failed to persist code for room {}: {}", room_id, e);
            }
        });
    }
}
