//! UseCase: タイピング中表示の設定 / 解除
//!
//! 変更後のタイピング中一覧全体を `typing_status` として他の参加者に送る。

use std::sync::Arc;

use codesync_shared::time::Clock;

use crate::domain::{
    DisplayName, ParticipantId, RoomEvent, RoomId, RoomRegistry, SessionIndex, Timestamp,
    TypingIndicator,
};

use super::{Broadcaster, error::RoomActionError};

pub struct UpdateTypingUseCase {
    registry: Arc<dyn RoomRegistry>,
    sessions: Arc<dyn SessionIndex>,
    broadcaster: Arc<Broadcaster>,
    clock: Arc<dyn Clock>,
}

impl UpdateTypingUseCase {
    pub fn new(
        registry: Arc<dyn RoomRegistry>,
        sessions: Arc<dyn SessionIndex>,
        broadcaster: Arc<Broadcaster>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
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
        is_typing: bool,
    ) -> Result<Vec<TypingIndicator>, RoomActionError> {
        let name = self.sessions.resolve_name(&participant_id, name).await;
        let now = Timestamp::new(self.clock.now_millis());

        let typing = self
            .registry
            .set_typing(&room_id, &participant_id, name, is_typing, now)
            .await?;

        self.broadcaster
            .publish(
                &room_id,
                &RoomEvent::typing_status(&typing),
                Some(&participant_id),
            )
            .await;

        Ok(typing)
    }
}
