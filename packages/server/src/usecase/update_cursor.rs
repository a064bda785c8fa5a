//! UseCase: カーソル位置の更新

use std::sync::Arc;

use crate::domain::{
    CursorPosition, DisplayName, ParticipantId, RoomEvent, RoomId, RoomRegistry, SessionIndex,
    event::CursorUpdatedPayload,
};

use super::{Broadcaster, error::RoomActionError};

pub struct UpdateCursorUseCase {
    registry: Arc<dyn RoomRegistry>,
    sessions: Arc<dyn SessionIndex>,
    broadcaster: Arc<Broadcaster>,
}

impl UpdateCursorUseCase {
    pub fn new(
        registry: Arc<dyn RoomRegistry>,
        sessions: Arc<dyn SessionIndex>,
        broadcaster: Arc<Broadcaster>,
    ) -> Self {
        Self {
            registry,
            sessions,
            broadcaster,
        }
    }

    /// 参加者でない ID のカーソル更新は `RoomActionError::NotInRoom`
    pub async fn execute(
        &self,
        room_id: RoomId,
        participant_id: ParticipantId,
        name: Option<DisplayName>,
        position: CursorPosition,
    ) -> Result<(), RoomActionError> {
        let name = self.sessions.resolve_name(&participant_id, name).await;

        self.registry
            .update_cursor(&room_id, &participant_id, name.clone(), position)
            .await?;

        let event = RoomEvent::CursorUpdated(CursorUpdatedPayload {
            user_id: participant_id.as_str().to_string(),
            user_name: name.into_string(),
            position,
        });
        self.broadcaster
            .publish(&room_id, &event, Some(&participant_id))
            .await;

        Ok(())
    }
}
