//! UseCase: チャットメッセージの送信
//!
//! 本文の検証 → 履歴への追加 → 送信者を含む全参加者への配信 の順に行う。

use std::sync::Arc;

use codesync_shared::time::Clock;

use crate::domain::{
    ChatMessage, DisplayName, MessageContent, ParticipantId, RoomEvent, RoomId, RoomRegistry,
    SessionIndex, Timestamp,
};

use super::{Broadcaster, error::RoomActionError};

pub struct SendChatMessageUseCase {
    registry: Arc<dyn RoomRegistry>,
    sessions: Arc<dyn SessionIndex>,
    broadcaster: Arc<Broadcaster>,
    clock: Arc<dyn Clock>,
}

impl SendChatMessageUseCase {
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

    /// メッセージを送信し、保存されたメッセージを返す
    ///
    /// 空の本文や上限を超える本文は `RoomActionError::Validation` で拒否され、
    /// 履歴にも追加されない。
    pub async fn execute(
        &self,
        room_id: RoomId,
        participant_id: ParticipantId,
        name: Option<DisplayName>,
        message: String,
    ) -> Result<ChatMessage, RoomActionError> {
        let content = MessageContent::new(message)?;
        let name = self.sessions.resolve_name(&participant_id, name).await;

        let message = ChatMessage::new(
            room_id.clone(),
            participant_id,
            name,
            content,
            Timestamp::new(self.clock.now_millis()),
        );
        self.registry.append_chat(&room_id, message.clone()).await?;

        tracing::info!(
            "Chat message {} from {} in room {}",
            message.id,
            message.from,
            room_id
        );

        self.broadcaster
            .publish(&room_id, &RoomEvent::ChatMessage((&message).into()), None)
            .await;

        Ok(message)
    }
}
