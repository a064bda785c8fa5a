//! UseCase: Room からの退出
//!
//! 参加者を Room から削除し、セッションとイベントチャンネルの登録も片付ける。
//! 退出は冪等で、既に不在の参加者について `user_left` は送らない。

use std::sync::Arc;

use crate::domain::{
    Departure, MessagePusher, ParticipantId, RoomEvent, RoomId, RoomRegistry, SessionIndex,
};

use super::{Broadcaster, error::RoomActionError};

pub struct LeaveRoomUseCase {
    registry: Arc<dyn RoomRegistry>,
    sessions: Arc<dyn SessionIndex>,
    message_pusher: Arc<dyn MessagePusher>,
    broadcaster: Arc<Broadcaster>,
}

impl LeaveRoomUseCase {
    pub fn new(
        registry: Arc<dyn RoomRegistry>,
        sessions: Arc<dyn SessionIndex>,
        message_pusher: Arc<dyn MessagePusher>,
        broadcaster: Arc<Broadcaster>,
    ) -> Self {
        Self {
            registry,
            sessions,
            message_pusher,
            broadcaster,
        }
    }

    pub async fn execute(
        &self,
        room_id: RoomId,
        participant_id: ParticipantId,
    ) -> Result<Departure, RoomActionError> {
        let departure = self.registry.leave(&room_id, &participant_id).await?;

        // 別の Room のセッションに切り替わっている場合は触らない
        let owns_session = match self.sessions.get(&participant_id).await {
            Some(entry) if entry.room_id == room_id => {
                self.sessions.remove(&participant_id).await;
                true
            }
            Some(_) => false,
            None => true,
        };
        if owns_session {
            self.message_pusher.remove_client(&participant_id).await;
        }

        match &departure.removed {
            Some(participant) => {
                tracing::info!(
                    "User {} left room {}. Remaining users: {}",
                    participant_id,
                    room_id,
                    departure.remaining.len()
                );
                self.broadcaster
                    .publish(
                        &room_id,
                        &RoomEvent::user_left(participant, &departure.remaining),
                        Some(&participant_id),
                    )
                    .await;
            }
            None => {
                tracing::debug!("User {} was not in room {}", participant_id, room_id);
            }
        }

        Ok(departure)
    }
}
