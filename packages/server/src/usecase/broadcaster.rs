//! Broadcaster: Room の参加者全員（送信者を除く）にイベントを配信する
//!
//! 参加者ごとの配信は独立しており、参加者間の順序は保証しない。
//! 1 つのチャンネル内では publish の順序どおりに届く。

use std::sync::Arc;

use crate::domain::{
    BroadcastReport, MessagePusher, ParticipantId, RoomEvent, RoomId, RoomRegistry,
};

pub struct Broadcaster {
    registry: Arc<dyn RoomRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl Broadcaster {
    pub fn new(registry: Arc<dyn RoomRegistry>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            registry,
            message_pusher,
        }
    }

    /// `room_id` の参加者のうち `exclude` 以外の全員にイベントを送る
    ///
    /// 送信は待たない。失敗したチャンネルは MessagePusher が登録を削除し、
    /// 参加者の削除は PresenceReconciler が行う。
    pub async fn publish(
        &self,
        room_id: &RoomId,
        event: &RoomEvent,
        exclude: Option<&ParticipantId>,
    ) -> BroadcastReport {
        tracing::info!(
            "Broadcasting {} event to room {} (excluding user: {:?})",
            event.event_type(),
            room_id,
            exclude.map(ParticipantId::as_str)
        );

        let participants = match self.registry.participant_ids(room_id).await {
            Ok(participants) => participants,
            Err(e) => {
                tracing::warn!("Attempted to send event to room {}: {}", room_id, e);
                return BroadcastReport::default();
            }
        };

        let targets: Vec<ParticipantId> = participants
            .into_iter()
            .filter(|id| Some(id) != exclude)
            .collect();

        let payload = match event.to_json() {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!("Failed to serialize {} event: {}", event.event_type(), e);
                return BroadcastReport::default();
            }
        };

        let report = self.message_pusher.broadcast(targets, &payload).await;
        tracing::info!(
            "Event {} sent to {} users in room {}",
            event.event_type(),
            report.delivered.len(),
            room_id
        );
        report
    }
}
