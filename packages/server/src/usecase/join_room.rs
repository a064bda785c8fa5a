//! UseCase: Room への参加
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinRoomUseCase::execute() メソッド
//! - メモリ上に無い Room の永続化層からの復元、参加者の追加、他の参加者への通知
//!
//! ### どのような状況を想定しているか
//! - 正常系：参加（初回は永続化層から復元）
//! - 異常系：存在しない Room、永続化層の障害

use std::sync::Arc;

use crate::domain::{
    DisplayName, Participant, ParticipantId, RoomEvent, RoomId, RoomRegistry, RoomSnapshot,
    RoomStore, SessionEntry, SessionIndex,
};

use super::{Broadcaster, error::RoomActionError};

/// Room 参加のユースケース
pub struct JoinRoomUseCase {
    store: Arc<dyn RoomStore>,
    registry: Arc<dyn RoomRegistry>,
    sessions: Arc<dyn SessionIndex>,
    broadcaster: Arc<Broadcaster>,
}

impl JoinRoomUseCase {
    pub fn new(
        store: Arc<dyn RoomStore>,
        registry: Arc<dyn RoomRegistry>,
        sessions: Arc<dyn SessionIndex>,
        broadcaster: Arc<Broadcaster>,
    ) -> Self {
        Self {
            store,
            registry,
            sessions,
            broadcaster,
        }
    }

    /// 参加を実行
    ///
    /// # Returns
    ///
    /// * `Ok(RoomSnapshot)` - 新しいクライアントの初期化に必要な Room の状態
    /// * `Err(RoomActionError::RoomNotFound)` - Room が存在しない
    pub async fn execute(
        &self,
        room_id: RoomId,
        participant_id: ParticipantId,
        name: DisplayName,
    ) -> Result<RoomSnapshot, RoomActionError> {
        tracing::info!(
            "User {} ({}) attempting to join room: {}",
            name.as_str(),
            participant_id,
            room_id
        );

        // 1. メモリ上に無ければ永続化層から復元
        if !self.registry.contains(&room_id).await {
            let Some(stored) = self.store.find_room(&room_id).await? else {
                tracing::warn!("Room not found in store: {}", room_id);
                return Err(RoomActionError::RoomNotFound);
            };
            self.registry.ensure_loaded(stored).await;
        }

        // 2. 参加者を追加
        let participant = Participant::new(participant_id.clone(), name.clone());
        let snapshot = self.registry.join(&room_id, participant.clone()).await?;
        self.sessions
            .insert(SessionEntry {
                participant_id: participant_id.clone(),
                room_id: room_id.clone(),
                name,
            })
            .await;

        tracing::info!(
            "User {} successfully joined room {}. Total users: {}",
            participant_id,
            room_id,
            snapshot.participants.len()
        );

        // 3. 他の参加者に通知
        self.broadcaster
            .publish(
                &room_id,
                &RoomEvent::user_joined(&participant, &snapshot.participants),
                Some(&participant_id),
            )
            .await;

        Ok(snapshot)
    }
}
