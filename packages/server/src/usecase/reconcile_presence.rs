//! PresenceReconciler: 幽霊参加者と古いタイピング中表示の定期的な掃除
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - PresenceReconciler::reconcile_at() / spawn() メソッド
//! - イベントチャンネルを持たない参加者の退出処理、期限切れタイピング中表示の削除
//!
//! ### どのような状況を想定しているか
//! - 正常系：接続中の参加者は残る
//! - 切断系：leave せずにストリームが閉じた参加者は次の巡回で 1 回だけ user_left
//! - 時間経過：タイピング中表示は 10 秒を過ぎると消える
//! - 定期実行：起動直後には巡回せず、1 周期ごとに巡回する

use std::{sync::Arc, time::Duration};

use codesync_shared::time::Clock;
use tokio::{task::JoinHandle, time::MissedTickBehavior};

use crate::domain::{
    MessagePusher, ParticipantId, RoomEvent, RoomId, RoomRegistry, SessionIndex, Timestamp,
};

use super::Broadcaster;

/// 1 回の巡回結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// 退出させた参加者
    pub evicted: Vec<(RoomId, ParticipantId)>,
    /// 削除したタイピング中表示
    pub expired_typing: Vec<(RoomId, ParticipantId)>,
}

pub struct PresenceReconciler {
    registry: Arc<dyn RoomRegistry>,
    sessions: Arc<dyn SessionIndex>,
    message_pusher: Arc<dyn MessagePusher>,
    broadcaster: Arc<Broadcaster>,
    clock: Arc<dyn Clock>,
    typing_ttl: Duration,
}

impl PresenceReconciler {
    pub fn new(
        registry: Arc<dyn RoomRegistry>,
        sessions: Arc<dyn SessionIndex>,
        message_pusher: Arc<dyn MessagePusher>,
        broadcaster: Arc<Broadcaster>,
        clock: Arc<dyn Clock>,
        typing_ttl: Duration,
    ) -> Self {
        Self {
            registry,
            sessions,
            message_pusher,
            broadcaster,
            clock,
            typing_ttl,
        }
    }

    /// `period` ごとに巡回するタスクを起動する（最初の巡回は `period` 後）
    pub fn spawn(self: Arc<Self>, period: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // interval の最初の tick は即座に完了する
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let report = self.run_once().await;
                if !report.evicted.is_empty() || !report.expired_typing.is_empty() {
                    tracing::info!(
                        "Presence reconciliation: evicted {} users, expired {} typing indicators",
                        report.evicted.len(),
                        report.expired_typing.len()
                    );
                }
            }
        })
    }

    pub async fn run_once(&self) -> ReconcileReport {
        self.reconcile_at(Timestamp::new(self.clock.now_millis()))
            .await
    }

    /// `now` を基準に全ての Room を巡回する
    pub async fn reconcile_at(&self, now: Timestamp) -> ReconcileReport {
        let ttl_millis = i64::try_from(self.typing_ttl.as_millis()).unwrap_or(i64::MAX);
        let cutoff = now.minus_millis(ttl_millis);
        let mut report = ReconcileReport::default();

        for room_id in self.registry.room_ids().await {
            self.reconcile_room(&room_id, cutoff, &mut report).await;
        }
        report
    }

    async fn reconcile_room(
        &self,
        room_id: &RoomId,
        cutoff: Timestamp,
        report: &mut ReconcileReport,
    ) {
        // 1. チャンネルを持たない参加者を特定
        let Ok(participants) = self.registry.participant_ids(room_id).await else {
            return;
        };
        let registered = self.message_pusher.registered_clients().await;
        let ghosts: Vec<ParticipantId> = participants
            .into_iter()
            .filter(|id| !registered.contains(id))
            .collect();

        // 2. 期限切れのタイピング中表示を 1 件ずつ削除
        let expired = self
            .registry
            .expired_typing(room_id, cutoff)
            .await
            .unwrap_or_default();
        for participant_id in expired {
            let Ok(typing) = self.registry.clear_typing(room_id, &participant_id).await else {
                continue;
            };
            tracing::debug!(
                "Typing indicator expired for user {} in room {}",
                participant_id,
                room_id
            );
            self.broadcaster
                .publish(room_id, &RoomEvent::typing_status(&typing), None)
                .await;
            report
                .expired_typing
                .push((room_id.clone(), participant_id));
        }

        // 3. 幽霊参加者を退出させる
        for participant_id in ghosts {
            // 巡回中に再接続した参加者は残す
            if self.message_pusher.is_registered(&participant_id).await {
                continue;
            }
            let Ok(departure) = self.registry.leave(room_id, &participant_id).await else {
                continue;
            };
            let Some(participant) = departure.removed else {
                continue;
            };
            if let Some(entry) = self.sessions.get(&participant_id).await
                && &entry.room_id == room_id
            {
                self.sessions.remove(&participant_id).await;
            }

            tracing::info!(
                "Evicted disconnected user {} from room {}",
                participant_id,
                room_id
            );
            self.broadcaster
                .publish(
                    room_id,
                    &RoomEvent::user_left(&participant, &departure.remaining),
                    None,
                )
                .await;
            report.evicted.push((room_id.clone(), participant_id));
        }
    }
}
