//! mpsc チャンネルを使った MessagePusher 実装
//!
//! ## 責務
//!
//! - 参加者ごとの `mpsc::Sender` を管理（EventChannel テーブル）
//! - 参加者へのメッセージ送信（broadcast）
//!
//! ## 設計ノート
//!
//! チャンネルの生成はイベントストリーム（`stream.rs`）で行われます。
//! この実装は送信側だけを保持し、`try_send` で決して待たずに送信します。
//! 送信に失敗した（満杯・クローズ済み）チャンネルは切断とみなして登録を削除し、
//! 参加者自体の削除は PresenceReconciler に任せます。

use std::{
    collections::{HashMap, HashSet},
    sync::atomic::{AtomicU64, Ordering},
};

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc::error::TrySendError};

use crate::domain::{
    BroadcastReport, ChannelToken, MessagePushError, MessagePusher, ParticipantId, PusherChannel,
};

struct Registration {
    sender: PusherChannel,
    token: ChannelToken,
}

/// mpsc チャンネルを使った MessagePusher 実装
///
/// ## 使用例
///
/// ```ignore
/// let pusher = ChannelMessagePusher::new();
/// let (tx, rx) = tokio::sync::mpsc::channel(256);
/// let token = pusher.register_client(participant_id.clone(), tx).await;
///
/// let report = pusher.broadcast(vec![participant_id], "{\"type\":\"ping\"}").await;
/// ```
#[derive(Default)]
pub struct ChannelMessagePusher {
    /// 参加者 ID → 登録中のチャンネル
    clients: Mutex<HashMap<ParticipantId, Registration>>,
    next_token: AtomicU64,
}

impl ChannelMessagePusher {
    pub fn new() -> Self {
        Self::default()
    }

    fn push_error(client_id: &ParticipantId, error: TrySendError<String>) -> MessagePushError {
        match error {
            TrySendError::Full(_) => MessagePushError::ChannelFull(client_id.to_string()),
            TrySendError::Closed(_) => MessagePushError::ChannelClosed(client_id.to_string()),
        }
    }
}

#[async_trait]
impl MessagePusher for ChannelMessagePusher {
    async fn register_client(
        &self,
        client_id: ParticipantId,
        sender: PusherChannel,
    ) -> ChannelToken {
        let token = ChannelToken::new(self.next_token.fetch_add(1, Ordering::Relaxed));
        let mut clients = self.clients.lock().await;
        if clients
            .insert(client_id.clone(), Registration { sender, token })
            .is_some()
        {
            tracing::info!("Replaced existing event channel for '{}'", client_id);
        }
        tracing::debug!("Client '{}' registered to MessagePusher", client_id);
        token
    }

    async fn unregister_client(&self, client_id: &ParticipantId, token: ChannelToken) -> bool {
        let mut clients = self.clients.lock().await;
        match clients.get(client_id) {
            Some(registration) if registration.token == token => {
                clients.remove(client_id);
                tracing::debug!("Client '{}' unregistered from MessagePusher", client_id);
                true
            }
            _ => false,
        }
    }

    async fn remove_client(&self, client_id: &ParticipantId) -> bool {
        let removed = self.clients.lock().await.remove(client_id).is_some();
        if removed {
            tracing::debug!("Client '{}' removed from MessagePusher", client_id);
        }
        removed
    }

    async fn is_registered(&self, client_id: &ParticipantId) -> bool {
        self.clients.lock().await.contains_key(client_id)
    }

    async fn registered_clients(&self) -> HashSet<ParticipantId> {
        self.clients.lock().await.keys().cloned().collect()
    }

    async fn count_clients(&self) -> usize {
        self.clients.lock().await.len()
    }

    async fn broadcast(&self, targets: Vec<ParticipantId>, content: &str) -> BroadcastReport {
        let mut clients = self.clients.lock().await;
        let mut report = BroadcastReport::default();

        for target in targets {
            let Some(registration) = clients.get(&target) else {
                report.skipped.push(target);
                continue;
            };

            // ブロードキャストでは一部の送信失敗を許容
            match registration.sender.try_send(content.to_string()) {
                Ok(()) => report.delivered.push(target),
                Err(e) => {
                    tracing::warn!(
                        "Removing broken event channel for client '{}': {}",
                        target,
                        Self::push_error(&target, e)
                    );
                    report.dropped.push(target);
                }
            }
        }

        for dropped in &report.dropped {
            clients.remove(dropped);
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - broadcast の送信と、失敗時の登録削除
    // - トークンによる登録解除（古いストリームが新しい登録を消さない）
    //
    // 【なぜこのテストが必要か】
    // - ブロードキャストは呼び出し元を決してブロックしてはならない
    // - 満杯・クローズ済みのチャンネルは切断として扱う必要がある
    // ========================================

    fn pid(id: &str) -> ParticipantId {
        ParticipantId::new(id.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_broadcast_preserves_fifo_per_client() {
        // テスト項目: 1 つのチャンネルには送信順にメッセージが届く
        // given (前提条件):
        let pusher = ChannelMessagePusher::new();
        let (tx, mut rx) = mpsc::channel(8);
        pusher.register_client(pid("alice"), tx).await;

        // when (操作):
        for i in 0..3 {
            pusher.broadcast(vec![pid("alice")], &format!("m{i}")).await;
        }

        // then (期待する結果):
        assert_eq!(rx.recv().await, Some("m0".to_string()));
        assert_eq!(rx.recv().await, Some("m1".to_string()));
        assert_eq!(rx.recv().await, Some("m2".to_string()));
    }

    #[tokio::test]
    async fn test_broadcast_drops_full_channel_without_blocking() {
        // テスト項目: 満杯のチャンネルは待たずに登録削除され、他には届く
        // given (前提条件):
        let pusher = ChannelMessagePusher::new();
        let (full_tx, _full_rx) = mpsc::channel(1);
        let (ok_tx, mut ok_rx) = mpsc::channel(4);
        pusher.register_client(pid("slow"), full_tx).await;
        pusher.register_client(pid("fast"), ok_tx).await;
        pusher.broadcast(vec![pid("slow")], "fill").await;

        // when (操作):
        let report = pusher
            .broadcast(vec![pid("slow"), pid("fast"), pid("absent")], "event")
            .await;

        // then (期待する結果):
        assert_eq!(report.delivered, vec![pid("fast")]);
        assert_eq!(report.dropped, vec![pid("slow")]);
        assert_eq!(report.skipped, vec![pid("absent")]);
        assert!(!pusher.is_registered(&pid("slow")).await);
        assert_eq!(ok_rx.recv().await, Some("event".to_string()));
    }

    #[tokio::test]
    async fn test_broadcast_drops_closed_channel() {
        // テスト項目: 受信側が破棄されたチャンネルは登録削除される
        // given (前提条件):
        let pusher = ChannelMessagePusher::new();
        let (tx, rx) = mpsc::channel(4);
        pusher.register_client(pid("gone"), tx).await;
        drop(rx);

        // when (操作):
        let report = pusher.broadcast(vec![pid("gone")], "event").await;

        // then (期待する結果):
        assert_eq!(report.dropped, vec![pid("gone")]);
        assert_eq!(pusher.count_clients().await, 0);
    }

    #[tokio::test]
    async fn test_unregister_with_stale_token_keeps_new_registration() {
        // テスト項目: 古いトークンでの登録解除は新しい登録を消さない
        // given (前提条件):
        let pusher = ChannelMessagePusher::new();
        let (old_tx, _old_rx) = mpsc::channel(4);
        let (new_tx, _new_rx) = mpsc::channel(4);
        let old_token = pusher.register_client(pid("alice"), old_tx).await;
        let new_token = pusher.register_client(pid("alice"), new_tx).await;

        // when (操作):
        let stale = pusher.unregister_client(&pid("alice"), old_token).await;

        // then (期待する結果):
        assert!(!stale);
        assert!(pusher.is_registered(&pid("alice")).await);
        assert!(pusher.unregister_client(&pid("alice"), new_token).await);
        assert!(!pusher.is_registered(&pid("alice")).await);
    }
}
