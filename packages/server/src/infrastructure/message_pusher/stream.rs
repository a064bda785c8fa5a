//! 参加者ごとの長寿命イベントストリーム
//!
//! ## 責務
//!
//! - EventChannel を生成し、MessagePusher に登録する（同じ ID は最後に開いたストリームが勝つ）
//! - 次のイベントかアイドルタイムアウトのどちらかを待ち、タイムアウト時は ping を送る
//!
//! 接続がどのように終わっても、ストリームの破棄時にチャンネル登録を削除します。

use std::{sync::Arc, time::Duration};

use futures_util::{Stream, stream};
use tokio::sync::mpsc;

use crate::domain::{ChannelToken, MessagePusher, ParticipantId};

/// シリアライズ済みの `ping` イベント
pub const KEEP_ALIVE_PAYLOAD: &str = r#"{"type":"ping"}"#;

/// ストリームが 1 回に送り出すもの
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamFrame {
    /// キューに積まれた Room イベント
    Event(String),
    /// アイドルタイムアウト経過
    KeepAlive,
}

impl StreamFrame {
    pub fn into_payload(self) -> String {
        match self {
            Self::Event(payload) => payload,
            Self::KeepAlive => KEEP_ALIVE_PAYLOAD.to_string(),
        }
    }
}

pub struct EventStream {
    participant_id: ParticipantId,
    receiver: mpsc::Receiver<String>,
    idle_timeout: Duration,
    _registration: Registration,
}

impl EventStream {
    /// `participant_id` の EventChannel を生成して登録する
    pub async fn open(
        pusher: Arc<dyn MessagePusher>,
        participant_id: ParticipantId,
        capacity: usize,
        idle_timeout: Duration,
    ) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let token = pusher
            .register_client(participant_id.clone(), sender)
            .await;
        tracing::info!("Event stream started for user: {}", participant_id);

        Self {
            participant_id: participant_id.clone(),
            receiver,
            idle_timeout,
            _registration: Registration {
                pusher,
                participant_id,
                token,
            },
        }
    }

    pub fn participant_id(&self) -> &ParticipantId {
        &self.participant_id
    }

    /// 次のフレームを待つ
    ///
    /// 新しいストリームへの置き換えや leave で登録が消え、チャンネルが
    /// 閉じられた場合は `None` を返す。
    pub async fn next_frame(&mut self) -> Option<StreamFrame> {
        tokio::select! {
            message = self.receiver.recv() => message.map(StreamFrame::Event),
            _ = tokio::time::sleep(self.idle_timeout) => Some(StreamFrame::KeepAlive),
        }
    }

    /// フレームごとのシリアライズ済みペイロード
    pub fn into_payloads(self) -> impl Stream<Item = String> + Send + 'static {
        stream::unfold(self, |mut events| async move {
            let frame = events.next_frame().await?;
            Some((frame.into_payload(), events))
        })
    }
}

/// 破棄時にチャンネル登録を削除する
struct Registration {
    pusher: Arc<dyn MessagePusher>,
    participant_id: ParticipantId,
    token: ChannelToken,
}

impl Drop for Registration {
    fn drop(&mut self) {
        let pusher = self.pusher.clone();
        let participant_id = self.participant_id.clone();
        let token = self.token;

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    pusher.unregister_client(&participant_id, token).await;
                    tracing::info!("Event stream ended for user: {}", participant_id);
                });
            }
            Err(_) => {
                tracing::warn!(
                    "No runtime to unregister event channel for '{}'",
                    participant_id
                );
            }
        }
    }
}
