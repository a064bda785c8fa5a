//! MessagePusher trait 定義
//!
//! 参加者ごとのイベントチャンネル（EventChannel）の登録と、そこへの送信を抽象化します。
//! MessagePusher はチャンネルの送信側だけを持ち、受信側はイベントストリームが所有します。

use std::collections::HashSet;

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::ParticipantId;

/// 参加者 1 人分のイベントチャンネル（送信側）
pub type PusherChannel = mpsc::Sender<String>;

/// チャンネル登録ごとに発行されるトークン
///
/// 同じ参加者 ID で再接続した場合、古いストリームの後片付けが
/// 新しい登録を消さないようにするために使う。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelToken(u64);

impl ChannelToken {
    pub fn new(value: u64) -> Self {
        Self(value)
    }
}

/// ブロードキャストの結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// キューに積めた参加者
    pub delivered: Vec<ParticipantId>,
    /// 送信に失敗し、チャンネル登録を削除した参加者
    pub dropped: Vec<ParticipantId>,
    /// チャンネルが登録されていなかった参加者
    pub skipped: Vec<ParticipantId>,
}

#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// チャンネルを登録する（同じ ID の既存登録は置き換える）
    async fn register_client(&self, client_id: ParticipantId, sender: PusherChannel)
    -> ChannelToken;

    /// `token` の登録がまだ有効な場合のみ登録を解除する
    async fn unregister_client(&self, client_id: &ParticipantId, token: ChannelToken) -> bool;

    /// 登録を無条件に解除する
    async fn remove_client(&self, client_id: &ParticipantId) -> bool;

    async fn is_registered(&self, client_id: &ParticipantId) -> bool;

    /// 登録中の全ての参加者 ID
    async fn registered_clients(&self) -> HashSet<ParticipantId>;

    async fn count_clients(&self) -> usize;

    /// 複数の参加者に送信（待たない）
    ///
    /// 送信に失敗したチャンネルは切断とみなして登録を削除する。
    async fn broadcast(&self, targets: Vec<ParticipantId>, content: &str) -> BroadcastReport;
}
