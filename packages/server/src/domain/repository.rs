//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! - `RoomRegistry`: メモリ上の Room 状態（プロセス全体で 1 つ）
//! - `SessionIndex`: 参加者 ID → {Room ID, 表示名}
//! - `RoomStore`: Room の永続化（外部の協調者）

use async_trait::async_trait;

use super::{
    Departure, DisplayName, ParticipantId, RegistryError, RoomId, RoomSnapshot, StoreError,
    StoredRoom, Timestamp, TypingIndicator,
    entity::{ChatMessage, Participant},
    value_object::CursorPosition,
};

/// メモリ上の Room 状態を管理するレジストリ
///
/// Room を対象とする全ての操作は、Room がレジストリに存在しない場合
/// `RegistryError::RoomNotFound` を返す。
#[async_trait]
pub trait RoomRegistry: Send + Sync {
    /// スナップショットから Room をキャッシュする（既に存在する場合は何もしない）
    async fn ensure_loaded(&self, seed: StoredRoom);

    /// Room がキャッシュされているか
    async fn contains(&self, room_id: &RoomId) -> bool;

    /// 参加者を追加し、新規クライアント初期化用のスナップショットを返す
    async fn join(
        &self,
        room_id: &RoomId,
        participant: Participant,
    ) -> Result<RoomSnapshot, RegistryError>;

    /// ドキュメント全体を置き換える
    async fn update_document(&self, room_id: &RoomId, text: String) -> Result<(), RegistryError>;

    /// 現在のドキュメント
    async fn document(&self, room_id: &RoomId) -> Result<String, RegistryError>;

    /// カーソル位置を更新
    async fn update_cursor(
        &self,
        room_id: &RoomId,
        participant_id: &ParticipantId,
        name: DisplayName,
        position: CursorPosition,
    ) -> Result<(), RegistryError>;

    /// タイピング中表示を設定 / 解除し、現在のタイピング中一覧を返す
    async fn set_typing(
        &self,
        room_id: &RoomId,
        participant_id: &ParticipantId,
        name: DisplayName,
        is_typing: bool,
        now: Timestamp,
    ) -> Result<Vec<TypingIndicator>, RegistryError>;

    /// チャットメッセージを追加（履歴は上限件数まで）
    async fn append_chat(&self, room_id: &RoomId, message: ChatMessage)
    -> Result<(), RegistryError>;

    /// 参加者を Room から削除（冪等）
    async fn leave(
        &self,
        room_id: &RoomId,
        participant_id: &ParticipantId,
    ) -> Result<Departure, RegistryError>;

    /// Room の参加者 ID 一覧
    async fn participant_ids(&self, room_id: &RoomId) -> Result<Vec<ParticipantId>, RegistryError>;

    /// Room の参加者一覧
    async fn participants(&self, room_id: &RoomId) -> Result<Vec<Participant>, RegistryError>;

    /// Room のスナップショット
    async fn snapshot(&self, room_id: &RoomId) -> Result<RoomSnapshot, RegistryError>;

    /// `cutoff` より古いタイピング中表示を持つ参加者
    async fn expired_typing(
        &self,
        room_id: &RoomId,
        cutoff: Timestamp,
    ) -> Result<Vec<ParticipantId>, RegistryError>;

    /// タイピング中表示を 1 件削除し、現在のタイピング中一覧を返す
    async fn clear_typing(
        &self,
        room_id: &RoomId,
        participant_id: &ParticipantId,
    ) -> Result<Vec<TypingIndicator>, RegistryError>;

    /// キャッシュされている全ての Room ID
    async fn room_ids(&self) -> Vec<RoomId>;

    /// キャッシュされている Room 数
    async fn count_rooms(&self) -> usize;
}

/// 接続中の参加者のセッション情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEntry {
    pub participant_id: ParticipantId,
    pub room_id: RoomId,
    pub name: DisplayName,
}

/// 参加者 ID → セッション情報
///
/// 表示名を省略したイベントの名前補完と、切断時の後片付けに使う。
#[async_trait]
pub trait SessionIndex: Send + Sync {
    async fn insert(&self, entry: SessionEntry);

    async fn get(&self, participant_id: &ParticipantId) -> Option<SessionEntry>;

    async fn remove(&self, participant_id: &ParticipantId) -> Option<SessionEntry>;

    /// 表示名を解決する（セッションが無ければ `None`）
    async fn display_name(&self, participant_id: &ParticipantId) -> Option<DisplayName> {
        self.get(participant_id).await.map(|entry| entry.name)
    }

    /// 指定された表示名 → セッションの表示名 → 参加者 ID の順で表示名を決める
    async fn resolve_name(
        &self,
        participant_id: &ParticipantId,
        provided: Option<DisplayName>,
    ) -> DisplayName {
        if let Some(name) = provided {
            return name;
        }
        self.display_name(participant_id)
            .await
            .unwrap_or_else(|| DisplayName::from_participant(participant_id))
    }
}

/// Room の永続化ストア
///
/// コアから見ると fire-and-forget の協調者。失敗は呼び出し側でログに残し、
/// リトライはしない。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomStore: Send + Sync {
    async fn create_room(&self, room: StoredRoom) -> Result<(), StoreError>;

    async fn find_room(&self, room_id: &RoomId) -> Result<Option<StoredRoom>, StoreError>;

    async fn persist_code(
        &self,
        room_id: &RoomId,
        code: &str,
        updated_at: Timestamp,
    ) -> Result<(), StoreError>;

    async fn ping(&self) -> bool;
}
