//! Domain entities
//!
//! `RoomState` はメモリ上に保持される 1 つの Room の状態です。
//! 参加者・カーソル・タイピング中表示・チャット履歴・共有ドキュメントを持ちます。
//!
//! ## 不変条件
//!
//! `cursors` と `typing` に存在するキーは必ず `participants` にも存在する。
//! この条件は `set_cursor` / `set_typing` / `remove_participant` で維持される。

use std::collections::{HashMap, VecDeque};

use serde::Serialize;
use uuid::Uuid;

use super::{
    error::RegistryError,
    value_object::{
        CursorPosition, DisplayName, MessageContent, ParticipantId, RoomId, Timestamp,
    },
};

/// チャット履歴の保持件数
pub const CHAT_HISTORY_CAPACITY: usize = 100;

/// Room に参加している 1 ユーザー
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: DisplayName,
}

impl Participant {
    pub fn new(id: ParticipantId, name: DisplayName) -> Self {
        Self { id, name }
    }
}

/// 参加者のカーソル
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cursor {
    pub name: DisplayName,
    pub position: CursorPosition,
}

/// タイピング中表示
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypingIndicator {
    pub participant_id: ParticipantId,
    pub name: DisplayName,
    pub last_set_at: Timestamp,
}

/// チャットメッセージ（生成後は不変、`id` が同一性）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub id: String,
    pub room_id: RoomId,
    pub from: ParticipantId,
    pub from_name: DisplayName,
    pub content: MessageContent,
    pub timestamp: Timestamp,
}

impl ChatMessage {
    pub fn new(
        room_id: RoomId,
        from: ParticipantId,
        from_name: DisplayName,
        content: MessageContent,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            room_id,
            from,
            from_name,
            content,
            timestamp,
        }
    }
}

/// 永続化層に保存される Room
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredRoom {
    pub id: RoomId,
    pub name: String,
    pub code: String,
    pub language: String,
    pub created_at: Timestamp,
    pub updated_at: Option<Timestamp>,
}

impl StoredRoom {
    pub fn new(id: RoomId, name: String, language: String, created_at: Timestamp) -> Self {
        Self {
            id,
            name,
            code: String::new(),
            language,
            created_at,
            updated_at: None,
        }
    }
}

/// 新しく参加したクライアントを初期化するための Room スナップショット
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSnapshot {
    pub id: RoomId,
    pub name: String,
    pub language: String,
    pub document: String,
    pub participants: Vec<Participant>,
    pub chat_history: Vec<ChatMessage>,
}

/// 参加者が Room から抜けた結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    /// 削除された参加者（既に不在だった場合は `None`）
    pub removed: Option<Participant>,
    /// 残りの参加者
    pub remaining: Vec<Participant>,
}

/// メモリ上の Room の状態
#[derive(Debug, Clone)]
pub struct RoomState {
    pub id: RoomId,
    pub name: String,
    pub language: String,
    pub document: String,
    participants: HashMap<ParticipantId, Participant>,
    cursors: HashMap<ParticipantId, Cursor>,
    typing: HashMap<ParticipantId, TypingIndicator>,
    chat_history: VecDeque<ChatMessage>,
    chat_capacity: usize,
}

impl RoomState {
    pub fn new(id: RoomId, name: String, language: String, document: String) -> Self {
        Self::with_capacity(id, name, language, document, CHAT_HISTORY_CAPACITY)
    }

    pub fn with_capacity(
        id: RoomId,
        name: String,
        language: String,
        document: String,
        chat_capacity: usize,
    ) -> Self {
        Self {
            id,
            name,
            language,
            document,
            participants: HashMap::new(),
            cursors: HashMap::new(),
            typing: HashMap::new(),
            chat_history: VecDeque::with_capacity(chat_capacity),
            chat_capacity,
        }
    }

    /// 参加者を追加（同じ ID の再参加は表示名を更新する）
    pub fn add_participant(&mut self, participant: Participant) {
        self.participants.insert(participant.id.clone(), participant);
    }

    /// 参加者を全ての参加者別マップから削除（冪等）
    pub fn remove_participant(&mut self, id: &ParticipantId) -> Option<Participant> {
        self.cursors.remove(id);
        self.typing.remove(id);
        self.participants.remove(id)
    }

    /// 参加者リスト（ID 順）
    pub fn participants(&self) -> Vec<Participant> {
        let mut participants: Vec<Participant> = self.participants.values().cloned().collect();
        participants.sort_by(|a, b| a.id.cmp(&b.id));
        participants
    }

    pub fn participant_ids(&self) -> Vec<ParticipantId> {
        let mut ids: Vec<ParticipantId> = self.participants.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// ドキュメント全体を置き換える（last-write-wins）
    pub fn replace_document(&mut self, text: String) {
        self.document = text;
    }

    pub fn set_cursor(
        &mut self,
        id: &ParticipantId,
        name: DisplayName,
        position: CursorPosition,
    ) -> Result<(), RegistryError> {
        self.ensure_participant(id)?;
        self.cursors.insert(id.clone(), Cursor { name, position });
        Ok(())
    }

    pub fn cursor(&self, id: &ParticipantId) -> Option<&Cursor> {
        self.cursors.get(id)
    }

    /// タイピング中表示を設定 / 解除し、現在のタイピング中一覧を返す
    ///
    /// 解除は参加者でなくてもエラーにしない。
    pub fn set_typing(
        &mut self,
        id: &ParticipantId,
        name: DisplayName,
        is_typing: bool,
        now: Timestamp,
    ) -> Result<Vec<TypingIndicator>, RegistryError> {
        if is_typing {
            self.ensure_participant(id)?;
            self.typing.insert(
                id.clone(),
                TypingIndicator {
                    participant_id: id.clone(),
                    name,
                    last_set_at: now,
                },
            );
        } else {
            self.typing.remove(id);
        }
        Ok(self.typing_users())
    }

    /// 現在のタイピング中一覧（ID 順）
    pub fn typing_users(&self) -> Vec<TypingIndicator> {
        let mut users: Vec<TypingIndicator> = self.typing.values().cloned().collect();
        users.sort_by(|a, b| a.participant_id.cmp(&b.participant_id));
        users
    }

    /// `cutoff` より古いタイピング中表示の参加者 ID
    pub fn expired_typing(&self, cutoff: Timestamp) -> Vec<ParticipantId> {
        let mut expired: Vec<ParticipantId> = self
            .typing
            .values()
            .filter(|indicator| indicator.last_set_at < cutoff)
            .map(|indicator| indicator.participant_id.clone())
            .collect();
        expired.sort();
        expired
    }

    pub fn clear_typing(&mut self, id: &ParticipantId) -> bool {
        self.typing.remove(id).is_some()
    }

    /// チャットメッセージを追加し、古いものから上限を超えた分を捨てる
    pub fn append_chat(&mut self, message: ChatMessage) {
        self.chat_history.push_back(message);
        while self.chat_history.len() > self.chat_capacity {
            self.chat_history.pop_front();
        }
    }

    pub fn chat_history(&self) -> Vec<ChatMessage> {
        self.chat_history.iter().cloned().collect()
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            id: self.id.clone(),
            name: self.name.clone(),
            language: self.language.clone(),
            document: self.document.clone(),
            participants: self.participants(),
            chat_history: self.chat_history(),
        }
    }

    fn ensure_participant(&self, id: &ParticipantId) -> Result<(), RegistryError> {
        if self.participants.contains_key(id) {
            Ok(())
        } else {
            Err(RegistryError::NotInRoom {
                room_id: self.id.clone(),
                participant_id: id.clone(),
            })
        }
    }
}
