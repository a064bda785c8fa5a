//! イベントストリームで配信する Room イベント
//!
//! 全てのイベントは `{"type": ..., "data": {...}}` 形式でシリアライズされます。
//! `ping` だけは `data` を持ちません。

use codesync_shared::time::timestamp_to_rfc3339;
use serde::Serialize;

use super::{
    entity::{ChatMessage, Participant, TypingIndicator},
    value_object::CursorPosition,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum RoomEvent {
    UserJoined(PresencePayload),
    UserLeft(PresencePayload),
    CodeUpdated(CodeUpdatedPayload),
    CursorUpdated(CursorUpdatedPayload),
    ChatMessage(ChatMessagePayload),
    TypingStatus(TypingStatusPayload),
    Ping,
}

impl RoomEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::UserJoined(_) => "user_joined",
            Self::UserLeft(_) => "user_left",
            Self::CodeUpdated(_) => "code_updated",
            Self::CursorUpdated(_) => "cursor_updated",
            Self::ChatMessage(_) => "chat_message",
            Self::TypingStatus(_) => "typing_status",
            Self::Ping => "ping",
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn user_joined(participant: &Participant, users: &[Participant]) -> Self {
        Self::UserJoined(PresencePayload::new(participant, users))
    }

    pub fn user_left(participant: &Participant, users: &[Participant]) -> Self {
        Self::UserLeft(PresencePayload::new(participant, users))
    }

    pub fn typing_status(typing: &[TypingIndicator]) -> Self {
        Self::TypingStatus(TypingStatusPayload {
            typing_users: typing.iter().map(TypingUser::from).collect(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub user_id: String,
    pub user_name: String,
}

impl From<&Participant> for UserSummary {
    fn from(participant: &Participant) -> Self {
        Self {
            user_id: participant.id.as_str().to_string(),
            user_name: participant.name.as_str().to_string(),
        }
    }
}

/// `user_joined` / `user_left` のペイロード
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresencePayload {
    pub user_id: String,
    pub user_name: String,
    pub users: Vec<UserSummary>,
}

impl PresencePayload {
    fn new(participant: &Participant, users: &[Participant]) -> Self {
        Self {
            user_id: participant.id.as_str().to_string(),
            user_name: participant.name.as_str().to_string(),
            users: users.iter().map(UserSummary::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeUpdatedPayload {
    pub code: String,
    pub user_id: String,
    pub user_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CursorUpdatedPayload {
    pub user_id: String,
    pub user_name: String,
    pub position: CursorPosition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessagePayload {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub message: String,
    pub timestamp: String,
}

impl From<&ChatMessage> for ChatMessagePayload {
    fn from(message: &ChatMessage) -> Self {
        Self {
            id: message.id.clone(),
            user_id: message.from.as_str().to_string(),
            user_name: message.from_name.as_str().to_string(),
            message: message.content.as_str().to_string(),
            timestamp: timestamp_to_rfc3339(message.timestamp.value()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypingUser {
    pub user_id: String,
    pub user_name: String,
    pub timestamp: String,
}

impl From<&TypingIndicator> for TypingUser {
    fn from(indicator: &TypingIndicator) -> Self {
        Self {
            user_id: indicator.participant_id.as_str().to_string(),
            user_name: indicator.name.as_str().to_string(),
            timestamp: timestamp_to_rfc3339(indicator.last_set_at.value()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypingStatusPayload {
    pub typing_users: Vec<TypingUser>,
}
