//! HTTP API の DTO
//!
//! リクエストの検証はドメイン型への変換時に行う（`conversion` を参照）。

use serde::{Deserialize, Serialize};

use crate::domain::event::UserSummary;

// ========================================
// Request
// ========================================

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRoomRequest {
    pub name: String,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JoinRoomRequest {
    pub room_id: String,
    pub user_id: String,
    pub user_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CodeUpdateRequest {
    pub room_id: String,
    pub code: String,
    pub user_id: String,
    #[serde(default)]
    pub user_name: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PositionDto {
    #[serde(default)]
    pub line: u32,
    #[serde(default)]
    pub column: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CursorUpdateRequest {
    pub room_id: String,
    pub user_id: String,
    #[serde(default)]
    pub user_name: Option<String>,
    pub position: PositionDto,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SendChatMessageRequest {
    pub room_id: String,
    pub user_id: String,
    #[serde(default)]
    pub user_name: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TypingStatusRequest {
    pub room_id: String,
    pub user_id: String,
    #[serde(default)]
    pub user_name: Option<String>,
    pub is_typing: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeaveRoomRequest {
    pub room_id: String,
    pub user_id: String,
    #[serde(default)]
    pub user_name: Option<String>,
}

// ========================================
// Response
// ========================================

/// 永続化された Room
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomDto {
    pub id: String,
    pub name: String,
    pub code: String,
    pub language: String,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessageDto {
    pub id: String,
    pub room_id: String,
    pub user_id: String,
    pub user_name: String,
    pub message: String,
    pub timestamp: String,
}

/// 参加時に返す Room の初期状態
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinRoomResponse {
    pub room_id: String,
    pub room_name: String,
    pub code: String,
    pub language: String,
    pub user_id: String,
    pub user_name: String,
    pub users: Vec<UserSummary>,
    pub chat_messages: Vec<ChatMessageDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
            message_id: None,
        }
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::ok()
        }
    }

    pub fn with_message_id(message_id: String) -> Self {
        Self {
            message_id: Some(message_id),
            ..Self::ok()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// 処理できなかったリクエストに対する応答（HTTP ステータスは 200 のまま）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceInfo {
    pub message: &'static str,
    pub status: &'static str,
    pub version: &'static str,
}
