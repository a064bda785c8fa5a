//! Conversion logic between DTOs and domain types.

use codesync_shared::time::timestamp_to_rfc3339;

use crate::domain::{
    ChatMessage, CursorPosition, DisplayName, ParticipantId, RoomId, RoomSnapshot, StoredRoom,
    ValueObjectError, event::UserSummary,
};
use crate::infrastructure::dto::http as dto;

// ========================================
// DTO → Domain
// ========================================

/// 参加を伴う操作の共通部分（Room ID と参加者 ID）
pub fn room_and_participant(
    room_id: String,
    user_id: String,
) -> Result<(RoomId, ParticipantId), ValueObjectError> {
    Ok((RoomId::new(room_id)?, ParticipantId::new(user_id)?))
}

/// 任意の表示名（空文字は未指定とみなす）
pub fn optional_name(user_name: Option<String>) -> Option<DisplayName> {
    user_name.and_then(|name| DisplayName::new(name).ok())
}

impl From<dto::PositionDto> for CursorPosition {
    fn from(dto: dto::PositionDto) -> Self {
        CursorPosition::new(dto.line, dto.column)
    }
}

// ========================================
// Domain → DTO
// ========================================

impl From<StoredRoom> for dto::RoomDto {
    fn from(room: StoredRoom) -> Self {
        Self {
            id: room.id.into_string(),
            name: room.name,
            code: room.code,
            language: room.language,
            created_at: timestamp_to_rfc3339(room.created_at.value()),
            updated_at: room
                .updated_at
                .map(|updated_at| timestamp_to_rfc3339(updated_at.value())),
        }
    }
}

impl From<&ChatMessage> for dto::ChatMessageDto {
    fn from(message: &ChatMessage) -> Self {
        Self {
            id: message.id.clone(),
            room_id: message.room_id.as_str().to_string(),
            user_id: message.from.as_str().to_string(),
            user_name: message.from_name.as_str().to_string(),
            message: message.content.as_str().to_string(),
            timestamp: timestamp_to_rfc3339(message.timestamp.value()),
        }
    }
}

impl dto::JoinRoomResponse {
    pub fn from_snapshot(
        snapshot: RoomSnapshot,
        participant_id: &ParticipantId,
        name: &DisplayName,
    ) -> Self {
        Self {
            room_id: snapshot.id.into_string(),
            room_name: snapshot.name,
            code: snapshot.document,
            language: snapshot.language,
            user_id: participant_id.as_str().to_string(),
            user_name: name.as_str().to_string(),
            users: snapshot.participants.iter().map(UserSummary::from).collect(),
            chat_messages: snapshot
                .chat_history
                .iter()
                .map(dto::ChatMessageDto::from)
                .collect(),
        }
    }
}
