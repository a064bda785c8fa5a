//! Domain errors

use thiserror::Error;

use super::value_object::{ParticipantId, RoomId};

/// 値オブジェクトの検証エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("Room id cannot be empty")]
    EmptyRoomId,
    #[error("User id cannot be empty")]
    EmptyParticipantId,
    #[error("User name cannot be empty")]
    EmptyDisplayName,
    #[error("Message cannot be empty")]
    EmptyMessage,
    #[error("Message too long (max {max} characters)")]
    MessageTooLong { length: usize, max: usize },
}

/// RoomRegistry の操作エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Room not found")]
    RoomNotFound(RoomId),
    #[error("User not in room")]
    NotInRoom {
        room_id: RoomId,
        participant_id: ParticipantId,
    },
}

/// RoomStore（永続化層）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Room already exists: {0}")]
    AlreadyExists(RoomId),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// MessagePusher のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("Channel full for client: {0}")]
    ChannelFull(String),
    #[error("Channel closed for client: {0}")]
    ChannelClosed(String),
}

/// CodeRunner のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodeRunnerError {
    #[error("Request timed out")]
    Timeout,
    #[error("API request failed with status {0}")]
    Status(u16),
    #[error("{0}")]
    Transport(String),
}
