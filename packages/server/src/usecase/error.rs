//! UseCase 層のエラー

use thiserror::Error;

use crate::domain::{RegistryError, StoreError, ValueObjectError};

/// Room に対する操作のエラー
///
/// UI 層ではリクエストを失敗させず、`{"error": ...}` の形で返す。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomActionError {
    #[error("Room not found")]
    RoomNotFound,
    #[error("User not in room")]
    NotInRoom,
    #[error("{0}")]
    Validation(#[from] ValueObjectError),
    #[error("Database error: {0}")]
    Store(#[from] StoreError),
}

impl From<RegistryError> for RoomActionError {
    fn from(error: RegistryError) -> Self {
        match error {
            RegistryError::RoomNotFound(_) => Self::RoomNotFound,
            RegistryError::NotInRoom { .. } => Self::NotInRoom,
        }
    }
}

/// Room 作成のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreateRoomError {
    #[error("Room name cannot be empty")]
    EmptyName,
    #[error("Database error: {0}")]
    Store(#[from] StoreError),
}
