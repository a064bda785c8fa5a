//! Domain layer
//!
//! Room・参加者・チャットなどのドメインモデルと、
//! Infrastructure 層が実装するインターフェース（trait）を定義します。

pub mod code_runner;
pub mod entity;
pub mod error;
pub mod event;
pub mod pusher;
pub mod repository;
pub mod value_object;

pub use code_runner::{CodeRunner, ExecutionOutput, ExecutionRequest};
#[cfg(test)]
pub use code_runner::MockCodeRunner;
pub use entity::{
    CHAT_HISTORY_CAPACITY, ChatMessage, Cursor, Departure, Participant, RoomSnapshot, RoomState,
    StoredRoom, TypingIndicator,
};
pub use error::{CodeRunnerError, MessagePushError, RegistryError, StoreError, ValueObjectError};
pub use event::RoomEvent;
pub use pusher::{BroadcastReport, ChannelToken, MessagePusher, PusherChannel};
pub use repository::{RoomRegistry, RoomStore, SessionEntry, SessionIndex};
#[cfg(test)]
pub use repository::MockRoomStore;
pub use value_object::{
    CursorPosition, DisplayName, MAX_MESSAGE_CHARS, MessageContent, ParticipantId, RoomId,
    Timestamp,
};
