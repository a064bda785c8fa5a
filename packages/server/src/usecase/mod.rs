//! UseCase layer
//!
//! ルートハンドラから呼ばれるアプリケーションロジック。
//! Domain 層の trait にのみ依存し、具体的な実装は起動時に注入される。

mod broadcaster;
mod create_room;
pub mod error;
mod get_room;
mod join_room;
mod leave_room;
mod reconcile_presence;
mod run_code;
mod save_room;
mod send_chat_message;
mod server_status;
mod update_code;
mod update_cursor;
mod update_typing;

#[cfg(test)]
mod test_support;

pub use broadcaster::Broadcaster;
pub use create_room::{CreateRoomUseCase, DEFAULT_LANGUAGE};
pub use error::{CreateRoomError, RoomActionError};
pub use get_room::GetRoomUseCase;
pub use join_room::JoinRoomUseCase;
pub use leave_room::LeaveRoomUseCase;
pub use reconcile_presence::{PresenceReconciler, ReconcileReport};
pub use run_code::{RunCodeOutcome, RunCodeUseCase};
pub use save_room::SaveRoomUseCase;
pub use send_chat_message::SendChatMessageUseCase;
pub use server_status::{ServerStatus, ServerStatusUseCase};
pub use update_code::UpdateCodeUseCase;
pub use update_cursor::UpdateCursorUseCase;
pub use update_typing::UpdateTypingUseCase;
