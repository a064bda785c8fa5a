//! Shared application state.

use std::{sync::Arc, time::Duration};

use crate::{
    domain::MessagePusher,
    usecase::{
        CreateRoomUseCase, GetRoomUseCase, JoinRoomUseCase, LeaveRoomUseCase, RunCodeUseCase,
        SaveRoomUseCase, SendChatMessageUseCase, ServerStatusUseCase, UpdateCodeUseCase,
        UpdateCursorUseCase, UpdateTypingUseCase,
    },
};

/// イベントストリームの設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSettings {
    pub channel_capacity: usize,
    pub idle_timeout: Duration,
}

pub struct AppState {
    pub create_room_usecase: Arc<CreateRoomUseCase>,
    pub get_room_usecase: Arc<GetRoomUseCase>,
    pub save_room_usecase: Arc<SaveRoomUseCase>,
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    pub update_code_usecase: Arc<UpdateCodeUseCase>,
    pub update_cursor_usecase: Arc<UpdateCursorUseCase>,
    pub send_chat_message_usecase: Arc<SendChatMessageUseCase>,
    pub update_typing_usecase: Arc<UpdateTypingUseCase>,
    pub leave_room_usecase: Arc<LeaveRoomUseCase>,
    pub run_code_usecase: Arc<RunCodeUseCase>,
    pub server_status_usecase: Arc<ServerStatusUseCase>,
    /// SSE ハンドラがイベントチャンネルを登録する先
    pub message_pusher: Arc<dyn MessagePusher>,
    pub stream_settings: StreamSettings,
}
