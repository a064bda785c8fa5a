//! Dependency wiring.
//!
//! Builds the repositories, the message pusher, every use case and the
//! presence reconciler from a `ServerConfig`.

use std::sync::Arc;

use codesync_shared::time::Clock;

use crate::{
    config::ServerConfig,
    domain::CodeRunner,
    infrastructure::{
        code_runner::PistonCodeRunner,
        message_pusher::ChannelMessagePusher,
        repository::{InMemoryRoomRegistry, InMemoryRoomStore, InMemorySessionIndex},
    },
    ui::{AppState, state::StreamSettings},
    usecase::{
        Broadcaster, CreateRoomUseCase, GetRoomUseCase, JoinRoomUseCase, LeaveRoomUseCase,
        PresenceReconciler, RunCodeUseCase, SaveRoomUseCase, SendChatMessageUseCase,
        ServerStatusUseCase, UpdateCodeUseCase, UpdateCursorUseCase, UpdateTypingUseCase,
    },
};

/// Everything the server needs to run
pub struct Application {
    pub app_state: Arc<AppState>,
    pub reconciler: Arc<PresenceReconciler>,
}

impl Application {
    /// Wire the application with the Piston code runner from `config`.
    pub fn build(
        config: &ServerConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, crate::domain::CodeRunnerError> {
        let code_runner = Arc::new(PistonCodeRunner::new(
            config.code_runner_url.clone(),
            config.code_runner_timeout,
        )?);
        Ok(Self::with_code_runner(config, clock, code_runner))
    }

    pub fn with_code_runner(
        config: &ServerConfig,
        clock: Arc<dyn Clock>,
        code_runner: Arc<dyn CodeRunner>,
    ) -> Self {
        // Initialize dependencies in order:
        // 1. Repositories
        // 2. MessagePusher and Broadcaster
        // 3. UseCases
        // 4. AppState

        // 1. Create repositories (in-memory)
        let store = Arc::new(InMemoryRoomStore::new());
        let registry = Arc::new(InMemoryRoomRegistry::new());
        let sessions = Arc::new(InMemorySessionIndex::new());

        // 2. Create MessagePusher (bounded channel per participant) and Broadcaster
        let message_pusher = Arc::new(ChannelMessagePusher::new());
        let broadcaster = Arc::new(Broadcaster::new(registry.clone(), message_pusher.clone()));

        // 3. Create UseCases
        let create_room_usecase = Arc::new(CreateRoomUseCase::new(
            store.clone(),
            registry.clone(),
            clock.clone(),
        ));
        let get_room_usecase = Arc::new(GetRoomUseCase::new(store.clone()));
        let save_room_usecase = Arc::new(SaveRoomUseCase::new(
            store.clone(),
            registry.clone(),
            clock.clone(),
        ));
        let join_room_usecase = Arc::new(JoinRoomUseCase::new(
            store.clone(),
            registry.clone(),
            sessions.clone(),
            broadcaster.clone(),
        ));
        let update_code_usecase = Arc::new(UpdateCodeUseCase::new(
            store.clone(),
            registry.clone(),
            sessions.clone(),
            broadcaster.clone(),
            clock.clone(),
        ));
        let update_cursor_usecase = Arc::new(UpdateCursorUseCase::new(
            registry.clone(),
            sessions.clone(),
            broadcaster.clone(),
        ));
        let send_chat_message_usecase = Arc::new(SendChatMessageUseCase::new(
            registry.clone(),
            sessions.clone(),
            broadcaster.clone(),
            clock.clone(),
        ));
        let update_typing_usecase = Arc::new(UpdateTypingUseCase::new(
            registry.clone(),
            sessions.clone(),
            broadcaster.clone(),
            clock.clone(),
        ));
        let leave_room_usecase = Arc::new(LeaveRoomUseCase::new(
            registry.clone(),
            sessions.clone(),
            message_pusher.clone(),
            broadcaster.clone(),
        ));
        let run_code_usecase = Arc::new(RunCodeUseCase::new(code_runner));
        let server_status_usecase = Arc::new(ServerStatusUseCase::new(
            store.clone(),
            registry.clone(),
            message_pusher.clone(),
            clock.clone(),
        ));
        let reconciler = Arc::new(PresenceReconciler::new(
            registry,
            sessions,
            message_pusher.clone(),
            broadcaster,
            clock,
            config.typing_ttl,
        ));

        // 4. Create AppState
        let app_state = Arc::new(AppState {
            create_room_usecase,
            get_room_usecase,
            save_room_usecase,
            join_room_usecase,
            update_code_usecase,
            update_cursor_usecase,
            send_chat_message_usecase,
            update_typing_usecase,
            leave_room_usecase,
            run_code_usecase,
            server_status_usecase,
            message_pusher,
            stream_settings: StreamSettings {
                channel_capacity: config.channel_capacity,
                idle_timeout: config.idle_timeout,
            },
        });

        Self {
            app_state,
            reconciler,
        }
    }
}
