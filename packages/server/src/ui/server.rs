//! Server execution logic.

use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::usecase::PresenceReconciler;

use super::{
    handler::{
        create_room, get_room, health_check, join_room, leave_room, root, run_code, save_room,
        send_chat_message, sse_handler, update_code, update_cursor, update_typing,
    },
    signal::shutdown_signal,
    state::AppState,
};

/// Build the application router.
pub fn router(app_state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/rooms", post(create_room))
        .route("/rooms/join", post(join_room))
        .route("/rooms/code", post(update_code))
        .route("/rooms/cursor", post(update_cursor))
        .route("/rooms/{room_id}", get(get_room))
        .route("/rooms/{room_id}/save", post(save_room))
        .route("/send-chat-message", post(send_chat_message))
        .route("/typing-status", post(update_typing))
        .route("/leave-room", post(leave_room))
        .route("/run-code", post(run_code))
        .route("/sse/{user_id}", get(sse_handler));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

/// Collaborative editor server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(app_state, reconciler, Duration::from_secs(30));
/// server.run(config.bind_addr()).await?;
/// ```
pub struct Server {
    app_state: Arc<AppState>,
    /// PresenceReconciler（幽霊参加者の掃除）
    reconciler: Arc<PresenceReconciler>,
    reconcile_interval: Duration,
}

impl Server {
    pub fn new(
        app_state: Arc<AppState>,
        reconciler: Arc<PresenceReconciler>,
        reconcile_interval: Duration,
    ) -> Self {
        Self {
            app_state,
            reconciler,
            reconcile_interval,
        }
    }

    /// Run the server until a shutdown signal is received
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, bind_addr: String) -> Result<(), Box<dyn std::error::Error>> {
        let message_pusher = self.app_state.message_pusher.clone();
        let app = router(self.app_state);

        // Bind the server to the host and port
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        // Start the presence reconciler
        let reconciler_task = self.reconciler.spawn(self.reconcile_interval);

        tracing::info!("CodeSync server listening on {}", listener.local_addr()?);
        tracing::info!("Event stream: http://{}/api/sse/{{user_id}}", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        let reconciler_abort = reconciler_task.abort_handle();
        let shutdown = async move {
            shutdown_signal().await;
            reconciler_abort.abort();
            // 登録を外すとイベントストリームが終了し、接続を閉じられる
            for participant_id in message_pusher.registered_clients().await {
                message_pusher.remove_client(&participant_id).await;
            }
        };

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
