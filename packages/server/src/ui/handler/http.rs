//! HTTP API endpoint handlers.
//!
//! Room 操作の失敗はリクエストを失敗させず、HTTP 200 の `{"error": ...}` で返す。

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    domain::{DisplayName, ExecutionRequest, RoomId, ValueObjectError},
    infrastructure::dto::{
        conversion::{optional_name, room_and_participant},
        http::{
            CodeUpdateRequest, CreateRoomRequest, CursorUpdateRequest, ErrorResponse,
            JoinRoomRequest, JoinRoomResponse, LeaveRoomRequest, MessageResponse, RoomDto,
            SendChatMessageRequest, ServiceInfo, SuccessResponse, TypingStatusRequest,
        },
    },
    ui::state::AppState,
    usecase::{CreateRoomError, RoomActionError, RunCodeOutcome, ServerStatus},
};

/// `{"error": ...}` を HTTP 200 で返すエラー
#[derive(Debug)]
pub struct SoftError(String);

impl IntoResponse for SoftError {
    fn into_response(self) -> Response {
        tracing::debug!("Soft error response: {}", self.0);
        Json(ErrorResponse { error: self.0 }).into_response()
    }
}

impl From<RoomActionError> for SoftError {
    fn from(error: RoomActionError) -> Self {
        if let RoomActionError::Store(e) = &error {
            tracing::error!("Store error: {}", e);
        }
        Self(error.to_string())
    }
}

impl From<ValueObjectError> for SoftError {
    fn from(error: ValueObjectError) -> Self {
        Self(error.to_string())
    }
}

type SoftResult<T> = Result<Json<T>, SoftError>;

/// Service banner
pub async fn root() -> Json<ServiceInfo> {
    tracing::info!("Root endpoint accessed");
    Json(ServiceInfo {
        message: "CodeSync Real-Time Code Editor Backend",
        status: "running",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<ServerStatus> {
    Json(state.server_status_usecase.execute().await)
}

pub async fn create_room(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateRoomRequest>,
) -> Result<Json<RoomDto>, Response> {
    match state
        .create_room_usecase
        .execute(request.name, request.language)
        .await
    {
        Ok(room) => Ok(Json(room.into())),
        Err(e @ CreateRoomError::EmptyName) => Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response()),
        Err(CreateRoomError::Store(e)) => {
            tracing::error!("Database error when creating room: {}", e);
            Err((
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse {
                    error: "Database connection error".to_string(),
                }),
            )
                .into_response())
        }
    }
}

pub async fn get_room(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> SoftResult<RoomDto> {
    let room_id = RoomId::new(room_id)?;
    let room = state.get_room_usecase.execute(room_id).await?;
    Ok(Json(room.into()))
}

pub async fn save_room(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> SoftResult<MessageResponse> {
    let room_id = RoomId::new(room_id)?;
    state.save_room_usecase.execute(room_id).await?;
    Ok(Json(MessageResponse {
        message: "File saved successfully".to_string(),
    }))
}

pub async fn join_room(
    State(state): State<Arc<AppState>>,
    Json(request): Json<JoinRoomRequest>,
) -> SoftResult<JoinRoomResponse> {
    let (room_id, participant_id) = room_and_participant(request.room_id, request.user_id)?;
    let name = DisplayName::new(request.user_name)?;

    let snapshot = state
        .join_room_usecase
        .execute(room_id, participant_id.clone(), name.clone())
        .await?;

    Ok(Json(JoinRoomResponse::from_snapshot(
        snapshot,
        &participant_id,
        &name,
    )))
}

pub async fn update_code(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CodeUpdateRequest>,
) -> SoftResult<SuccessResponse> {
    let (room_id, participant_id) = room_and_participant(request.room_id, request.user_id)?;
    state
        .update_code_usecase
        .execute(
            room_id,
            participant_id,
            optional_name(request.user_name),
            request.code,
        )
        .await?;
    Ok(Json(SuccessResponse::ok()))
}

pub async fn update_cursor(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CursorUpdateRequest>,
) -> SoftResult<SuccessResponse> {
    let (room_id, participant_id) = room_and_participant(request.room_id, request.user_id)?;
    state
        .update_cursor_usecase
        .execute(
            room_id,
            participant_id,
            optional_name(request.user_name),
            request.position.into(),
        )
        .await?;
    Ok(Json(SuccessResponse::ok()))
}

pub async fn send_chat_message(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SendChatMessageRequest>,
) -> SoftResult<SuccessResponse> {
    let (room_id, participant_id) = room_and_participant(request.room_id, request.user_id)?;
    let message = state
        .send_chat_message_usecase
        .execute(
            room_id,
            participant_id,
            optional_name(request.user_name),
            request.message,
        )
        .await?;
    Ok(Json(SuccessResponse::with_message_id(message.id)))
}

pub async fn update_typing(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TypingStatusRequest>,
) -> SoftResult<SuccessResponse> {
    let (room_id, participant_id) = room_and_participant(request.room_id, request.user_id)?;
    state
        .update_typing_usecase
        .execute(
            room_id,
            participant_id,
            optional_name(request.user_name),
            request.is_typing,
        )
        .await?;
    Ok(Json(SuccessResponse::ok()))
}

pub async fn leave_room(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LeaveRoomRequest>,
) -> SoftResult<SuccessResponse> {
    let (room_id, participant_id) = room_and_participant(request.room_id, request.user_id)?;
    state
        .leave_room_usecase
        .execute(room_id, participant_id)
        .await?;
    Ok(Json(SuccessResponse::with_message("Left room successfully")))
}

pub async fn run_code(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ExecutionRequest>,
) -> Json<RunCodeOutcome> {
    Json(state.run_code_usecase.execute(request).await)
}
