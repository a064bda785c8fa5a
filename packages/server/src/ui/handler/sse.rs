//! Server-Sent Events endpoint.
//!
//! One `data:` line per event. Keep-alive pings come from the event stream
//! itself, so axum's own keep-alive comments are not enabled.

use std::{convert::Infallible, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{HeaderName, HeaderValue, StatusCode, header},
    response::{
        IntoResponse, Response,
        sse::{Event, Sse},
    },
};
use futures_util::StreamExt;

use crate::{
    domain::ParticipantId, infrastructure::message_pusher::EventStream, ui::state::AppState,
};

pub async fn sse_handler(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Response {
    let participant_id = match ParticipantId::new(user_id) {
        Ok(id) => id,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };
    tracing::info!("SSE connection established for user: {}", participant_id);

    let settings = state.stream_settings;
    let stream = EventStream::open(
        state.message_pusher.clone(),
        participant_id,
        settings.channel_capacity,
        settings.idle_timeout,
    )
    .await;

    let events = stream
        .into_payloads()
        .map(|payload| Ok::<_, Infallible>(Event::default().data(payload)));

    (
        [
            (header::CACHE_CONTROL, HeaderValue::from_static("no-cache")),
            (
                HeaderName::from_static("x-accel-buffering"),
                HeaderValue::from_static("no"),
            ),
        ],
        Sse::new(events),
    )
        .into_response()
}
