use axum::{
    extract::State,
    response::sse::{Event, Sse},
};
use futures::stream::{Stream, StreamExt};
use std::convert::Infallible;
use std::sync::Arc;
use tokio_stream::wrappers::ReceiverStream;

use rootie_relay::RelayEvent;

use crate::{
    error::{ApiResult, ValidatedJson},
    routes::chat::{prepare_turn, ChatTurnRequest},
    state::AppState,
};

/// Run a chat turn and stream the reply using Server-Sent Events
///
/// Every frame is `data: <json>` where the JSON carries a `type` of
/// `init`, `chunk`, `complete`, `done` or `error`.
#[utoipa::path(
    post,
    path = "/api/chat/stream",
    request_body = ChatTurnRequest,
    responses(
        (status = 200, description = "Streaming response", content_type = "text/event-stream"),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Graph not found")
    ),
    tag = "chat"
)]
pub async fn chat_stream(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<ChatTurnRequest>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let turn = prepare_turn(&state, req).await?;

    // Dropping the SSE body (client gone) drops the receiver, which stops the relay
    let event_receiver = state.relay.spawn_stream(turn);
    let sse_stream = ReceiverStream::new(event_receiver).map(|event| Ok(sse_frame(&event)));

    Ok(Sse::new(sse_stream))
}

fn sse_frame(event: &RelayEvent) -> Event {
    match Event::default().json_data(event) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::error!(event = event.kind(), error = %e, "Failed to encode stream event");
            Event::default().data(r#"{"type":"error","error":"Failed to encode stream event"}"#)
        }
    }
}
