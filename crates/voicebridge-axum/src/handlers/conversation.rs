//! The conversation endpoint (§4.11, §6.1, §6.2): accepts a message,
//! drives the orchestrator, and streams the resulting client events back
//! as NDJSON (or, when `stream=false`, as one buffered JSON array).

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::StreamExt;

use voicebridge_core::event::ClientEvent;
use voicebridge_core::model::RequestOverrides;
use voicebridge_orchestrator::ConversationRequest;

use crate::dto::{ConversationRequestBody, StreamParams, MAX_MESSAGE_CHARS};
use crate::error::HttpError;
use crate::side_channel::SideChannel;
use crate::state::AppState;

fn capture_actions(event: &ClientEvent, side_channel: &SideChannel) {
    match event {
        ClientEvent::Action { action } => side_channel.push(action.clone()),
        ClientEvent::TextDone { actions, .. } => {
            for action in actions {
                side_channel.push(action.clone());
            }
        }
        _ => {}
    }
}

fn build_request(body: ConversationRequestBody) -> ConversationRequest {
    let overrides: RequestOverrides = body.into_overrides();
    ConversationRequest {
        message: body.message,
        session_id: body.session_id,
        overrides,
        ui_context: body.ui_context,
    }
}

pub async fn converse(
    State(state): State<AppState>,
    Query(params): Query<StreamParams>,
    Json(body): Json<ConversationRequestBody>,
) -> Result<Response, HttpError> {
    if body.message.chars().count() > MAX_MESSAGE_CHARS {
        return Err(HttpError::BadRequest(format!(
            "message exceeds {MAX_MESSAGE_CHARS} character limit"
        )));
    }

    let req = build_request(body);
    let rx = state.orchestrator.clone().handle(req);

    if params.stream.unwrap_or(true) {
        Ok(stream_ndjson(rx, state.side_channel.clone()))
    } else {
        Ok(buffer_json(rx, state.side_channel.clone()).await)
    }
}

fn stream_ndjson(
    rx: tokio::sync::mpsc::UnboundedReceiver<ClientEvent>,
    side_channel: std::sync::Arc<SideChannel>,
) -> Response {
    let body_stream = UnboundedReceiverStream::new(rx).map(move |event| {
        capture_actions(&event, &side_channel);
        let mut line = serde_json::to_vec(&event).unwrap_or_default();
        line.push(b'\n');
        Ok::<_, std::io::Error>(line)
    });

    Response::builder()
        .header(header::CONTENT_TYPE, "application/x-ndjson")
        .header(header::CACHE_CONTROL, "no-cache")
        .header("X-Accel-Buffering", "no")
        .body(Body::from_stream(body_stream))
        .unwrap()
        .into_response()
}

async fn buffer_json(
    mut rx: tokio::sync::mpsc::UnboundedReceiver<ClientEvent>,
    side_channel: std::sync::Arc<SideChannel>,
) -> Response {
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        capture_actions(&event, &side_channel);
        events.push(event);
    }
    Json(events).into_response()
}
