//! Side-channel drain endpoint (§4.11): atomically returns and clears the
//! queue of extracted canvas/music actions observed in recent responses.

use axum::extract::State;
use axum::Json;
use serde_json::Value;

use crate::state::AppState;

pub async fn drain(State(state): State<AppState>) -> Json<Vec<Value>> {
    Json(state.side_channel.drain())
}
