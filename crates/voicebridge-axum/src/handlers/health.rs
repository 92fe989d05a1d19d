//! Health / introspection endpoint (§6.6): process liveness plus gateway
//! and TTS registry listings.

use axum::extract::State;
use axum::Json;

use crate::dto::HealthResponse;
use crate::state::AppState;

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        gateways: state.gateways.list_gateways().await,
        tts_providers: state.tts.list(true).await,
    })
}
