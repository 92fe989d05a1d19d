//! Session reset endpoint (§4.11): soft bumps the counter only; hard
//! bumps and fires a best-effort pre-warm request against the new key
//! without blocking the response on it.

use axum::extract::State;
use axum::Json;

use voicebridge_core::ports::SessionStorePort;

use crate::dto::{ResetMode, ResetRequestBody, ResetResponse};
use crate::error::HttpError;
use crate::state::AppState;

pub async fn reset(
    State(state): State<AppState>,
    Json(body): Json<ResetRequestBody>,
) -> Result<Json<ResetResponse>, HttpError> {
    let new_key = state.session_store.bump(&state.session_prefix).await?;

    if matches!(body.mode, ResetMode::Hard) {
        let gateways = state.gateways.clone();
        let profiles = state.profiles.clone();
        let prewarm_key = new_key.clone();
        tokio::spawn(async move {
            let profile = profiles.active().await;
            let _ = gateways.ask(&profile.gateway_id, "__prewarm__".to_string(), prewarm_key).await;
        });
    }

    Ok(Json(ResetResponse { session_key: new_key }))
}
