//! Route definitions and router construction.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::bootstrap::{AxumContext, CorsConfig};
use crate::handlers;
use crate::state::AppState;

fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    match config {
        CorsConfig::AllowAll => {
            CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
        }
        CorsConfig::AllowOrigins(origins) => {
            use axum::http::HeaderValue;
            let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            CorsLayer::new().allow_origin(allowed).allow_methods(Any).allow_headers(Any)
        }
    }
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/conversation", post(handlers::conversation::converse))
        .route("/conversation/reset", post(handlers::reset::reset))
        .route("/conversation/actions", get(handlers::side_channel::drain))
        .route("/health", get(handlers::health::health))
}

/// Builds the full router: CORS + request tracing over `/api/*`.
pub fn create_router(ctx: AxumContext, cors_config: &CorsConfig) -> Router {
    let state: AppState = std::sync::Arc::new(ctx);
    let cors = build_cors_layer(cors_config);

    Router::new()
        .nest("/api", api_routes().with_state(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
