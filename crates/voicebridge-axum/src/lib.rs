//! The HTTP/WS edge: the conversation streaming endpoint, session reset,
//! the canvas/music side-channel, and health introspection, plus the
//! composition root that wires every lower-layer service together.

pub mod bootstrap;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod side_channel;
pub mod state;

pub use bootstrap::{bootstrap, start_server, AxumContext, CorsConfig, ServerConfig};
pub use error::HttpError;
pub use routes::create_router;
pub use state::AppState;
