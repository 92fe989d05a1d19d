//! Shared application state type for the Axum router.

use std::sync::Arc;

use crate::bootstrap::AxumContext;

pub type AppState = Arc<AxumContext>;
