//! HTTP-edge error type and mappings from every lower-layer error enum:
//! one stable JSON error body, one `IntoResponse` impl, and a `From`
//! conversion per lower-layer error type so handlers can use `?` freely.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use voicebridge_core::ports::{GatewayError, StoreError, TtsError};
use voicebridge_profile::ProfileError;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    status: u16,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };
        let body = ErrorBody { error: message, status: status.as_u16() };
        (status, axum::Json(body)).into_response()
    }
}

impl From<GatewayError> for HttpError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::NotConfigured(msg) => Self::ServiceUnavailable(msg),
            GatewayError::Transport(msg) => Self::ServiceUnavailable(msg),
            GatewayError::Timeout(secs) => {
                Self::ServiceUnavailable(format!("gateway timed out after {secs}s"))
            }
            GatewayError::NotFound(id) => Self::NotFound(format!("gateway '{id}' not found")),
        }
    }
}

impl From<TtsError> for HttpError {
    fn from(err: TtsError) -> Self {
        match err {
            TtsError::TermsRequired
            | TtsError::RateLimitExceeded
            | TtsError::InsufficientQuota
            | TtsError::InvalidApiKey => Self::ServiceUnavailable(err.to_string()),
            TtsError::VoiceNotFound(_) => Self::BadRequest(err.to_string()),
            TtsError::Other(msg) => Self::Internal(msg),
        }
    }
}

impl From<StoreError> for HttpError {
    fn from(err: StoreError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<ProfileError> for HttpError {
    fn from(err: ProfileError) -> Self {
        match err {
            ProfileError::NotFound(id) => Self::NotFound(format!("profile '{id}' not found")),
            ProfileError::Io(msg) | ProfileError::Malformed(msg) => Self::Internal(msg),
        }
    }
}
