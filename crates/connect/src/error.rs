//! Error types for the connect crate.

use serde::Deserialize;
use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ConnectError>;

/// Errors surfaced by client operations.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// No usable response: connect failure, timeout, body read error.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response from the backend.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Login or token refresh rejected, or stored credentials unusable.
    #[error("authentication error: {0}")]
    Auth(String),

    /// 2xx response whose body does not decode.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Record or draft rejected at the adapter boundary.
    #[error("invalid record: {0}")]
    InvalidRecord(String),
}

impl ConnectError {
    /// Create an API error from status and message.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create an auth error.
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }

    /// Create a boundary-validation error.
    pub fn invalid_record(message: impl Into<String>) -> Self {
        Self::InvalidRecord(message.into())
    }

    /// HTTP status if this is an API error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Error body shape the backend emits. DRF puts a single human-readable
/// string under `detail`; a few custom views use `message` instead.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
    message: Option<String>,
}

/// Extract a human-readable message from an error response body.
///
/// Priority: backend `detail` field, then `message`, then the raw body.
pub(crate) fn extract_message(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        if let Some(detail) = parsed.detail {
            return detail;
        }
        if let Some(message) = parsed.message {
            return message;
        }
    }
    body.to_string()
}
