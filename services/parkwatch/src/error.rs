//! Error types for the parkwatch client

use std::time::Duration;

/// Fallback shown to users when a failed operation carries no server message
pub const FALLBACK_FAILURE_MESSAGE: &str = "Operation failed";

/// Errors that can occur in the parkwatch client
#[derive(Debug, thiserror::Error)]
pub enum ParkwatchError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Backend error: {code} - {msg}")]
    Api { code: i32, msg: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Camera operation failed: {}", .0.message())]
    Camera(#[from] FetchFailure),
}

/// Result type alias for parkwatch operations
pub type Result<T> = std::result::Result<T, ParkwatchError>;

/// Why a camera store operation did not succeed.
///
/// `Clone` so that callers coalesced onto one in-flight refresh can all
/// receive the same outcome.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchFailure {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("backend rejected request: {code} - {msg}")]
    Rejected { code: i32, msg: String },
}

impl FetchFailure {
    /// Message suitable for showing to a user
    pub fn message(&self) -> &str {
        match self {
            FetchFailure::Rejected { msg, .. } if !msg.is_empty() => msg,
            _ => FALLBACK_FAILURE_MESSAGE,
        }
    }
}

impl From<ParkwatchError> for FetchFailure {
    fn from(err: ParkwatchError) -> Self {
        match err {
            ParkwatchError::Api { code, msg } => FetchFailure::Rejected { code, msg },
            ParkwatchError::Camera(failure) => failure,
            ParkwatchError::Timeout(msg) => FetchFailure::Transport(format!("timeout: {msg}")),
            other => FetchFailure::Transport(other.to_string()),
        }
    }
}
