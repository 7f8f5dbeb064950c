//! CDP error types.

use thiserror::Error;

/// Errors that can occur during CDP communication.
#[derive(Error, Debug)]
pub enum CdpError {
    /// WebSocket connection failed.
    #[error("WebSocket connection failed: {0}")]
    ConnectionFailed(String),

    /// The browser-side connection was lost during operation.
    #[error("CDP connection lost")]
    ConnectionLost,

    /// The CDP session this command was addressed to has been detached.
    #[error("CDP session closed: {0}")]
    SessionClosed(String),

    /// Failed to send a CDP message.
    #[error("failed to send CDP message: {0}")]
    SendFailed(String),

    /// CDP protocol error returned by the browser.
    #[error("CDP protocol error {code}: {message}")]
    Protocol { code: i64, message: String },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CdpError {
    /// Whether this error is a protocol error reported by the browser
    /// (as opposed to a transport failure on our side).
    pub fn is_protocol(&self) -> bool {
        matches!(self, Self::Protocol { .. })
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for CdpError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        match err {
            tokio_tungstenite::tungstenite::Error::ConnectionClosed
            | tokio_tungstenite::tungstenite::Error::AlreadyClosed => Self::ConnectionLost,
            other => Self::ConnectionFailed(other.to_string()),
        }
    }
}
