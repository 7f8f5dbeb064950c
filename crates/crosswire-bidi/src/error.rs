//! The WebDriver BiDi error taxonomy.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes surfaced on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    /// A command parameter failed validation.
    #[serde(rename = "invalid argument")]
    InvalidArgument,
    /// The session id is not known.
    #[serde(rename = "invalid session id")]
    InvalidSessionId,
    /// No user prompt is currently open.
    #[serde(rename = "no such alert")]
    NoSuchAlert,
    /// The referenced element does not exist.
    #[serde(rename = "no such element")]
    NoSuchElement,
    /// The referenced browsing context does not exist.
    #[serde(rename = "no such frame")]
    NoSuchFrame,
    /// The referenced handle does not exist.
    #[serde(rename = "no such handle")]
    NoSuchHandle,
    /// The referenced network intercept does not exist.
    #[serde(rename = "no such intercept")]
    NoSuchIntercept,
    /// The referenced node does not exist.
    #[serde(rename = "no such node")]
    NoSuchNode,
    /// The referenced network request does not exist.
    #[serde(rename = "no such request")]
    NoSuchRequest,
    /// The referenced script does not exist.
    #[serde(rename = "no such script")]
    NoSuchScript,
    /// The referenced user context does not exist.
    #[serde(rename = "no such user context")]
    NoSuchUserContext,
    /// A new session could not be created.
    #[serde(rename = "session not created")]
    SessionNotCreated,
    /// Screenshot capture failed.
    #[serde(rename = "unable to capture screen")]
    UnableToCaptureScreen,
    /// The browser declined to close.
    #[serde(rename = "unable to close browser")]
    UnableToCloseBrowser,
    /// The cookie could not be set.
    #[serde(rename = "unable to set cookie")]
    UnableToSetCookie,
    /// The file input could not be populated.
    #[serde(rename = "unable to set file input")]
    UnableToSetFileInput,
    /// The command method is not known.
    #[serde(rename = "unknown command")]
    UnknownCommand,
    /// Any error not covered by a more specific code.
    #[serde(rename = "unknown error")]
    UnknownError,
    /// The operation is valid but not supported.
    #[serde(rename = "unsupported operation")]
    UnsupportedOperation,
    /// A pointer action left the viewport.
    #[serde(rename = "move target out of bounds")]
    MoveTargetOutOfBounds,
}

impl ErrorCode {
    /// The exact wire string for this code.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid argument",
            Self::InvalidSessionId => "invalid session id",
            Self::NoSuchAlert => "no such alert",
            Self::NoSuchElement => "no such element",
            Self::NoSuchFrame => "no such frame",
            Self::NoSuchHandle => "no such handle",
            Self::NoSuchIntercept => "no such intercept",
            Self::NoSuchNode => "no such node",
            Self::NoSuchRequest => "no such request",
            Self::NoSuchScript => "no such script",
            Self::NoSuchUserContext => "no such user context",
            Self::SessionNotCreated => "session not created",
            Self::UnableToCaptureScreen => "unable to capture screen",
            Self::UnableToCloseBrowser => "unable to close browser",
            Self::UnableToSetCookie => "unable to set cookie",
            Self::UnableToSetFileInput => "unable to set file input",
            Self::UnknownCommand => "unknown command",
            Self::UnknownError => "unknown error",
            Self::UnsupportedOperation => "unsupported operation",
            Self::MoveTargetOutOfBounds => "move target out of bounds",
        }
    }
}

/// A typed command failure carrying its wire error code.
#[derive(Debug, Clone, Error)]
#[error("{}: {message}", code.as_str())]
pub struct BidiError {
    /// Wire error code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
    /// Stack string for unknown errors, when available.
    pub stacktrace: Option<String>,
}

impl BidiError {
    /// Build an error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            stacktrace: None,
        }
    }

    /// `invalid argument` with the given message.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidArgument, message)
    }

    /// `no such frame` for a context id.
    pub fn no_such_frame(context: &str) -> Self {
        Self::new(ErrorCode::NoSuchFrame, format!("context {context} not found"))
    }

    /// `unknown error` wrapping an arbitrary failure.
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::UnknownError, message)
    }

    /// `unsupported operation` with the given message.
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::UnsupportedOperation, message)
    }
}
