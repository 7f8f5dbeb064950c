//! BiDi frame envelopes.
//!
//! Clients send command frames and receive replies and events; everything
//! is tagged with an optional channel that partitions delivery on one
//! transport. `goog:channel` is accepted as an alias for `channel`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{BidiError, ErrorCode};

/// A parsed incoming command.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    /// Client-assigned command id.
    pub id: u64,
    /// Dotted method name, e.g. "browsingContext.navigate".
    pub method: String,
    /// Raw parameters; validated by the owning processor.
    pub params: Value,
    /// Channel the reply is tagged with.
    pub channel: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawCommand {
    id: Value,
    method: Option<String>,
    #[serde(default)]
    params: Option<Value>,
    channel: Option<String>,
    #[serde(rename = "goog:channel")]
    goog_channel: Option<String>,
}

/// Failure to parse a command frame.
///
/// Carries whatever command id could still be recovered so the error
/// reply can reference it (`id: null` otherwise, as the protocol
/// requires).
#[derive(Debug, Clone)]
pub struct CommandParseError {
    /// Recovered command id, if the frame carried a readable one.
    pub id: Option<u64>,
    /// Recovered channel, if any.
    pub channel: Option<String>,
    /// The underlying error.
    pub error: BidiError,
}

/// Parse one raw text frame into a [`Command`].
///
/// # Errors
///
/// Returns a [`CommandParseError`] when the frame is not a JSON object,
/// the `id` is missing or not an integer, or the `method` is absent.
pub fn parse_command(frame: &str) -> Result<Command, CommandParseError> {
    let raw: RawCommand = match serde_json::from_str(frame) {
        Ok(raw) => raw,
        Err(e) => {
            // Try to salvage the id from an otherwise malformed object.
            let id = serde_json::from_str::<Value>(frame)
                .ok()
                .and_then(|v| v.get("id").and_then(Value::as_u64));
            return Err(CommandParseError {
                id,
                channel: None,
                error: BidiError::invalid_argument(format!("cannot parse command: {e}")),
            });
        }
    };

    let channel = raw.channel.or(raw.goog_channel);
    let id = match raw.id.as_u64() {
        Some(id) => id,
        None => {
            return Err(CommandParseError {
                id: None,
                channel,
                error: BidiError::invalid_argument("command id must be an unsigned integer"),
            });
        }
    };
    let method = match raw.method {
        Some(method) if !method.is_empty() => method,
        _ => {
            return Err(CommandParseError {
                id: Some(id),
                channel,
                error: BidiError::invalid_argument("command method missing"),
            });
        }
    };

    Ok(Command {
        id,
        method,
        params: raw.params.unwrap_or(Value::Null),
        channel,
    })
}

/// An outgoing frame: command reply or event.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutgoingFrame {
    /// Successful command reply.
    Success {
        /// The command id this replies to.
        id: u64,
        /// Command result.
        result: Value,
        /// Channel tag.
        #[serde(skip_serializing_if = "Option::is_none")]
        channel: Option<String>,
    },
    /// Failed command reply. `id` serializes as `null` when the command id
    /// could not be read.
    Error {
        /// The command id this replies to, when recoverable.
        id: Option<u64>,
        /// Wire error code.
        error: ErrorCode,
        /// Human-readable message.
        message: String,
        /// Stack string, for unknown errors.
        #[serde(skip_serializing_if = "Option::is_none")]
        stacktrace: Option<String>,
        /// Channel tag.
        #[serde(skip_serializing_if = "Option::is_none")]
        channel: Option<String>,
    },
    /// Spontaneous event.
    Event {
        /// Dotted event name.
        method: String,
        /// Event payload.
        params: Value,
        /// Channel tag.
        #[serde(skip_serializing_if = "Option::is_none")]
        channel: Option<String>,
    },
}

impl OutgoingFrame {
    /// Build a success reply.
    pub fn success(id: u64, result: Value, channel: Option<String>) -> Self {
        Self::Success { id, result, channel }
    }

    /// Build an error reply from a typed failure.
    pub fn error(id: Option<u64>, error: &BidiError, channel: Option<String>) -> Self {
        Self::Error {
            id,
            error: error.code,
            message: error.message.clone(),
            stacktrace: error.stacktrace.clone(),
            channel,
        }
    }

    /// Build an event frame.
    pub fn event(method: impl Into<String>, params: Value, channel: Option<String>) -> Self {
        Self::Event {
            method: method.into(),
            params,
            channel,
        }
    }

    /// Serialize to the wire text form.
    pub fn to_frame(&self) -> String {
        // The envelope contains nothing unserializable.
        serde_json::to_string(self).unwrap_or_else(|_| String::from("{}"))
    }
}

#[cfg(test)]
mod tests;
