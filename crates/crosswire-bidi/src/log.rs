//! log module types.

use serde::Serialize;

use crate::script::{RemoteValue, StackTrace};

/// Where a log entry originated.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Source {
    /// Realm that produced the entry, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub realm: Option<String>,
    /// Context that produced the entry, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// Payload of log.entryAdded.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Entry kind ("console", "javascript", or a generic source name).
    #[serde(rename = "type")]
    pub entry_type: String,
    /// Severity ("debug", "info", "warn", "error").
    pub level: String,
    /// Originating realm/context.
    pub source: Source,
    /// Entry text.
    pub text: Option<String>,
    /// Entry timestamp in milliseconds since epoch.
    pub timestamp: u64,
    /// Stack trace, when captured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<StackTrace>,
    /// Console method, for console entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Console arguments, for console entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<RemoteValue>>,
}
