//! Log domain types.

use serde::Deserialize;

/// A browser-generated log entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Entry source ("javascript", "network", "security", ...).
    pub source: String,
    /// Entry severity ("verbose", "info", "warning", "error").
    pub level: String,
    /// Entry text.
    pub text: String,
    /// Entry timestamp in milliseconds since epoch.
    pub timestamp: f64,
    /// Resource URL the entry refers to.
    pub url: Option<String>,
    /// Stack trace if available.
    pub stack_trace: Option<super::runtime::StackTrace>,
}

/// Event: Log.entryAdded
#[derive(Debug, Clone, Deserialize)]
pub struct EntryAddedEvent {
    /// The added entry.
    pub entry: LogEntry,
}
