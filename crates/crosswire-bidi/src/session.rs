//! session module types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Parameters for session.subscribe and the by-attributes form of
/// session.unsubscribe.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRequest {
    /// Event names or module prefixes to subscribe to.
    pub events: Vec<String>,
    /// Restrict to these top-level contexts and their descendants.
    pub contexts: Option<Vec<String>>,
    /// Restrict to all current and future contexts of these user contexts.
    pub user_contexts: Option<Vec<String>>,
}

/// Result of session.subscribe.
#[derive(Debug, Clone, Serialize)]
pub struct SubscribeResult {
    /// Id of the new subscription.
    pub subscription: String,
}

/// Parameters for session.unsubscribe: by subscription ids, or by the
/// attributes the subscription was created with.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum UnsubscribeParams {
    /// Remove the listed subscriptions.
    ByIds {
        /// Subscription ids.
        subscriptions: Vec<String>,
    },
    /// Remove by event names (legacy form).
    ByAttributes {
        /// Event names or module prefixes.
        events: Vec<String>,
        /// Contexts the original subscription named.
        contexts: Option<Vec<String>>,
    },
}

/// Result of session.status.
#[derive(Debug, Clone, Serialize)]
pub struct StatusResult {
    /// Whether the implementation accepts new sessions.
    pub ready: bool,
    /// Implementation-defined message.
    pub message: String,
}

/// Parameters for session.new. Capability matching is minimal: the
/// requested capabilities are echoed into the returned metadata.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct NewParams {
    /// Requested capabilities, uninterpreted.
    #[serde(default)]
    pub capabilities: Value,
}

/// Result of session.new.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewResult {
    /// New session id.
    pub session_id: String,
    /// Matched capabilities.
    pub capabilities: Value,
}
