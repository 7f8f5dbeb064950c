//! browser module types.

use serde::{Deserialize, Serialize};

/// A user context (logical browser profile).
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserContextInfo {
    /// User context id; "default" for the default profile.
    pub user_context: String,
}

/// Parameters for browser.removeUserContext.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveUserContextParams {
    /// User context to remove.
    pub user_context: String,
}

/// Result of browser.getUserContexts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetUserContextsResult {
    /// All live user contexts, the default one included.
    pub user_contexts: Vec<UserContextInfo>,
}
