//! cdp extension module types (`goog:cdp.*` accepted as aliases).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Parameters for cdp.sendCommand.
#[derive(Debug, Clone, Deserialize)]
pub struct SendCommandParams {
    /// CDP method to call.
    pub method: String,
    /// CDP parameters.
    pub params: Option<Value>,
    /// CDP session to call on; the browser root when omitted.
    pub session: Option<String>,
}

/// Result of cdp.sendCommand.
#[derive(Debug, Clone, Serialize)]
pub struct SendCommandResult {
    /// The CDP result object.
    pub result: Value,
    /// Session the command ran on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
}

/// Parameters for cdp.getSession.
#[derive(Debug, Clone, Deserialize)]
pub struct GetSessionParams {
    /// Browsing context to look up.
    pub context: String,
}

/// Result of cdp.getSession.
#[derive(Debug, Clone, Serialize)]
pub struct GetSessionResult {
    /// CDP session id of the context's current target.
    pub session: Option<String>,
}

/// Parameters for cdp.resolveRealm.
#[derive(Debug, Clone, Deserialize)]
pub struct ResolveRealmParams {
    /// BiDi realm id to resolve.
    pub realm: String,
}

/// Result of cdp.resolveRealm.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveRealmResult {
    /// CDP execution context id backing the realm.
    pub execution_context_id: i64,
}
