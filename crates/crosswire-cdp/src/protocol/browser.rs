//! Browser domain types.

use serde::{Deserialize, Serialize};

/// Result of Browser.getVersion.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetVersionResult {
    /// Protocol version.
    pub protocol_version: String,
    /// Product name and version.
    pub product: String,
    /// Product revision.
    pub revision: String,
    /// Full user agent string.
    pub user_agent: String,
    /// V8 version.
    pub js_version: String,
}

/// Permission descriptor for Browser.setPermission.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionDescriptor {
    /// Permission name ("geolocation", "notifications", ...).
    pub name: String,
    /// For "midi": whether sysex is requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sysex: Option<bool>,
    /// For "push": whether userVisibleOnly is requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_visible_only: Option<bool>,
    /// For "clipboard": whether the write permission is requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_without_sanitization: Option<bool>,
}

/// Parameters for Browser.setPermission.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetPermissionParams {
    /// Which permission to set.
    pub permission: PermissionDescriptor,
    /// Grant state ("granted", "denied", "prompt").
    pub setting: String,
    /// Origin the permission applies to; all origins when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    /// Browser context to set the permission in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub browser_context_id: Option<String>,
}
