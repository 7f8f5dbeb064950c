//! Storage domain types.
//!
//! Browser-context-partitioned cookie access.

use serde::{Deserialize, Serialize};

use super::network::{Cookie, CookieParam};

/// Parameters for Storage.getCookies.
#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GetCookiesParams {
    /// Browser context to read cookies from; the default context when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub browser_context_id: Option<String>,
}

/// Result of Storage.getCookies.
#[derive(Debug, Clone, Deserialize)]
pub struct GetCookiesResult {
    /// All cookies in the partition.
    pub cookies: Vec<Cookie>,
}

/// Parameters for Storage.setCookies.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetCookiesParams {
    /// Cookies to set.
    pub cookies: Vec<CookieParam>,
    /// Browser context to set cookies in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub browser_context_id: Option<String>,
}

/// Parameters for Storage.clearCookies.
#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ClearCookiesParams {
    /// Browser context to clear.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub browser_context_id: Option<String>,
}
