//! Network domain types.
//!
//! Request/response monitoring events and the per-target emulation knobs
//! (cache, headers, user agent) the mapper reconciles.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Unique request identifier; stable across redirects of the same fetch.
pub type RequestId = String;

/// Monotonic network timestamp in seconds.
pub type MonotonicTime = f64;

/// Request / response headers as a flat name-to-value map.
pub type Headers = HashMap<String, Value>;

/// Parameters for Network.enable.
#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EnableParams {
    /// Per-resource buffer size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_resource_buffer_size: Option<u64>,
    /// Total buffer size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_total_buffer_size: Option<u64>,
}

/// Parameters for Network.setCacheDisabled.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetCacheDisabledParams {
    /// Whether the cache is bypassed.
    pub cache_disabled: bool,
}

/// Parameters for Network.setExtraHTTPHeaders.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetExtraHttpHeadersParams {
    /// Headers added to every request from this target.
    pub headers: Headers,
}

/// Parameters for Network.setUserAgentOverride.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetUserAgentOverrideParams {
    /// User agent string.
    pub user_agent: String,
    /// Accept-Language override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accept_language: Option<String>,
    /// Platform override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
}

/// HTTP request data.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    /// Request URL without fragment.
    pub url: String,
    /// Fragment of the URL, including '#'.
    pub url_fragment: Option<String>,
    /// HTTP method.
    pub method: String,
    /// Request headers.
    pub headers: Headers,
    /// Whether the request carries POST data.
    pub has_post_data: Option<bool>,
    /// Referrer policy.
    pub referrer_policy: Option<String>,
}

/// HTTP response data.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    /// Response URL.
    pub url: String,
    /// HTTP status code.
    pub status: i64,
    /// HTTP status text.
    pub status_text: String,
    /// Response headers.
    pub headers: Headers,
    /// Resource mime type.
    pub mime_type: String,
    /// Whether the response was served from disk cache.
    pub from_disk_cache: Option<bool>,
    /// Whether the response was served by a service worker.
    pub from_service_worker: Option<bool>,
    /// Total bytes received so far.
    pub encoded_data_length: f64,
    /// Protocol used ("http/1.1", "h2", ...).
    pub protocol: Option<String>,
    /// Timing breakdown.
    pub timing: Option<ResourceTiming>,
}

/// Resource fetch timing, all values relative to requestTime.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceTiming {
    /// Baseline in seconds (monotonic).
    pub request_time: f64,
    /// DNS resolution start.
    pub dns_start: f64,
    /// DNS resolution end.
    pub dns_end: f64,
    /// Connection start.
    pub connect_start: f64,
    /// Connection end.
    pub connect_end: f64,
    /// TLS start.
    pub ssl_start: f64,
    /// TLS end.
    pub ssl_end: f64,
    /// Request sent start.
    pub send_start: f64,
    /// Request sent end.
    pub send_end: f64,
    /// First response byte.
    pub receive_headers_end: f64,
}

/// Request initiator description.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Initiator {
    /// Initiator kind ("parser", "script", "preload", "other", ...).
    #[serde(rename = "type")]
    pub initiator_type: String,
    /// Script stack trace, for script initiators.
    pub stack: Option<super::runtime::StackTrace>,
    /// Initiating URL, for parser initiators.
    pub url: Option<String>,
    /// 0-based line number in the initiating document.
    pub line_number: Option<f64>,
    /// 0-based column number in the initiating document.
    pub column_number: Option<f64>,
}

/// Event: Network.requestWillBeSent
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestWillBeSentEvent {
    /// Request id.
    pub request_id: RequestId,
    /// Loader id; equals the request id for document loads.
    pub loader_id: String,
    /// URL of the document the request belongs to.
    pub document_url: String,
    /// The request.
    pub request: Request,
    /// Monotonic timestamp.
    pub timestamp: MonotonicTime,
    /// Wall clock time in seconds since epoch.
    pub wall_time: f64,
    /// Request initiator.
    pub initiator: Initiator,
    /// Whether a matching requestWillBeSentExtraInfo will follow.
    pub redirect_has_extra_info: Option<bool>,
    /// Redirect response data, when this request is a redirect hop.
    pub redirect_response: Option<Response>,
    /// Resource type ("Document", "XHR", "Fetch", ...).
    #[serde(rename = "type")]
    pub resource_type: Option<String>,
    /// Frame the request is associated with.
    pub frame_id: Option<String>,
    /// Whether a requestWillBeSentExtraInfo event will follow.
    pub has_extra_info: Option<bool>,
}

/// Event: Network.requestWillBeSentExtraInfo
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestWillBeSentExtraInfoEvent {
    /// Request id.
    pub request_id: RequestId,
    /// Raw request headers as sent over the wire.
    pub headers: Headers,
    /// Cookies included in the request, with any blocked ones marked.
    pub associated_cookies: Option<Vec<AssociatedCookie>>,
}

/// Cookie attached (or blocked from attaching) to a request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssociatedCookie {
    /// The cookie.
    pub cookie: Cookie,
    /// Reasons the cookie was blocked, empty when it was sent.
    pub blocked_reasons: Vec<String>,
}

/// Event: Network.responseReceived
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseReceivedEvent {
    /// Request id.
    pub request_id: RequestId,
    /// Loader id.
    pub loader_id: String,
    /// Monotonic timestamp.
    pub timestamp: MonotonicTime,
    /// Resource type.
    #[serde(rename = "type")]
    pub resource_type: String,
    /// The response.
    pub response: Response,
    /// Whether a responseReceivedExtraInfo event will follow.
    pub has_extra_info: Option<bool>,
    /// Frame the response is associated with.
    pub frame_id: Option<String>,
}

/// Event: Network.responseReceivedExtraInfo
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseReceivedExtraInfoEvent {
    /// Request id.
    pub request_id: RequestId,
    /// Raw response headers as received over the wire.
    pub headers: Headers,
    /// HTTP status code, including informational responses.
    pub status_code: Option<i64>,
    /// Cookies the response tried to set, with any blocked ones marked.
    pub blocked_cookies: Option<Vec<Value>>,
}

/// Event: Network.loadingFailed
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadingFailedEvent {
    /// Request id.
    pub request_id: RequestId,
    /// Monotonic timestamp.
    pub timestamp: MonotonicTime,
    /// Resource type.
    #[serde(rename = "type")]
    pub resource_type: Option<String>,
    /// Error message ("net::ERR_ABORTED", ...).
    pub error_text: String,
    /// Whether loading was canceled.
    pub canceled: Option<bool>,
    /// Blocked reason, when blocking caused the failure.
    pub blocked_reason: Option<String>,
}

/// Event: Network.loadingFinished
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadingFinishedEvent {
    /// Request id.
    pub request_id: RequestId,
    /// Monotonic timestamp.
    pub timestamp: MonotonicTime,
    /// Total transferred bytes.
    pub encoded_data_length: f64,
}

/// Event: Network.requestServedFromCache
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestServedFromCacheEvent {
    /// Request id.
    pub request_id: RequestId,
}

/// A browser cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cookie {
    /// Cookie name.
    pub name: String,
    /// Cookie value.
    pub value: String,
    /// Cookie domain.
    pub domain: String,
    /// Cookie path.
    pub path: String,
    /// Expiry in seconds since epoch, -1 for session cookies.
    pub expires: f64,
    /// Cookie size in bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
    /// HttpOnly flag.
    pub http_only: bool,
    /// Secure flag.
    pub secure: bool,
    /// Whether the cookie is a session cookie.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<bool>,
    /// SameSite policy ("Strict", "Lax", "None").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub same_site: Option<String>,
}

/// Cookie fields for Storage.setCookies.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CookieParam {
    /// Cookie name.
    pub name: String,
    /// Cookie value.
    pub value: String,
    /// Request URL to infer domain/path defaults from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Cookie domain.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    /// Cookie path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Secure flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secure: Option<bool>,
    /// HttpOnly flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_only: Option<bool>,
    /// SameSite policy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub same_site: Option<String>,
    /// Expiry in seconds since epoch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<f64>,
}
