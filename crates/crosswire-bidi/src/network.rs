//! network module types.
//!
//! Events mirror the lifecycle of one fetch; intercept registrations pause
//! matching requests at one or more phases.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request identifier, stable across redirects.
pub type Request = String;

/// Intercept identifier.
pub type InterceptId = String;

/// Phase at which an intercept pauses a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InterceptPhase {
    /// Before the request goes out.
    BeforeRequestSent,
    /// Once response headers arrived.
    ResponseStarted,
    /// At an authentication challenge.
    AuthRequired,
}

/// URL pattern: a literal string or a structured component match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum UrlPattern {
    /// Literal pattern, matched as a substring of the request URL.
    String {
        /// The pattern text.
        pattern: String,
    },
    /// Component pattern; absent components match anything.
    Pattern {
        /// Scheme, without "://".
        #[serde(skip_serializing_if = "Option::is_none")]
        protocol: Option<String>,
        /// Hostname.
        #[serde(skip_serializing_if = "Option::is_none")]
        hostname: Option<String>,
        /// Port.
        #[serde(skip_serializing_if = "Option::is_none")]
        port: Option<String>,
        /// Path.
        #[serde(skip_serializing_if = "Option::is_none")]
        pathname: Option<String>,
        /// Query string, without "?".
        #[serde(skip_serializing_if = "Option::is_none")]
        search: Option<String>,
    },
}

impl UrlPattern {
    /// Whether this pattern matches the given URL.
    ///
    /// String patterns use substring matching; structured patterns compare
    /// each present component against the parsed URL.
    pub fn matches(&self, url: &str) -> bool {
        match self {
            Self::String { pattern } => url.contains(pattern.as_str()),
            Self::Pattern {
                protocol,
                hostname,
                port,
                pathname,
                search,
            } => {
                let Ok(parsed) = url::Url::parse(url) else {
                    return false;
                };
                if let Some(protocol) = protocol {
                    if parsed.scheme() != protocol.trim_end_matches(':') {
                        return false;
                    }
                }
                if let Some(hostname) = hostname {
                    if parsed.host_str() != Some(hostname.as_str()) {
                        return false;
                    }
                }
                if let Some(port) = port {
                    let actual = parsed
                        .port_or_known_default()
                        .map(|p| p.to_string())
                        .unwrap_or_default();
                    if &actual != port {
                        return false;
                    }
                }
                if let Some(pathname) = pathname {
                    if parsed.path() != pathname {
                        return false;
                    }
                }
                if let Some(search) = search {
                    let actual = parsed.query().unwrap_or("");
                    if actual != search.trim_start_matches('?') {
                        return false;
                    }
                }
                true
            }
        }
    }
}

/// Bytes that may or may not be UTF-8.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BytesValue {
    /// UTF-8 text.
    String {
        /// The text.
        value: String,
    },
    /// Base64-encoded bytes.
    Base64 {
        /// The encoded bytes.
        value: String,
    },
}

impl BytesValue {
    /// A UTF-8 string value.
    pub fn string(s: impl Into<String>) -> Self {
        Self::String { value: s.into() }
    }
}

/// One header.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Header {
    /// Header name.
    pub name: String,
    /// Header value.
    pub value: BytesValue,
}

/// One cookie attached to a request or response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Cookie {
    /// Cookie name.
    pub name: String,
    /// Cookie value.
    pub value: BytesValue,
    /// Cookie domain.
    pub domain: String,
    /// Cookie path.
    pub path: String,
    /// Cookie size in bytes.
    pub size: u64,
    /// HttpOnly flag.
    pub http_only: bool,
    /// Secure flag.
    pub secure: bool,
    /// SameSite policy.
    pub same_site: SameSite,
    /// Expiry in seconds since epoch; absent for session cookies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry: Option<i64>,
}

/// SameSite cookie policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSite {
    /// Strict.
    Strict,
    /// Lax.
    Lax,
    /// None.
    None,
}

/// Fetch timing info, milliseconds relative to time origin.
#[derive(Debug, Clone, Serialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FetchTimingInfo {
    /// Time origin baseline.
    pub time_origin: f64,
    /// Request start.
    pub request_time: f64,
    /// Redirect start.
    pub redirect_start: f64,
    /// Redirect end.
    pub redirect_end: f64,
    /// Fetch start.
    pub fetch_start: f64,
    /// DNS start.
    pub dns_start: f64,
    /// DNS end.
    pub dns_end: f64,
    /// Connect start.
    pub connect_start: f64,
    /// Connect end.
    pub connect_end: f64,
    /// TLS start.
    pub tls_start: f64,
    /// Request send start.
    pub request_start: f64,
    /// First response byte.
    pub response_start: f64,
    /// Response end.
    pub response_end: f64,
}

/// Request data carried on every network event.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RequestData {
    /// Request id.
    pub request: Request,
    /// Request URL.
    pub url: String,
    /// HTTP method.
    pub method: String,
    /// Request headers.
    pub headers: Vec<Header>,
    /// Request cookies.
    pub cookies: Vec<Cookie>,
    /// Total header bytes.
    pub headers_size: u64,
    /// Body size, when known.
    pub body_size: Option<u64>,
    /// Timing breakdown.
    pub timings: FetchTimingInfo,
}

/// Response data for responseStarted / responseCompleted.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResponseData {
    /// Response URL.
    pub url: String,
    /// Protocol ("http/1.1", "h2", ...).
    pub protocol: String,
    /// HTTP status.
    pub status: u64,
    /// HTTP status text.
    pub status_text: String,
    /// Whether the response came from a cache.
    pub from_cache: bool,
    /// Response headers.
    pub headers: Vec<Header>,
    /// Mime type.
    pub mime_type: String,
    /// Bytes received so far.
    pub bytes_received: u64,
    /// Header bytes, when known.
    pub headers_size: Option<u64>,
    /// Body bytes, when known.
    pub body_size: Option<u64>,
    /// Content info.
    pub content: ResponseContent,
    /// Auth challenges, when the response asked for credentials.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_challenges: Option<Vec<AuthChallenge>>,
}

/// Response content descriptor.
#[derive(Debug, Clone, Serialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResponseContent {
    /// Decoded body size.
    pub size: u64,
}

/// One authentication challenge.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AuthChallenge {
    /// Challenge scheme ("basic", "digest").
    pub scheme: String,
    /// Challenge realm.
    pub realm: String,
}

/// Request initiator.
#[derive(Debug, Clone, Serialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Initiator {
    /// Initiator kind.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub initiator_type: Option<String>,
    /// Column number for script initiators.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_number: Option<u64>,
    /// Line number for script initiators.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_number: Option<u64>,
    /// Request that triggered this one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<Request>,
}

/// Fields shared by every network event.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BaseParameters {
    /// Originating browsing context, when known.
    pub context: Option<String>,
    /// Whether the request is paused waiting for a continue command.
    pub is_blocked: bool,
    /// Navigation this request belongs to, when it is a document load.
    pub navigation: Option<String>,
    /// Redirect hop count.
    pub redirect_count: u64,
    /// The request.
    pub request: RequestData,
    /// Event timestamp in milliseconds since epoch.
    pub timestamp: u64,
    /// Intercepts that matched, present when blocked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intercepts: Option<Vec<InterceptId>>,
}

/// Payload of network.beforeRequestSent.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BeforeRequestSentParams {
    /// Common fields.
    #[serde(flatten)]
    pub base: BaseParameters,
    /// Request initiator.
    pub initiator: Initiator,
}

/// Payload of network.responseStarted / network.responseCompleted.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResponseParams {
    /// Common fields.
    #[serde(flatten)]
    pub base: BaseParameters,
    /// The response.
    pub response: ResponseData,
}

/// Payload of network.fetchError.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FetchErrorParams {
    /// Common fields.
    #[serde(flatten)]
    pub base: BaseParameters,
    /// Error text.
    pub error_text: String,
}

/// Payload of network.authRequired.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuthRequiredParams {
    /// Common fields.
    #[serde(flatten)]
    pub base: BaseParameters,
    /// The response carrying the challenge.
    pub response: ResponseData,
}

/// Parameters for network.addIntercept.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddInterceptParams {
    /// Phases to pause at.
    pub phases: Vec<InterceptPhase>,
    /// Patterns to match; everything matches when omitted.
    pub url_patterns: Option<Vec<UrlPattern>>,
    /// Restrict to these top-level contexts.
    pub contexts: Option<Vec<String>>,
}

/// Result of network.addIntercept.
#[derive(Debug, Clone, Serialize)]
pub struct AddInterceptResult {
    /// Id of the new intercept.
    pub intercept: InterceptId,
}

/// Parameters for network.removeIntercept.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoveInterceptParams {
    /// Intercept to remove.
    pub intercept: InterceptId,
}

/// Header/cookie overrides for network.continueRequest.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinueRequestParams {
    /// Blocked request to release.
    pub request: Request,
    /// Body override.
    pub body: Option<BytesValue>,
    /// Cookie overrides.
    pub cookies: Option<Vec<CookieHeader>>,
    /// Header overrides.
    pub headers: Option<Vec<Header>>,
    /// Method override.
    pub method: Option<String>,
    /// URL override.
    pub url: Option<String>,
}

/// A cookie in request-header form.
#[derive(Debug, Clone, Deserialize)]
pub struct CookieHeader {
    /// Cookie name.
    pub name: String,
    /// Cookie value.
    pub value: BytesValue,
}

/// Parameters for network.continueResponse.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinueResponseParams {
    /// Blocked request to release.
    pub request: Request,
    /// Cookie overrides (Set-Cookie form).
    pub cookies: Option<Vec<Value>>,
    /// Credentials, when resolving an auth pause.
    pub credentials: Option<AuthCredentials>,
    /// Header overrides.
    pub headers: Option<Vec<Header>>,
    /// Status phrase override.
    pub reason_phrase: Option<String>,
    /// Status code override.
    pub status_code: Option<u64>,
}

/// Username/password credentials.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthCredentials {
    /// Credential kind; always "password".
    #[serde(rename = "type")]
    pub credential_type: String,
    /// Username.
    pub username: String,
    /// Password.
    pub password: String,
}

/// Parameters for network.continueWithAuth.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinueWithAuthParams {
    /// Blocked request to resolve.
    pub request: Request,
    /// What to do with the challenge.
    pub action: ContinueWithAuthAction,
    /// Credentials, required for provideCredentials.
    pub credentials: Option<AuthCredentials>,
}

/// Auth resolution action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContinueWithAuthAction {
    /// Use the browser's default handling.
    Default,
    /// Cancel the challenge.
    Cancel,
    /// Answer with the supplied credentials.
    ProvideCredentials,
}

/// Parameters for network.provideResponse.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvideResponseParams {
    /// Blocked request to fulfill.
    pub request: Request,
    /// Response body.
    pub body: Option<BytesValue>,
    /// Response cookies (Set-Cookie form).
    pub cookies: Option<Vec<Value>>,
    /// Response headers.
    pub headers: Option<Vec<Header>>,
    /// Status phrase.
    pub reason_phrase: Option<String>,
    /// Status code.
    pub status_code: Option<u64>,
}

/// Parameters for network.failRequest.
#[derive(Debug, Clone, Deserialize)]
pub struct FailRequestParams {
    /// Blocked request to fail.
    pub request: Request,
}

/// Parameters for network.setCacheBehavior.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetCacheBehaviorParams {
    /// "default" or "bypass".
    pub cache_behavior: CacheBehavior,
    /// Restrict to these top-level contexts; global when omitted.
    pub contexts: Option<Vec<String>>,
}

/// Cache behavior values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBehavior {
    /// Browser-default caching.
    Default,
    /// Bypass the cache.
    Bypass,
}

#[cfg(test)]
mod tests;
