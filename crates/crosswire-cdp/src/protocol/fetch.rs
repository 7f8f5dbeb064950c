//! Fetch domain types.
//!
//! Request interception. The mapper keeps at most one Fetch.enable pattern
//! set per target and pauses matching requests until a continue command
//! resolves them.

use serde::{Deserialize, Serialize};

use super::network::Request;

/// Fetch-domain request identifier (distinct from Network request ids).
pub type FetchRequestId = String;

/// Stage at which a request pattern intercepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RequestStage {
    /// Pause before the request goes out.
    #[default]
    Request,
    /// Pause once response headers are available.
    Response,
}

/// Request pattern for interception.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RequestPattern {
    /// Wildcard URL pattern ('*' and '?'); omitting matches everything.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_pattern: Option<String>,
    /// Restrict to one resource type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    /// Stage to intercept at; Request when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_stage: Option<RequestStage>,
}

/// Parameters for Fetch.enable.
#[derive(Debug, Clone, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EnableParams {
    /// Patterns to pause; everything pauses when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patterns: Option<Vec<RequestPattern>>,
    /// Whether authRequired events are issued and auth pauses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle_auth_requests: Option<bool>,
}

/// Response HTTP header entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HeaderEntry {
    /// Header name.
    pub name: String,
    /// Header value.
    pub value: String,
}

/// Parameters for Fetch.continueRequest.
#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ContinueRequestParams {
    /// Paused request to release.
    pub request_id: FetchRequestId,
    /// URL override, not observable by the page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Method override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Base64-encoded post data override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_data: Option<String>,
    /// Header overrides.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<Vec<HeaderEntry>>,
    /// Whether to also pause at the response stage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intercept_response: Option<bool>,
}

/// Parameters for Fetch.continueResponse.
#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ContinueResponseParams {
    /// Paused request to release.
    pub request_id: FetchRequestId,
    /// Status code override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_code: Option<i64>,
    /// Status text override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_phrase: Option<String>,
    /// Header overrides.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_headers: Option<Vec<HeaderEntry>>,
}

/// Parameters for Fetch.fulfillRequest.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FulfillRequestParams {
    /// Paused request to fulfill.
    pub request_id: FetchRequestId,
    /// HTTP status code for the synthesized response.
    pub response_code: i64,
    /// Status text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_phrase: Option<String>,
    /// Response headers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_headers: Option<Vec<HeaderEntry>>,
    /// Base64-encoded response body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// Parameters for Fetch.failRequest.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailRequestParams {
    /// Paused request to fail.
    pub request_id: FetchRequestId,
    /// Network-level error ("Failed", "Aborted", "AccessDenied", ...).
    pub error_reason: String,
}

/// Auth challenge response for Fetch.continueWithAuth.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthChallengeResponse {
    /// What to do ("Default", "CancelAuth", "ProvideCredentials").
    pub response: String,
    /// Username, with ProvideCredentials.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Password, with ProvideCredentials.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Parameters for Fetch.continueWithAuth.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinueWithAuthParams {
    /// Paused request to resolve.
    pub request_id: FetchRequestId,
    /// How to answer the challenge.
    pub auth_challenge_response: AuthChallengeResponse,
}

/// Event: Fetch.requestPaused
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestPausedEvent {
    /// Fetch-domain id of the paused request.
    pub request_id: FetchRequestId,
    /// The request.
    pub request: Request,
    /// Frame the request belongs to.
    pub frame_id: String,
    /// Resource type.
    pub resource_type: String,
    /// Response error, when paused at a failed response.
    pub response_error_reason: Option<String>,
    /// Response status, when paused at the response stage.
    pub response_status_code: Option<i64>,
    /// Response status text, when paused at the response stage.
    pub response_status_text: Option<String>,
    /// Response headers, when paused at the response stage.
    pub response_headers: Option<Vec<HeaderEntry>>,
    /// Matching Network.requestWillBeSent request id, when available.
    pub network_id: Option<String>,
}

/// Auth challenge description.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthChallenge {
    /// Challenge source ("Server" or "Proxy").
    pub source: Option<String>,
    /// Challenge origin.
    pub origin: String,
    /// Authentication scheme ("basic", "digest").
    pub scheme: String,
    /// Authentication realm.
    pub realm: String,
}

/// Event: Fetch.authRequired
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthRequiredEvent {
    /// Fetch-domain id of the paused request.
    pub request_id: FetchRequestId,
    /// The request.
    pub request: Request,
    /// Frame the request belongs to.
    pub frame_id: String,
    /// Resource type.
    pub resource_type: String,
    /// The challenge to answer.
    pub auth_challenge: AuthChallenge,
}
