//! Network request tracking and interception.
//!
//! [`NetworkStorage`] owns the per-request state machines and the
//! intercept registry, computes the effective `Fetch.enable` pattern set,
//! and records which requests are paused waiting for a continue command.

pub mod request;

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crosswire_bidi::network::{InterceptPhase, UrlPattern};
use crosswire_bidi::{BidiError, ErrorCode};
use crosswire_cdp::protocol::fetch as cdp_fetch;
use crosswire_cdp::CdpSession;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

pub use request::{InterceptMatcher, NetworkEmission, NetworkRequest, PausedState, RequestId};

/// One registered intercept.
#[derive(Debug, Clone)]
pub struct Intercept {
    /// Intercept id.
    pub id: String,
    /// Phases the intercept pauses at.
    pub phases: Vec<InterceptPhase>,
    /// URL patterns; empty matches everything.
    pub patterns: Vec<UrlPattern>,
    /// Restrict to these top-level contexts; global when `None`.
    pub contexts: Option<Vec<String>>,
}

impl Intercept {
    fn matches(&self, phase: InterceptPhase, url: &str) -> bool {
        self.phases.contains(&phase)
            && (self.patterns.is_empty() || self.patterns.iter().any(|p| p.matches(url)))
    }
}

/// A request paused under an intercept.
#[derive(Debug, Clone)]
pub struct BlockedRequest {
    /// Fetch-domain id for the continue commands.
    pub fetch_id: String,
    /// Phase the request is paused at.
    pub phase: InterceptPhase,
    /// Session the Fetch commands must be sent on.
    pub session: CdpSession,
}

/// Matcher over a snapshot of the intercept registry.
#[derive(Debug, Clone)]
pub struct InterceptSnapshot {
    intercepts: Vec<Intercept>,
}

impl InterceptMatcher for InterceptSnapshot {
    /// Matching intercept ids, in the registry's stable (id) order.
    fn matching(&self, phase: InterceptPhase, url: &str) -> Vec<String> {
        self.intercepts
            .iter()
            .filter(|intercept| intercept.matches(phase, url))
            .map(|intercept| intercept.id.clone())
            .collect()
    }
}

/// Storage for requests, intercepts and paused requests.
#[derive(Debug, Default)]
pub struct NetworkStorage {
    requests: Mutex<HashMap<RequestId, NetworkRequest>>,
    // BTreeMap keeps iteration order deterministic across snapshots.
    intercepts: Mutex<BTreeMap<String, Intercept>>,
    blocked: Mutex<HashMap<RequestId, BlockedRequest>>,
}

impl NetworkStorage {
    /// New empty storage.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register an intercept; returns its id.
    pub async fn add_intercept(
        &self,
        phases: Vec<InterceptPhase>,
        patterns: Vec<UrlPattern>,
        contexts: Option<Vec<String>>,
    ) -> String {
        let id = Uuid::new_v4().to_string();
        let intercept = Intercept {
            id: id.clone(),
            phases,
            patterns,
            contexts,
        };
        debug!(intercept = %id, "intercept added");
        self.intercepts.lock().await.insert(id.clone(), intercept);
        id
    }

    /// Remove an intercept, returning it so a failed reconcile can
    /// restore it.
    ///
    /// # Errors
    ///
    /// `no such intercept` when the id is not registered.
    pub async fn remove_intercept(&self, id: &str) -> Result<Intercept, BidiError> {
        match self.intercepts.lock().await.remove(id) {
            Some(intercept) => {
                debug!(intercept = %id, "intercept removed");
                Ok(intercept)
            }
            None => Err(BidiError::new(
                ErrorCode::NoSuchIntercept,
                format!("intercept {id} not found"),
            )),
        }
    }

    /// Put an intercept back after an aborted change.
    pub async fn restore_intercept(&self, intercept: Intercept) {
        self.intercepts
            .lock()
            .await
            .insert(intercept.id.clone(), intercept);
    }

    /// Snapshot the registry for matching.
    pub async fn snapshot(&self) -> InterceptSnapshot {
        InterceptSnapshot {
            intercepts: self.intercepts.lock().await.values().cloned().collect(),
        }
    }

    /// The Fetch.enable parameter set implied by the active intercepts;
    /// `None` means Fetch must be disabled.
    pub async fn fetch_enable_params(&self) -> Option<cdp_fetch::EnableParams> {
        let intercepts = self.intercepts.lock().await;
        if intercepts.is_empty() {
            return None;
        }
        let mut patterns: Vec<cdp_fetch::RequestPattern> = Vec::new();
        let mut handle_auth = false;
        for intercept in intercepts.values() {
            for phase in &intercept.phases {
                match phase {
                    InterceptPhase::AuthRequired => {
                        handle_auth = true;
                        continue;
                    }
                    InterceptPhase::BeforeRequestSent | InterceptPhase::ResponseStarted => {}
                }
                let stage = match phase {
                    InterceptPhase::ResponseStarted => cdp_fetch::RequestStage::Response,
                    _ => cdp_fetch::RequestStage::Request,
                };
                if intercept.patterns.is_empty() {
                    push_unique(&mut patterns, wildcard_pattern("*", stage));
                } else {
                    for pattern in &intercept.patterns {
                        push_unique(
                            &mut patterns,
                            wildcard_pattern(&fetch_url_pattern(pattern), stage),
                        );
                    }
                }
            }
        }
        if handle_auth && patterns.is_empty() {
            // Auth interception still needs the domain enabled.
            patterns.push(wildcard_pattern("*", cdp_fetch::RequestStage::Request));
        }
        Some(cdp_fetch::EnableParams {
            patterns: Some(patterns),
            handle_auth_requests: Some(handle_auth),
        })
    }

    /// Run a CDP network signal through the request's state machine.
    ///
    /// Creates the request lazily on its first signal.
    pub async fn with_request<R>(
        &self,
        id: &str,
        f: impl FnOnce(&mut NetworkRequest, &InterceptSnapshot) -> R,
    ) -> R {
        let snapshot = self.snapshot().await;
        let mut requests = self.requests.lock().await;
        let request = requests
            .entry(id.to_string())
            .or_insert_with(|| NetworkRequest::new(id.to_string()));
        f(request, &snapshot)
    }

    /// Record a request as blocked.
    pub async fn mark_blocked(&self, request_id: &str, blocked: BlockedRequest) {
        self.blocked
            .lock()
            .await
            .insert(request_id.to_string(), blocked);
    }

    /// Look up a blocked request and check the phase the command expects.
    ///
    /// # Errors
    ///
    /// `no such request` when the request is not blocked; `invalid
    /// argument` when it is blocked in a different phase.
    pub async fn blocked_in_phase(
        &self,
        request_id: &str,
        allowed: &[InterceptPhase],
    ) -> Result<BlockedRequest, BidiError> {
        let blocked = self.blocked.lock().await;
        let entry = blocked.get(request_id).ok_or_else(|| {
            BidiError::new(
                ErrorCode::NoSuchRequest,
                format!("request {request_id} is not blocked"),
            )
        })?;
        if !allowed.contains(&entry.phase) {
            return Err(BidiError::invalid_argument(format!(
                "request {request_id} is blocked in a different phase"
            )));
        }
        Ok(entry.clone())
    }

    /// Release the blocked record after a successful continue command.
    pub async fn release_blocked(&self, request_id: &str) {
        self.blocked.lock().await.remove(request_id);
        let mut requests = self.requests.lock().await;
        if let Some(request) = requests.get_mut(request_id) {
            request.paused = None;
        }
    }
}

fn push_unique(patterns: &mut Vec<cdp_fetch::RequestPattern>, pattern: cdp_fetch::RequestPattern) {
    if !patterns.contains(&pattern) {
        patterns.push(pattern);
    }
}

fn wildcard_pattern(url_pattern: &str, stage: cdp_fetch::RequestStage) -> cdp_fetch::RequestPattern {
    cdp_fetch::RequestPattern {
        url_pattern: Some(url_pattern.to_string()),
        resource_type: None,
        request_stage: Some(stage),
    }
}

/// Lower a BiDi URL pattern to the Fetch wildcard syntax.
///
/// String patterns keep their substring semantics by wrapping in
/// wildcards; structured patterns compose their components, with `*`
/// standing in for anything unspecified.
fn fetch_url_pattern(pattern: &UrlPattern) -> String {
    match pattern {
        UrlPattern::String { pattern } => format!("*{pattern}*"),
        UrlPattern::Pattern {
            protocol,
            hostname,
            port,
            pathname,
            search,
        } => {
            let protocol = protocol.as_deref().unwrap_or("*");
            let hostname = hostname.as_deref().unwrap_or("*");
            let port = port
                .as_ref()
                .map(|p| format!(":{p}"))
                .unwrap_or_default();
            let pathname = match pathname.as_deref() {
                Some(path) if path.starts_with('/') => path.to_string(),
                Some(path) => format!("/{path}"),
                None => "/*".to_string(),
            };
            let search = search
                .as_ref()
                .map(|s| format!("?{}", s.trim_start_matches('?')))
                .unwrap_or_else(|| "*".to_string());
            format!("{protocol}://{hostname}{port}{pathname}{search}")
        }
    }
}

#[cfg(test)]
mod tests;
