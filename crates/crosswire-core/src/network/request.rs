//! Per-request state machine.
//!
//! A request retains every CDP signal it has seen and emits each BiDi
//! event exactly once, as soon as the information that event needs is
//! present. A redirect ends the current hop (responseCompleted with the
//! redirect response) and restarts the same request id with an
//! incremented redirect count.

use crosswire_bidi::network as bidi;
use crosswire_bidi::network::InterceptPhase;
use crosswire_cdp::protocol::fetch as cdp_fetch;
use crosswire_cdp::protocol::network as cdp_net;

/// CDP network request id.
pub type RequestId = String;

/// One BiDi network event ready to be published.
#[derive(Debug, Clone)]
pub enum NetworkEmission {
    /// network.beforeRequestSent
    BeforeRequestSent(bidi::BeforeRequestSentParams),
    /// network.responseStarted
    ResponseStarted(bidi::ResponseParams),
    /// network.responseCompleted
    ResponseCompleted(bidi::ResponseParams),
    /// network.fetchError
    FetchError(bidi::FetchErrorParams),
    /// network.authRequired
    AuthRequired(bidi::AuthRequiredParams),
}

impl NetworkEmission {
    /// Dotted BiDi event name.
    pub fn method(&self) -> &'static str {
        match self {
            Self::BeforeRequestSent(_) => "network.beforeRequestSent",
            Self::ResponseStarted(_) => "network.responseStarted",
            Self::ResponseCompleted(_) => "network.responseCompleted",
            Self::FetchError(_) => "network.fetchError",
            Self::AuthRequired(_) => "network.authRequired",
        }
    }

    /// Shared base fields.
    pub fn base(&self) -> &bidi::BaseParameters {
        match self {
            Self::BeforeRequestSent(p) => &p.base,
            Self::ResponseStarted(p) | Self::ResponseCompleted(p) => &p.base,
            Self::FetchError(p) => &p.base,
            Self::AuthRequired(p) => &p.base,
        }
    }

    /// Shared base fields, mutable (the publisher patches `navigation`).
    pub fn base_mut(&mut self) -> &mut bidi::BaseParameters {
        match self {
            Self::BeforeRequestSent(p) => &mut p.base,
            Self::ResponseStarted(p) | Self::ResponseCompleted(p) => &mut p.base,
            Self::FetchError(p) => &mut p.base,
            Self::AuthRequired(p) => &mut p.base,
        }
    }

    /// Serialize the payload.
    pub fn params(&self) -> serde_json::Value {
        let value = match self {
            Self::BeforeRequestSent(p) => serde_json::to_value(p),
            Self::ResponseStarted(p) | Self::ResponseCompleted(p) => serde_json::to_value(p),
            Self::FetchError(p) => serde_json::to_value(p),
            Self::AuthRequired(p) => serde_json::to_value(p),
        };
        value.unwrap_or(serde_json::Value::Null)
    }
}

/// Where a paused request currently waits.
#[derive(Debug, Clone)]
pub struct PausedState {
    /// Fetch-domain id used by the continue commands.
    pub fetch_id: String,
    /// Phase the request paused at.
    pub phase: InterceptPhase,
}

/// Resolves which intercept ids match a URL at a phase.
pub trait InterceptMatcher {
    /// Matching intercept ids, in registration order.
    fn matching(&self, phase: InterceptPhase, url: &str) -> Vec<String>;
}

/// The merged per-request state.
#[derive(Debug)]
pub struct NetworkRequest {
    /// CDP request id.
    pub id: RequestId,
    /// Frame the request belongs to, when known.
    pub context_id: Option<String>,
    /// Redirect hop counter.
    pub redirect_count: u64,
    /// Pause state, when the request waits on a continue command.
    pub paused: Option<PausedState>,

    will_be_sent: Option<cdp_net::RequestWillBeSentEvent>,
    extra_info: Option<cdp_net::RequestWillBeSentExtraInfoEvent>,
    response: Option<cdp_net::ResponseReceivedEvent>,
    response_extra_info: Option<cdp_net::ResponseReceivedExtraInfoEvent>,
    served_from_cache: bool,
    loading_finished: bool,

    emitted_before_request_sent: bool,
    emitted_response_started: bool,
    emitted_response_completed: bool,
}

impl NetworkRequest {
    /// Fresh request record.
    pub fn new(id: RequestId) -> Self {
        Self {
            id,
            context_id: None,
            redirect_count: 0,
            paused: None,
            will_be_sent: None,
            extra_info: None,
            response: None,
            response_extra_info: None,
            served_from_cache: false,
            loading_finished: false,
            emitted_before_request_sent: false,
            emitted_response_started: false,
            emitted_response_completed: false,
        }
    }

    /// Whether this request is the document load of its frame.
    pub fn is_navigation_request(&self) -> bool {
        self.will_be_sent
            .as_ref()
            .is_some_and(|ev| ev.loader_id == self.id)
    }

    /// `Network.requestWillBeSent`.
    pub fn on_request_will_be_sent(
        &mut self,
        ev: cdp_net::RequestWillBeSentEvent,
        matcher: &dyn InterceptMatcher,
    ) -> Vec<NetworkEmission> {
        let mut emissions = Vec::new();

        if let Some(redirect_response) = ev.redirect_response.clone() {
            if self.will_be_sent.is_some() {
                // Finalize the previous hop with the redirect response.
                emissions.extend(self.try_emit_before_request_sent(matcher));
                emissions.extend(self.emit_redirect_close(&redirect_response, ev.timestamp));
                self.redirect_count += 1;
                self.extra_info = None;
                self.response = None;
                self.response_extra_info = None;
                self.served_from_cache = false;
                self.loading_finished = false;
                self.paused = None;
                self.emitted_before_request_sent = false;
                self.emitted_response_started = false;
                self.emitted_response_completed = false;
            }
        }

        self.context_id = ev.frame_id.clone().or(self.context_id.take());
        self.will_be_sent = Some(ev);
        emissions.extend(self.try_emit_before_request_sent(matcher));
        emissions
    }

    /// `Network.requestWillBeSentExtraInfo`.
    pub fn on_request_will_be_sent_extra_info(
        &mut self,
        ev: cdp_net::RequestWillBeSentExtraInfoEvent,
        matcher: &dyn InterceptMatcher,
    ) -> Vec<NetworkEmission> {
        self.extra_info = Some(ev);
        self.try_emit_before_request_sent(matcher)
    }

    /// `Network.responseReceived`.
    pub fn on_response_received(
        &mut self,
        ev: cdp_net::ResponseReceivedEvent,
        matcher: &dyn InterceptMatcher,
    ) -> Vec<NetworkEmission> {
        self.context_id = ev.frame_id.clone().or(self.context_id.take());
        self.response = Some(ev);
        let mut emissions = self.try_emit_response_started(matcher);
        emissions.extend(self.try_emit_response_completed(matcher));
        emissions
    }

    /// `Network.responseReceivedExtraInfo`.
    pub fn on_response_received_extra_info(
        &mut self,
        ev: cdp_net::ResponseReceivedExtraInfoEvent,
        matcher: &dyn InterceptMatcher,
    ) -> Vec<NetworkEmission> {
        self.response_extra_info = Some(ev);
        let mut emissions = self.try_emit_response_started(matcher);
        emissions.extend(self.try_emit_response_completed(matcher));
        emissions
    }

    /// `Network.loadingFinished`.
    pub fn on_loading_finished(
        &mut self,
        matcher: &dyn InterceptMatcher,
    ) -> Vec<NetworkEmission> {
        self.loading_finished = true;
        let mut emissions = self.try_emit_response_started(matcher);
        emissions.extend(self.try_emit_response_completed(matcher));
        emissions
    }

    /// `Network.requestServedFromCache`.
    pub fn on_served_from_cache(&mut self) {
        self.served_from_cache = true;
    }

    /// `Network.loadingFailed`.
    pub fn on_loading_failed(
        &mut self,
        ev: &cdp_net::LoadingFailedEvent,
        matcher: &dyn InterceptMatcher,
    ) -> Vec<NetworkEmission> {
        let base = self.base_parameters(InterceptPhase::BeforeRequestSent, matcher, ev.timestamp);
        vec![NetworkEmission::FetchError(bidi::FetchErrorParams {
            base,
            error_text: ev.error_text.clone(),
        })]
    }

    /// `Fetch.requestPaused`. Records the pause; returns the matching
    /// intercept ids (empty = the pause is unwanted and must be released).
    pub fn on_request_paused(
        &mut self,
        ev: &cdp_fetch::RequestPausedEvent,
        matcher: &dyn InterceptMatcher,
    ) -> Vec<String> {
        let phase = if ev.response_status_code.is_some() || ev.response_error_reason.is_some() {
            InterceptPhase::ResponseStarted
        } else {
            InterceptPhase::BeforeRequestSent
        };
        let matches = matcher.matching(phase, &ev.request.url);
        if matches.is_empty() {
            return matches;
        }
        self.paused = Some(PausedState {
            fetch_id: ev.request_id.clone(),
            phase,
        });
        matches
    }

    /// `Fetch.authRequired`.
    pub fn on_auth_required(
        &mut self,
        ev: &cdp_fetch::AuthRequiredEvent,
        matcher: &dyn InterceptMatcher,
        timestamp: f64,
    ) -> Vec<NetworkEmission> {
        self.paused = Some(PausedState {
            fetch_id: ev.request_id.clone(),
            phase: InterceptPhase::AuthRequired,
        });
        let mut base = self.base_parameters(InterceptPhase::AuthRequired, matcher, timestamp);
        base.is_blocked = true;
        if base.request.url.is_empty() {
            base.request.url = ev.request.url.clone();
            base.request.method = ev.request.method.clone();
        }
        let response = bidi::ResponseData {
            url: ev.request.url.clone(),
            protocol: String::new(),
            status: 401,
            status_text: "Unauthorized".to_string(),
            from_cache: false,
            headers: Vec::new(),
            mime_type: String::new(),
            bytes_received: 0,
            headers_size: None,
            body_size: None,
            content: bidi::ResponseContent::default(),
            auth_challenges: Some(vec![bidi::AuthChallenge {
                scheme: ev.auth_challenge.scheme.clone(),
                realm: ev.auth_challenge.realm.clone(),
            }]),
        };
        vec![NetworkEmission::AuthRequired(bidi::AuthRequiredParams {
            base,
            response,
        })]
    }

    fn try_emit_before_request_sent(
        &mut self,
        matcher: &dyn InterceptMatcher,
    ) -> Vec<NetworkEmission> {
        let Some(will_be_sent) = &self.will_be_sent else {
            return Vec::new();
        };
        if self.emitted_before_request_sent {
            return Vec::new();
        }
        if will_be_sent.has_extra_info == Some(true) && self.extra_info.is_none() {
            return Vec::new();
        }
        self.emitted_before_request_sent = true;
        let timestamp = will_be_sent.wall_time;
        let initiator = bidi::Initiator {
            initiator_type: Some(will_be_sent.initiator.initiator_type.clone()),
            column_number: will_be_sent.initiator.column_number.map(|c| c as u64),
            line_number: will_be_sent.initiator.line_number.map(|l| l as u64),
            request: None,
        };
        let base =
            self.base_parameters(InterceptPhase::BeforeRequestSent, matcher, timestamp);
        vec![NetworkEmission::BeforeRequestSent(
            bidi::BeforeRequestSentParams { base, initiator },
        )]
    }

    fn try_emit_response_started(
        &mut self,
        matcher: &dyn InterceptMatcher,
    ) -> Vec<NetworkEmission> {
        if self.emitted_response_started || !self.response_gates_open() {
            return Vec::new();
        }
        self.emitted_response_started = true;
        let timestamp = self.response.as_ref().map_or(0.0, |r| r.timestamp);
        let base = self.base_parameters(InterceptPhase::ResponseStarted, matcher, timestamp);
        let response = self.response_data();
        vec![NetworkEmission::ResponseStarted(bidi::ResponseParams {
            base,
            response,
        })]
    }

    fn try_emit_response_completed(
        &mut self,
        matcher: &dyn InterceptMatcher,
    ) -> Vec<NetworkEmission> {
        if self.emitted_response_completed
            || !self.emitted_response_started
            || !(self.loading_finished || self.served_from_cache)
            || !self.response_gates_open()
        {
            return Vec::new();
        }
        self.emitted_response_completed = true;
        let timestamp = self.response.as_ref().map_or(0.0, |r| r.timestamp);
        let base = self.base_parameters(InterceptPhase::ResponseStarted, matcher, timestamp);
        let response = self.response_data();
        vec![NetworkEmission::ResponseCompleted(bidi::ResponseParams {
            base,
            response,
        })]
    }

    /// Emit the responseStarted/responseCompleted pair that closes a
    /// redirect hop.
    fn emit_redirect_close(
        &mut self,
        redirect_response: &cdp_net::Response,
        timestamp: f64,
    ) -> Vec<NetworkEmission> {
        let base = self.base_parameters_unblocked(timestamp);
        let response = response_data_from(redirect_response, self.served_from_cache);
        self.emitted_response_started = true;
        self.emitted_response_completed = true;
        vec![
            NetworkEmission::ResponseStarted(bidi::ResponseParams {
                base: base.clone(),
                response: response.clone(),
            }),
            NetworkEmission::ResponseCompleted(bidi::ResponseParams { base, response }),
        ]
    }

    fn response_gates_open(&self) -> bool {
        match &self.response {
            None => false,
            Some(response) => {
                response.has_extra_info != Some(true) || self.response_extra_info.is_some()
            }
        }
    }

    /// URL of the request, for intercept matching.
    pub fn url(&self) -> &str {
        self.will_be_sent
            .as_ref()
            .map_or("", |ev| ev.request.url.as_str())
    }

    fn base_parameters(
        &self,
        phase: InterceptPhase,
        matcher: &dyn InterceptMatcher,
        timestamp: f64,
    ) -> bidi::BaseParameters {
        let intercepts = matcher.matching(phase, self.url());
        let mut base = self.base_parameters_unblocked(timestamp);
        if !intercepts.is_empty() {
            base.is_blocked = true;
            base.intercepts = Some(intercepts);
        }
        base
    }

    fn base_parameters_unblocked(&self, timestamp: f64) -> bidi::BaseParameters {
        bidi::BaseParameters {
            context: self.context_id.clone(),
            is_blocked: false,
            navigation: None,
            redirect_count: self.redirect_count,
            request: self.request_data(),
            timestamp: seconds_to_millis(timestamp),
            intercepts: None,
        }
    }

    fn request_data(&self) -> bidi::RequestData {
        let (url, method, headers) = match (&self.extra_info, &self.will_be_sent) {
            (Some(extra), Some(sent)) => (
                sent.request.url.clone(),
                sent.request.method.clone(),
                headers_from(&extra.headers),
            ),
            (None, Some(sent)) => (
                sent.request.url.clone(),
                sent.request.method.clone(),
                headers_from(&sent.request.headers),
            ),
            (Some(extra), None) => (String::new(), String::new(), headers_from(&extra.headers)),
            (None, None) => (String::new(), String::new(), Vec::new()),
        };
        let cookies = self
            .extra_info
            .as_ref()
            .and_then(|extra| extra.associated_cookies.as_ref())
            .map(|cookies| {
                cookies
                    .iter()
                    .filter(|c| c.blocked_reasons.is_empty())
                    .map(|c| cookie_from(&c.cookie))
                    .collect()
            })
            .unwrap_or_default();
        let headers_size = headers
            .iter()
            .map(|h| h.name.len() as u64 + header_value_len(&h.value))
            .sum();
        bidi::RequestData {
            request: self.id.clone(),
            url,
            method,
            headers,
            cookies,
            headers_size,
            body_size: None,
            timings: bidi::FetchTimingInfo::default(),
        }
    }

    fn response_data(&self) -> bidi::ResponseData {
        let Some(received) = &self.response else {
            return response_data_from(
                &empty_response(),
                self.served_from_cache,
            );
        };
        let mut data = response_data_from(&received.response, self.served_from_cache);
        if let Some(extra) = &self.response_extra_info {
            if let Some(status) = extra.status_code {
                data.status = status.max(0) as u64;
            }
            data.headers = headers_from(&extra.headers);
        }
        data
    }
}

fn seconds_to_millis(seconds: f64) -> u64 {
    if seconds <= 0.0 {
        0
    } else {
        (seconds * 1000.0) as u64
    }
}

fn header_value_len(value: &bidi::BytesValue) -> u64 {
    match value {
        bidi::BytesValue::String { value } | bidi::BytesValue::Base64 { value } => {
            value.len() as u64
        }
    }
}

fn headers_from(headers: &cdp_net::Headers) -> Vec<bidi::Header> {
    let mut out: Vec<bidi::Header> = headers
        .iter()
        .map(|(name, value)| bidi::Header {
            name: name.clone(),
            value: bidi::BytesValue::string(
                value
                    .as_str()
                    .map_or_else(|| value.to_string(), ToString::to_string),
            ),
        })
        .collect();
    out.sort_by(|a, b| a.name.cmp(&b.name));
    out
}

fn cookie_from(cookie: &cdp_net::Cookie) -> bidi::Cookie {
    bidi::Cookie {
        name: cookie.name.clone(),
        value: bidi::BytesValue::string(cookie.value.clone()),
        domain: cookie.domain.clone(),
        path: cookie.path.clone(),
        size: cookie.size.unwrap_or(0).max(0) as u64,
        http_only: cookie.http_only,
        secure: cookie.secure,
        same_site: match cookie.same_site.as_deref() {
            Some("Strict") => bidi::SameSite::Strict,
            Some("None") => bidi::SameSite::None,
            _ => bidi::SameSite::Lax,
        },
        expiry: if cookie.expires < 0.0 {
            None
        } else {
            Some(cookie.expires as i64)
        },
    }
}

fn response_data_from(response: &cdp_net::Response, served_from_cache: bool) -> bidi::ResponseData {
    bidi::ResponseData {
        url: response.url.clone(),
        protocol: response.protocol.clone().unwrap_or_default(),
        status: response.status.max(0) as u64,
        status_text: response.status_text.clone(),
        from_cache: response.from_disk_cache.unwrap_or(false) || served_from_cache,
        headers: headers_from(&response.headers),
        mime_type: response.mime_type.clone(),
        bytes_received: response.encoded_data_length.max(0.0) as u64,
        headers_size: None,
        body_size: None,
        content: bidi::ResponseContent::default(),
        auth_challenges: None,
    }
}

fn empty_response() -> cdp_net::Response {
    cdp_net::Response {
        url: String::new(),
        status: 0,
        status_text: String::new(),
        headers: cdp_net::Headers::default(),
        mime_type: String::new(),
        from_disk_cache: None,
        from_service_worker: None,
        encoded_data_length: 0.0,
        protocol: None,
        timing: None,
    }
}

#[cfg(test)]
mod tests;
