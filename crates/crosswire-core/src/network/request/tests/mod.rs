use std::collections::HashMap;

use crosswire_bidi::network::InterceptPhase;
use crosswire_cdp::protocol::fetch as cdp_fetch;
use crosswire_cdp::protocol::network as cdp_net;

use super::*;

struct NoIntercepts;

impl InterceptMatcher for NoIntercepts {
    fn matching(&self, _phase: InterceptPhase, _url: &str) -> Vec<String> {
        Vec::new()
    }
}

struct AlwaysIntercept(&'static str, InterceptPhase);

impl InterceptMatcher for AlwaysIntercept {
    fn matching(&self, phase: InterceptPhase, _url: &str) -> Vec<String> {
        if phase == self.1 {
            vec![self.0.to_string()]
        } else {
            Vec::new()
        }
    }
}

fn will_be_sent(
    id: &str,
    url: &str,
    has_extra_info: bool,
    redirect: Option<cdp_net::Response>,
) -> cdp_net::RequestWillBeSentEvent {
    cdp_net::RequestWillBeSentEvent {
        request_id: id.to_string(),
        loader_id: "LOADER".to_string(),
        document_url: url.to_string(),
        request: cdp_net::Request {
            url: url.to_string(),
            url_fragment: None,
            method: "GET".to_string(),
            headers: HashMap::new(),
            has_post_data: None,
            referrer_policy: None,
        },
        timestamp: 1.0,
        wall_time: 1_700_000.0,
        initiator: cdp_net::Initiator {
            initiator_type: "other".to_string(),
            stack: None,
            url: None,
            line_number: None,
            column_number: None,
        },
        redirect_has_extra_info: None,
        redirect_response: redirect,
        resource_type: Some("Document".to_string()),
        frame_id: Some("F1".to_string()),
        has_extra_info: Some(has_extra_info),
    }
}

fn response(id: &str, status: i64, has_extra_info: bool) -> cdp_net::ResponseReceivedEvent {
    cdp_net::ResponseReceivedEvent {
        request_id: id.to_string(),
        loader_id: "LOADER".to_string(),
        timestamp: 2.0,
        resource_type: "Document".to_string(),
        response: raw_response(status),
        has_extra_info: Some(has_extra_info),
        frame_id: Some("F1".to_string()),
    }
}

fn raw_response(status: i64) -> cdp_net::Response {
    cdp_net::Response {
        url: "http://a/r".to_string(),
        status,
        status_text: "OK".to_string(),
        headers: HashMap::new(),
        mime_type: "text/html".to_string(),
        from_disk_cache: Some(false),
        from_service_worker: None,
        encoded_data_length: 128.0,
        protocol: Some("http/1.1".to_string()),
        timing: None,
    }
}

fn methods(emissions: &[NetworkEmission]) -> Vec<&'static str> {
    emissions.iter().map(NetworkEmission::method).collect()
}

#[test]
fn test_before_request_sent_waits_for_extra_info() {
    let mut request = NetworkRequest::new("R1".to_string());
    let emissions = request.on_request_will_be_sent(
        will_be_sent("R1", "http://a/", true, None),
        &NoIntercepts,
    );
    assert!(emissions.is_empty(), "must wait for extra info");

    let emissions = request.on_request_will_be_sent_extra_info(
        cdp_net::RequestWillBeSentExtraInfoEvent {
            request_id: "R1".to_string(),
            headers: HashMap::from([(
                "accept".to_string(),
                serde_json::Value::String("*/*".to_string()),
            )]),
            associated_cookies: None,
        },
        &NoIntercepts,
    );
    assert_eq!(methods(&emissions), vec!["network.beforeRequestSent"]);
    match &emissions[0] {
        NetworkEmission::BeforeRequestSent(p) => {
            assert_eq!(p.base.redirect_count, 0);
            assert_eq!(p.base.request.url, "http://a/");
            assert_eq!(p.base.request.headers.len(), 1);
            assert!(!p.base.is_blocked);
        }
        other => panic!("unexpected emission {other:?}"),
    }
}

#[test]
fn test_before_request_sent_emitted_once() {
    let mut request = NetworkRequest::new("R1".to_string());
    let first =
        request.on_request_will_be_sent(will_be_sent("R1", "http://a/", false, None), &NoIntercepts);
    assert_eq!(first.len(), 1);
    let again = request.on_request_will_be_sent_extra_info(
        cdp_net::RequestWillBeSentExtraInfoEvent {
            request_id: "R1".to_string(),
            headers: HashMap::new(),
            associated_cookies: None,
        },
        &NoIntercepts,
    );
    assert!(again.is_empty());
}

#[test]
fn test_response_lifecycle() {
    let mut request = NetworkRequest::new("R1".to_string());
    request.on_request_will_be_sent(will_be_sent("R1", "http://a/", false, None), &NoIntercepts);

    let emissions = request.on_response_received(response("R1", 200, false), &NoIntercepts);
    assert_eq!(methods(&emissions), vec!["network.responseStarted"]);

    let emissions = request.on_loading_finished(&NoIntercepts);
    assert_eq!(methods(&emissions), vec!["network.responseCompleted"]);
}

#[test]
fn test_response_extra_info_gates_events() {
    let mut request = NetworkRequest::new("R1".to_string());
    request.on_request_will_be_sent(will_be_sent("R1", "http://a/", false, None), &NoIntercepts);

    let emissions = request.on_response_received(response("R1", 200, true), &NoIntercepts);
    assert!(emissions.is_empty());
    // loadingFinished still cannot emit: extra info outstanding.
    let emissions = request.on_loading_finished(&NoIntercepts);
    assert!(emissions.is_empty());

    let emissions = request.on_response_received_extra_info(
        cdp_net::ResponseReceivedExtraInfoEvent {
            request_id: "R1".to_string(),
            headers: HashMap::new(),
            status_code: Some(204),
            blocked_cookies: None,
        },
        &NoIntercepts,
    );
    assert_eq!(
        methods(&emissions),
        vec!["network.responseStarted", "network.responseCompleted"]
    );
    match &emissions[0] {
        NetworkEmission::ResponseStarted(p) => assert_eq!(p.response.status, 204),
        other => panic!("unexpected emission {other:?}"),
    }
}

#[test]
fn test_redirect_sequence() {
    let mut request = NetworkRequest::new("R1".to_string());

    let emissions =
        request.on_request_will_be_sent(will_be_sent("R1", "http://a/r", false, None), &NoIntercepts);
    assert_eq!(methods(&emissions), vec!["network.beforeRequestSent"]);

    // The 302 arrives as the redirectResponse of the next hop.
    let emissions = request.on_request_will_be_sent(
        will_be_sent("R1", "http://a/t", false, Some(raw_response(302))),
        &NoIntercepts,
    );
    assert_eq!(
        methods(&emissions),
        vec![
            "network.responseStarted",
            "network.responseCompleted",
            "network.beforeRequestSent"
        ]
    );
    match &emissions[0] {
        NetworkEmission::ResponseStarted(p) => {
            assert_eq!(p.response.status, 302);
            assert_eq!(p.base.redirect_count, 0);
        }
        other => panic!("unexpected emission {other:?}"),
    }
    match &emissions[2] {
        NetworkEmission::BeforeRequestSent(p) => {
            assert_eq!(p.base.redirect_count, 1);
            assert_eq!(p.base.request.url, "http://a/t");
        }
        other => panic!("unexpected emission {other:?}"),
    }

    let emissions = request.on_response_received(response("R1", 200, false), &NoIntercepts);
    assert_eq!(methods(&emissions), vec!["network.responseStarted"]);
    let emissions = request.on_loading_finished(&NoIntercepts);
    assert_eq!(methods(&emissions), vec!["network.responseCompleted"]);
}

#[test]
fn test_fetch_error_on_loading_failed() {
    let mut request = NetworkRequest::new("R1".to_string());
    request.on_request_will_be_sent(will_be_sent("R1", "http://a/", false, None), &NoIntercepts);
    let emissions = request.on_loading_failed(
        &cdp_net::LoadingFailedEvent {
            request_id: "R1".to_string(),
            timestamp: 3.0,
            resource_type: Some("Document".to_string()),
            error_text: "net::ERR_CONNECTION_REFUSED".to_string(),
            canceled: Some(false),
            blocked_reason: None,
        },
        &NoIntercepts,
    );
    assert_eq!(methods(&emissions), vec!["network.fetchError"]);
    match &emissions[0] {
        NetworkEmission::FetchError(p) => {
            assert_eq!(p.error_text, "net::ERR_CONNECTION_REFUSED");
        }
        other => panic!("unexpected emission {other:?}"),
    }
}

#[test]
fn test_intercepted_request_is_blocked() {
    let matcher = AlwaysIntercept("icp-1", InterceptPhase::BeforeRequestSent);
    let mut request = NetworkRequest::new("R1".to_string());
    let emissions =
        request.on_request_will_be_sent(will_be_sent("R1", "http://a/", false, None), &matcher);
    match &emissions[0] {
        NetworkEmission::BeforeRequestSent(p) => {
            assert!(p.base.is_blocked);
            assert_eq!(p.base.intercepts, Some(vec!["icp-1".to_string()]));
        }
        other => panic!("unexpected emission {other:?}"),
    }
}

#[test]
fn test_request_paused_without_matching_intercepts_requests_release() {
    let mut request = NetworkRequest::new("R1".to_string());
    request.on_request_will_be_sent(will_be_sent("R1", "http://a/", false, None), &NoIntercepts);
    let matches = request.on_request_paused(
        &cdp_fetch::RequestPausedEvent {
            request_id: "FETCH-1".to_string(),
            request: cdp_net::Request {
                url: "http://a/".to_string(),
                url_fragment: None,
                method: "GET".to_string(),
                headers: HashMap::new(),
                has_post_data: None,
                referrer_policy: None,
            },
            frame_id: "F1".to_string(),
            resource_type: "Document".to_string(),
            response_error_reason: None,
            response_status_code: None,
            response_status_text: None,
            response_headers: None,
            network_id: Some("R1".to_string()),
        },
        &NoIntercepts,
    );
    assert!(matches.is_empty());
    assert!(request.paused.is_none());
}

#[test]
fn test_navigation_request_detection() {
    let mut request = NetworkRequest::new("LOADER".to_string());
    request.on_request_will_be_sent(
        will_be_sent("LOADER", "http://a/", false, None),
        &NoIntercepts,
    );
    assert!(request.is_navigation_request());
}
