use serde_json::json;

use super::*;

#[test]
fn test_string_pattern_substring_matching() {
    let pattern = UrlPattern::String {
        pattern: "/api/".to_string(),
    };
    assert!(pattern.matches("http://example.com/api/users"));
    assert!(pattern.matches("https://other.test/api/"));
    assert!(!pattern.matches("http://example.com/static/app.js"));
}

#[test]
fn test_structured_pattern_components() {
    let pattern = UrlPattern::Pattern {
        protocol: Some("https".to_string()),
        hostname: Some("example.com".to_string()),
        port: None,
        pathname: Some("/api/users".to_string()),
        search: None,
    };
    assert!(pattern.matches("https://example.com/api/users"));
    assert!(pattern.matches("https://example.com/api/users?page=2"));
    assert!(!pattern.matches("http://example.com/api/users"));
    assert!(!pattern.matches("https://example.com/api/items"));
}

#[test]
fn test_structured_pattern_default_port() {
    let pattern = UrlPattern::Pattern {
        protocol: None,
        hostname: None,
        port: Some("443".to_string()),
        pathname: None,
        search: None,
    };
    assert!(pattern.matches("https://example.com/"));
    assert!(!pattern.matches("http://example.com/"));
}

#[test]
fn test_structured_pattern_rejects_unparsable_url() {
    let pattern = UrlPattern::Pattern {
        protocol: None,
        hostname: None,
        port: None,
        pathname: None,
        search: None,
    };
    assert!(!pattern.matches("not a url"));
}

#[test]
fn test_url_pattern_deserialization() {
    let p: UrlPattern =
        serde_json::from_value(json!({"type": "string", "pattern": "example"})).unwrap();
    assert_eq!(
        p,
        UrlPattern::String {
            pattern: "example".to_string()
        }
    );

    let p: UrlPattern =
        serde_json::from_value(json!({"type": "pattern", "hostname": "a.test"})).unwrap();
    assert!(matches!(p, UrlPattern::Pattern { .. }));
}

#[test]
fn test_intercept_phase_wire_form() {
    assert_eq!(
        serde_json::to_string(&InterceptPhase::BeforeRequestSent).unwrap(),
        r#""beforeRequestSent""#
    );
    let phase: InterceptPhase = serde_json::from_str(r#""authRequired""#).unwrap();
    assert_eq!(phase, InterceptPhase::AuthRequired);
}

#[test]
fn test_base_parameters_flatten() {
    let params = BeforeRequestSentParams {
        base: BaseParameters {
            context: Some("ctx".to_string()),
            is_blocked: false,
            navigation: None,
            redirect_count: 0,
            request: RequestData {
                request: "r1".to_string(),
                url: "http://a/".to_string(),
                method: "GET".to_string(),
                headers: vec![],
                cookies: vec![],
                headers_size: 0,
                body_size: None,
                timings: FetchTimingInfo::default(),
            },
            timestamp: 123,
            intercepts: None,
        },
        initiator: Initiator::default(),
    };
    let v = serde_json::to_value(params).unwrap();
    assert_eq!(v["context"], "ctx");
    assert_eq!(v["isBlocked"], false);
    assert_eq!(v["request"]["request"], "r1");
    assert!(v.get("intercepts").is_none());
}

#[test]
fn test_continue_with_auth_parsing() {
    let params: ContinueWithAuthParams = serde_json::from_value(json!({
        "request": "r2",
        "action": "provideCredentials",
        "credentials": {"type": "password", "username": "u", "password": "p"}
    }))
    .unwrap();
    assert_eq!(params.action, ContinueWithAuthAction::ProvideCredentials);
    assert_eq!(params.credentials.unwrap().username, "u");
}
