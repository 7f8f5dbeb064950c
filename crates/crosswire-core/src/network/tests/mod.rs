use crosswire_bidi::network::{InterceptPhase, UrlPattern};
use crosswire_cdp::protocol::fetch as cdp_fetch;

use super::*;

#[tokio::test]
async fn test_intercept_lifecycle() {
    let storage = NetworkStorage::new();
    let id = storage
        .add_intercept(
            vec![InterceptPhase::BeforeRequestSent],
            vec![UrlPattern::String {
                pattern: "/api/".to_string(),
            }],
            None,
        )
        .await;

    let snapshot = storage.snapshot().await;
    assert_eq!(
        snapshot.matching(InterceptPhase::BeforeRequestSent, "http://x/api/a"),
        vec![id.clone()]
    );
    assert!(snapshot
        .matching(InterceptPhase::ResponseStarted, "http://x/api/a")
        .is_empty());
    assert!(snapshot
        .matching(InterceptPhase::BeforeRequestSent, "http://x/static")
        .is_empty());

    storage.remove_intercept(&id).await.unwrap();
    let err = storage.remove_intercept(&id).await.unwrap_err();
    assert_eq!(err.code, crosswire_bidi::ErrorCode::NoSuchIntercept);
}

#[tokio::test]
async fn test_fetch_enable_params_union() {
    let storage = NetworkStorage::new();
    assert!(storage.fetch_enable_params().await.is_none());

    storage
        .add_intercept(
            vec![InterceptPhase::BeforeRequestSent],
            vec![UrlPattern::String {
                pattern: "example".to_string(),
            }],
            None,
        )
        .await;
    storage
        .add_intercept(vec![InterceptPhase::ResponseStarted], vec![], None)
        .await;

    let params = storage.fetch_enable_params().await.unwrap();
    assert_eq!(params.handle_auth_requests, Some(false));
    let patterns = params.patterns.unwrap();
    assert!(patterns.iter().any(|p| {
        p.url_pattern.as_deref() == Some("*example*")
            && p.request_stage == Some(cdp_fetch::RequestStage::Request)
    }));
    assert!(patterns.iter().any(|p| {
        p.url_pattern.as_deref() == Some("*")
            && p.request_stage == Some(cdp_fetch::RequestStage::Response)
    }));
}

#[tokio::test]
async fn test_auth_phase_sets_handle_auth() {
    let storage = NetworkStorage::new();
    storage
        .add_intercept(vec![InterceptPhase::AuthRequired], vec![], None)
        .await;
    let params = storage.fetch_enable_params().await.unwrap();
    assert_eq!(params.handle_auth_requests, Some(true));
    // Auth-only interception still registers a pattern so the domain
    // stays enabled.
    assert!(!params.patterns.unwrap().is_empty());
}

#[tokio::test]
async fn test_structured_pattern_lowering() {
    let storage = NetworkStorage::new();
    storage
        .add_intercept(
            vec![InterceptPhase::BeforeRequestSent],
            vec![UrlPattern::Pattern {
                protocol: Some("https".to_string()),
                hostname: Some("example.com".to_string()),
                port: Some("8443".to_string()),
                pathname: Some("/api".to_string()),
                search: None,
            }],
            None,
        )
        .await;
    let params = storage.fetch_enable_params().await.unwrap();
    let patterns = params.patterns.unwrap();
    assert_eq!(
        patterns[0].url_pattern.as_deref(),
        Some("https://example.com:8443/api*")
    );
}

#[tokio::test]
async fn test_blocked_request_phase_check() {
    let storage = NetworkStorage::new();
    let (outgoing, incoming) = crosswire_cdp::pipe().0;
    let mux = crosswire_cdp::CdpMux::new(outgoing, incoming);
    let session = mux.session(Some("S".to_string()));

    storage
        .mark_blocked(
            "R1",
            BlockedRequest {
                fetch_id: "F1".to_string(),
                phase: InterceptPhase::BeforeRequestSent,
                session,
            },
        )
        .await;

    let ok = storage
        .blocked_in_phase("R1", &[InterceptPhase::BeforeRequestSent])
        .await
        .unwrap();
    assert_eq!(ok.fetch_id, "F1");

    let err = storage
        .blocked_in_phase("R1", &[InterceptPhase::ResponseStarted])
        .await
        .unwrap_err();
    assert_eq!(err.code, crosswire_bidi::ErrorCode::InvalidArgument);

    let err = storage
        .blocked_in_phase("R2", &[InterceptPhase::BeforeRequestSent])
        .await
        .unwrap_err();
    assert_eq!(err.code, crosswire_bidi::ErrorCode::NoSuchRequest);

    storage.release_blocked("R1").await;
    assert!(storage
        .blocked_in_phase("R1", &[InterceptPhase::BeforeRequestSent])
        .await
        .is_err());
}
