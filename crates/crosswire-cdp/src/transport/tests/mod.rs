use super::*;

#[test]
fn test_request_serialization_minimal() {
    let req = CdpRequest {
        id: 1,
        method: "Browser.getVersion".to_string(),
        params: None,
        session_id: None,
    };
    let json = serde_json::to_string(&req).unwrap();
    assert_eq!(json, r#"{"id":1,"method":"Browser.getVersion"}"#);
}

#[test]
fn test_request_serialization_with_session() {
    let req = CdpRequest {
        id: 7,
        method: "Runtime.evaluate".to_string(),
        params: Some(serde_json::json!({"expression": "1+1"})),
        session_id: Some("SESSION1".to_string()),
    };
    let json = serde_json::to_string(&req).unwrap();
    assert!(json.contains(r#""sessionId":"SESSION1""#));
    assert!(json.contains(r#""expression":"1+1""#));
}

#[test]
fn test_response_deserialization_success() {
    let json = r#"{"id":1,"result":{"value":42},"sessionId":"S"}"#;
    let resp: CdpResponse = serde_json::from_str(json).unwrap();
    assert_eq!(resp.id, 1);
    assert!(resp.result.is_some());
    assert!(resp.error.is_none());
    assert_eq!(resp.session_id.as_deref(), Some("S"));
}

#[test]
fn test_response_deserialization_error() {
    let json = r#"{"id":2,"error":{"code":-32601,"message":"'Foo.bar' wasn't found"}}"#;
    let resp: CdpResponse = serde_json::from_str(json).unwrap();
    let err = resp.error.unwrap();
    assert_eq!(err.code, -32601);
    assert!(err.message.contains("wasn't found"));
}

#[test]
fn test_event_deserialization() {
    let json = r#"{"method":"Page.lifecycleEvent","params":{"name":"load"},"sessionId":"S2"}"#;
    let evt: CdpEvent = serde_json::from_str(json).unwrap();
    assert_eq!(evt.method, "Page.lifecycleEvent");
    assert_eq!(evt.session_id.as_deref(), Some("S2"));
}

#[test]
fn test_message_untagged_routing() {
    let resp: CdpMessage = serde_json::from_str(r#"{"id":1,"result":{}}"#).unwrap();
    assert!(matches!(resp, CdpMessage::Response(_)));

    let evt: CdpMessage =
        serde_json::from_str(r#"{"method":"Target.attachedToTarget","params":{}}"#).unwrap();
    assert!(matches!(evt, CdpMessage::Event(_)));
}

#[test]
fn test_event_parse_params_typed() {
    #[derive(serde::Deserialize)]
    struct Params {
        name: String,
    }
    let evt = CdpEvent {
        method: "Page.lifecycleEvent".to_string(),
        params: Some(serde_json::json!({"name": "init", "frameId": "F1"})),
        session_id: None,
    };
    let parsed: Params = evt.parse_params().unwrap();
    assert_eq!(parsed.name, "init");
}

#[tokio::test]
async fn test_pipe_round_trip() {
    let ((out_tx, mut in_rx), mut carrier) = pipe();

    out_tx.send("frame-out".to_string()).await.unwrap();
    assert_eq!(carrier.outgoing.recv().await.unwrap(), "frame-out");

    carrier.incoming.send("frame-in".to_string()).await.unwrap();
    assert_eq!(in_rx.recv().await.unwrap(), "frame-in");
}
