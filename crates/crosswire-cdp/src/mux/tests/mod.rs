use serde_json::json;

use super::*;
use crate::transport::pipe;

/// A scripted browser peer on the far side of the pipe.
struct FakeBrowser {
    outgoing: tokio::sync::mpsc::Receiver<String>,
    incoming: tokio::sync::mpsc::Sender<String>,
}

fn mux_with_peer() -> (Arc<CdpMux>, FakeBrowser) {
    let ((out_tx, in_rx), carrier) = pipe();
    let mux = CdpMux::new(out_tx, in_rx);
    (
        mux,
        FakeBrowser {
            outgoing: carrier.outgoing,
            incoming: carrier.incoming,
        },
    )
}

#[tokio::test]
async fn test_command_response_correlation() {
    let (mux, mut browser) = mux_with_peer();

    let send = tokio::spawn({
        let mux = Arc::clone(&mux);
        async move { mux.send_raw("Browser.getVersion", None, None).await }
    });

    let frame = browser.outgoing.recv().await.unwrap();
    let req: Value = serde_json::from_str(&frame).unwrap();
    assert_eq!(req["method"], "Browser.getVersion");
    let id = req["id"].as_u64().unwrap();

    browser
        .incoming
        .send(json!({"id": id, "result": {"product": "Chrome/140"}}).to_string())
        .await
        .unwrap();

    let result = send.await.unwrap().unwrap();
    assert_eq!(result["product"], "Chrome/140");
}

#[tokio::test]
async fn test_protocol_error_becomes_typed_failure() {
    let (mux, mut browser) = mux_with_peer();

    let send = tokio::spawn({
        let mux = Arc::clone(&mux);
        async move { mux.send_raw("Page.navigate", Some(json!({})), None).await }
    });

    let frame = browser.outgoing.recv().await.unwrap();
    let req: Value = serde_json::from_str(&frame).unwrap();
    let id = req["id"].as_u64().unwrap();

    browser
        .incoming
        .send(json!({"id": id, "error": {"code": -32602, "message": "Invalid parameters"}}).to_string())
        .await
        .unwrap();

    let err = send.await.unwrap().unwrap_err();
    match err {
        CdpError::Protocol { code, message } => {
            assert_eq!(code, -32602);
            assert_eq!(message, "Invalid parameters");
        }
        other => panic!("expected protocol error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_session_event_demultiplexing() {
    let (mux, browser) = mux_with_peer();

    let session_a = mux.session(Some("A".to_string()));
    let root = mux.session(None);
    let mut events_a = session_a.subscribe_events().await;
    let mut events_root = root.subscribe_events().await;

    for frame in [
        json!({"method": "Page.lifecycleEvent", "params": {"name": "init"}, "sessionId": "A"}),
        json!({"method": "Target.attachedToTarget", "params": {}}),
        json!({"method": "Page.lifecycleEvent", "params": {"name": "load"}, "sessionId": "B"}),
        json!({"method": "Page.loadEventFired", "params": {}, "sessionId": "A"}),
    ] {
        browser.incoming.send(frame.to_string()).await.unwrap();
    }

    let first = events_a.recv().await.unwrap();
    assert_eq!(first.method, "Page.lifecycleEvent");
    let second = events_a.recv().await.unwrap();
    assert_eq!(second.method, "Page.loadEventFired");

    let root_event = events_root.recv().await.unwrap();
    assert_eq!(root_event.method, "Target.attachedToTarget");
    assert_eq!(root_event.session_id, None);
}

#[tokio::test]
async fn test_connection_loss_fails_pending_and_closes_subscribers() {
    let (mux, mut browser) = mux_with_peer();

    let session = mux.session(None);
    let mut events = session.subscribe_events().await;

    let send = tokio::spawn({
        let mux = Arc::clone(&mux);
        async move { mux.send_raw("Browser.getVersion", None, None).await }
    });

    // Consume the outgoing frame, then drop both carrier halves.
    let _ = browser.outgoing.recv().await.unwrap();
    drop(browser);

    let err = send.await.unwrap().unwrap_err();
    assert!(matches!(err, CdpError::ConnectionLost));
    assert!(events.recv().await.is_none());

    // New commands fail fast once closed.
    let err = mux.send_raw("Browser.getVersion", None, None).await.unwrap_err();
    assert!(matches!(err, CdpError::ConnectionLost));
    assert!(mux.is_closed());
}

#[tokio::test]
async fn test_session_scoped_command_carries_session_id() {
    let (mux, mut browser) = mux_with_peer();
    let session = mux.session(Some("SESS".to_string()));

    let send = tokio::spawn(async move {
        session
            .send_raw("Runtime.enable", None)
            .await
    });

    let frame = browser.outgoing.recv().await.unwrap();
    let req: Value = serde_json::from_str(&frame).unwrap();
    assert_eq!(req["sessionId"], "SESS");

    browser
        .incoming
        .send(json!({"id": req["id"], "result": {}, "sessionId": "SESS"}).to_string())
        .await
        .unwrap();
    send.await.unwrap().unwrap();
}
