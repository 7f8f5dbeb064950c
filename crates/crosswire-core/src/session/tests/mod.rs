use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::sync::mpsc;

use super::*;
use crate::clock::ManualClock;

type Hook = Box<dyn Fn(&Value) -> (Value, Vec<Value>) + Send + Sync>;

struct Harness {
    session: Arc<MapperSession>,
    client_tx: mpsc::Sender<String>,
    client_rx: mpsc::Receiver<String>,
    peer_tx: mpsc::Sender<String>,
    cdp_frames: mpsc::UnboundedReceiver<Value>,
}

fn default_result(method: &str) -> Value {
    match method {
        "Browser.getVersion" => json!({
            "protocolVersion": "1.3",
            "product": "Chrome/140.0.0.0",
            "revision": "@abcdef",
            "userAgent": "Mozilla/5.0 (X11; Linux x86_64) Chrome/140.0.0.0",
            "jsVersion": "14.0"
        }),
        _ => json!({}),
    }
}

/// Boot a mapper over in-memory transports against a scripted browser.
async fn boot(hooks: HashMap<String, Hook>) -> Harness {
    let (to_client, client_rx) = mpsc::channel(256);
    let (client_tx, from_client) = mpsc::channel(256);
    let ((cdp_out, cdp_in), mut carrier) = crosswire_cdp::pipe();

    let peer_tx = carrier.incoming.clone();
    let (frames_tx, cdp_frames) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while let Some(frame) = carrier.outgoing.recv().await {
            let value: Value = serde_json::from_str(&frame).unwrap();
            let _ = frames_tx.send(value.clone());
            let method = value["method"].as_str().unwrap_or_default().to_string();
            let (result, extra) = match hooks.get(&method) {
                Some(hook) => hook(&value),
                None => (default_result(&method), Vec::new()),
            };
            let reply = json!({
                "id": value["id"],
                "result": result,
                "sessionId": value["sessionId"]
            });
            if carrier.incoming.send(reply.to_string()).await.is_err() {
                break;
            }
            for event in extra {
                if carrier.incoming.send(event.to_string()).await.is_err() {
                    break;
                }
            }
        }
    });

    let session = MapperSession::start_with_clock(
        to_client,
        from_client,
        cdp_out,
        cdp_in,
        ManualClock::new(1_000),
    )
    .await
    .unwrap();

    Harness {
        session,
        client_tx,
        client_rx,
        peer_tx,
        cdp_frames,
    }
}

impl Harness {
    /// Attach the default page target T1 on session S1.
    async fn attach_page(&self) {
        self.push_event(
            None,
            "Target.attachedToTarget",
            json!({
                "sessionId": "S1",
                "targetInfo": {
                    "targetId": "T1",
                    "type": "page",
                    "title": "",
                    "url": "about:blank",
                    "attached": true
                },
                "waitingForDebugger": true
            }),
        )
        .await;
        assert!(self.session.contexts().wait_for_context("T1").await);
        // Let target init drain before tests start scripting.
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    async fn push_event(&self, session_id: Option<&str>, method: &str, params: Value) {
        let mut frame = json!({"method": method, "params": params});
        if let Some(session_id) = session_id {
            frame["sessionId"] = json!(session_id);
        }
        self.peer_tx.send(frame.to_string()).await.unwrap();
    }

    async fn send_command(&self, frame: Value) {
        self.client_tx.send(frame.to_string()).await.unwrap();
    }

    async fn next_frame(&mut self) -> Value {
        let frame = tokio::time::timeout(Duration::from_secs(5), self.client_rx.recv())
            .await
            .expect("timed out waiting for a frame")
            .expect("client transport closed");
        serde_json::from_str(&frame).unwrap()
    }
}

#[tokio::test]
async fn test_session_status_round_trip() {
    let mut harness = boot(HashMap::new()).await;
    harness
        .send_command(json!({"id": 1, "method": "session.status", "params": {}}))
        .await;
    let reply = harness.next_frame().await;
    assert_eq!(reply["type"], "success");
    assert_eq!(reply["id"], 1);
    assert_eq!(reply["result"]["ready"], false);
}

#[tokio::test]
async fn test_unknown_command_and_module() {
    let mut harness = boot(HashMap::new()).await;
    harness
        .send_command(json!({"id": 1, "method": "rocketry.launch", "params": {}}))
        .await;
    let reply = harness.next_frame().await;
    assert_eq!(reply["type"], "error");
    assert_eq!(reply["error"], "unknown command");

    harness
        .send_command(json!({"id": 2, "method": "session.blow", "params": {}}))
        .await;
    let reply = harness.next_frame().await;
    assert_eq!(reply["error"], "unknown command");
    assert_eq!(reply["id"], 2);
}

#[tokio::test]
async fn test_unreadable_frame_gets_null_id_reply() {
    let mut harness = boot(HashMap::new()).await;
    harness.client_tx.send("not json".to_string()).await.unwrap();
    let reply = harness.next_frame().await;
    assert_eq!(reply["type"], "error");
    assert!(reply["id"].is_null());
    assert_eq!(reply["error"], "invalid argument");
}

#[tokio::test]
async fn test_replies_keep_command_order() {
    let mut harness = boot(HashMap::new()).await;
    // A burst of commands; replies must come back in id order even if
    // processors interleave.
    for id in 1..=5 {
        harness
            .send_command(json!({"id": id, "method": "session.status", "params": {}}))
            .await;
    }
    for id in 1..=5 {
        let reply = harness.next_frame().await;
        assert_eq!(reply["id"], id);
    }
}

#[tokio::test]
async fn test_fragment_navigation() {
    let mut hooks: HashMap<String, Hook> = HashMap::new();
    hooks.insert(
        "Page.navigate".to_string(),
        Box::new(|_cmd| {
            (
                json!({"frameId": "T1"}),
                vec![json!({
                    "method": "Page.navigatedWithinDocument",
                    "params": {
                        "frameId": "T1",
                        "url": "about:blank#x",
                        "navigationType": "fragment"
                    },
                    "sessionId": "S1"
                })],
            )
        }),
    );
    let mut harness = boot(hooks).await;
    harness.attach_page().await;

    harness
        .send_command(json!({
            "id": 1,
            "method": "session.subscribe",
            "params": {"events": ["browsingContext"]}
        }))
        .await;
    assert_eq!(harness.next_frame().await["type"], "success");

    harness
        .send_command(json!({
            "id": 2,
            "method": "browsingContext.navigate",
            "params": {"context": "T1", "url": "about:blank#x", "wait": "complete"}
        }))
        .await;

    let reply = harness.next_frame().await;
    assert_eq!(reply["type"], "success", "navigate reply: {reply}");
    assert_eq!(reply["result"]["url"], "about:blank#x");
    assert!(reply["result"]["navigation"].is_string());

    let event = harness.next_frame().await;
    assert_eq!(event["type"], "event");
    assert_eq!(event["method"], "browsingContext.fragmentNavigated");
    assert_eq!(event["params"]["url"], "about:blank#x");
    assert_eq!(event["params"]["navigation"], reply["result"]["navigation"]);
}

#[tokio::test]
async fn test_cross_document_navigation() {
    let mut hooks: HashMap<String, Hook> = HashMap::new();
    hooks.insert(
        "Page.navigate".to_string(),
        Box::new(|_cmd| {
            (
                json!({"frameId": "T1", "loaderId": "L1"}),
                vec![
                    json!({
                        "method": "Page.frameStartedNavigating",
                        "params": {"frameId": "T1", "url": "http://a/", "loaderId": "L1"},
                        "sessionId": "S1"
                    }),
                    json!({
                        "method": "Page.frameNavigated",
                        "params": {"frame": {
                            "id": "T1", "loaderId": "L1", "url": "http://a/"
                        }},
                        "sessionId": "S1"
                    }),
                    json!({
                        "method": "Page.lifecycleEvent",
                        "params": {"frameId": "T1", "loaderId": "L1",
                                   "name": "DOMContentLoaded", "timestamp": 1.0},
                        "sessionId": "S1"
                    }),
                    json!({
                        "method": "Page.lifecycleEvent",
                        "params": {"frameId": "T1", "loaderId": "L1",
                                   "name": "load", "timestamp": 2.0},
                        "sessionId": "S1"
                    }),
                ],
            )
        }),
    );
    let mut harness = boot(hooks).await;
    harness.attach_page().await;

    harness
        .send_command(json!({
            "id": 1,
            "method": "session.subscribe",
            "params": {"events": ["browsingContext.navigationStarted", "browsingContext.load"]}
        }))
        .await;
    assert_eq!(harness.next_frame().await["type"], "success");

    harness
        .send_command(json!({
            "id": 2,
            "method": "browsingContext.navigate",
            "params": {"context": "T1", "url": "http://a/", "wait": "complete"}
        }))
        .await;

    let reply = harness.next_frame().await;
    assert_eq!(reply["type"], "success", "navigate reply: {reply}");
    assert_eq!(reply["result"]["url"], "http://a/");

    let started = harness.next_frame().await;
    assert_eq!(started["method"], "browsingContext.navigationStarted");
    assert_eq!(started["params"]["url"], "http://a/");
    let load = harness.next_frame().await;
    assert_eq!(load["method"], "browsingContext.load");
}

#[tokio::test]
async fn test_navigation_aborted_by_renderer() {
    let mut hooks: HashMap<String, Hook> = HashMap::new();
    hooks.insert(
        "Page.navigate".to_string(),
        Box::new(|_cmd| {
            (
                json!({"frameId": "T1", "loaderId": "L1"}),
                vec![
                    json!({
                        "method": "Page.frameStartedNavigating",
                        "params": {"frameId": "T1", "url": "http://a/", "loaderId": "L1"},
                        "sessionId": "S1"
                    }),
                    // The renderer sets location before the load fires.
                    json!({
                        "method": "Page.frameStartedNavigating",
                        "params": {"frameId": "T1", "url": "http://b/", "loaderId": "L2"},
                        "sessionId": "S1"
                    }),
                ],
            )
        }),
    );
    let mut harness = boot(hooks).await;
    harness.attach_page().await;

    harness
        .send_command(json!({
            "id": 1,
            "method": "session.subscribe",
            "params": {"events": ["browsingContext"]}
        }))
        .await;
    assert_eq!(harness.next_frame().await["type"], "success");

    harness
        .send_command(json!({
            "id": 2,
            "method": "browsingContext.navigate",
            "params": {"context": "T1", "url": "http://a/", "wait": "complete"}
        }))
        .await;

    let reply = harness.next_frame().await;
    assert_eq!(reply["type"], "error");
    assert_eq!(reply["error"], "unknown error");

    let first = harness.next_frame().await;
    assert_eq!(first["method"], "browsingContext.navigationStarted");
    assert_eq!(first["params"]["url"], "http://a/");
    let aborted = harness.next_frame().await;
    assert_eq!(aborted["method"], "browsingContext.navigationAborted");
    // The abort carries the URL the user expected.
    assert_eq!(aborted["params"]["url"], "http://a/");
    let second = harness.next_frame().await;
    assert_eq!(second["method"], "browsingContext.navigationStarted");
    assert_eq!(second["params"]["url"], "http://b/");
}

#[tokio::test]
async fn test_log_entry_buffering_and_replay() {
    let mut harness = boot(HashMap::new()).await;
    harness.attach_page().await;

    for n in 1..=3 {
        harness
            .push_event(
                Some("S1"),
                "Runtime.consoleAPICalled",
                json!({
                    "type": "log",
                    "args": [{"type": "string", "value": format!("entry-{n}")}],
                    "executionContextId": 7,
                    "timestamp": 1_000.0 + f64::from(n)
                }),
            )
            .await;
    }
    // Let the target loop buffer them.
    tokio::time::sleep(Duration::from_millis(50)).await;

    harness
        .send_command(json!({
            "id": 1,
            "method": "session.subscribe",
            "params": {"events": ["log.entryAdded"]}
        }))
        .await;
    assert_eq!(harness.next_frame().await["type"], "success");
    for n in 1..=3 {
        let event = harness.next_frame().await;
        assert_eq!(event["method"], "log.entryAdded");
        assert_eq!(event["params"]["text"], format!("entry-{n}"), "replay order");
    }

    // Unsubscribe, resubscribe: the channel has seen them already.
    harness
        .send_command(json!({
            "id": 2,
            "method": "session.unsubscribe",
            "params": {"events": ["log.entryAdded"]}
        }))
        .await;
    assert_eq!(harness.next_frame().await["type"], "success");
    harness
        .send_command(json!({
            "id": 3,
            "method": "session.subscribe",
            "params": {"events": ["log.entryAdded"]}
        }))
        .await;
    assert_eq!(harness.next_frame().await["type"], "success");

    // No replay: the next frame is the next command's reply.
    harness
        .send_command(json!({"id": 4, "method": "session.status", "params": {}}))
        .await;
    let reply = harness.next_frame().await;
    assert_eq!(reply["id"], 4);
}

#[tokio::test]
async fn test_intercept_drives_fetch_enable() {
    let mut harness = boot(HashMap::new()).await;
    harness.attach_page().await;
    // Drain the init-time CDP traffic.
    while harness.cdp_frames.try_recv().is_ok() {}

    harness
        .send_command(json!({
            "id": 1,
            "method": "network.addIntercept",
            "params": {
                "phases": ["beforeRequestSent"],
                "urlPatterns": [{"type": "string", "pattern": "/api/"}]
            }
        }))
        .await;
    let reply = harness.next_frame().await;
    assert_eq!(reply["type"], "success", "addIntercept reply: {reply}");
    let intercept = reply["result"]["intercept"].as_str().unwrap().to_string();

    // The mapper pushed Fetch.enable with the lowered pattern.
    let enable = loop {
        let frame = tokio::time::timeout(Duration::from_secs(5), harness.cdp_frames.recv())
            .await
            .unwrap()
            .unwrap();
        if frame["method"] == "Fetch.enable" {
            break frame;
        }
    };
    assert_eq!(enable["sessionId"], "S1");
    assert_eq!(enable["params"]["patterns"][0]["urlPattern"], "*/api/*");
    assert_eq!(enable["params"]["handleAuthRequests"], false);

    harness
        .send_command(json!({
            "id": 2,
            "method": "network.removeIntercept",
            "params": {"intercept": intercept}
        }))
        .await;
    assert_eq!(harness.next_frame().await["type"], "success");

    let disable = loop {
        let frame = tokio::time::timeout(Duration::from_secs(5), harness.cdp_frames.recv())
            .await
            .unwrap()
            .unwrap();
        if frame["method"] == "Fetch.disable" {
            break frame;
        }
    };
    assert_eq!(disable["sessionId"], "S1");
}

#[tokio::test]
async fn test_subscribe_unsubscribe_leaves_domains_untouched() {
    let mut harness = boot(HashMap::new()).await;
    harness.attach_page().await;
    while harness.cdp_frames.try_recv().is_ok() {}

    // With no intercepts, network subscriptions do not change the
    // enabled-domain set; reconciliation must be a no-op.
    harness
        .send_command(json!({
            "id": 1,
            "method": "session.subscribe",
            "params": {"events": ["network"]}
        }))
        .await;
    assert_eq!(harness.next_frame().await["type"], "success");
    harness
        .send_command(json!({
            "id": 2,
            "method": "session.unsubscribe",
            "params": {"events": ["network"]}
        }))
        .await;
    assert_eq!(harness.next_frame().await["type"], "success");

    // Give the reconcile loop a beat, then check no Fetch traffic went
    // out.
    tokio::time::sleep(Duration::from_millis(50)).await;
    while let Ok(frame) = harness.cdp_frames.try_recv() {
        let method = frame["method"].as_str().unwrap_or_default();
        assert!(
            !method.starts_with("Fetch."),
            "unexpected domain toggle: {method}"
        );
    }
}

#[tokio::test]
async fn test_cdp_send_command_passthrough() {
    let mut harness = boot(HashMap::new()).await;
    harness
        .send_command(json!({
            "id": 1,
            "method": "goog:cdp.sendCommand",
            "params": {"method": "Browser.getVersion"}
        }))
        .await;
    let reply = harness.next_frame().await;
    assert_eq!(reply["type"], "success");
    assert_eq!(reply["result"]["result"]["product"], "Chrome/140.0.0.0");
}

#[tokio::test]
async fn test_get_tree_after_attach() {
    let mut harness = boot(HashMap::new()).await;
    harness.attach_page().await;

    harness
        .send_command(json!({"id": 1, "method": "browsingContext.getTree", "params": {}}))
        .await;
    let reply = harness.next_frame().await;
    assert_eq!(reply["type"], "success");
    let contexts = reply["result"]["contexts"].as_array().unwrap();
    assert_eq!(contexts.len(), 1);
    assert_eq!(contexts[0]["context"], "T1");
    assert_eq!(contexts[0]["userContext"], "default");
}

#[tokio::test]
async fn test_context_destroyed_on_detach() {
    let mut harness = boot(HashMap::new()).await;
    harness.attach_page().await;

    harness
        .send_command(json!({
            "id": 1,
            "method": "session.subscribe",
            "params": {"events": ["browsingContext.contextDestroyed"]}
        }))
        .await;
    assert_eq!(harness.next_frame().await["type"], "success");

    harness
        .push_event(
            None,
            "Target.detachedFromTarget",
            json!({"sessionId": "S1", "targetId": "T1"}),
        )
        .await;

    let event = harness.next_frame().await;
    assert_eq!(event["method"], "browsingContext.contextDestroyed");
    assert_eq!(event["params"]["context"], "T1");
    assert!(!harness.session.contexts().has("T1").await);
}
