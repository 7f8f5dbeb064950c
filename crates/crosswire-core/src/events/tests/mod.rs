use serde_json::{json, Value};
use tokio::sync::mpsc;

use super::*;

async fn setup() -> (Arc<EventManager>, mpsc::Receiver<String>, Arc<BrowsingContextStorage>) {
    let (tx, rx) = mpsc::channel(64);
    let contexts = BrowsingContextStorage::new();
    contexts.create("top-1", None, Some("default")).await;
    contexts.create("child-1", Some("top-1"), None).await;
    contexts.create("top-2", None, Some("profile-2")).await;
    let manager = EventManager::new(OutgoingQueue::new(tx), Arc::clone(&contexts));
    (manager, rx, contexts)
}

async fn next_frame(rx: &mut mpsc::Receiver<String>) -> Value {
    serde_json::from_str(&rx.recv().await.unwrap()).unwrap()
}

#[tokio::test]
async fn test_event_routed_to_covering_channel() {
    let (manager, mut rx, _contexts) = setup().await;
    manager
        .subscribe(vec!["log.entryAdded".to_string()], None, None, Some("ch".to_string()))
        .await
        .unwrap();

    manager
        .emit("log.entryAdded", json!({"text": "x"}), Some("top-1".to_string()))
        .await;

    let frame = next_frame(&mut rx).await;
    assert_eq!(frame["type"], "event");
    assert_eq!(frame["method"], "log.entryAdded");
    assert_eq!(frame["channel"], "ch");
}

#[tokio::test]
async fn test_descendant_contexts_covered_via_top_level() {
    let (manager, mut rx, _contexts) = setup().await;
    manager
        .subscribe(
            vec!["log.entryAdded".to_string()],
            Some(vec!["top-1".to_string()]),
            None,
            None,
        )
        .await
        .unwrap();

    // Event from the child frame reaches the top-level subscription.
    manager
        .emit("log.entryAdded", json!({"n": 1}), Some("child-1".to_string()))
        .await;
    let frame = next_frame(&mut rx).await;
    assert_eq!(frame["params"]["n"], 1);

    // Events from another tree do not.
    manager
        .emit("log.entryAdded", json!({"n": 2}), Some("top-2".to_string()))
        .await;
    manager
        .emit("log.entryAdded", json!({"n": 3}), Some("child-1".to_string()))
        .await;
    let frame = next_frame(&mut rx).await;
    assert_eq!(frame["params"]["n"], 3);
}

#[tokio::test]
async fn test_subscribing_by_child_normalizes_to_top_level() {
    let (manager, mut rx, _contexts) = setup().await;
    manager
        .subscribe(
            vec!["log.entryAdded".to_string()],
            Some(vec!["child-1".to_string()]),
            None,
            None,
        )
        .await
        .unwrap();
    manager
        .emit("log.entryAdded", json!({"n": 1}), Some("top-1".to_string()))
        .await;
    let frame = next_frame(&mut rx).await;
    assert_eq!(frame["params"]["n"], 1);
}

#[tokio::test]
async fn test_unknown_context_subscription_fails() {
    let (manager, _rx, _contexts) = setup().await;
    let err = manager
        .subscribe(
            vec!["log.entryAdded".to_string()],
            Some(vec!["ghost".to_string()]),
            None,
            None,
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, crosswire_bidi::ErrorCode::NoSuchFrame);
}

#[tokio::test]
async fn test_buffered_replay_once_per_channel() {
    let (manager, mut rx, _contexts) = setup().await;

    // Three entries before anyone subscribes.
    for n in 1..=3 {
        manager
            .emit("log.entryAdded", json!({"n": n}), Some("top-1".to_string()))
            .await;
    }

    manager
        .subscribe(vec!["log.entryAdded".to_string()], None, None, Some("ch".to_string()))
        .await
        .unwrap();

    for n in 1..=3 {
        let frame = next_frame(&mut rx).await;
        assert_eq!(frame["params"]["n"], n, "replay in order");
    }

    // Unsubscribe and resubscribe: nothing is re-delivered.
    manager
        .unsubscribe_by_attributes(&["log.entryAdded".to_string()], Some("ch"))
        .await
        .unwrap();
    manager
        .subscribe(vec!["log.entryAdded".to_string()], None, None, Some("ch".to_string()))
        .await
        .unwrap();

    // A fresh event is still delivered (and is the next frame).
    manager
        .emit("log.entryAdded", json!({"n": 99}), Some("top-1".to_string()))
        .await;
    let frame = next_frame(&mut rx).await;
    assert_eq!(frame["params"]["n"], 99);
}

#[tokio::test]
async fn test_replay_merges_contexts_in_ordinal_order() {
    let (manager, mut rx, _contexts) = setup().await;
    manager
        .emit("log.entryAdded", json!({"n": 1}), Some("top-1".to_string()))
        .await;
    manager
        .emit("log.entryAdded", json!({"n": 2}), Some("top-2".to_string()))
        .await;
    manager
        .emit("log.entryAdded", json!({"n": 3}), Some("top-1".to_string()))
        .await;

    // Global subscription replays all three, interleaved by ordinal.
    manager
        .subscribe(vec!["log.entryAdded".to_string()], None, None, None)
        .await
        .unwrap();
    for n in 1..=3 {
        let frame = next_frame(&mut rx).await;
        assert_eq!(frame["params"]["n"], n);
    }
}

#[tokio::test]
async fn test_buffer_capacity_bounded() {
    let (manager, mut rx, _contexts) = setup().await;
    for n in 0..105 {
        manager
            .emit("log.entryAdded", json!({"n": n}), Some("top-1".to_string()))
            .await;
    }
    manager
        .subscribe(vec!["log.entryAdded".to_string()], None, None, None)
        .await
        .unwrap();
    // The oldest five fell out of the buffer.
    let frame = next_frame(&mut rx).await;
    assert_eq!(frame["params"]["n"], 5);
}

#[tokio::test]
async fn test_reconcile_notified_on_subscription_changes() {
    let (manager, _rx, _contexts) = setup().await;
    let (tx, mut reconcile_rx) = mpsc::unbounded_channel();
    manager.set_reconcile_notifier(tx).await;

    manager
        .subscribe(vec!["network".to_string()], None, None, None)
        .await
        .unwrap();
    assert!(reconcile_rx.recv().await.is_some());

    manager
        .unsubscribe_by_attributes(&["network".to_string()], None)
        .await
        .unwrap();
    assert!(reconcile_rx.recv().await.is_some());
}

#[tokio::test]
async fn test_channels_delivered_in_subscription_creation_order() {
    let (manager, mut rx, _contexts) = setup().await;
    manager
        .subscribe(vec!["log.entryAdded".to_string()], None, None, Some("late".to_string()))
        .await
        .unwrap();
    manager
        .subscribe(vec!["log.entryAdded".to_string()], None, None, Some("later".to_string()))
        .await
        .unwrap();

    manager
        .emit("log.entryAdded", json!({}), Some("top-1".to_string()))
        .await;
    // Both channels receive the event; cross-channel wire order is
    // unspecified.
    let mut channels = vec![
        next_frame(&mut rx).await["channel"].clone(),
        next_frame(&mut rx).await["channel"].clone(),
    ];
    channels.sort_by_key(std::string::ToString::to_string);
    assert_eq!(channels, vec![json!("late"), json!("later")]);
}
