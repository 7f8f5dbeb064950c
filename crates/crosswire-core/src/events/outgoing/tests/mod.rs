use serde_json::json;
use tokio::sync::mpsc;

use super::*;

#[tokio::test]
async fn test_replies_sent_in_enqueue_order() {
    let (tx, mut rx) = mpsc::channel(16);
    let queue = OutgoingQueue::new(tx);

    // Command 1 is read first, command 2 second; 2 completes first.
    let reply_1 = queue.enqueue_pending(None).await;
    let reply_2 = queue.enqueue_pending(None).await;

    reply_2
        .send(OutgoingFrame::success(2, json!({}), None))
        .unwrap();
    tokio::task::yield_now().await;
    reply_1
        .send(OutgoingFrame::success(1, json!({}), None))
        .unwrap();

    let first: serde_json::Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
    let second: serde_json::Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
    assert_eq!(first["id"], 1);
    assert_eq!(second["id"], 2);
}

#[tokio::test]
async fn test_events_interleave_in_order() {
    let (tx, mut rx) = mpsc::channel(16);
    let queue = OutgoingQueue::new(tx);

    let reply = queue.enqueue_pending(None).await;
    queue
        .enqueue_ready(
            None,
            OutgoingFrame::event("log.entryAdded", json!({"n": 1}), None),
        )
        .await;

    reply
        .send(OutgoingFrame::success(1, json!({}), None))
        .unwrap();

    // The pending reply was enqueued first and must come out first.
    let first: serde_json::Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
    assert_eq!(first["type"], "success");
    let second: serde_json::Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
    assert_eq!(second["type"], "event");
}

#[tokio::test]
async fn test_dropped_reply_does_not_wedge_queue() {
    let (tx, mut rx) = mpsc::channel(16);
    let queue = OutgoingQueue::new(tx);

    let dropped = queue.enqueue_pending(None).await;
    drop(dropped);
    queue
        .enqueue_ready(
            None,
            OutgoingFrame::event("log.entryAdded", json!({}), None),
        )
        .await;

    let frame: serde_json::Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
    assert_eq!(frame["type"], "event");
}

#[tokio::test]
async fn test_channels_do_not_block_each_other() {
    let (tx, mut rx) = mpsc::channel(16);
    let queue = OutgoingQueue::new(tx);

    // Channel "a" has an unresolved reply; channel "b" sends an event.
    let _stuck = queue.enqueue_pending(Some("a".to_string())).await;
    queue
        .enqueue_ready(
            Some("b".to_string()),
            OutgoingFrame::event("log.entryAdded", json!({}), Some("b".to_string())),
        )
        .await;

    let frame: serde_json::Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
    assert_eq!(frame["channel"], "b");
}
