use std::collections::HashSet;

use crosswire_bidi::script::RealmType;

use super::*;

fn window_realm(id: &str, context: &str, sandbox: Option<&str>) -> Realm {
    Realm {
        id: id.to_string(),
        execution_context_id: 1,
        origin: "http://example.com".to_string(),
        kind: RealmType::Window,
        context_id: Some(context.to_string()),
        sandbox: sandbox.map(ToString::to_string),
        session_id: Some("S1".to_string()),
        is_hidden: false,
        handles: HashSet::new(),
    }
}

#[tokio::test]
async fn test_insert_rejects_duplicate_ids() {
    let storage = RealmStorage::new();
    assert!(storage.insert(window_realm("r1", "c1", None)).await);
    assert!(!storage.insert(window_realm("r1", "c1", None)).await);
}

#[tokio::test]
async fn test_window_realm_lookup_by_sandbox() {
    let storage = RealmStorage::new();
    storage.insert(window_realm("r1", "c1", None)).await;
    storage.insert(window_realm("r2", "c1", Some("sb"))).await;

    let default = storage.window_realm("c1", None).await.unwrap();
    assert_eq!(default.id, "r1");
    let sandboxed = storage.window_realm("c1", Some("sb")).await.unwrap();
    assert_eq!(sandboxed.id, "r2");
    assert!(storage.window_realm("c1", Some("other")).await.is_none());
}

#[tokio::test]
async fn test_hidden_realms_excluded_from_list_and_lookup() {
    let storage = RealmStorage::new();
    let mut hidden = window_realm("r-internal", "c1", Some("__internal"));
    hidden.is_hidden = true;
    storage.insert(hidden).await;
    storage.insert(window_realm("r1", "c1", None)).await;

    let listed = storage.list(Some("c1"), None).await;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].realm, "r1");
    assert!(storage.window_realm("c1", Some("__internal")).await.is_none());
}

#[tokio::test]
async fn test_handle_retain_release() {
    let storage = RealmStorage::new();
    storage.insert(window_realm("r1", "c1", None)).await;
    storage.retain_handle("r1", "obj-1").await;
    assert!(storage.release_handle("r1", "obj-1").await);
    assert!(!storage.release_handle("r1", "obj-1").await);
}

#[tokio::test]
async fn test_remove_by_session_sweeps_all() {
    let storage = RealmStorage::new();
    storage.insert(window_realm("r1", "c1", None)).await;
    storage.insert(window_realm("r2", "c1", Some("sb"))).await;
    let removed = storage.remove_by_session(Some("S1")).await;
    assert_eq!(removed.len(), 2);
    assert!(storage.window_realm("c1", None).await.is_none());
}

#[tokio::test]
async fn test_remove_by_execution_context() {
    let storage = RealmStorage::new();
    storage.insert(window_realm("r1", "c1", None)).await;
    let removed = storage.remove_by_execution_context(Some("S1"), 1).await;
    assert_eq!(removed.unwrap().id, "r1");
    assert!(storage
        .remove_by_execution_context(Some("S1"), 1)
        .await
        .is_none());
}
