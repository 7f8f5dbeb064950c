use super::*;

#[tokio::test]
async fn test_add_and_remove() {
    let storage = PreloadScriptStorage::new();
    let id = storage
        .add("() => { window.__x = 1; }".to_string(), None, None, None)
        .await;
    let script = storage.remove(&id).await.unwrap();
    assert_eq!(script.id, id);

    let err = storage.remove(&id).await.unwrap_err();
    assert_eq!(err.code, crosswire_bidi::ErrorCode::NoSuchScript);
}

#[tokio::test]
async fn test_qualification_rules() {
    let storage = PreloadScriptStorage::new();
    storage
        .add("() => {}".to_string(), None, Some(vec!["top-1".to_string()]), None)
        .await;
    storage
        .add(
            "() => {}".to_string(),
            None,
            None,
            Some(vec!["profile-1".to_string()]),
        )
        .await;
    storage.add("() => {}".to_string(), None, None, None).await;

    // Context-restricted + unrestricted apply to top-1/default.
    let pending = storage.pending_for_target("t1", "top-1", "default").await;
    assert_eq!(pending.len(), 2);

    // User-context-restricted + unrestricted apply elsewhere in profile-1.
    let pending = storage.pending_for_target("t1", "other", "profile-1").await;
    assert_eq!(pending.len(), 2);

    // Only the unrestricted one applies to a stranger.
    let pending = storage.pending_for_target("t1", "other", "default").await;
    assert_eq!(pending.len(), 1);
}

#[tokio::test]
async fn test_install_is_idempotent_per_target() {
    let storage = PreloadScriptStorage::new();
    let id = storage.add("() => {}".to_string(), None, None, None).await;

    assert_eq!(storage.pending_for_target("t1", "c", "default").await.len(), 1);
    storage.mark_installed(&id, "t1", "cdp-ident-1".to_string()).await;
    assert!(storage.pending_for_target("t1", "c", "default").await.is_empty());
    // A different target still needs it.
    assert_eq!(storage.pending_for_target("t2", "c", "default").await.len(), 1);

    // Forgetting the target makes it pending again (OOPIF swap, re-attach).
    storage.forget_target("t1").await;
    assert_eq!(storage.pending_for_target("t1", "c", "default").await.len(), 1);
}

#[tokio::test]
async fn test_source_wraps_declaration() {
    let storage = PreloadScriptStorage::new();
    let id = storage.add("() => { run(); }".to_string(), None, None, None).await;
    let scripts = storage.pending_for_target("t", "c", "default").await;
    assert_eq!(scripts[0].id, id);
    assert_eq!(scripts[0].source(), "(() => { run(); })()");
}
