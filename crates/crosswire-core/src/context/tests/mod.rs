use super::*;

#[tokio::test]
async fn test_tree_creation_and_top_level_walk() {
    let storage = BrowsingContextStorage::new();
    assert!(storage.create("top", None, Some("default")).await);
    assert!(storage.create("child", Some("top"), None).await);
    assert!(storage.create("grandchild", Some("child"), None).await);
    // Duplicate creation is refused.
    assert!(!storage.create("child", Some("top"), None).await);

    assert_eq!(storage.top_level_of("grandchild").await.unwrap(), "top");
    assert_eq!(storage.top_level_of("top").await.unwrap(), "top");

    let (top, user_context) = storage.scope_of("grandchild").await.unwrap();
    assert_eq!(top, "top");
    assert_eq!(user_context, "default");
}

#[tokio::test]
async fn test_children_inherit_user_context() {
    let storage = BrowsingContextStorage::new();
    storage.create("top", None, Some("profile-7")).await;
    storage.create("child", Some("top"), None).await;
    let uc = storage
        .with("child", |c| c.user_context_id.clone())
        .await
        .unwrap();
    assert_eq!(uc, "profile-7");
}

#[tokio::test]
async fn test_delete_subtree_leaves_first() {
    let storage = BrowsingContextStorage::new();
    storage.create("top", None, None).await;
    storage.create("a", Some("top"), None).await;
    storage.create("b", Some("top"), None).await;
    storage.create("a1", Some("a"), None).await;

    let deleted = storage.delete_subtree("a").await;
    assert_eq!(deleted, vec!["a1".to_string(), "a".to_string()]);
    assert!(!storage.has("a").await);
    assert!(!storage.has("a1").await);
    assert!(storage.has("b").await);

    // Parent no longer lists the deleted child.
    let children = storage.with("top", |c| c.children.clone()).await.unwrap();
    assert_eq!(children, vec!["b".to_string()]);
}

#[tokio::test]
async fn test_missing_context_is_no_such_frame() {
    let storage = BrowsingContextStorage::new();
    let err = storage.with("ghost", |_| ()).await.unwrap_err();
    assert_eq!(err.code, crosswire_bidi::ErrorCode::NoSuchFrame);
}

#[tokio::test]
async fn test_subtree_ids_spans_descendants() {
    let storage = BrowsingContextStorage::new();
    storage.create("top", None, None).await;
    storage.create("a", Some("top"), None).await;
    storage.create("a1", Some("a"), None).await;
    storage.create("other", None, None).await;

    let mut ids = storage.subtree_ids(&["top".to_string()]).await;
    ids.sort();
    assert_eq!(ids, vec!["a".to_string(), "a1".to_string(), "top".to_string()]);
}

#[tokio::test]
async fn test_tree_info_depth_limit() {
    let storage = BrowsingContextStorage::new();
    storage.create("top", None, None).await;
    storage.create("a", Some("top"), None).await;
    storage.create("a1", Some("a"), None).await;

    let info = storage.tree_info("top", Some(1), true).await.unwrap();
    let children = info.children.unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].context, "a");
    // Depth 1 prunes the grandchild level.
    assert!(children[0].children.is_none());
}
