use super::*;

#[tokio::test]
async fn test_layers_cascade() {
    let storage = ContextConfigStorage::new();
    storage
        .update_global(|c| c.cache_bypass = Some(true))
        .await;
    storage
        .update_user_context("profile-1", |c| {
            c.user_agent = Some("AgentSmith/1.0".to_string());
        })
        .await;
    storage
        .update_context("ctx-1", |c| c.cache_bypass = Some(false))
        .await;

    let effective = storage.effective("profile-1", Some("ctx-1")).await;
    // Context layer wins over global.
    assert_eq!(effective.cache_bypass, Some(false));
    // User context layer supplies the user agent.
    assert_eq!(effective.user_agent.as_deref(), Some("AgentSmith/1.0"));

    let effective = storage.effective("profile-1", Some("other")).await;
    assert_eq!(effective.cache_bypass, Some(true));
}

#[tokio::test]
async fn test_explicit_clear_overrides_lower_layer() {
    let storage = ContextConfigStorage::new();
    storage
        .update_global(|c| {
            c.viewport = Some(Some(crosswire_bidi::browsing_context::Viewport {
                width: 800,
                height: 600,
            }));
        })
        .await;
    storage
        .update_context("ctx-1", |c| c.viewport = Some(None))
        .await;

    let effective = storage.effective("default", Some("ctx-1")).await;
    assert_eq!(effective.viewport, Some(None));
}

#[tokio::test]
async fn test_removed_context_layer_is_forgotten() {
    let storage = ContextConfigStorage::new();
    storage
        .update_context("ctx-1", |c| c.cache_bypass = Some(true))
        .await;
    storage.remove_context("ctx-1").await;
    let effective = storage.effective("default", Some("ctx-1")).await;
    assert_eq!(effective.cache_bypass, None);
}
