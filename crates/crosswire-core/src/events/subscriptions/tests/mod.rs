use super::*;

fn scope(top: &str, user: &str) -> (String, String) {
    (top.to_string(), user.to_string())
}

#[test]
fn test_unknown_event_rejected() {
    let mut manager = SubscriptionManager::new();
    let err = manager
        .add(vec!["network.bogus".to_string()], None, None, None)
        .unwrap_err();
    assert_eq!(err.code, crosswire_bidi::ErrorCode::InvalidArgument);
}

#[test]
fn test_global_subscription_covers_everything() {
    let mut manager = SubscriptionManager::new();
    manager
        .add(vec!["log.entryAdded".to_string()], None, None, Some("ch".to_string()))
        .unwrap();

    let s = scope("top", "default");
    assert_eq!(
        manager.channels_for("log.entryAdded", Some(&s)),
        vec![Some("ch".to_string())]
    );
    // Contextless events reach global subscriptions too.
    assert_eq!(
        manager.channels_for("log.entryAdded", None),
        vec![Some("ch".to_string())]
    );
}

#[test]
fn test_module_prefix_subscription() {
    let mut manager = SubscriptionManager::new();
    manager
        .add(vec!["network".to_string()], None, None, None)
        .unwrap();
    let s = scope("top", "default");
    assert_eq!(manager.channels_for("network.beforeRequestSent", Some(&s)).len(), 1);
    assert_eq!(manager.channels_for("log.entryAdded", Some(&s)).len(), 0);
}

#[test]
fn test_context_restriction() {
    let mut manager = SubscriptionManager::new();
    manager
        .add(
            vec!["log.entryAdded".to_string()],
            Some(vec!["top-1".to_string()]),
            None,
            None,
        )
        .unwrap();

    assert_eq!(
        manager
            .channels_for("log.entryAdded", Some(&scope("top-1", "default")))
            .len(),
        1
    );
    assert!(manager
        .channels_for("log.entryAdded", Some(&scope("top-2", "default")))
        .is_empty());
    // Restricted subscriptions never cover contextless events.
    assert!(manager.channels_for("log.entryAdded", None).is_empty());
}

#[test]
fn test_user_context_restriction() {
    let mut manager = SubscriptionManager::new();
    manager
        .add(
            vec!["log.entryAdded".to_string()],
            None,
            Some(vec!["profile-1".to_string()]),
            None,
        )
        .unwrap();
    assert_eq!(
        manager
            .channels_for("log.entryAdded", Some(&scope("any", "profile-1")))
            .len(),
        1
    );
    assert!(manager
        .channels_for("log.entryAdded", Some(&scope("any", "default")))
        .is_empty());
}

#[test]
fn test_channel_order_is_first_subscription_order() {
    let mut manager = SubscriptionManager::new();
    manager
        .add(vec!["log.entryAdded".to_string()], None, None, Some("b".to_string()))
        .unwrap();
    manager
        .add(vec!["log.entryAdded".to_string()], None, None, Some("a".to_string()))
        .unwrap();
    // Another subscription on "b" does not move it.
    manager
        .add(vec!["network".to_string()], None, None, Some("b".to_string()))
        .unwrap();

    let s = scope("top", "default");
    assert_eq!(
        manager.channels_for("log.entryAdded", Some(&s)),
        vec![Some("b".to_string()), Some("a".to_string())]
    );
}

#[test]
fn test_overlapping_subscriptions_survive_individual_removal() {
    let mut manager = SubscriptionManager::new();
    let first = manager
        .add(vec!["log.entryAdded".to_string()], None, None, None)
        .unwrap();
    let _second = manager
        .add(vec!["log.entryAdded".to_string()], None, None, None)
        .unwrap();

    manager.remove_by_ids(&[first.id]).unwrap();
    assert!(manager.is_subscribed("log.entryAdded"));
}

#[test]
fn test_remove_by_unknown_id_removes_nothing() {
    let mut manager = SubscriptionManager::new();
    let sub = manager
        .add(vec!["log.entryAdded".to_string()], None, None, None)
        .unwrap();
    let err = manager
        .remove_by_ids(&[sub.id.clone(), "ghost".to_string()])
        .unwrap_err();
    assert_eq!(err.code, crosswire_bidi::ErrorCode::InvalidArgument);
    assert!(manager.is_subscribed("log.entryAdded"));
}

#[test]
fn test_remove_by_attributes() {
    let mut manager = SubscriptionManager::new();
    manager
        .add(vec!["log.entryAdded".to_string()], None, None, Some("ch".to_string()))
        .unwrap();

    // Wrong channel: nothing matches.
    let err = manager
        .remove_by_attributes(&["log.entryAdded".to_string()], None)
        .unwrap_err();
    assert_eq!(err.code, crosswire_bidi::ErrorCode::InvalidArgument);

    manager
        .remove_by_attributes(&["log.entryAdded".to_string()], Some("ch"))
        .unwrap();
    assert!(!manager.is_subscribed("log.entryAdded"));
}
