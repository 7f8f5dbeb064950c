use super::*;

const NOW: u64 = 1_000;

#[test]
fn test_fragment_navigation_keeps_current_id() {
    let mut tracker = NavigationTracker::new("C1".to_string());

    // Establish a current navigation first.
    let emissions = tracker.frame_started_navigating("about:blank", "L0", NOW);
    assert_eq!(emissions.len(), 1);
    let current = tracker.current_navigation_id().unwrap().to_string();
    tracker.load("L0", NOW);

    // Command navigation to a fragment: no loader is ever assigned.
    let mut handle = tracker.start_command_navigation("about:blank#x");
    let emissions = tracker.navigated_within_document("about:blank#x", Some("fragment"), NOW + 1);

    assert_eq!(emissions.len(), 1);
    assert_eq!(emissions[0].method, "browsingContext.fragmentNavigated");
    assert_eq!(emissions[0].info.url, "about:blank#x");
    assert_eq!(emissions[0].info.navigation.as_deref(), Some(handle.id.as_str()));
    // Current navigation id did not move.
    assert_eq!(tracker.current_navigation_id(), Some(current.as_str()));

    // Even wait:"complete" resolves for fragment navigations.
    tokio_test::block_on(handle.wait_for(Readiness::Complete)).unwrap();
}

#[test]
fn test_cross_document_happy_path() {
    let mut tracker = NavigationTracker::new("C1".to_string());

    let mut handle = tracker.start_command_navigation("http://a/");
    let emissions = tracker.frame_started_navigating("http://a/", "L1", NOW);
    assert_eq!(emissions.len(), 1);
    assert_eq!(emissions[0].method, "browsingContext.navigationStarted");
    assert_eq!(emissions[0].info.url, "http://a/");
    assert_eq!(emissions[0].info.navigation.as_deref(), Some(handle.id.as_str()));

    tracker.frame_navigated("http://a/");
    let dcl = tracker.dom_content_loaded("L1", NOW + 1);
    assert_eq!(dcl[0].method, "browsingContext.domContentLoaded");
    let load = tracker.load("L1", NOW + 2);
    assert_eq!(load[0].method, "browsingContext.load");

    tokio_test::block_on(handle.wait_for(Readiness::Complete)).unwrap();
}

#[test]
fn test_renderer_abort_carries_old_url() {
    let mut tracker = NavigationTracker::new("C1".to_string());

    let mut handle = tracker.start_command_navigation("http://a/");
    let emissions = tracker.frame_started_navigating("http://a/", "L1", NOW);
    assert_eq!(emissions[0].method, "browsingContext.navigationStarted");

    // Before load, the page sets location to http://b/.
    let emissions = tracker.frame_started_navigating("http://b/", "L2", NOW + 5);
    assert_eq!(emissions.len(), 2);
    assert_eq!(emissions[0].method, "browsingContext.navigationAborted");
    assert_eq!(emissions[0].info.url, "http://a/");
    assert_eq!(emissions[0].info.navigation.as_deref(), Some(handle.id.as_str()));
    assert_eq!(emissions[1].method, "browsingContext.navigationStarted");
    assert_eq!(emissions[1].info.url, "http://b/");

    // The command navigation resolves as aborted.
    let err = tokio_test::block_on(handle.wait_for(Readiness::Complete)).unwrap_err();
    assert_eq!(err.code, crosswire_bidi::ErrorCode::UnknownError);

    // The new navigation owns the current id.
    assert_eq!(
        tracker.current_navigation_id(),
        emissions[1].info.navigation.as_deref()
    );
}

#[test]
fn test_loading_failed_matches_loader_only() {
    let mut tracker = NavigationTracker::new("C1".to_string());
    tracker.start_command_navigation("http://a/");
    tracker.frame_started_navigating("http://a/", "L1", NOW);

    // A subresource failure is not a navigation failure.
    assert!(tracker.loading_failed("R-sub", "net::ERR_FAILED", NOW).is_empty());

    let emissions = tracker.loading_failed("L1", "net::ERR_CONNECTION_REFUSED", NOW);
    assert_eq!(emissions.len(), 1);
    assert_eq!(emissions[0].method, "browsingContext.navigationFailed");
    assert_eq!(emissions[0].info.url, "http://a/");
}

#[test]
fn test_duplicate_started_signal_is_ignored() {
    let mut tracker = NavigationTracker::new("C1".to_string());
    tracker.start_command_navigation("http://a/");
    let first = tracker.frame_started_navigating("http://a/", "L1", NOW);
    assert_eq!(first.len(), 1);
    let dup = tracker.frame_started_navigating("http://a/", "L1", NOW + 1);
    assert!(dup.is_empty());
}

#[test]
fn test_lifecycle_for_stale_loader_is_ignored() {
    let mut tracker = NavigationTracker::new("C1".to_string());
    tracker.start_command_navigation("http://a/");
    tracker.frame_started_navigating("http://a/", "L1", NOW);
    assert!(tracker.load("L-old", NOW).is_empty());
    assert!(tracker.dom_content_loaded("L-old", NOW).is_empty());
}

#[test]
fn test_wait_for_none_resolves_at_start() {
    let mut tracker = NavigationTracker::new("C1".to_string());
    let mut handle = tracker.start_command_navigation("http://a/");
    tracker.frame_started_navigating("http://a/", "L1", NOW);
    tokio_test::block_on(handle.wait_for(Readiness::Started)).unwrap();
}

#[test]
fn test_fail_navigation_for_rejected_command() {
    let mut tracker = NavigationTracker::new("C1".to_string());
    let mut handle = tracker.start_command_navigation("http://bad/");
    let emissions = tracker.fail_navigation(&handle.id, "net::ERR_NAME_NOT_RESOLVED", NOW);
    assert_eq!(emissions.len(), 1);
    assert_eq!(emissions[0].method, "browsingContext.navigationFailed");
    assert!(tokio_test::block_on(handle.wait_for(Readiness::Started)).is_err());
}
