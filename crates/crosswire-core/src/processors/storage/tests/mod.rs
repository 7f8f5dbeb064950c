use super::*;

fn cdp_cookie(name: &str, domain: &str, secure: bool) -> cdp_net::Cookie {
    cdp_net::Cookie {
        name: name.to_string(),
        value: "v".to_string(),
        domain: domain.to_string(),
        path: "/".to_string(),
        expires: -1.0,
        size: Some(10),
        http_only: false,
        secure,
        session: Some(true),
        same_site: Some("Lax".to_string()),
    }
}

#[test]
fn test_cookie_conversion() {
    let cookie = to_bidi_cookie(&cdp_cookie("sid", ".example.com", true));
    assert_eq!(cookie.name, "sid");
    assert_eq!(cookie.value, BytesValue::string("v"));
    assert_eq!(cookie.same_site, SameSite::Lax);
    // Session cookies carry no expiry.
    assert_eq!(cookie.expiry, None);
    assert!(cookie.secure);
}

#[test]
fn test_filter_matching() {
    let cookie = to_bidi_cookie(&cdp_cookie("sid", ".example.com", true));

    assert!(matches_filter(&cookie, None));

    let filter = bidi_storage::CookieFilter {
        name: Some("sid".to_string()),
        ..Default::default()
    };
    assert!(matches_filter(&cookie, Some(&filter)));

    let filter = bidi_storage::CookieFilter {
        name: Some("other".to_string()),
        ..Default::default()
    };
    assert!(!matches_filter(&cookie, Some(&filter)));

    let filter = bidi_storage::CookieFilter {
        secure: Some(false),
        ..Default::default()
    };
    assert!(!matches_filter(&cookie, Some(&filter)));

    let filter = bidi_storage::CookieFilter {
        domain: Some(".example.com".to_string()),
        same_site: Some(SameSite::Lax),
        ..Default::default()
    };
    assert!(matches_filter(&cookie, Some(&filter)));
}

#[test]
fn test_default_user_context_maps_to_no_browser_context() {
    assert_eq!(normalize_user_context_str("default"), None);
    assert_eq!(
        normalize_user_context_str("profile-9"),
        Some("profile-9".to_string())
    );
}

#[test]
fn test_partition_key_reports_user_context() {
    let key = partition_key(None);
    assert_eq!(key.user_context.as_deref(), Some("default"));
    let key = partition_key(Some("profile-1".to_string()));
    assert_eq!(key.user_context.as_deref(), Some("profile-1"));
}
