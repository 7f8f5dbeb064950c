use serde_json::json;

use super::*;

#[test]
fn test_parse_command_minimal() {
    let cmd = parse_command(r#"{"id":3,"method":"session.status","params":{}}"#).unwrap();
    assert_eq!(cmd.id, 3);
    assert_eq!(cmd.method, "session.status");
    assert_eq!(cmd.channel, None);
}

#[test]
fn test_parse_command_with_channel() {
    let cmd =
        parse_command(r#"{"id":1,"method":"session.subscribe","params":{},"channel":"ch-1"}"#)
            .unwrap();
    assert_eq!(cmd.channel.as_deref(), Some("ch-1"));
}

#[test]
fn test_parse_command_goog_channel_alias() {
    let cmd =
        parse_command(r#"{"id":1,"method":"session.subscribe","params":{},"goog:channel":"g"}"#)
            .unwrap();
    assert_eq!(cmd.channel.as_deref(), Some("g"));
}

#[test]
fn test_parse_command_missing_params_defaults_null() {
    let cmd = parse_command(r#"{"id":9,"method":"session.status"}"#).unwrap();
    assert!(cmd.params.is_null());
}

#[test]
fn test_parse_command_malformed_id() {
    let err = parse_command(r#"{"id":"nope","method":"session.status"}"#).unwrap_err();
    assert_eq!(err.id, None);
    assert_eq!(err.error.code, crate::error::ErrorCode::InvalidArgument);
}

#[test]
fn test_parse_command_missing_method_keeps_id() {
    let err = parse_command(r#"{"id":12,"params":{}}"#).unwrap_err();
    assert_eq!(err.id, Some(12));
}

#[test]
fn test_parse_command_unreadable_frame() {
    let err = parse_command("not json").unwrap_err();
    assert_eq!(err.id, None);
}

#[test]
fn test_success_frame_serialization() {
    let frame = OutgoingFrame::success(5, json!({"ok": true}), None);
    let v: serde_json::Value = serde_json::from_str(&frame.to_frame()).unwrap();
    assert_eq!(v, json!({"type": "success", "id": 5, "result": {"ok": true}}));
}

#[test]
fn test_error_frame_null_id() {
    let err = crate::error::BidiError::invalid_argument("bad frame");
    let frame = OutgoingFrame::error(None, &err, None);
    let v: serde_json::Value = serde_json::from_str(&frame.to_frame()).unwrap();
    assert_eq!(v["type"], "error");
    assert!(v["id"].is_null());
    assert_eq!(v["error"], "invalid argument");
}

#[test]
fn test_event_frame_with_channel() {
    let frame = OutgoingFrame::event(
        "log.entryAdded",
        json!({"text": "hi"}),
        Some("ch".to_string()),
    );
    let v: serde_json::Value = serde_json::from_str(&frame.to_frame()).unwrap();
    assert_eq!(v["type"], "event");
    assert_eq!(v["method"], "log.entryAdded");
    assert_eq!(v["channel"], "ch");
}
