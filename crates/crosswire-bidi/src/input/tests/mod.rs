use serde_json::json;

use super::*;

#[test]
fn test_perform_actions_parsing() {
    let params: PerformActionsParams = serde_json::from_value(json!({
        "context": "c1",
        "actions": [
            {
                "type": "key",
                "id": "kb",
                "actions": [
                    {"type": "keyDown", "value": "a"},
                    {"type": "keyUp", "value": "a"}
                ]
            },
            {
                "type": "pointer",
                "id": "mouse",
                "parameters": {"pointerType": "mouse"},
                "actions": [
                    {"type": "pointerMove", "x": 10.0, "y": 20.0},
                    {"type": "pointerDown", "button": 0},
                    {"type": "pointerUp", "button": 0}
                ]
            }
        ]
    }))
    .unwrap();

    assert_eq!(params.actions.len(), 2);
    assert_eq!(params.actions[0].id(), "kb");
    assert_eq!(params.actions[0].len(), 2);
    assert_eq!(params.actions[1].len(), 3);
    match &params.actions[1] {
        SourceActions::Pointer { parameters, actions, .. } => {
            assert_eq!(parameters.pointer_type, PointerType::Mouse);
            assert!(matches!(
                actions[0],
                PointerAction::PointerMove { x, y, .. } if x == 10.0 && y == 20.0
            ));
        }
        other => panic!("expected pointer source, got {other:?}"),
    }
}

#[test]
fn test_pause_action() {
    let action: NoneAction =
        serde_json::from_value(json!({"type": "pause", "duration": 150})).unwrap();
    assert!(matches!(action, NoneAction::Pause { duration: Some(150) }));
}

#[test]
fn test_origin_parsing() {
    let origin: Origin = serde_json::from_value(json!("pointer")).unwrap();
    assert!(matches!(origin, Origin::Keyword(OriginKeyword::Pointer)));

    let origin: Origin = serde_json::from_value(json!({
        "type": "element",
        "element": {"sharedId": "f.F.d.D.e.1"}
    }))
    .unwrap();
    assert!(matches!(origin, Origin::Element { .. }));
}

#[test]
fn test_wheel_scroll_parsing() {
    let action: WheelAction = serde_json::from_value(json!({
        "type": "scroll",
        "x": 0, "y": 0, "deltaX": 0, "deltaY": 120
    }))
    .unwrap();
    match action {
        WheelAction::Scroll { delta_y, origin, .. } => {
            assert_eq!(delta_y, 120);
            assert!(matches!(origin, Origin::Default));
        }
        other => panic!("expected scroll, got {other:?}"),
    }
}
