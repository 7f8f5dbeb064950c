use crosswire_bidi::script::{LocalValue, RegExpValue, RemoteValue, TypedLocalValue};
use serde_json::json;

use super::*;

fn typed(v: serde_json::Value) -> TypedLocalValue {
    match serde_json::from_value::<LocalValue>(v).unwrap() {
        LocalValue::Typed(t) => t,
        LocalValue::Reference(r) => panic!("expected typed value, got {r:?}"),
    }
}

#[test]
fn test_primitive_call_arguments() {
    let cases = [
        (json!({"type": "undefined"}), CallArgument::default()),
        (
            json!({"type": "null"}),
            CallArgument {
                value: Some(serde_json::Value::Null),
                ..CallArgument::default()
            },
        ),
        (
            json!({"type": "string", "value": "hi"}),
            CallArgument {
                value: Some(json!("hi")),
                ..CallArgument::default()
            },
        ),
        (
            json!({"type": "number", "value": "NaN"}),
            CallArgument {
                unserializable_value: Some("NaN".to_string()),
                ..CallArgument::default()
            },
        ),
        (
            json!({"type": "bigint", "value": "42"}),
            CallArgument {
                unserializable_value: Some("42n".to_string()),
                ..CallArgument::default()
            },
        ),
    ];
    for (input, expected) in cases {
        match prepare_typed(&typed(input.clone())).unwrap() {
            PreparedValue::Argument(arg) => assert_eq!(arg, expected, "input: {input}"),
            PreparedValue::Descriptor(d) => panic!("expected argument for {input}, got {d}"),
        }
    }
}

#[test]
fn test_composite_becomes_descriptor() {
    let value = typed(json!({
        "type": "map",
        "value": [["k", {"type": "number", "value": 1.0}]]
    }));
    match prepare_typed(&value).unwrap() {
        PreparedValue::Descriptor(d) => {
            assert_eq!(d["type"], "map");
            assert_eq!(d["value"][0][0], "k");
            assert_eq!(d["value"][0][1]["type"], "number");
        }
        PreparedValue::Argument(a) => panic!("expected descriptor, got {a:?}"),
    }
}

#[test]
fn test_channel_is_unsupported() {
    let value = typed(json!({"type": "channel", "value": {"channel": "c"}}));
    let err = prepare_typed(&value).unwrap_err();
    assert_eq!(err.code, crosswire_bidi::ErrorCode::UnsupportedOperation);
}

#[test]
fn test_nested_reference_rejected() {
    let value = typed(json!({
        "type": "array",
        "value": [{"handle": "h1"}]
    }));
    let err = prepare_typed(&value).unwrap_err();
    assert_eq!(err.code, crosswire_bidi::ErrorCode::UnsupportedOperation);
}

#[test]
fn test_regexp_descriptor() {
    let value = TypedLocalValue::RegExp {
        value: RegExpValue {
            pattern: "a+".to_string(),
            flags: Some("gi".to_string()),
        },
    };
    let descriptor = to_descriptor(&value).unwrap();
    assert_eq!(descriptor, json!({"type": "regexp", "value": {"pattern": "a+", "flags": "gi"}}));
}

#[test]
fn test_assemble_arguments_meta() {
    let args = vec![
        PreparedValue::Argument(CallArgument {
            value: Some(json!(1.0)),
            ..CallArgument::default()
        }),
        PreparedValue::Descriptor(json!({"type": "date", "value": "2026-01-01T00:00:00Z"})),
    ];
    let assembled = assemble_arguments(None, args);
    assert_eq!(assembled.len(), 4);
    // Meta names the descriptor index and the untouched this.
    assert_eq!(assembled[0].value, Some(json!({"args": [1], "this": false})));
    // Undefined this.
    assert_eq!(assembled[1], CallArgument::default());
    assert_eq!(assembled[2].value, Some(json!(1.0)));
    assert_eq!(
        assembled[3].value,
        Some(json!({"type": "date", "value": "2026-01-01T00:00:00Z"}))
    );
}

#[test]
fn test_wrapper_embeds_user_function() {
    let wrapped = wrap_function_declaration("(a, b) => a + b");
    assert!(wrapped.starts_with("function (__cwMeta, __cwThis, ...__cwArgs)"));
    assert!(wrapped.contains("((a, b) => a + b).apply(__cwThis, __cwArgs)"));
}

#[test]
fn test_deep_primitive_round_trip() {
    let deep = DeepSerializedValue {
        value_type: "number".to_string(),
        value: Some(json!(2.5)),
        object_id: None,
        weak_local_object_reference: None,
    };
    assert_eq!(deep_to_remote_value(&deep, None), RemoteValue::number(2.5));
}

#[test]
fn test_deep_node_gets_shared_id() {
    let ctx = NodeContext {
        frame_id: "FRAME".to_string(),
        document_id: "DOC".to_string(),
    };
    let deep = DeepSerializedValue {
        value_type: "node".to_string(),
        value: Some(json!({
            "nodeType": 1,
            "backendNodeId": 7,
            "childNodeCount": 0
        })),
        object_id: Some("obj-1".to_string()),
        weak_local_object_reference: None,
    };
    let remote = deep_to_remote_value(&deep, Some(&ctx));
    assert_eq!(remote.kind, "node");
    assert_eq!(remote.shared_id.as_deref(), Some("f.FRAME.d.DOC.e.7"));
}

#[test]
fn test_deep_nested_array() {
    let deep = DeepSerializedValue {
        value_type: "array".to_string(),
        value: Some(json!([
            {"type": "string", "value": "x"},
            {"type": "number", "value": "-0"}
        ])),
        object_id: None,
        weak_local_object_reference: None,
    };
    let remote = deep_to_remote_value(&deep, None);
    let items = remote.value.unwrap();
    assert_eq!(items[0], json!({"type": "string", "value": "x"}));
    assert_eq!(items[1], json!({"type": "number", "value": "-0"}));
}

#[test]
fn test_fallback_specials() {
    let object = RemoteObject {
        object_type: "number".to_string(),
        subtype: None,
        class_name: None,
        value: None,
        unserializable_value: Some("-Infinity".to_string()),
        description: None,
        object_id: None,
        deep_serialized_value: None,
    };
    assert_eq!(
        remote_object_fallback(&object),
        RemoteValue::number(f64::NEG_INFINITY)
    );
}

#[test]
fn test_fallback_error_subtype() {
    let object = RemoteObject {
        object_type: "object".to_string(),
        subtype: Some("error".to_string()),
        class_name: Some("TypeError".to_string()),
        value: None,
        unserializable_value: None,
        description: Some("TypeError: boom".to_string()),
        object_id: Some("obj-9".to_string()),
        deep_serialized_value: None,
    };
    assert_eq!(remote_object_fallback(&object).kind, "error");
}
