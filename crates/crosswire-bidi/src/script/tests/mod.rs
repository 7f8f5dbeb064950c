use serde_json::json;

use super::*;

#[test]
fn test_local_value_primitives() {
    let v: LocalValue = serde_json::from_value(json!({"type": "undefined"})).unwrap();
    assert_eq!(v, LocalValue::Typed(TypedLocalValue::Undefined));

    let v: LocalValue = serde_json::from_value(json!({"type": "number", "value": 3.5})).unwrap();
    assert_eq!(
        v,
        LocalValue::Typed(TypedLocalValue::Number {
            value: NumberValue::Finite(3.5)
        })
    );

    let v: LocalValue = serde_json::from_value(json!({"type": "number", "value": "NaN"})).unwrap();
    assert_eq!(
        v,
        LocalValue::Typed(TypedLocalValue::Number {
            value: NumberValue::Special(SpecialNumber::NaN)
        })
    );

    let v: LocalValue =
        serde_json::from_value(json!({"type": "bigint", "value": "12345678901234567890"})).unwrap();
    assert!(matches!(v, LocalValue::Typed(TypedLocalValue::Bigint { .. })));
}

#[test]
fn test_local_value_composites() {
    let v: LocalValue = serde_json::from_value(json!({
        "type": "map",
        "value": [["a", {"type": "string", "value": "x"}]]
    }))
    .unwrap();
    match v {
        LocalValue::Typed(TypedLocalValue::Map { value }) => {
            assert_eq!(value.len(), 1);
            assert_eq!(value[0].0, ObjectKey::String("a".to_string()));
        }
        other => panic!("expected map, got {other:?}"),
    }

    let v: LocalValue = serde_json::from_value(json!({
        "type": "regexp",
        "value": {"pattern": "ab+c", "flags": "i"}
    }))
    .unwrap();
    match v {
        LocalValue::Typed(TypedLocalValue::RegExp { value }) => {
            assert_eq!(value.pattern, "ab+c");
            assert_eq!(value.flags.as_deref(), Some("i"));
        }
        other => panic!("expected regexp, got {other:?}"),
    }
}

#[test]
fn test_local_value_remote_reference() {
    let v: LocalValue = serde_json::from_value(json!({"handle": "h-1"})).unwrap();
    match v {
        LocalValue::Reference(r) => {
            assert_eq!(r.handle.as_deref(), Some("h-1"));
            assert_eq!(r.shared_id, None);
        }
        other => panic!("expected reference, got {other:?}"),
    }

    let v: LocalValue =
        serde_json::from_value(json!({"sharedId": "f.F1.d.D1.e.42"})).unwrap();
    assert!(matches!(v, LocalValue::Reference(_)));
}

#[test]
fn test_remote_value_number_specials() {
    assert_eq!(
        serde_json::to_value(RemoteValue::number(f64::NAN)).unwrap(),
        json!({"type": "number", "value": "NaN"})
    );
    assert_eq!(
        serde_json::to_value(RemoteValue::number(-0.0)).unwrap(),
        json!({"type": "number", "value": "-0"})
    );
    assert_eq!(
        serde_json::to_value(RemoteValue::number(f64::INFINITY)).unwrap(),
        json!({"type": "number", "value": "Infinity"})
    );
    assert_eq!(
        serde_json::to_value(RemoteValue::number(f64::NEG_INFINITY)).unwrap(),
        json!({"type": "number", "value": "-Infinity"})
    );
    assert_eq!(
        serde_json::to_value(RemoteValue::number(2.0)).unwrap(),
        json!({"type": "number", "value": 2.0})
    );
}

#[test]
fn test_remote_value_skips_absent_fields() {
    let v = serde_json::to_value(RemoteValue::undefined()).unwrap();
    assert_eq!(v, json!({"type": "undefined"}));

    let mut retained = RemoteValue::of_kind("object");
    retained.handle = Some("h-2".to_string());
    let v = serde_json::to_value(retained).unwrap();
    assert_eq!(v, json!({"type": "object", "handle": "h-2"}));
}

#[test]
fn test_target_parsing() {
    let t: Target = serde_json::from_value(json!({"realm": "r-1"})).unwrap();
    assert_eq!(t, Target::Realm { realm: "r-1".to_string() });

    let t: Target = serde_json::from_value(json!({"context": "c-1", "sandbox": "sb"})).unwrap();
    assert_eq!(
        t,
        Target::Context {
            context: "c-1".to_string(),
            sandbox: Some("sb".to_string())
        }
    );
}

#[test]
fn test_evaluate_result_serialization() {
    let result = EvaluateResult::Success {
        result: RemoteValue::string("done"),
        realm: "r-9".to_string(),
    };
    let v = serde_json::to_value(result).unwrap();
    assert_eq!(
        v,
        json!({
            "type": "success",
            "result": {"type": "string", "value": "done"},
            "realm": "r-9"
        })
    );
}

#[test]
fn test_evaluate_params_defaults() {
    let params: EvaluateParams = serde_json::from_value(json!({
        "expression": "1 + 1",
        "target": {"context": "c1"},
        "awaitPromise": true
    }))
    .unwrap();
    assert_eq!(params.result_ownership, ResultOwnership::None);
    assert_eq!(params.serialization_options, SerializationOptions::default());
    assert!(!params.user_activation);
}

#[test]
fn test_realm_type_wire_form() {
    assert_eq!(
        serde_json::to_string(&RealmType::DedicatedWorker).unwrap(),
        r#""dedicated-worker""#
    );
    assert_eq!(serde_json::to_string(&RealmType::Window).unwrap(), r#""window""#);
}
