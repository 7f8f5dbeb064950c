//! Value bridge between BiDi and CDP representations.
//!
//! Downstream: client [`LocalValue`]s become CDP call arguments. Remote
//! references pass as object ids; primitives pass as plain values or
//! CDP unserializable strings; composite literals pass as JSON
//! descriptors that a wrapper around the user function revives in the
//! realm. Upstream: CDP deep-serialized results become BiDi
//! [`RemoteValue`]s, with node values annotated with their shared id.

use crosswire_bidi::script::{
    NumberValue, ObjectKey, RemoteValue, SpecialNumber, StackFrame, StackTrace, TypedLocalValue,
};
use crosswire_bidi::{script as bidi_script, BidiError};
use crosswire_cdp::protocol::runtime::{
    CallArgument, DeepSerializedValue, ExceptionDetails, RemoteObject,
};
use serde_json::{json, Value};

use super::shared_id::format_shared_id;

/// Context needed to mint shared ids for node values.
#[derive(Debug, Clone)]
pub struct NodeContext {
    /// Frame (browsing context) id of the realm.
    pub frame_id: String,
    /// Loader id of the realm's current document.
    pub document_id: String,
}

/// A local value prepared for transport.
#[derive(Debug, Clone, PartialEq)]
pub enum PreparedValue {
    /// Passes through CDP as-is.
    Argument(CallArgument),
    /// A JSON descriptor the in-realm wrapper revives.
    Descriptor(Value),
}

/// Prepare a typed (non-reference) local value.
///
/// # Errors
///
/// `unsupported operation` for channels; `invalid argument` for
/// descriptors that cannot be built.
pub fn prepare_typed(value: &TypedLocalValue) -> Result<PreparedValue, BidiError> {
    let argument = match value {
        TypedLocalValue::Undefined => CallArgument::default(),
        TypedLocalValue::Null => CallArgument {
            value: Some(Value::Null),
            ..CallArgument::default()
        },
        TypedLocalValue::String { value } => CallArgument {
            value: Some(Value::String(value.clone())),
            ..CallArgument::default()
        },
        TypedLocalValue::Boolean { value } => CallArgument {
            value: Some(Value::Bool(*value)),
            ..CallArgument::default()
        },
        TypedLocalValue::Bigint { value } => CallArgument {
            unserializable_value: Some(format!("{value}n")),
            ..CallArgument::default()
        },
        TypedLocalValue::Number { value } => match value {
            NumberValue::Finite(n) => CallArgument {
                value: Some(
                    serde_json::Number::from_f64(*n)
                        .map(Value::Number)
                        .unwrap_or(Value::Null),
                ),
                ..CallArgument::default()
            },
            NumberValue::Special(special) => CallArgument {
                unserializable_value: Some(special_number_str(*special).to_string()),
                ..CallArgument::default()
            },
        },
        TypedLocalValue::Channel { .. } => {
            return Err(BidiError::unsupported("channel arguments are not supported"));
        }
        composite => return Ok(PreparedValue::Descriptor(to_descriptor(composite)?)),
    };
    Ok(PreparedValue::Argument(argument))
}

fn special_number_str(special: SpecialNumber) -> &'static str {
    match special {
        SpecialNumber::NaN => "NaN",
        SpecialNumber::NegativeZero => "-0",
        SpecialNumber::Infinity => "Infinity",
        SpecialNumber::NegativeInfinity => "-Infinity",
    }
}

/// Build the JSON descriptor for a composite local value.
///
/// # Errors
///
/// `unsupported operation` when a remote reference or channel is nested
/// inside a composite literal (object ids cannot travel inside JSON).
pub fn to_descriptor(value: &TypedLocalValue) -> Result<Value, BidiError> {
    Ok(match value {
        TypedLocalValue::Undefined => json!({"type": "undefined"}),
        TypedLocalValue::Null => json!({"type": "null"}),
        TypedLocalValue::String { value } => json!({"type": "string", "value": value}),
        TypedLocalValue::Boolean { value } => json!({"type": "boolean", "value": value}),
        TypedLocalValue::Bigint { value } => json!({"type": "bigint", "value": value}),
        TypedLocalValue::Number { value } => match value {
            NumberValue::Finite(n) => json!({"type": "number", "value": n}),
            NumberValue::Special(s) => {
                json!({"type": "number", "value": special_number_str(*s)})
            }
        },
        TypedLocalValue::Date { value } => json!({"type": "date", "value": value}),
        TypedLocalValue::RegExp { value } => json!({
            "type": "regexp",
            "value": {"pattern": value.pattern, "flags": value.flags}
        }),
        TypedLocalValue::Array { value } => {
            json!({"type": "array", "value": descriptor_list(value)?})
        }
        TypedLocalValue::Set { value } => {
            json!({"type": "set", "value": descriptor_list(value)?})
        }
        TypedLocalValue::Object { value } => {
            json!({"type": "object", "value": descriptor_entries(value)?})
        }
        TypedLocalValue::Map { value } => {
            json!({"type": "map", "value": descriptor_entries(value)?})
        }
        TypedLocalValue::Channel { .. } => {
            return Err(BidiError::unsupported("channel arguments are not supported"));
        }
    })
}

fn descriptor_list(values: &[bidi_script::LocalValue]) -> Result<Vec<Value>, BidiError> {
    values.iter().map(nested_descriptor).collect()
}

fn descriptor_entries(
    entries: &[(ObjectKey, bidi_script::LocalValue)],
) -> Result<Vec<Value>, BidiError> {
    entries
        .iter()
        .map(|(key, value)| {
            let key = match key {
                ObjectKey::String(s) => Value::String(s.clone()),
                ObjectKey::Value(v) => nested_descriptor(v)?,
            };
            Ok(Value::Array(vec![key, nested_descriptor(value)?]))
        })
        .collect()
}

fn nested_descriptor(value: &bidi_script::LocalValue) -> Result<Value, BidiError> {
    match value {
        bidi_script::LocalValue::Typed(typed) => to_descriptor(typed),
        bidi_script::LocalValue::Reference(_) => Err(BidiError::unsupported(
            "remote references inside composite values are not supported",
        )),
    }
}

/// The in-realm deserializer for JSON descriptors.
const REVIVER: &str = r"(function __revive(d) {
  switch (d.type) {
    case 'undefined': return undefined;
    case 'null': return null;
    case 'string': return d.value;
    case 'boolean': return d.value;
    case 'bigint': return BigInt(d.value);
    case 'number':
      if (d.value === 'NaN') return NaN;
      if (d.value === '-0') return -0;
      if (d.value === 'Infinity') return Infinity;
      if (d.value === '-Infinity') return -Infinity;
      return d.value;
    case 'date': return new Date(d.value);
    case 'regexp': return new RegExp(d.value.pattern, d.value.flags ?? undefined);
    case 'array': return d.value.map(__revive);
    case 'set': return new Set(d.value.map(__revive));
    case 'map': return new Map(d.value.map(([k, v]) => [
      typeof k === 'string' ? k : __revive(k), __revive(v)]));
    case 'object': {
      const o = {};
      for (const [k, v] of d.value) {
        o[typeof k === 'string' ? k : __revive(k)] = __revive(v);
      }
      return o;
    }
    default: throw new Error('cannot revive ' + d.type);
  }
})";

/// Wrap a user function declaration so descriptor arguments are revived
/// before the call.
///
/// The wrapped function receives `(meta, thisValue, ...args)` where
/// `meta.args` lists the indices that carry descriptors and
/// `meta.this` says whether `thisValue` does.
pub fn wrap_function_declaration(user_declaration: &str) -> String {
    format!(
        "function (__cwMeta, __cwThis, ...__cwArgs) {{\n\
         const __cwRevive = {REVIVER};\n\
         for (const __cwI of __cwMeta.args) {{ __cwArgs[__cwI] = __cwRevive(__cwArgs[__cwI]); }}\n\
         if (__cwMeta.this) {{ __cwThis = __cwRevive(__cwThis); }}\n\
         return ({user_declaration}).apply(__cwThis, __cwArgs);\n\
         }}"
    )
}

/// Assemble the CDP argument list for a wrapped call.
pub fn assemble_arguments(
    this: Option<PreparedValue>,
    args: Vec<PreparedValue>,
) -> Vec<CallArgument> {
    let mut descriptor_indices = Vec::new();
    let mut out: Vec<CallArgument> = Vec::with_capacity(args.len() + 2);

    let (this_arg, this_serialized) = match this {
        None => (CallArgument::default(), false),
        Some(PreparedValue::Argument(arg)) => (arg, false),
        Some(PreparedValue::Descriptor(descriptor)) => (
            CallArgument {
                value: Some(descriptor),
                ..CallArgument::default()
            },
            true,
        ),
    };

    let mut rest = Vec::with_capacity(args.len());
    for (index, arg) in args.into_iter().enumerate() {
        match arg {
            PreparedValue::Argument(arg) => rest.push(arg),
            PreparedValue::Descriptor(descriptor) => {
                descriptor_indices.push(index);
                rest.push(CallArgument {
                    value: Some(descriptor),
                    ..CallArgument::default()
                });
            }
        }
    }

    out.push(CallArgument {
        value: Some(json!({"args": descriptor_indices, "this": this_serialized})),
        ..CallArgument::default()
    });
    out.push(this_arg);
    out.extend(rest);
    out
}

/// Convert a CDP result object into a BiDi remote value.
///
/// Prefers the deep serialized form; falls back to the primitive fields
/// of the remote object when no deep value is present.
pub fn remote_object_to_value(object: &RemoteObject, ctx: Option<&NodeContext>) -> RemoteValue {
    match &object.deep_serialized_value {
        Some(deep) => deep_to_remote_value(deep, ctx),
        None => remote_object_fallback(object),
    }
}

/// Convert a deep serialized value into a BiDi remote value.
pub fn deep_to_remote_value(deep: &DeepSerializedValue, ctx: Option<&NodeContext>) -> RemoteValue {
    let transformed = deep
        .value
        .as_ref()
        .map(|value| transform_deep_payload(&deep.value_type, value, ctx));
    let shared_id = if deep.value_type == "node" {
        shared_id_of(deep.value.as_ref(), ctx)
    } else {
        None
    };
    let internal_id = deep
        .weak_local_object_reference
        .map(|reference| reference.to_string());
    RemoteValue {
        kind: deep.value_type.clone(),
        value: transformed,
        handle: None,
        shared_id,
        internal_id,
    }
}

fn shared_id_of(value: Option<&Value>, ctx: Option<&NodeContext>) -> Option<String> {
    let ctx = ctx?;
    let backend_node_id = value?.get("backendNodeId")?.as_i64()?;
    Some(format_shared_id(
        &ctx.frame_id,
        &ctx.document_id,
        backend_node_id,
    ))
}

fn transform_deep_payload(kind: &str, value: &Value, ctx: Option<&NodeContext>) -> Value {
    match kind {
        "array" | "set" | "htmlcollection" | "nodelist" => match value.as_array() {
            Some(items) => Value::Array(
                items
                    .iter()
                    .map(|item| transform_nested(item, ctx))
                    .collect(),
            ),
            None => value.clone(),
        },
        "object" | "map" => match value.as_array() {
            Some(entries) => Value::Array(
                entries
                    .iter()
                    .map(|entry| match entry.as_array() {
                        Some(pair) if pair.len() == 2 => {
                            let key = if pair[0].is_string() {
                                pair[0].clone()
                            } else {
                                transform_nested(&pair[0], ctx)
                            };
                            Value::Array(vec![key, transform_nested(&pair[1], ctx)])
                        }
                        _ => entry.clone(),
                    })
                    .collect(),
            ),
            None => value.clone(),
        },
        "node" => {
            let mut node = value.clone();
            if let Some(children) = node.get_mut("children").and_then(Value::as_array_mut) {
                let transformed: Vec<Value> =
                    children.iter().map(|child| transform_nested(child, ctx)).collect();
                *children = transformed;
            }
            node
        }
        _ => value.clone(),
    }
}

fn transform_nested(value: &Value, ctx: Option<&NodeContext>) -> Value {
    let Ok(deep) = serde_json::from_value::<DeepSerializedValue>(value.clone()) else {
        return value.clone();
    };
    let remote = deep_to_remote_value(&deep, ctx);
    serde_json::to_value(remote).unwrap_or_else(|_| value.clone())
}

/// Remote value from a plain remote object (no deep serialization).
pub fn remote_object_fallback(object: &RemoteObject) -> RemoteValue {
    match object.object_type.as_str() {
        "undefined" => RemoteValue::undefined(),
        "string" => RemoteValue::string(
            object
                .value
                .as_ref()
                .and_then(Value::as_str)
                .unwrap_or_default(),
        ),
        "boolean" => RemoteValue::boolean(
            object
                .value
                .as_ref()
                .and_then(Value::as_bool)
                .unwrap_or_default(),
        ),
        "bigint" => RemoteValue::bigint(
            object
                .unserializable_value
                .as_deref()
                .unwrap_or("0n")
                .trim_end_matches('n'),
        ),
        "number" => match (&object.value, object.unserializable_value.as_deref()) {
            (_, Some("NaN")) => RemoteValue::number(f64::NAN),
            (_, Some("-0")) => RemoteValue::number(-0.0),
            (_, Some("Infinity")) => RemoteValue::number(f64::INFINITY),
            (_, Some("-Infinity")) => RemoteValue::number(f64::NEG_INFINITY),
            (Some(value), _) => RemoteValue::number(value.as_f64().unwrap_or(0.0)),
            _ => RemoteValue::number(0.0),
        },
        "object" if object.value.as_ref().is_some_and(Value::is_null) => RemoteValue::null(),
        "function" => RemoteValue::of_kind("function"),
        "object" => {
            let kind = object.subtype.as_deref().unwrap_or("object");
            RemoteValue::of_kind(map_subtype(kind))
        }
        other => RemoteValue::of_kind(other.to_string()),
    }
}

fn map_subtype(subtype: &str) -> &str {
    match subtype {
        "null" => "null",
        "error" => "error",
        "promise" => "promise",
        "regexp" => "regexp",
        "date" => "date",
        "map" => "map",
        "set" => "set",
        "weakmap" => "weakmap",
        "weakset" => "weakset",
        "proxy" => "proxy",
        "typedarray" => "typedarray",
        "arraybuffer" => "arraybuffer",
        "array" => "array",
        "node" => "node",
        _ => "object",
    }
}

/// Convert CDP exception details into the BiDi form.
pub fn exception_to_bidi(
    details: &ExceptionDetails,
    ctx: Option<&NodeContext>,
) -> bidi_script::ExceptionDetails {
    let exception = details
        .exception
        .as_ref()
        .map(|object| remote_object_to_value(object, ctx))
        .unwrap_or_else(RemoteValue::undefined);
    let text = details
        .exception
        .as_ref()
        .and_then(|e| e.description.clone())
        .unwrap_or_else(|| details.text.clone());
    let stack_trace = details
        .stack_trace
        .as_ref()
        .map(|stack| StackTrace {
            call_frames: stack
                .call_frames
                .iter()
                .map(|frame| StackFrame {
                    column_number: frame.column_number,
                    function_name: frame.function_name.clone(),
                    line_number: frame.line_number,
                    url: frame.url.clone(),
                })
                .collect(),
        })
        .unwrap_or_default();
    bidi_script::ExceptionDetails {
        column_number: details.column_number,
        exception,
        line_number: details.line_number,
        stack_trace,
        text,
    }
}

#[cfg(test)]
mod tests;
