//! script module types.
//!
//! Value model for remote evaluation: client-supplied [`LocalValue`]s go
//! down into the realm, realm results come back as [`RemoteValue`]s with
//! optional ownership handles.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Realm identifier (CDP execution context unique id).
pub type RealmId = String;

/// Ownership handle for a remote object.
pub type Handle = String;

/// Serialized node reference, `f.<frameId>.d.<documentId>.e.<backendNodeId>`.
pub type SharedId = String;

/// Reference to a remote object or node.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RemoteReference {
    /// Ownership handle, when the object was retained.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle: Option<Handle>,
    /// Node reference, when the object is a DOM node.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_id: Option<SharedId>,
}

/// A value the client sends into a realm.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum LocalValue {
    /// A value constructed from the payload. Tried first: references carry
    /// no `type` tag, so anything tagged parses here.
    Typed(TypedLocalValue),
    /// Reference to something already living in the realm.
    Reference(RemoteReference),
}

/// Tagged local value kinds.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TypedLocalValue {
    /// `undefined`.
    Undefined,
    /// `null`.
    Null,
    /// A string.
    String {
        /// The string.
        value: String,
    },
    /// A number, finite or special.
    Number {
        /// Finite numbers arrive as JSON numbers, specials as strings.
        value: NumberValue,
    },
    /// A boolean.
    Boolean {
        /// The boolean.
        value: bool,
    },
    /// A bigint, string-encoded.
    Bigint {
        /// Decimal digits.
        value: String,
    },
    /// An array.
    Array {
        /// Element values.
        value: Vec<LocalValue>,
    },
    /// A plain object.
    Object {
        /// Entries; keys are strings or local values.
        value: Vec<(ObjectKey, LocalValue)>,
    },
    /// A Map.
    Map {
        /// Entries; keys are strings or local values.
        value: Vec<(ObjectKey, LocalValue)>,
    },
    /// A Set.
    Set {
        /// Member values.
        value: Vec<LocalValue>,
    },
    /// A Date, ISO-8601 encoded.
    Date {
        /// ISO date string.
        value: String,
    },
    /// A RegExp.
    #[serde(rename = "regexp")]
    RegExp {
        /// Pattern and flags.
        value: RegExpValue,
    },
    /// A message channel; accepted by the parser, rejected at dispatch.
    Channel {
        /// Channel properties, uninterpreted.
        value: Value,
    },
}

/// A map/object key: plain string or arbitrary local value.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ObjectKey {
    /// String key.
    String(String),
    /// Non-string key.
    Value(Box<LocalValue>),
}

/// A number that may be one of the non-JSON specials.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum NumberValue {
    /// Finite number.
    Finite(f64),
    /// "NaN", "-0", "Infinity" or "-Infinity".
    Special(SpecialNumber),
}

/// Non-JSON-representable numbers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SpecialNumber {
    /// Not a number.
    #[serde(rename = "NaN")]
    NaN,
    /// Negative zero.
    #[serde(rename = "-0")]
    NegativeZero,
    /// Positive infinity.
    #[serde(rename = "Infinity")]
    Infinity,
    /// Negative infinity.
    #[serde(rename = "-Infinity")]
    NegativeInfinity,
}

/// RegExp payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegExpValue {
    /// Source pattern.
    pub pattern: String,
    /// Flags string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<String>,
}

/// A value the realm sends back to the client.
///
/// Kept as a flat struct with a kind tag: every kind uses a subset of the
/// optional fields, and serialization skips the rest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct RemoteValue {
    /// Value kind ("undefined", "number", "array", "node", ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// Kind-specific payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Ownership handle, present when the result was retained.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle: Option<Handle>,
    /// Node reference, for node values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_id: Option<SharedId>,
    /// Marker correlating multiple occurrences of one object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_id: Option<String>,
}

impl RemoteValue {
    /// A value with only a kind tag.
    pub fn of_kind(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Self::default()
        }
    }

    /// A kind with a payload.
    pub fn with_value(kind: impl Into<String>, value: Value) -> Self {
        Self {
            kind: kind.into(),
            value: Some(value),
            ..Self::default()
        }
    }

    /// `undefined`.
    pub fn undefined() -> Self {
        Self::of_kind("undefined")
    }

    /// `null`.
    pub fn null() -> Self {
        Self::of_kind("null")
    }

    /// A string value.
    pub fn string(s: impl Into<String>) -> Self {
        Self::with_value("string", Value::String(s.into()))
    }

    /// A boolean value.
    pub fn boolean(b: bool) -> Self {
        Self::with_value("boolean", Value::Bool(b))
    }

    /// A number, encoding the non-JSON specials as strings.
    pub fn number(n: f64) -> Self {
        let value = if n.is_nan() {
            Value::String("NaN".to_string())
        } else if n.is_infinite() {
            if n > 0.0 {
                Value::String("Infinity".to_string())
            } else {
                Value::String("-Infinity".to_string())
            }
        } else if n == 0.0 && n.is_sign_negative() {
            Value::String("-0".to_string())
        } else {
            serde_json::Number::from_f64(n).map_or(Value::Null, Value::Number)
        };
        Self::with_value("number", value)
    }

    /// A bigint, string-encoded.
    pub fn bigint(digits: impl Into<String>) -> Self {
        Self::with_value("bigint", Value::String(digits.into()))
    }
}

/// Where a script runs: a realm directly, or a context's default/sandbox
/// realm.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Target {
    /// By realm id.
    Realm {
        /// The realm.
        realm: RealmId,
    },
    /// By browsing context, optionally in a named sandbox.
    Context {
        /// The browsing context.
        context: String,
        /// Sandbox name.
        sandbox: Option<String>,
    },
}

/// Result ownership for evaluation results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum ResultOwnership {
    /// Retain the result and return a handle.
    Root,
    /// Do not retain the result.
    #[default]
    None,
}

/// Serialization options for evaluation results.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SerializationOptions {
    /// Maximum depth of serialized object trees.
    pub max_object_depth: Option<u64>,
    /// Maximum depth of serialized DOM trees.
    pub max_dom_depth: Option<u64>,
    /// Shadow tree inclusion ("none", "open", "all").
    pub include_shadow_tree: Option<String>,
}

/// Parameters for script.evaluate.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateParams {
    /// Expression to evaluate.
    pub expression: String,
    /// Where to evaluate.
    pub target: Target,
    /// Whether to await a promise result.
    pub await_promise: bool,
    /// Result ownership.
    #[serde(default)]
    pub result_ownership: ResultOwnership,
    /// Result serialization options.
    #[serde(default)]
    pub serialization_options: SerializationOptions,
    /// Whether to evaluate with a user gesture.
    #[serde(default)]
    pub user_activation: bool,
}

/// Parameters for script.callFunction.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallFunctionParams {
    /// Declaration of the function to call.
    pub function_declaration: String,
    /// Where to call.
    pub target: Target,
    /// Whether to await a promise result.
    pub await_promise: bool,
    /// Arguments passed to the function.
    #[serde(default)]
    pub arguments: Vec<LocalValue>,
    /// `this` for the call.
    pub this: Option<LocalValue>,
    /// Result ownership.
    #[serde(default)]
    pub result_ownership: ResultOwnership,
    /// Result serialization options.
    #[serde(default)]
    pub serialization_options: SerializationOptions,
    /// Whether to call with a user gesture.
    #[serde(default)]
    pub user_activation: bool,
}

/// Parameters for script.disown.
#[derive(Debug, Clone, Deserialize)]
pub struct DisownParams {
    /// Handles to release.
    pub handles: Vec<Handle>,
    /// Realm owning the handles.
    pub target: Target,
}

/// Parameters for script.getRealms.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GetRealmsParams {
    /// Restrict to realms of this context.
    pub context: Option<String>,
    /// Restrict to realms of this type.
    #[serde(rename = "type")]
    pub realm_type: Option<RealmType>,
}

/// Realm kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RealmType {
    /// A window (frame) realm.
    Window,
    /// A dedicated worker realm.
    DedicatedWorker,
    /// A shared worker realm.
    SharedWorker,
    /// A service worker realm.
    ServiceWorker,
    /// A worklet realm.
    Worklet,
}

/// Description of one realm, as returned by getRealms and realmCreated.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RealmInfo {
    /// Realm id.
    pub realm: RealmId,
    /// Realm origin.
    pub origin: String,
    /// Realm kind.
    #[serde(rename = "type")]
    pub realm_type: RealmType,
    /// Owning browsing context, for window realms.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Sandbox name, for sandboxed window realms.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sandbox: Option<String>,
}

/// Result of script.getRealms.
#[derive(Debug, Clone, Serialize)]
pub struct GetRealmsResult {
    /// Matching realms.
    pub realms: Vec<RealmInfo>,
}

/// Exception details in an evaluate result.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionDetails {
    /// Column of the throw site.
    pub column_number: i64,
    /// The thrown value.
    pub exception: RemoteValue,
    /// Line of the throw site.
    pub line_number: i64,
    /// Stack trace of the throw site.
    pub stack_trace: StackTrace,
    /// Exception text.
    pub text: String,
}

/// A captured stack trace.
#[derive(Debug, Clone, Serialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StackTrace {
    /// Frames, topmost first.
    pub call_frames: Vec<StackFrame>,
}

/// One stack frame.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StackFrame {
    /// Column number.
    pub column_number: i64,
    /// Function name.
    pub function_name: String,
    /// Line number.
    pub line_number: i64,
    /// Script URL.
    pub url: String,
}

/// Result of script.evaluate / script.callFunction.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EvaluateResult {
    /// The script completed.
    Success {
        /// The completion value.
        result: RemoteValue,
        /// Realm the script ran in.
        realm: RealmId,
    },
    /// The script threw.
    Exception {
        /// Details of the thrown value.
        exception_details: ExceptionDetails,
        /// Realm the script ran in.
        realm: RealmId,
    },
}

/// Parameters for script.addPreloadScript.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPreloadScriptParams {
    /// Function declaration to run at document start.
    pub function_declaration: String,
    /// Arguments for the declaration (channels unsupported).
    #[serde(default)]
    pub arguments: Vec<Value>,
    /// Restrict to these top-level contexts.
    pub contexts: Option<Vec<String>>,
    /// Restrict to these user contexts.
    pub user_contexts: Option<Vec<String>>,
    /// Sandbox to run in.
    pub sandbox: Option<String>,
}

/// Result of script.addPreloadScript.
#[derive(Debug, Clone, Serialize)]
pub struct AddPreloadScriptResult {
    /// Id of the installed script.
    pub script: String,
}

/// Parameters for script.removePreloadScript.
#[derive(Debug, Clone, Deserialize)]
pub struct RemovePreloadScriptParams {
    /// Id of the script to remove.
    pub script: String,
}

/// Serializable realm-destroyed event payload.
#[derive(Debug, Clone, Serialize)]
pub struct RealmDestroyedParams {
    /// The destroyed realm.
    pub realm: RealmId,
}

#[cfg(test)]
mod tests;
