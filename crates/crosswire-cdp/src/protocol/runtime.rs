//! Runtime domain types.
//!
//! Remote evaluation, mirror objects and execution context lifecycle. The
//! mapper always requests deep serialization so results arrive in the
//! WebDriver-shaped form CDP already knows how to produce.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Unique script identifier.
pub type ScriptId = String;

/// Unique execution context identifier, scoped to the target.
pub type ExecutionContextId = i64;

/// Remote object identifier.
pub type RemoteObjectId = String;

/// Mirror object referencing the original JavaScript object.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteObject {
    /// Object type.
    #[serde(rename = "type")]
    pub object_type: String,
    /// Object subtype hint.
    pub subtype: Option<String>,
    /// Object class name.
    pub class_name: Option<String>,
    /// Remote object value when JSON-representable.
    pub value: Option<Value>,
    /// Primitive value that cannot be JSON-stringified.
    pub unserializable_value: Option<String>,
    /// String representation of the object.
    pub description: Option<String>,
    /// Unique object identifier for non-primitive values.
    pub object_id: Option<RemoteObjectId>,
    /// Deep serialized representation, present when requested.
    pub deep_serialized_value: Option<DeepSerializedValue>,
}

/// WebDriver-shaped deep serialization of a JavaScript value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeepSerializedValue {
    /// Value kind ("undefined", "number", "array", "node", ...).
    #[serde(rename = "type")]
    pub value_type: String,
    /// Kind-specific payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Object id when the value was additionally referenced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
    /// Set when maxDepth pruned a deeper structure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weak_local_object_reference: Option<i64>,
}

/// Serialization options for evaluate / callFunctionOn.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializationOptions {
    /// Serialization mode ("deep", "json", "idOnly").
    pub serialization: String,
    /// Depth limit for "deep".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<u64>,
    /// Embedder-specific parameters (e.g. includeShadowTree).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_parameters: Option<Value>,
}

impl SerializationOptions {
    /// Deep serialization with an optional depth cap.
    pub fn deep(max_depth: Option<u64>) -> Self {
        Self {
            serialization: "deep".to_string(),
            max_depth,
            additional_parameters: None,
        }
    }
}

/// Call argument for Runtime.callFunctionOn.
///
/// All fields optional; an empty argument passes `undefined`.
#[derive(Debug, Clone, Serialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CallArgument {
    /// JSON-representable value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Primitive that has no JSON representation ("NaN", "-0", "123n", ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unserializable_value: Option<String>,
    /// Remote object handle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_id: Option<RemoteObjectId>,
}

/// Stack trace captured at an exception or console call site.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackTrace {
    /// Call frames, topmost first.
    pub call_frames: Vec<CallFrame>,
}

/// One stack frame.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallFrame {
    /// Function name.
    pub function_name: String,
    /// Script id.
    pub script_id: ScriptId,
    /// Script URL.
    pub url: String,
    /// 0-based line number.
    pub line_number: i64,
    /// 0-based column number.
    pub column_number: i64,
}

/// Exception details.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionDetails {
    /// Exception id.
    pub exception_id: i64,
    /// Exception text.
    pub text: String,
    /// Line number of the exception location.
    pub line_number: i64,
    /// Column number of the exception location.
    pub column_number: i64,
    /// Script ID of the exception location.
    pub script_id: Option<ScriptId>,
    /// URL of the exception location.
    pub url: Option<String>,
    /// Stack trace if available.
    pub stack_trace: Option<StackTrace>,
    /// Exception object.
    pub exception: Option<RemoteObject>,
    /// Execution context ID.
    pub execution_context_id: Option<ExecutionContextId>,
}

/// Parameters for Runtime.evaluate.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateParams {
    /// Expression to evaluate.
    pub expression: String,
    /// Execution context to evaluate in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_id: Option<ExecutionContextId>,
    /// Whether to return the result by value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_by_value: Option<bool>,
    /// Whether a promise result is awaited.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub await_promise: Option<bool>,
    /// Whether command line API is available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_command_line_api: Option<bool>,
    /// Whether evaluation should be treated as user gesture.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_gesture: Option<bool>,
    /// Requested result serialization.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serialization_options: Option<SerializationOptions>,
}

/// Result of Runtime.evaluate.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateResult {
    /// Evaluation result.
    pub result: RemoteObject,
    /// Exception details if the evaluation threw.
    pub exception_details: Option<ExceptionDetails>,
}

/// Parameters for Runtime.callFunctionOn.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallFunctionOnParams {
    /// Declaration of the function to call.
    pub function_declaration: String,
    /// Object to call the function on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_id: Option<RemoteObjectId>,
    /// Call arguments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Vec<CallArgument>>,
    /// Execution context to call in, alternative to objectId.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_context_id: Option<ExecutionContextId>,
    /// Whether to return the result by value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_by_value: Option<bool>,
    /// Whether a promise result is awaited.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub await_promise: Option<bool>,
    /// Whether the call should be treated as user gesture.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_gesture: Option<bool>,
    /// Requested result serialization.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serialization_options: Option<SerializationOptions>,
}

/// Result of Runtime.callFunctionOn.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallFunctionOnResult {
    /// Call result.
    pub result: RemoteObject,
    /// Exception details if the call threw.
    pub exception_details: Option<ExceptionDetails>,
}

/// Parameters for Runtime.releaseObject.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseObjectParams {
    /// Handle to release.
    pub object_id: RemoteObjectId,
}

/// Execution context description.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionContextDescription {
    /// Numeric context id, scoped to the target.
    pub id: ExecutionContextId,
    /// Context origin.
    pub origin: String,
    /// Human readable name.
    pub name: String,
    /// Process-unique context id.
    pub unique_id: String,
    /// Embedder data about the context.
    pub aux_data: Option<ExecutionContextAuxData>,
}

/// Auxiliary data for execution contexts created for frames.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionContextAuxData {
    /// Frame the context belongs to.
    pub frame_id: Option<String>,
    /// Whether this is the frame's default context.
    pub is_default: Option<bool>,
    /// Context kind ("default", "isolated", "worker").
    #[serde(rename = "type")]
    pub context_type: Option<String>,
}

/// Event: Runtime.executionContextCreated
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutionContextCreatedEvent {
    /// Newly created execution context.
    pub context: ExecutionContextDescription,
}

/// Event: Runtime.executionContextDestroyed
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionContextDestroyedEvent {
    /// Numeric id of the destroyed context.
    pub execution_context_id: ExecutionContextId,
    /// Process-unique id of the destroyed context.
    pub execution_context_unique_id: Option<String>,
}

/// Event: Runtime.consoleAPICalled
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsoleApiCalledEvent {
    /// Console call kind ("log", "error", "warning", ...).
    #[serde(rename = "type")]
    pub call_type: String,
    /// Call arguments.
    pub args: Vec<RemoteObject>,
    /// Context the call was made from.
    pub execution_context_id: ExecutionContextId,
    /// Call timestamp in milliseconds since epoch.
    pub timestamp: f64,
    /// Stack trace captured at the call site.
    pub stack_trace: Option<StackTrace>,
}

/// Event: Runtime.exceptionThrown
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionThrownEvent {
    /// Timestamp of the exception in milliseconds since epoch.
    pub timestamp: f64,
    /// Exception details.
    pub exception_details: ExceptionDetails,
}
