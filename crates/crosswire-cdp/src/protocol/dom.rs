//! DOM domain types.
//!
//! Node resolution for shared references and file input population.

use serde::{Deserialize, Serialize};

use super::runtime::{RemoteObject, RemoteObjectId};

/// Backend node identifier, stable for the lifetime of the document.
pub type BackendNodeId = i64;

/// Parameters for DOM.resolveNode.
#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ResolveNodeParams {
    /// Backend node to resolve.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend_node_id: Option<BackendNodeId>,
    /// Execution context to resolve the node in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_context_id: Option<i64>,
}

/// Result of DOM.resolveNode.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveNodeResult {
    /// JavaScript object wrapper for the node.
    pub object: RemoteObject,
}

/// Parameters for DOM.setFileInputFiles.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetFileInputFilesParams {
    /// Absolute file paths to set.
    pub files: Vec<String>,
    /// Input element to populate, by backend node id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend_node_id: Option<BackendNodeId>,
    /// Input element to populate, by remote object id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_id: Option<RemoteObjectId>,
}

/// Parameters for DOM.describeNode.
#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DescribeNodeParams {
    /// Node to describe, by remote object id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_id: Option<RemoteObjectId>,
    /// Node to describe, by backend node id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend_node_id: Option<BackendNodeId>,
}

/// Result of DOM.describeNode.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribeNodeResult {
    /// Node description.
    pub node: Node,
}

/// Subset of DOM.Node the mapper consumes.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Node id in the agent's node map (0 when not pushed).
    pub node_id: i64,
    /// Backend node id.
    pub backend_node_id: BackendNodeId,
    /// Node type (1 element, 3 text, 9 document, ...).
    pub node_type: i64,
    /// Node name.
    pub node_name: String,
    /// Frame id for frame owner elements.
    pub frame_id: Option<String>,
}
