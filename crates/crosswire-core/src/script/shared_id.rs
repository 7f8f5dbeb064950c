//! Shared node references.
//!
//! A node crossing the protocol boundary is addressed as
//! `f.<frameId>.d.<documentId>.e.<backendNodeId>`: the frame, the loader
//! of the document the node belongs to, and the backend node id. The
//! reference stays valid exactly as long as that document is current.

use crosswire_bidi::{BidiError, ErrorCode};

/// Parsed form of a shared id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedNodeRef {
    /// Frame (browsing context) id.
    pub frame_id: String,
    /// Loader id of the owning document.
    pub document_id: String,
    /// Backend node id.
    pub backend_node_id: i64,
}

/// Format a shared id.
pub fn format_shared_id(frame_id: &str, document_id: &str, backend_node_id: i64) -> String {
    format!("f.{frame_id}.d.{document_id}.e.{backend_node_id}")
}

/// Parse a shared id back into its parts.
///
/// # Errors
///
/// `no such node` when the string does not have the expected shape.
pub fn parse_shared_id(shared_id: &str) -> Result<SharedNodeRef, BidiError> {
    let malformed =
        || BidiError::new(ErrorCode::NoSuchNode, format!("malformed sharedId {shared_id}"));

    let rest = shared_id.strip_prefix("f.").ok_or_else(malformed)?;
    let (frame_id, rest) = rest.split_once(".d.").ok_or_else(malformed)?;
    let (document_id, backend) = rest.split_once(".e.").ok_or_else(malformed)?;
    if frame_id.is_empty() || document_id.is_empty() {
        return Err(malformed());
    }
    let backend_node_id: i64 = backend.parse().map_err(|_| malformed())?;
    Ok(SharedNodeRef {
        frame_id: frame_id.to_string(),
        document_id: document_id.to_string(),
        backend_node_id,
    })
}
