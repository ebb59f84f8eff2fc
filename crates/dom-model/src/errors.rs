//! Error types for the document model

use thiserror::Error;

use crate::model::NodeId;

/// Document error enumeration
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomError {
    /// Node id does not belong to this document
    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),

    /// Node exists but is the document node, not an element
    #[error("Node {0} is not an element")]
    NotAnElement(NodeId),

    /// Element was detached from the tree
    #[error("Node {0} is not connected to the document")]
    Detached(NodeId),

    /// Empty or malformed tag name
    #[error("Invalid tag name: {0:?}")]
    InvalidTag(String),

    /// Tree mutation would produce a cycle or touch the document node
    #[error("Hierarchy request failed: {0}")]
    Hierarchy(String),

    /// Selector outside the supported tag/class/descendant subset
    #[error("Unsupported selector: {0}")]
    UnsupportedSelector(String),

    /// Node id could not be parsed
    #[error("Invalid node id: {0:?}")]
    InvalidNodeId(String),

    /// Snapshot (de)serialization failed
    #[error("Snapshot error: {0}")]
    Snapshot(String),
}

impl From<serde_json::Error> for DomError {
    fn from(err: serde_json::Error) -> Self {
        DomError::Snapshot(err.to_string())
    }
}
