//! Bulk action error types

use soulpick_dom::{DomError, NodeId};
use thiserror::Error;

/// Failure of a single element action during a run
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// Target no longer exists in the connected document
    #[error("target {0} is gone from the document")]
    TargetGone(NodeId),

    /// Target exists but refused the action
    #[error("target {0} rejected the action: {1}")]
    Rejected(NodeId, String),

    /// Underlying document error
    #[error("document error: {0}")]
    Dom(DomError),
}

impl From<DomError> for ActionError {
    fn from(err: DomError) -> Self {
        match err {
            DomError::UnknownNode(id) | DomError::Detached(id) => ActionError::TargetGone(id),
            DomError::NotAnElement(id) => {
                ActionError::Rejected(id, "node is not an element".to_string())
            }
            other => ActionError::Dom(other),
        }
    }
}
