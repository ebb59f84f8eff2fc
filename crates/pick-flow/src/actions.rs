//! [`ElementActions`] over the in-memory document

use soulpick_dom::{Document, NodeId};
use tracing::debug;

use crate::errors::ActionError;
use crate::ports::ElementActions;

/// Attribute written by [`ElementActions::set_value`].
pub const VALUE_ATTRIBUTE: &str = "value";

impl ElementActions for Document {
    fn click(&mut self, id: NodeId) -> Result<(), ActionError> {
        Ok(Document::click(self, id)?)
    }

    fn set_value(&mut self, id: NodeId, value: &str) -> Result<(), ActionError> {
        if !self.is_connected(id) {
            return Err(ActionError::TargetGone(id));
        }
        self.set_attr(id, VALUE_ATTRIBUTE, value)?;
        debug!(node = %id, "value set");
        Ok(())
    }
}
