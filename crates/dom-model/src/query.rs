//! Live selector queries over a [`Document`]

use tracing::debug;

use crate::errors::DomError;
use crate::model::{Document, NodeId};
use crate::selector::{CompoundSelector, PathSelector};

impl Document {
    /// All connected elements matching `selector`, in document order.
    ///
    /// An empty selector matches nothing.
    pub fn query_all(&self, selector: &PathSelector) -> Vec<NodeId> {
        if selector.is_empty() {
            return Vec::new();
        }
        let matched: Vec<NodeId> = self
            .elements()
            .into_iter()
            .filter(|id| self.matches_chain(*id, selector.steps()))
            .collect();
        debug!(selector = %selector, matched = matched.len(), "query_all");
        matched
    }

    /// Parses `selector` and runs [`Document::query_all`].
    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>, DomError> {
        let parsed: PathSelector = selector.parse()?;
        Ok(self.query_all(&parsed))
    }

    pub fn matches(&self, id: NodeId, selector: &PathSelector) -> bool {
        !selector.is_empty() && self.matches_chain(id, selector.steps())
    }

    /// Right-to-left descendant matching. Taking the nearest matching
    /// ancestor for each step is sufficient when every combinator is a
    /// descendant combinator.
    fn matches_chain(&self, id: NodeId, steps: &[CompoundSelector]) -> bool {
        let Some((leaf, rest)) = steps.split_last() else {
            return false;
        };
        if !self.matches_step(id, leaf) {
            return false;
        }

        let mut current = id;
        for step in rest.iter().rev() {
            let mut cursor = self.parent_element(current);
            let mut found = None;
            while let Some(parent) = cursor {
                if self.matches_step(parent, step) {
                    found = Some(parent);
                    break;
                }
                cursor = self.parent_element(parent);
            }
            let Some(matched) = found else {
                return false;
            };
            current = matched;
        }
        true
    }

    fn matches_step(&self, id: NodeId, step: &CompoundSelector) -> bool {
        self.element(id)
            .map(|element| step.matches(&element))
            .unwrap_or(false)
    }
}
