//! Selector derivation and prediction
//!
//! An element's "shape" is its tag plus its structural class tokens, chained
//! with the shapes of all of its ancestors. Two elements with the same shape
//! anywhere in the document are treated as equivalent; attributes, text and
//! sibling position are ignored.

use std::collections::HashSet;

use soulpick_dom::{CompoundSelector, Document, ElementRef, NodeId, PathSelector};
use tracing::debug;

use crate::types::ElementSet;

pub const SELECTED_MARKER: &str = "isSelected";
pub const PREDICTED_MARKER: &str = "isPredicted";
pub const HIGHLIGHTED_MARKER: &str = "isHighlighted";

/// Marker classes the picker may render onto elements. They describe picker
/// state, not document structure.
pub const DEFAULT_MARKER_CLASSES: [&str; 3] =
    [SELECTED_MARKER, PREDICTED_MARKER, HIGHLIGHTED_MARKER];

#[derive(Clone, Debug)]
pub struct SelectorEngine {
    ignored_classes: HashSet<String>,
}

impl Default for SelectorEngine {
    fn default() -> Self {
        Self::with_ignored_classes(DEFAULT_MARKER_CLASSES)
    }
}

impl SelectorEngine {
    /// Engine that ignores the default marker classes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine that ignores exactly `classes`.
    pub fn with_ignored_classes<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ignored_classes: classes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn ignore_class(mut self, class_name: impl Into<String>) -> Self {
        self.ignored_classes.insert(class_name.into());
        self
    }

    pub fn is_ignored(&self, class_name: &str) -> bool {
        self.ignored_classes.contains(class_name)
    }

    /// Tag plus structural classes, e.g. `LI.task.open`.
    pub fn selector_for(&self, element: &ElementRef<'_>) -> CompoundSelector {
        let mut seen = HashSet::new();
        element
            .classes()
            .filter(|token| !self.is_ignored(token))
            .filter(|token| seen.insert(*token))
            .fold(CompoundSelector::new(element.node_name()), |selector, token| {
                selector.with_class(token)
            })
    }

    /// Root-to-leaf chain of `selector_for` over the element's ancestors and
    /// the element itself.
    pub fn path_selector_for(&self, element: &ElementRef<'_>) -> PathSelector {
        let mut steps: Vec<CompoundSelector> = element
            .ancestors()
            .iter()
            .rev()
            .map(|ancestor| self.selector_for(ancestor))
            .collect();
        steps.push(self.selector_for(element));
        PathSelector::new(steps)
    }

    /// Every element in the owning document with the same path shape, in
    /// document order. Includes the element itself while it is connected.
    pub fn similar_elements(&self, element: &ElementRef<'_>) -> Vec<NodeId> {
        let path = self.path_selector_for(element);
        element.document().query_all(&path)
    }

    /// Union of similar elements over `selected`, minus `selected` itself.
    ///
    /// Ids that no longer resolve to an element of `document` are skipped.
    pub fn predict(&self, document: &Document, selected: &ElementSet) -> ElementSet {
        let mut predicted = ElementSet::new();
        for id in selected.iter() {
            let Some(element) = document.element(id) else {
                debug!(node = %id, "selected node is not an element of this document; skipping");
                continue;
            };
            predicted.extend(self.similar_elements(&element));
        }
        predicted.retain(|id| !selected.contains(id));
        debug!(
            selected = selected.len(),
            predicted = predicted.len(),
            "prediction recomputed"
        );
        predicted
    }
}
