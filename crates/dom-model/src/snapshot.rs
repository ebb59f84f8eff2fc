//! JSON snapshots of a document
//!
//! A snapshot is a single root element with nested children:
//!
//! ```json
//! { "tag": "body", "children": [ { "tag": "div", "attrs": { "class": "item" } } ] }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::DomError;
use crate::model::{Document, NodeId};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub tag: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSnapshot>,
}

impl NodeSnapshot {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: BTreeMap::new(),
            text: None,
            children: Vec::new(),
        }
    }

    pub fn with_class(self, class: impl Into<String>) -> Self {
        self.with_attr("class", class)
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_child(mut self, child: NodeSnapshot) -> Self {
        self.children.push(child);
        self
    }
}

impl Document {
    /// Builds a document whose single top-level element is `root`.
    pub fn from_snapshot(root: &NodeSnapshot) -> Result<Self, DomError> {
        let mut doc = Document::new();
        let mut pending = vec![(doc.root(), root)];
        while let Some((parent, snapshot)) = pending.pop() {
            let id = doc.create_element(parent, &snapshot.tag, snapshot.attrs.clone())?;
            if let Some(text) = &snapshot.text {
                doc.set_text(id, text.clone())?;
            }
            // reversed so children are created, and therefore numbered, in order
            for child in snapshot.children.iter().rev() {
                pending.push((id, child));
            }
        }
        Ok(doc)
    }

    pub fn from_json_str(json: &str) -> Result<Self, DomError> {
        let snapshot: NodeSnapshot = serde_json::from_str(json)?;
        Self::from_snapshot(&snapshot)
    }

    /// Snapshot of the first top-level element, if any.
    pub fn to_snapshot(&self) -> Option<NodeSnapshot> {
        self.children(self.root())
            .iter()
            .find(|id| self.element(**id).is_some())
            .map(|id| self.snapshot_of(*id))
    }

    pub fn to_json_string_pretty(&self) -> Result<String, DomError> {
        let snapshot = self
            .to_snapshot()
            .ok_or_else(|| DomError::Snapshot("document has no element".into()))?;
        Ok(serde_json::to_string_pretty(&snapshot)?)
    }

    fn snapshot_of(&self, id: NodeId) -> NodeSnapshot {
        let Some(element) = self.element(id) else {
            return NodeSnapshot::new("#document");
        };
        NodeSnapshot {
            tag: element.tag_name().to_string(),
            attrs: element.attrs().clone(),
            text: element.text().map(ToOwned::to_owned),
            children: self
                .children(id)
                .iter()
                .filter(|child| self.element(**child).is_some())
                .map(|child| self.snapshot_of(*child))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"{
        "tag": "body",
        "children": [
            { "tag": "h1", "text": "Inbox" },
            { "tag": "div", "attrs": { "class": "row" }, "children": [
                { "tag": "input", "attrs": { "class": "check", "type": "checkbox" } }
            ] },
            { "tag": "div", "attrs": { "class": "row" } }
        ]
    }"#;

    #[test]
    fn test_ids_follow_document_order() {
        let doc = Document::from_json_str(PAGE).unwrap();
        let ids: Vec<usize> = doc.elements().iter().map(|id| id.index()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(doc.element(NodeId(4)).unwrap().tag_name(), "input");
        assert_eq!(doc.element(NodeId(2)).unwrap().text(), Some("Inbox"));
    }

    #[test]
    fn test_snapshot_reflects_mutations() {
        let mut doc = Document::from_json_str(PAGE).unwrap();
        doc.set_attr(NodeId(4), "value", "yes").unwrap();
        doc.detach(NodeId(5)).unwrap();

        let snapshot = doc.to_snapshot().unwrap();
        assert_eq!(snapshot.children.len(), 2);
        assert_eq!(
            snapshot.children[1].children[0].attrs.get("value"),
            Some(&"yes".to_string())
        );
    }

    #[test]
    fn test_invalid_json_is_snapshot_error() {
        let err = Document::from_json_str("{ \"children\": [] }").unwrap_err();
        assert!(matches!(err, DomError::Snapshot(_)));
        let err = Document::from_json_str("{ \"tag\": \"\" }").unwrap_err();
        assert!(matches!(err, DomError::InvalidTag(_)));
    }
}
