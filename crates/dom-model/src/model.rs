use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::DomError;

/// Stable identity of a node inside one [`Document`].
///
/// Ids are arena indices and are never reused, so an id keeps pointing at the
/// same node even after the node is detached.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl FromStr for NodeId {
    type Err = DomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
        digits
            .parse::<usize>()
            .map(NodeId)
            .map_err(|_| DomError::InvalidNodeId(s.to_string()))
    }
}

#[derive(Clone, Debug)]
enum NodeKind {
    Document,
    Element(Element),
}

#[derive(Clone, Debug)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct Element {
    pub(crate) tag_name: String,
    pub(crate) attrs: BTreeMap<String, String>,
    pub(crate) text: Option<String>,
}

/// In-memory document tree.
///
/// Node 0 is the document node; elements hang below it. The document also
/// keeps an activation log so click dispatches can be observed.
#[derive(Clone, Debug)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    activations: Vec<NodeId>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                kind: NodeKind::Document,
            }],
            root: NodeId(0),
            activations: Vec::new(),
        }
    }

    /// The document node. It has no tag and never matches a selector.
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    /// Creates an element under `parent` and returns its id.
    pub fn create_element(
        &mut self,
        parent: NodeId,
        tag_name: &str,
        attrs: BTreeMap<String, String>,
    ) -> Result<NodeId, DomError> {
        self.node(parent)?;
        let tag_name = tag_name.trim();
        if tag_name.is_empty() || tag_name.chars().any(char::is_whitespace) {
            return Err(DomError::InvalidTag(tag_name.to_string()));
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: Some(parent),
            children: Vec::new(),
            kind: NodeKind::Element(Element {
                tag_name: tag_name.to_string(),
                attrs,
                text: None,
            }),
        });
        self.nodes[parent.0].children.push(id);
        Ok(id)
    }

    /// Shorthand for an element with an optional `class` attribute.
    pub fn append(&mut self, parent: NodeId, tag_name: &str, class: &str) -> Result<NodeId, DomError> {
        let mut attrs = BTreeMap::new();
        if !class.trim().is_empty() {
            attrs.insert("class".to_string(), class.to_string());
        }
        self.create_element(parent, tag_name, attrs)
    }

    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) -> Result<(), DomError> {
        self.element_mut(id)?.text = Some(text.into());
        Ok(())
    }

    /// Removes a node from its parent. The node and its subtree stay in the
    /// arena, so ids held elsewhere remain valid but stop matching queries.
    pub fn detach(&mut self, id: NodeId) -> Result<(), DomError> {
        if id == self.root {
            return Err(DomError::Hierarchy("cannot detach the document node".into()));
        }
        self.node(id)?;
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|child| *child != id);
        }
        debug!(node = %id, "detached node");
        Ok(())
    }

    /// Moves `child` (and its subtree) to the end of `parent`'s children.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.node(parent)?;
        self.element(child).ok_or(DomError::NotAnElement(child))?;
        if self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::Hierarchy(format!(
                "{child} is an ancestor of {parent}"
            )));
        }
        self.detach(child)?;
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        Ok(())
    }

    pub fn element(&self, id: NodeId) -> Option<ElementRef<'_>> {
        match &self.nodes.get(id.0)?.kind {
            NodeKind::Element(element) => Some(ElementRef {
                document: self,
                id,
                element,
            }),
            NodeKind::Document => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0)?.parent
    }

    /// Parent when it is an element; `None` for top-level elements.
    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).filter(|parent| self.element(*parent).is_some())
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.0)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_connected(&self, id: NodeId) -> bool {
        self.is_inclusive_ancestor(self.root, id)
    }

    /// True when `ancestor` is `id` or one of its ancestors.
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    /// Connected elements in document (pre-)order.
    pub fn elements(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if self.element(id).is_some() {
                out.push(id);
            }
            for child in self.nodes[id.0].children.iter().rev() {
                stack.push(*child);
            }
        }
        out
    }

    pub fn element_count(&self) -> usize {
        self.elements().len()
    }

    pub fn has_class(&self, id: NodeId, class_name: &str) -> bool {
        self.element(id)
            .map(|element| element.classes().any(|token| token == class_name))
            .unwrap_or(false)
    }

    /// Adds a class token; returns `false` when it was already present.
    pub fn add_class(&mut self, id: NodeId, class_name: &str) -> Result<bool, DomError> {
        let element = self.element_mut(id)?;
        let mut tokens = class_tokens(element.attrs.get("class").map(String::as_str));
        if tokens.iter().any(|token| token == class_name) {
            return Ok(false);
        }
        tokens.push(class_name.to_string());
        set_class_attr(element, &tokens);
        Ok(true)
    }

    /// Removes a class token; returns `false` when it was absent.
    pub fn remove_class(&mut self, id: NodeId, class_name: &str) -> Result<bool, DomError> {
        let element = self.element_mut(id)?;
        let mut tokens = class_tokens(element.attrs.get("class").map(String::as_str));
        let before = tokens.len();
        tokens.retain(|token| token != class_name);
        if tokens.len() == before {
            return Ok(false);
        }
        set_class_attr(element, &tokens);
        Ok(true)
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.nodes.get(id.0)?.kind {
            NodeKind::Element(element) => element.attrs.get(name).map(String::as_str),
            NodeKind::Document => None,
        }
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        self.element_mut(id)?
            .attrs
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) -> Result<Option<String>, DomError> {
        Ok(self.element_mut(id)?.attrs.remove(name))
    }

    /// Dispatches a click on a connected element and records it in the
    /// activation log.
    pub fn click(&mut self, id: NodeId) -> Result<(), DomError> {
        self.element(id).ok_or_else(|| self.missing(id))?;
        if !self.is_connected(id) {
            return Err(DomError::Detached(id));
        }
        self.activations.push(id);
        debug!(node = %id, "click dispatched");
        Ok(())
    }

    /// Elements clicked so far, in dispatch order.
    pub fn activations(&self) -> &[NodeId] {
        &self.activations
    }

    pub fn clear_activations(&mut self) {
        self.activations.clear();
    }

    fn node(&self, id: NodeId) -> Result<&Node, DomError> {
        self.nodes.get(id.0).ok_or(DomError::UnknownNode(id))
    }

    fn missing(&self, id: NodeId) -> DomError {
        if self.contains(id) {
            DomError::NotAnElement(id)
        } else {
            DomError::UnknownNode(id)
        }
    }

    pub(crate) fn element_mut(&mut self, id: NodeId) -> Result<&mut Element, DomError> {
        let missing = self.missing(id);
        match self.nodes.get_mut(id.0).map(|node| &mut node.kind) {
            Some(NodeKind::Element(element)) => Ok(element),
            _ => Err(missing),
        }
    }
}

/// Borrowed view of one element together with its owning document.
#[derive(Clone, Copy, Debug)]
pub struct ElementRef<'a> {
    document: &'a Document,
    id: NodeId,
    element: &'a Element,
}

impl<'a> ElementRef<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn document(&self) -> &'a Document {
        self.document
    }

    pub fn tag_name(&self) -> &'a str {
        &self.element.tag_name
    }

    /// Upper-cased tag name, as reported by `nodeName` for HTML elements.
    pub fn node_name(&self) -> String {
        self.element.tag_name.to_ascii_uppercase()
    }

    /// Class tokens in attribute order; runs of whitespace are collapsed.
    pub fn classes(&self) -> impl Iterator<Item = &'a str> {
        self.element
            .attrs
            .get("class")
            .map(String::as_str)
            .unwrap_or("")
            .split_ascii_whitespace()
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.attrs.get(name).map(String::as_str)
    }

    pub fn attrs(&self) -> &'a BTreeMap<String, String> {
        &self.element.attrs
    }

    pub fn text(&self) -> Option<&'a str> {
        self.element.text.as_deref()
    }

    pub fn parent(&self) -> Option<ElementRef<'a>> {
        self.document
            .parent_element(self.id)
            .and_then(|parent| self.document.element(parent))
    }

    /// Element ancestors, nearest first.
    pub fn ancestors(&self) -> Vec<ElementRef<'a>> {
        let mut out = Vec::new();
        let mut cursor = self.parent();
        while let Some(current) = cursor {
            cursor = current.parent();
            out.push(current);
        }
        out
    }
}

fn class_tokens(class_attr: Option<&str>) -> Vec<String> {
    class_attr
        .map(|value| value.split_ascii_whitespace().map(ToOwned::to_owned).collect())
        .unwrap_or_default()
}

fn set_class_attr(element: &mut Element, tokens: &[String]) {
    if tokens.is_empty() {
        element.attrs.remove("class");
    } else {
        element.attrs.insert("class".to_string(), tokens.join(" "));
    }
}
