//! Core types for the selector engine

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use soulpick_dom::NodeId;

/// Identity-keyed element set.
///
/// Membership is by [`NodeId`], so two structurally identical elements are
/// still distinct members. Iteration follows insertion order, which keeps the
/// combined selected/predicted sequence stable for rendering. Equality is set
/// equality and ignores order.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(into = "Vec<NodeId>", from = "Vec<NodeId>")]
pub struct ElementSet {
    order: Vec<NodeId>,
    members: HashSet<NodeId>,
}

impl ElementSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the element was already a member.
    pub fn insert(&mut self, id: NodeId) -> bool {
        if !self.members.insert(id) {
            return false;
        }
        self.order.push(id);
        true
    }

    /// Returns `false` if the element was not a member.
    pub fn remove(&mut self, id: NodeId) -> bool {
        if !self.members.remove(&id) {
            return false;
        }
        self.order.retain(|member| *member != id);
        true
    }

    /// Adds the element if absent, removes it if present. Returns whether the
    /// element is a member afterwards.
    pub fn toggle(&mut self, id: NodeId) -> bool {
        if self.remove(id) {
            false
        } else {
            self.insert(id)
        }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.members.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.order.iter().copied()
    }

    pub fn retain(&mut self, mut keep: impl FnMut(NodeId) -> bool) {
        let members = &mut self.members;
        self.order.retain(|id| {
            let kept = keep(*id);
            if !kept {
                members.remove(id);
            }
            kept
        });
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.members.clear();
    }

    pub fn to_vec(&self) -> Vec<NodeId> {
        self.order.clone()
    }

    pub fn is_disjoint(&self, other: &ElementSet) -> bool {
        self.members.is_disjoint(&other.members)
    }
}

impl PartialEq for ElementSet {
    fn eq(&self, other: &Self) -> bool {
        self.members == other.members
    }
}

impl Eq for ElementSet {}

impl FromIterator<NodeId> for ElementSet {
    fn from_iter<T: IntoIterator<Item = NodeId>>(iter: T) -> Self {
        let mut set = ElementSet::new();
        set.extend(iter);
        set
    }
}

impl Extend<NodeId> for ElementSet {
    fn extend<T: IntoIterator<Item = NodeId>>(&mut self, iter: T) {
        for id in iter {
            self.insert(id);
        }
    }
}

impl From<Vec<NodeId>> for ElementSet {
    fn from(ids: Vec<NodeId>) -> Self {
        ids.into_iter().collect()
    }
}

impl From<ElementSet> for Vec<NodeId> {
    fn from(set: ElementSet) -> Self {
        set.order
    }
}
