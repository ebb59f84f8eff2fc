//! Picker marker state
//!
//! Marker status is tracked per element in a side table and only written
//! onto class lists by [`MarkerTable::render`], so the document's own
//! classes never drive selection logic.

use std::collections::HashMap;

use bitflags::bitflags;
use selector_engine::{
    ElementSet, SelectorEngine, HIGHLIGHTED_MARKER, PREDICTED_MARKER, SELECTED_MARKER,
};
use serde::{Deserialize, Serialize};
use soulpick_dom::{Document, DomError, NodeId};
use tracing::debug;

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Markers: u8 {
        const SELECTED = 0b001;
        const PREDICTED = 0b010;
        const HIGHLIGHTED = 0b100;
    }
}

/// Class names rendered for each marker
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerClasses {
    pub selected: String,
    pub predicted: String,
    pub highlighted: String,
}

impl Default for MarkerClasses {
    fn default() -> Self {
        Self {
            selected: SELECTED_MARKER.to_string(),
            predicted: PREDICTED_MARKER.to_string(),
            highlighted: HIGHLIGHTED_MARKER.to_string(),
        }
    }
}

impl MarkerClasses {
    fn pairs(&self) -> [(Markers, &str); 3] {
        [
            (Markers::SELECTED, self.selected.as_str()),
            (Markers::PREDICTED, self.predicted.as_str()),
            (Markers::HIGHLIGHTED, self.highlighted.as_str()),
        ]
    }

    pub fn tokens(&self) -> [&str; 3] {
        [
            self.selected.as_str(),
            self.predicted.as_str(),
            self.highlighted.as_str(),
        ]
    }

    /// Selector engine that ignores the default marker classes, these
    /// marker classes and `extra`.
    pub fn engine<I, S>(&self, extra: I) -> SelectorEngine
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut engine = SelectorEngine::new();
        for class_name in self.tokens() {
            engine = engine.ignore_class(class_name);
        }
        for class_name in extra {
            engine = engine.ignore_class(class_name);
        }
        engine
    }
}

#[derive(Clone, Debug, Default)]
pub struct MarkerTable {
    entries: HashMap<NodeId, Markers>,
}

impl MarkerTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: NodeId) -> Markers {
        self.entries.get(&id).copied().unwrap_or_default()
    }

    pub fn set(&mut self, id: NodeId, flags: Markers, on: bool) {
        let entry = self.entries.entry(id).or_default();
        entry.set(flags, on);
        if entry.is_empty() {
            self.entries.remove(&id);
        }
    }

    /// Removes `flags` from every element.
    pub fn clear_flag(&mut self, flags: Markers) {
        self.entries.retain(|_, markers| {
            markers.remove(flags);
            !markers.is_empty()
        });
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Elements carrying any of `flags`.
    pub fn with_flag(&self, flags: Markers) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self
            .entries
            .iter()
            .filter(|(_, markers)| markers.intersects(flags))
            .map(|(id, _)| *id)
            .collect();
        ids.sort();
        ids
    }

    /// Syncs marker classes onto the document's class lists. Elements
    /// without markers lose any stale marker class. Returns the number of
    /// class edits made.
    pub fn render(&self, document: &mut Document, classes: &MarkerClasses) -> Result<usize, DomError> {
        let mut targets: ElementSet = document.elements().into_iter().collect();
        let mut tracked: Vec<NodeId> = self
            .entries
            .keys()
            .copied()
            .filter(|id| document.element(*id).is_some())
            .collect();
        tracked.sort();
        targets.extend(tracked);

        let mut edits = 0;
        for id in targets.iter() {
            let markers = self.get(id);
            for (flag, class_name) in classes.pairs() {
                let changed = if markers.contains(flag) {
                    document.add_class(id, class_name)?
                } else {
                    document.remove_class(id, class_name)?
                };
                if changed {
                    edits += 1;
                }
            }
        }
        debug!(edits, "markers rendered");
        Ok(edits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> (Document, Vec<NodeId>) {
        let mut doc = Document::new();
        let body = doc.append(doc.root(), "body", "").unwrap();
        let rows = (0..3)
            .map(|_| doc.append(body, "div", "row").unwrap())
            .collect();
        (doc, rows)
    }

    #[test]
    fn test_set_and_clear_flags() {
        let (_, rows) = page();
        let mut table = MarkerTable::new();
        table.set(rows[0], Markers::SELECTED, true);
        table.set(rows[0], Markers::HIGHLIGHTED, true);
        table.set(rows[1], Markers::PREDICTED, true);
        assert_eq!(table.get(rows[0]), Markers::SELECTED | Markers::HIGHLIGHTED);

        table.clear_flag(Markers::HIGHLIGHTED);
        assert_eq!(table.get(rows[0]), Markers::SELECTED);
        table.set(rows[1], Markers::PREDICTED, false);
        assert_eq!(table.with_flag(Markers::all()), vec![rows[0]]);
    }

    #[test]
    fn test_render_adds_and_removes_classes() {
        let (mut doc, rows) = page();
        let classes = MarkerClasses::default();
        let mut table = MarkerTable::new();
        table.set(rows[0], Markers::SELECTED, true);
        table.set(rows[1], Markers::PREDICTED, true);

        assert_eq!(table.render(&mut doc, &classes).unwrap(), 2);
        assert!(doc.has_class(rows[0], "isSelected"));
        assert!(doc.has_class(rows[1], "isPredicted"));
        assert!(doc.has_class(rows[1], "row"));

        table.clear();
        assert_eq!(table.render(&mut doc, &classes).unwrap(), 2);
        assert!(!doc.has_class(rows[0], "isSelected"));
        assert!(!doc.has_class(rows[1], "isPredicted"));
        assert_eq!(table.render(&mut doc, &classes).unwrap(), 0);
    }

    #[test]
    fn test_custom_class_names_feed_engine() {
        let (mut doc, rows) = page();
        let classes = MarkerClasses {
            selected: "picked".into(),
            ..MarkerClasses::default()
        };
        let mut table = MarkerTable::new();
        table.set(rows[2], Markers::SELECTED, true);
        table.render(&mut doc, &classes).unwrap();
        assert!(doc.has_class(rows[2], "picked"));

        let engine = classes.engine(["row"]);
        let selector = engine.selector_for(&doc.element(rows[2]).unwrap());
        assert_eq!(selector.to_string(), "DIV");
    }

    #[test]
    fn test_renamed_markers_still_ignore_defaults() {
        let (mut doc, rows) = page();
        doc.add_class(rows[0], "isSelected").unwrap();
        doc.add_class(rows[0], "picked").unwrap();
        let classes = MarkerClasses {
            selected: "picked".into(),
            ..MarkerClasses::default()
        };
        let engine = classes.engine(Vec::<String>::new());
        let selector = engine.selector_for(&doc.element(rows[0]).unwrap());
        assert_eq!(selector.to_string(), "DIV.row");
    }
}
