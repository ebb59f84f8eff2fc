//! Picker configuration
//!
//! Loaded from YAML by `cli::runtime::load_config`; every field has a
//! default so partial files are accepted.

use std::env;
use std::sync::Arc;

use pick_flow::{MarkerClasses, NoticeLog, Notifier, WorkflowController, DEFAULT_CLICK_NOTICE};
use selector_engine::SelectorEngine;
use serde::{Deserialize, Serialize};
use soulpick_dom::{Document, NodeId, PathSelector};
use tracing::{info, warn};

use crate::cli::output::OutputFormat;

pub const CLICK_NOTICE_ENV: &str = "SOULPICK_CLICK_NOTICE";
pub const HOST_SELECTOR_ENV: &str = "SOULPICK_HOST_SELECTOR";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Class names rendered for selected, predicted and highlighted elements
    pub markers: MarkerClasses,
    /// Notice shown when a click is requested with nothing selected
    pub click_notice: String,
    /// Extra class tokens left out of structural selectors
    pub ignored_classes: Vec<String>,
    /// Selector of the picker's own UI subtree
    pub host_selector: Option<String>,
    /// Output format used when `--output` is not given
    pub output: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            markers: MarkerClasses::default(),
            click_notice: DEFAULT_CLICK_NOTICE.to_string(),
            ignored_classes: Vec::new(),
            host_selector: None,
            output: OutputFormat::Human,
        }
    }
}

impl Config {
    /// Environment values win over the file.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(notice) = env::var(CLICK_NOTICE_ENV) {
            info!("Using click notice from {}", CLICK_NOTICE_ENV);
            self.click_notice = notice;
        }
        if let Ok(selector) = env::var(HOST_SELECTOR_ENV) {
            self.host_selector = (!selector.trim().is_empty()).then_some(selector);
        }
    }

    pub fn engine(&self) -> SelectorEngine {
        self.markers.engine(self.ignored_classes.iter().cloned())
    }

    /// First element matching `host_selector`, if configured and present.
    pub fn host_root(&self, document: &Document) -> Option<NodeId> {
        let raw = self.host_selector.as_deref()?;
        let selector: PathSelector = match raw.parse() {
            Ok(selector) => selector,
            Err(err) => {
                warn!(selector = raw, %err, "ignoring invalid host selector");
                return None;
            }
        };
        document.query_all(&selector).into_iter().next()
    }

    /// Controller wired with this configuration.
    pub fn controller(&self, document: &Document, notifier: Arc<dyn Notifier>) -> WorkflowController {
        let controller = WorkflowController::new(notifier)
            .with_engine(self.engine())
            .with_click_notice(self.click_notice.clone());
        match self.host_root(document) {
            Some(host) => controller.with_host_root(host),
            None => controller,
        }
    }

    /// Controller whose notices are kept for inspection.
    pub fn recording_controller(
        &self,
        document: &Document,
    ) -> (WorkflowController, Arc<NoticeLog>) {
        let notices = Arc::new(NoticeLog::new());
        (self.controller(document, notices.clone()), notices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: Config = serde_yaml::from_str("ignored_classes: [active]\n").unwrap();
        assert_eq!(config.ignored_classes, vec!["active".to_string()]);
        assert_eq!(config.markers, MarkerClasses::default());
        assert_eq!(config.click_notice, DEFAULT_CLICK_NOTICE);
        assert!(matches!(config.output, OutputFormat::Human));
    }

    #[test]
    fn test_marker_names_and_output() {
        let yaml = "markers:\n  selected: picked\noutput: json\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.markers.selected, "picked");
        assert_eq!(config.markers.predicted, "isPredicted");
        assert!(matches!(config.output, OutputFormat::Json));
    }

    #[test]
    fn test_engine_ignores_configured_classes() {
        let config = Config {
            ignored_classes: vec!["active".into()],
            ..Config::default()
        };
        let mut doc = Document::new();
        let id = doc.append(doc.root(), "li", "row active isSelected").unwrap();
        let selector = config.engine().selector_for(&doc.element(id).unwrap());
        assert_eq!(selector.to_string(), "LI.row");
    }

    #[test]
    fn test_renamed_marker_keeps_default_markers_out() {
        let config: Config = serde_yaml::from_str("markers:\n  selected: picked\n").unwrap();
        let mut doc = Document::new();
        let id = doc
            .append(doc.root(), "li", "row isSelected picked isPredicted")
            .unwrap();
        let selector = config.engine().selector_for(&doc.element(id).unwrap()).to_string();
        assert_eq!(selector, "LI.row");
        assert!(!selector.contains("isSelected"));
    }

    #[test]
    fn test_host_root_resolution() {
        let mut doc = Document::new();
        let body = doc.append(doc.root(), "body", "").unwrap();
        let host = doc.append(body, "div", "picker").unwrap();

        let mut config = Config::default();
        assert_eq!(config.host_root(&doc), None);
        config.host_selector = Some("div.picker".into());
        assert_eq!(config.host_root(&doc), Some(host));
        config.host_selector = Some("div > span".into());
        assert_eq!(config.host_root(&doc), None);
    }
}
