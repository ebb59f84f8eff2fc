//! Document files and element summaries

use std::path::Path;

use anyhow::{Context, Result};
use selector_engine::SelectorEngine;
use serde::Serialize;
use soulpick_dom::{Document, NodeId};
use tokio::fs;
use tracing::debug;

pub async fn load_document(path: &Path) -> Result<Document> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read document {}", path.display()))?;
    let document = Document::from_json_str(&content)
        .with_context(|| format!("Failed to parse document {}", path.display()))?;
    debug!(path = %path.display(), elements = document.element_count(), "document loaded");
    Ok(document)
}

pub async fn save_document(document: &Document, path: &Path) -> Result<()> {
    let json = document
        .to_json_string_pretty()
        .context("Failed to serialize document")?;
    fs::write(path, json)
        .await
        .with_context(|| format!("Failed to write document {}", path.display()))?;
    debug!(path = %path.display(), "document saved");
    Ok(())
}

/// One element as shown by the CLI.
#[derive(Debug, Clone, Serialize)]
pub struct ElementSummary {
    pub id: NodeId,
    pub tag: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl ElementSummary {
    pub fn of(document: &Document, engine: &SelectorEngine, id: NodeId) -> Option<Self> {
        let element = document.element(id)?;
        Some(Self {
            id,
            tag: element.node_name(),
            path: engine.path_selector_for(&element).to_string(),
            text: element.text().map(ToOwned::to_owned),
        })
    }

    pub fn collect<I>(document: &Document, engine: &SelectorEngine, ids: I) -> Vec<Self>
    where
        I: IntoIterator<Item = NodeId>,
    {
        ids.into_iter()
            .filter_map(|id| Self::of(document, engine, id))
            .collect()
    }

    pub fn human_line(&self) -> String {
        match &self.text {
            Some(text) => format!("{:>5}  {}  \"{}\"", self.id.to_string(), self.path, text),
            None => format!("{:>5}  {}", self.id.to_string(), self.path),
        }
    }
}
