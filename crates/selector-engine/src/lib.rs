//! Selector engine - structural similarity over a live document
//!
//! This crate turns picked elements into tag-plus-class path selectors and
//! uses them to predict structurally equivalent elements:
//! - `selector_for`: one element's shape, marker classes excluded
//! - `path_selector_for`: root-to-leaf chain of shapes
//! - `similar_elements`: document-wide matches of that chain
//! - `predict`: union of matches minus the picked set

pub mod engine;
pub mod types;

pub use engine::*;
pub use types::*;
