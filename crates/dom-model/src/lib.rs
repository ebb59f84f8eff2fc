//! Document model for the picker
//!
//! An arena-backed element tree with stable node identities, class list and
//! attribute helpers, structural path selectors and JSON snapshots. Every
//! query reads the live arena; nothing is cached between calls.

pub mod errors;
pub mod model;
pub mod query;
pub mod selector;
pub mod snapshot;

pub use errors::DomError;
pub use model::{Document, ElementRef, NodeId};
pub use selector::{CompoundSelector, PathSelector};
pub use snapshot::NodeSnapshot;
