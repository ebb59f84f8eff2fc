//! Picker workflow
//!
//! Drives the select, choose action, run sequence over a document:
//! elements are toggled into a selection, similar elements are predicted by
//! the selector engine, and a bulk click or value write is applied to both
//! sets. Invalid transitions are reported as ignored rather than failing.

pub mod actions;
pub mod controller;
pub mod errors;
pub mod markers;
pub mod ports;
pub mod types;

pub use actions::VALUE_ATTRIBUTE;
pub use controller::{WorkflowController, DEFAULT_CLICK_NOTICE};
pub use errors::ActionError;
pub use markers::{MarkerClasses, MarkerTable, Markers};
pub use ports::{ElementActions, NoticeLog, Notifier, TracingNotifier};
pub use types::*;
