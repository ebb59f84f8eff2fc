use parking_lot::Mutex;
use soulpick_dom::NodeId;
use tracing::info;

use crate::errors::ActionError;

/// User-visible notification sink
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Writes notices to the log.
#[derive(Clone, Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str) {
        info!(target: "soulpick::notice", "{}", message);
    }
}

/// Keeps every notice in memory, in delivery order.
#[derive(Debug, Default)]
pub struct NoticeLog {
    messages: Mutex<Vec<String>>,
}

impl NoticeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.lock().is_empty()
    }
}

impl Notifier for NoticeLog {
    fn notify(&self, message: &str) {
        self.messages.lock().push(message.to_string());
    }
}

/// Element actions a run applies to its targets
pub trait ElementActions {
    fn click(&mut self, id: NodeId) -> Result<(), ActionError>;
    fn set_value(&mut self, id: NodeId, value: &str) -> Result<(), ActionError>;
}
