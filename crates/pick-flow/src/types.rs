//! Workflow state and run report types

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use soulpick_dom::NodeId;
use uuid::Uuid;

/// Picker session identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Externally visible workflow step
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowStep {
    ElementSelection,
    ActionSelection,
    InputSelection,
    BotRunCompleted,
}

impl WorkflowStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStep::ElementSelection => "ELEMENT_SELECTION",
            WorkflowStep::ActionSelection => "ACTION_SELECTION",
            WorkflowStep::InputSelection => "INPUT_SELECTION",
            WorkflowStep::BotRunCompleted => "BOT_RUN_COMPLETED",
        }
    }
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bulk action the user can choose after selecting
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Click,
    Input,
}

impl ActionKind {
    /// Step the workflow moves to once this action is chosen with a
    /// non-empty selection.
    pub fn target_step(self) -> WorkflowStep {
        match self {
            ActionKind::Click => WorkflowStep::ActionSelection,
            ActionKind::Input => WorkflowStep::InputSelection,
        }
    }
}

/// Internal workflow state.
///
/// The one-level back-navigation slot is part of the selection state rather
/// than a separate field, so a resume target can only exist while elements
/// are being picked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkflowState {
    ElementSelection { resume: Option<ActionKind> },
    ActionSelection,
    InputSelection,
    Completed,
}

impl Default for WorkflowState {
    fn default() -> Self {
        WorkflowState::ElementSelection { resume: None }
    }
}

impl WorkflowState {
    pub fn step(&self) -> WorkflowStep {
        match self {
            WorkflowState::ElementSelection { .. } => WorkflowStep::ElementSelection,
            WorkflowState::ActionSelection => WorkflowStep::ActionSelection,
            WorkflowState::InputSelection => WorkflowStep::InputSelection,
            WorkflowState::Completed => WorkflowStep::BotRunCompleted,
        }
    }

    pub fn resume(&self) -> Option<ActionKind> {
        match self {
            WorkflowState::ElementSelection { resume } => *resume,
            _ => None,
        }
    }

    pub(crate) fn for_action(kind: ActionKind) -> Self {
        match kind {
            ActionKind::Click => WorkflowState::ActionSelection,
            ActionKind::Input => WorkflowState::InputSelection,
        }
    }
}

/// Result of a step transition request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Moved { from: WorkflowStep, to: WorkflowStep },
    /// Request was not legal in `step`; nothing changed.
    Ignored { step: WorkflowStep },
}

impl Transition {
    pub fn is_ignored(&self) -> bool {
        matches!(self, Transition::Ignored { .. })
    }

    /// Step after the request.
    pub fn step(&self) -> WorkflowStep {
        match self {
            Transition::Moved { to, .. } => *to,
            Transition::Ignored { step } => *step,
        }
    }
}

/// Result of toggling an element
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Toggle {
    Selected,
    Deselected,
    Ignored(IgnoreReason),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Selection only changes during ELEMENT_SELECTION
    WrongStep(WorkflowStep),
    /// Node belongs to the picker's own host subtree
    HostElement,
    /// Node is not an element of the document
    NotAnElement,
    /// Element is no longer connected to the document
    Detached,
}

/// Where a run target came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetOrigin {
    Selected,
    Predicted,
}

/// Action applied during a run
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BulkAction {
    Click,
    SetValue { value: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetOutcome {
    pub node: NodeId,
    pub origin: TargetOrigin,
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Per-element record of one bulk run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunReport {
    pub session: SessionId,
    pub action: BulkAction,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcomes: Vec<TargetOutcome>,
}

impl RunReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|outcome| outcome.ok).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn all_ok(&self) -> bool {
        self.outcomes.iter().all(|outcome| outcome.ok)
    }

    /// Targets in the order they were acted on.
    pub fn targets(&self) -> Vec<NodeId> {
        self.outcomes.iter().map(|outcome| outcome.node).collect()
    }

    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}
