//! Workflow controller
//!
//! Owns the current step, the selected and predicted sets and the marker
//! table. Every mutation is synchronous; the document is passed in by the
//! caller on each call and never cached.

use std::sync::Arc;

use chrono::Utc;
use selector_engine::{ElementSet, SelectorEngine};
use soulpick_dom::{Document, NodeId};
use tracing::{debug, info, warn};

use crate::errors::ActionError;
use crate::markers::{MarkerTable, Markers};
use crate::ports::{ElementActions, Notifier};
use crate::types::{
    ActionKind, BulkAction, IgnoreReason, RunReport, SessionId, TargetOrigin, TargetOutcome,
    Toggle, Transition, WorkflowState, WorkflowStep,
};

pub const DEFAULT_CLICK_NOTICE: &str =
    "Select the elements to click first, then continue to run the bot";

pub struct WorkflowController {
    session: SessionId,
    state: WorkflowState,
    selected: ElementSet,
    predicted: ElementSet,
    markers: MarkerTable,
    engine: SelectorEngine,
    notifier: Arc<dyn Notifier>,
    host_root: Option<NodeId>,
    click_notice: String,
}

impl WorkflowController {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            session: SessionId::new(),
            state: WorkflowState::default(),
            selected: ElementSet::new(),
            predicted: ElementSet::new(),
            markers: MarkerTable::new(),
            engine: SelectorEngine::new(),
            notifier,
            host_root: None,
            click_notice: DEFAULT_CLICK_NOTICE.to_string(),
        }
    }

    pub fn with_engine(mut self, engine: SelectorEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Root of the picker's own UI. Nothing inside it can be highlighted
    /// or selected.
    pub fn with_host_root(mut self, host_root: NodeId) -> Self {
        self.host_root = Some(host_root);
        self
    }

    pub fn with_click_notice(mut self, notice: impl Into<String>) -> Self {
        self.click_notice = notice.into();
        self
    }

    pub fn session(&self) -> &SessionId {
        &self.session
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub fn step(&self) -> WorkflowStep {
        self.state.step()
    }

    /// Action that `advance` will return to, if any.
    pub fn pending_resume(&self) -> Option<ActionKind> {
        self.state.resume()
    }

    pub fn selected(&self) -> &ElementSet {
        &self.selected
    }

    pub fn predicted(&self) -> &ElementSet {
        &self.predicted
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    pub fn predicted_count(&self) -> usize {
        self.predicted.len()
    }

    pub fn is_element_selection(&self) -> bool {
        self.step() == WorkflowStep::ElementSelection
    }

    pub fn is_reset_allowed(&self) -> bool {
        !matches!(
            self.state,
            WorkflowState::ElementSelection { .. } | WorkflowState::Completed
        )
    }

    /// Selected elements followed by predicted ones.
    pub fn targets(&self) -> Vec<NodeId> {
        self.selected.iter().chain(self.predicted.iter()).collect()
    }

    pub fn markers(&self) -> &MarkerTable {
        &self.markers
    }

    pub fn engine(&self) -> &SelectorEngine {
        &self.engine
    }

    fn is_host_element(&self, document: &Document, id: NodeId) -> bool {
        self.host_root
            .map(|host| document.is_inclusive_ancestor(host, id))
            .unwrap_or(false)
    }

    fn set_state(&mut self, next: WorkflowState) -> Transition {
        let from = self.step();
        self.state = next;
        if !matches!(next, WorkflowState::ElementSelection { .. }) {
            self.markers.clear_flag(Markers::HIGHLIGHTED);
        }
        let to = self.step();
        info!(session = %self.session, %from, %to, "workflow step changed");
        Transition::Moved { from, to }
    }

    fn ignored(&self, request: &str) -> Transition {
        debug!(session = %self.session, step = %self.step(), request, "transition ignored");
        Transition::Ignored { step: self.step() }
    }

    /// Predictions never include the host subtree, so a run cannot act on
    /// the picker's own UI.
    fn recompute_predictions(&mut self, document: &Document) {
        let mut predicted = self.engine.predict(document, &self.selected);
        if self.host_root.is_some() {
            predicted.retain(|id| !self.is_host_element(document, id));
        }
        self.markers.clear_flag(Markers::PREDICTED);
        for id in predicted.iter() {
            self.markers.set(id, Markers::PREDICTED, true);
        }
        self.predicted = predicted;
    }

    /// Adds the element to the selection if absent, removes it otherwise,
    /// then recomputes predictions.
    pub fn toggle_selection(&mut self, document: &Document, id: NodeId) -> Toggle {
        if !self.is_element_selection() {
            debug!(node = %id, step = %self.step(), "toggle outside element selection");
            return Toggle::Ignored(IgnoreReason::WrongStep(self.step()));
        }
        if document.element(id).is_none() {
            return Toggle::Ignored(IgnoreReason::NotAnElement);
        }
        if self.is_host_element(document, id) {
            return Toggle::Ignored(IgnoreReason::HostElement);
        }
        // a detached pick may still be dropped, never added
        if !document.is_connected(id) && !self.selected.contains(id) {
            debug!(node = %id, "toggle on detached element");
            return Toggle::Ignored(IgnoreReason::Detached);
        }

        let now_selected = self.selected.toggle(id);
        self.markers.set(id, Markers::SELECTED, now_selected);
        self.recompute_predictions(document);
        debug!(
            node = %id,
            selected = self.selected.len(),
            predicted = self.predicted.len(),
            "selection toggled"
        );
        if now_selected {
            Toggle::Selected
        } else {
            Toggle::Deselected
        }
    }

    /// Recomputes predictions against the current tree. Selected ids that no
    /// longer name a connected element are dropped first.
    pub fn refresh_predictions(&mut self, document: &Document) {
        let stale: Vec<NodeId> = self
            .selected
            .iter()
            .filter(|id| document.element(*id).is_none() || !document.is_connected(*id))
            .collect();
        for id in &stale {
            self.selected.remove(*id);
            self.markers.set(*id, Markers::SELECTED, false);
        }
        if !stale.is_empty() {
            warn!(dropped = stale.len(), "selected elements left the document");
        }
        self.recompute_predictions(document);
    }

    /// Pointer entered `id`. Returns whether it is now highlighted.
    pub fn hover_enter(&mut self, document: &Document, id: NodeId) -> bool {
        if !self.is_element_selection()
            || document.element(id).is_none()
            || !document.is_connected(id)
            || self.is_host_element(document, id)
        {
            return false;
        }
        self.markers.set(id, Markers::HIGHLIGHTED, true);
        true
    }

    /// Pointer left `id`. Returns whether a highlight was removed.
    pub fn hover_exit(&mut self, id: NodeId) -> bool {
        let was = self.markers.get(id).contains(Markers::HIGHLIGHTED);
        self.markers.set(id, Markers::HIGHLIGHTED, false);
        was
    }

    /// With nothing selected, returns to element selection and remembers
    /// `kind` for `advance`; a click request also notifies the user.
    /// Otherwise moves straight to the action's step.
    pub fn request_action_choice(&mut self, kind: ActionKind) -> Transition {
        if self.state == WorkflowState::Completed {
            return self.ignored("request_action_choice");
        }
        if self.selected.is_empty() {
            let transition = self.set_state(WorkflowState::ElementSelection { resume: Some(kind) });
            if kind == ActionKind::Click {
                self.notifier.notify(&self.click_notice);
            }
            return transition;
        }
        self.set_state(WorkflowState::for_action(kind))
    }

    /// Resumes the remembered action if there is one, otherwise moves to
    /// action selection.
    pub fn advance(&mut self) -> Transition {
        match self.state {
            WorkflowState::Completed => self.ignored("advance"),
            WorkflowState::ElementSelection { resume: Some(kind) } => {
                self.set_state(WorkflowState::for_action(kind))
            }
            _ => self.set_state(WorkflowState::ActionSelection),
        }
    }

    /// Clicks every selected then predicted element. Returns `None` once
    /// the run has already completed.
    pub fn run<A: ElementActions + ?Sized>(&mut self, target: &mut A) -> Option<RunReport> {
        self.execute(BulkAction::Click, target, |target, id| target.click(id))
    }

    /// Sets `value` on every selected then predicted element.
    pub fn apply_value<A: ElementActions + ?Sized>(
        &mut self,
        target: &mut A,
        value: &str,
    ) -> Option<RunReport> {
        let action = BulkAction::SetValue {
            value: value.to_string(),
        };
        self.execute(action, target, |target, id| target.set_value(id, value))
    }

    fn execute<A, F>(&mut self, action: BulkAction, target: &mut A, mut apply: F) -> Option<RunReport>
    where
        A: ElementActions + ?Sized,
        F: FnMut(&mut A, NodeId) -> Result<(), ActionError>,
    {
        if self.state == WorkflowState::Completed {
            warn!(session = %self.session, "run requested after completion");
            return None;
        }

        let started_at = Utc::now();
        let plan = self
            .selected
            .iter()
            .map(|id| (id, TargetOrigin::Selected))
            .chain(self.predicted.iter().map(|id| (id, TargetOrigin::Predicted)));
        let mut outcomes = Vec::with_capacity(self.selected.len() + self.predicted.len());
        for (node, origin) in plan {
            let outcome = match apply(target, node) {
                Ok(()) => TargetOutcome {
                    node,
                    origin,
                    ok: true,
                    error: None,
                },
                Err(err) => {
                    warn!(node = %node, error = %err, "action failed; continuing");
                    TargetOutcome {
                        node,
                        origin,
                        ok: false,
                        error: Some(err.to_string()),
                    }
                }
            };
            outcomes.push(outcome);
        }

        let report = RunReport {
            session: self.session.clone(),
            action,
            started_at,
            finished_at: Utc::now(),
            outcomes,
        };
        info!(
            session = %self.session,
            succeeded = report.succeeded(),
            failed = report.failed(),
            "bot run finished"
        );
        self.set_state(WorkflowState::Completed);
        Some(report)
    }

    /// Clears both sets, every marker and the pending slot, and returns to
    /// element selection. Ignored during element selection and after
    /// completion.
    pub fn reset(&mut self) -> Transition {
        if !self.is_reset_allowed() {
            return self.ignored("reset");
        }
        self.selected.clear();
        self.predicted.clear();
        self.markers.clear();
        self.set_state(WorkflowState::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::NoticeLog;

    fn rows(count: usize) -> (Document, NodeId, Vec<NodeId>) {
        let mut doc = Document::new();
        let body = doc.append(doc.root(), "body", "").unwrap();
        let rows = (0..count)
            .map(|_| doc.append(body, "div", "item").unwrap())
            .collect();
        (doc, body, rows)
    }

    fn controller() -> (WorkflowController, Arc<NoticeLog>) {
        let log = Arc::new(NoticeLog::new());
        (WorkflowController::new(log.clone()), log)
    }

    #[test]
    fn test_initial_state() {
        let (ctl, log) = controller();
        assert_eq!(ctl.step(), WorkflowStep::ElementSelection);
        assert!(ctl.is_element_selection());
        assert!(!ctl.is_reset_allowed());
        assert_eq!(ctl.selected_count(), 0);
        assert_eq!(ctl.predicted_count(), 0);
        assert_eq!(ctl.pending_resume(), None);
        assert!(log.is_empty());
    }

    #[test]
    fn test_toggle_selects_and_predicts() {
        let (doc, _, items) = rows(3);
        let (mut ctl, _) = controller();
        assert_eq!(ctl.toggle_selection(&doc, items[0]), Toggle::Selected);
        assert_eq!(ctl.selected().to_vec(), vec![items[0]]);
        assert_eq!(ctl.predicted().to_vec(), vec![items[1], items[2]]);
        assert_eq!(ctl.targets(), items);
        assert_eq!(ctl.markers().get(items[0]), Markers::SELECTED);
        assert_eq!(ctl.markers().get(items[2]), Markers::PREDICTED);
        assert_eq!(ctl.step(), WorkflowStep::ElementSelection);
    }

    #[test]
    fn test_toggle_twice_restores_sets() {
        let (doc, _, items) = rows(4);
        let (mut ctl, _) = controller();
        ctl.toggle_selection(&doc, items[1]);
        let selected = ctl.selected().clone();
        let predicted = ctl.predicted().clone();

        assert_eq!(ctl.toggle_selection(&doc, items[3]), Toggle::Selected);
        assert_eq!(ctl.toggle_selection(&doc, items[3]), Toggle::Deselected);
        assert_eq!(ctl.selected(), &selected);
        assert_eq!(ctl.predicted(), &predicted);
        assert_eq!(ctl.markers().get(items[3]), Markers::PREDICTED);
    }

    #[test]
    fn test_selecting_predicted_element_moves_it() {
        let (doc, _, items) = rows(3);
        let (mut ctl, _) = controller();
        ctl.toggle_selection(&doc, items[0]);
        ctl.toggle_selection(&doc, items[1]);
        assert_eq!(ctl.predicted().to_vec(), vec![items[2]]);
        assert!(ctl.selected().is_disjoint(ctl.predicted()));
        assert_eq!(ctl.markers().get(items[1]), Markers::SELECTED);
    }

    #[test]
    fn test_toggle_ignored_outside_selection() {
        let (doc, _, items) = rows(2);
        let (mut ctl, _) = controller();
        ctl.toggle_selection(&doc, items[0]);
        ctl.advance();
        assert_eq!(
            ctl.toggle_selection(&doc, items[1]),
            Toggle::Ignored(IgnoreReason::WrongStep(WorkflowStep::ActionSelection))
        );
        assert_eq!(ctl.selected_count(), 1);
    }

    #[test]
    fn test_host_subtree_is_excluded() {
        let (mut doc, body, items) = rows(2);
        let host = doc.append(body, "div", "picker-host").unwrap();
        let button = doc.append(host, "button", "item").unwrap();
        let (ctl, _) = controller();
        let mut ctl = ctl.with_host_root(host);

        assert_eq!(
            ctl.toggle_selection(&doc, button),
            Toggle::Ignored(IgnoreReason::HostElement)
        );
        assert!(!ctl.hover_enter(&doc, host));
        assert_eq!(
            ctl.toggle_selection(&doc, doc.root()),
            Toggle::Ignored(IgnoreReason::NotAnElement)
        );
        assert_eq!(ctl.toggle_selection(&doc, items[0]), Toggle::Selected);
    }

    #[test]
    fn test_host_lookalikes_are_not_predicted() {
        let (mut doc, body, items) = rows(2);
        let host = doc.append(body, "div", "picker-host").unwrap();
        let lookalike = doc.append(host, "div", "item").unwrap();
        let (ctl, _) = controller();
        let mut ctl = ctl.with_host_root(host);

        ctl.toggle_selection(&doc, items[0]);
        assert!(doc
            .query_selector_all("BODY DIV.item")
            .unwrap()
            .contains(&lookalike));
        assert_eq!(ctl.predicted().to_vec(), vec![items[1]]);
        assert_eq!(ctl.markers().get(lookalike), Markers::empty());

        ctl.advance();
        let report = ctl.run(&mut doc).unwrap();
        assert_eq!(report.targets(), items);
        assert!(!doc.activations().contains(&lookalike));
    }

    #[test]
    fn test_detached_element_cannot_be_selected() {
        let (mut doc, body, items) = rows(3);
        let orphan = doc.append(body, "div", "item").unwrap();
        doc.detach(orphan).unwrap();
        let (mut ctl, _) = controller();

        assert_eq!(
            ctl.toggle_selection(&doc, orphan),
            Toggle::Ignored(IgnoreReason::Detached)
        );
        assert_eq!(ctl.selected_count(), 0);
        assert_eq!(ctl.predicted_count(), 0);
        assert!(!ctl.hover_enter(&doc, orphan));

        ctl.toggle_selection(&doc, items[0]);
        doc.detach(items[0]).unwrap();
        assert_eq!(ctl.toggle_selection(&doc, items[0]), Toggle::Deselected);
        assert_eq!(ctl.selected_count(), 0);
    }

    #[test]
    fn test_hover_highlight() {
        let (doc, _, items) = rows(2);
        let (mut ctl, _) = controller();
        assert!(ctl.hover_enter(&doc, items[0]));
        assert_eq!(ctl.markers().get(items[0]), Markers::HIGHLIGHTED);
        assert!(ctl.hover_exit(items[0]));
        assert!(!ctl.hover_exit(items[0]));
        assert!(ctl.markers().is_empty());

        ctl.hover_enter(&doc, items[1]);
        ctl.toggle_selection(&doc, items[1]);
        ctl.advance();
        assert_eq!(ctl.markers().get(items[1]), Markers::SELECTED);
        assert!(!ctl.hover_enter(&doc, items[0]));
    }

    #[test]
    fn test_click_without_selection_queues_resume() {
        let (mut ctl, log) = controller();
        let transition = ctl.request_action_choice(ActionKind::Click);
        assert_eq!(transition.step(), WorkflowStep::ElementSelection);
        assert_eq!(ctl.pending_resume(), Some(ActionKind::Click));
        assert_eq!(log.messages(), vec![DEFAULT_CLICK_NOTICE.to_string()]);

        assert_eq!(ctl.advance().step(), WorkflowStep::ActionSelection);
        assert_eq!(ctl.pending_resume(), None);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_input_without_selection_is_silent() {
        let (ctl, log) = controller();
        let mut ctl = ctl.with_click_notice("pick something");
        ctl.request_action_choice(ActionKind::Input);
        assert_eq!(ctl.pending_resume(), Some(ActionKind::Input));
        assert!(log.is_empty());
        assert_eq!(ctl.advance().step(), WorkflowStep::InputSelection);

        ctl.reset();
        ctl.request_action_choice(ActionKind::Click);
        assert_eq!(log.messages(), vec!["pick something".to_string()]);
    }

    #[test]
    fn test_input_with_selection_moves_directly() {
        let (doc, _, items) = rows(2);
        let (mut ctl, log) = controller();
        ctl.toggle_selection(&doc, items[0]);
        let transition = ctl.request_action_choice(ActionKind::Input);
        assert_eq!(
            transition,
            Transition::Moved {
                from: WorkflowStep::ElementSelection,
                to: WorkflowStep::InputSelection
            }
        );
        assert_eq!(ctl.pending_resume(), None);
        assert!(log.is_empty());
    }

    #[test]
    fn test_direct_choice_drops_pending_slot() {
        let (doc, _, items) = rows(2);
        let (mut ctl, _) = controller();
        ctl.request_action_choice(ActionKind::Input);
        ctl.toggle_selection(&doc, items[0]);
        ctl.request_action_choice(ActionKind::Click);
        assert_eq!(ctl.step(), WorkflowStep::ActionSelection);
        assert_eq!(ctl.pending_resume(), None);
        assert_eq!(ctl.advance().step(), WorkflowStep::ActionSelection);
    }

    #[test]
    fn test_run_clicks_union_and_completes() {
        let (mut doc, _, items) = rows(3);
        let (mut ctl, _) = controller();
        ctl.toggle_selection(&doc, items[0]);
        ctl.toggle_selection(&doc, items[1]);
        ctl.advance();

        let report = ctl.run(&mut doc).unwrap();
        assert_eq!(doc.activations(), items.as_slice());
        assert_eq!(report.targets(), items);
        assert_eq!(report.outcomes[2].origin, TargetOrigin::Predicted);
        assert!(report.all_ok());
        assert_eq!(report.action, BulkAction::Click);
        assert_eq!(ctl.step(), WorkflowStep::BotRunCompleted);
    }

    #[test]
    fn test_run_continues_past_failures() {
        let (mut doc, _, items) = rows(3);
        let (mut ctl, _) = controller();
        ctl.toggle_selection(&doc, items[0]);
        ctl.advance();
        doc.detach(items[1]).unwrap();

        let report = ctl.run(&mut doc).unwrap();
        assert_eq!(report.failed(), 1);
        assert_eq!(report.succeeded(), 2);
        assert_eq!(
            report.outcomes[1].error.as_deref(),
            Some(ActionError::TargetGone(items[1]).to_string().as_str())
        );
        assert_eq!(doc.activations(), &[items[0], items[2]]);
    }

    #[test]
    fn test_apply_value_sets_attribute() {
        let (mut doc, _, items) = rows(2);
        let (mut ctl, _) = controller();
        ctl.toggle_selection(&doc, items[1]);
        ctl.request_action_choice(ActionKind::Input);

        let report = ctl.apply_value(&mut doc, "hello").unwrap();
        assert_eq!(report.targets(), vec![items[1], items[0]]);
        for id in &items {
            assert_eq!(doc.attr(*id, "value"), Some("hello"));
        }
        assert!(doc.activations().is_empty());
        assert_eq!(ctl.step(), WorkflowStep::BotRunCompleted);
    }

    #[test]
    fn test_completed_is_terminal() {
        let (mut doc, _, items) = rows(2);
        let (mut ctl, _) = controller();
        ctl.toggle_selection(&doc, items[0]);
        ctl.advance();
        ctl.run(&mut doc).unwrap();

        assert!(ctl.run(&mut doc).is_none());
        assert!(ctl.apply_value(&mut doc, "x").is_none());
        assert!(ctl.advance().is_ignored());
        assert!(ctl.request_action_choice(ActionKind::Input).is_ignored());
        assert!(ctl.reset().is_ignored());
        assert_eq!(doc.activations().len(), 2);
        assert_eq!(ctl.step(), WorkflowStep::BotRunCompleted);
    }

    #[test]
    fn test_reset_clears_everything_once() {
        let (doc, _, items) = rows(3);
        let (mut ctl, _) = controller();
        ctl.toggle_selection(&doc, items[0]);
        ctl.request_action_choice(ActionKind::Input);
        assert!(ctl.is_reset_allowed());

        let transition = ctl.reset();
        assert_eq!(transition.step(), WorkflowStep::ElementSelection);
        assert_eq!(ctl.selected_count(), 0);
        assert_eq!(ctl.predicted_count(), 0);
        assert!(ctl.markers().is_empty());
        assert!(ctl.reset().is_ignored());
    }

    #[test]
    fn test_refresh_predictions_after_mutation() {
        let (mut doc, body, items) = rows(2);
        let (mut ctl, _) = controller();
        ctl.toggle_selection(&doc, items[0]);
        assert_eq!(ctl.predicted_count(), 1);

        let late = doc.append(body, "div", "item").unwrap();
        ctl.refresh_predictions(&doc);
        assert_eq!(ctl.predicted().to_vec(), vec![items[1], late]);

        doc.detach(items[0]).unwrap();
        ctl.refresh_predictions(&doc);
        assert_eq!(ctl.selected_count(), 0);
        assert_eq!(ctl.predicted_count(), 0);
        assert!(ctl.markers().is_empty());
    }
}
