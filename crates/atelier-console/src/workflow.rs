//! Configured status workflows for moderated entities.
//!
//! The transition graph is supplied as data rather than hard-coded per
//! page: catalog content (courses, products, workshops) and fulfillment
//! records (returns, payouts) share one rule shape with different edges.

use atelier_api_models::StatusAction;

use crate::error::WorkflowError;

/// One allowed edge in a status workflow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransitionRule {
    /// Status label the entity must currently hold.
    pub from: &'static str,
    /// Action that traverses the edge.
    pub action: StatusAction,
    /// Status label the server will move the entity to.
    pub to: &'static str,
    /// Whether a non-empty reason must accompany the request.
    pub requires_reason: bool,
    /// Whether the UI must confirm before dispatching.
    pub requires_confirmation: bool,
}

const fn edge(from: &'static str, action: StatusAction, to: &'static str) -> TransitionRule {
    TransitionRule {
        from,
        action,
        to,
        requires_reason: false,
        requires_confirmation: false,
    }
}

const fn confirmed(from: &'static str, action: StatusAction, to: &'static str) -> TransitionRule {
    TransitionRule {
        requires_confirmation: true,
        ..edge(from, action, to)
    }
}

const fn reasoned(from: &'static str, action: StatusAction, to: &'static str) -> TransitionRule {
    TransitionRule {
        requires_reason: true,
        requires_confirmation: true,
        ..edge(from, action, to)
    }
}

/// The set of transitions one entity kind supports.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkflowConfig {
    rules: Vec<TransitionRule>,
}

impl WorkflowConfig {
    /// Workflow for studio-submitted catalog content.
    #[must_use]
    pub fn content() -> Self {
        Self {
            rules: vec![
                confirmed("draft", StatusAction::Submit, "pending"),
                edge("draft", StatusAction::Publish, "published"),
                edge("pending", StatusAction::Approve, "published"),
                reasoned("pending", StatusAction::Reject, "rejected"),
                edge("under_review", StatusAction::Approve, "published"),
                reasoned("under_review", StatusAction::Reject, "rejected"),
                edge("published", StatusAction::Unpublish, "draft"),
                edge("rejected", StatusAction::Resubmit, "pending"),
                confirmed("published", StatusAction::Archive, "archived"),
            ],
        }
    }

    /// Workflow for returns and payouts.
    #[must_use]
    pub fn fulfillment() -> Self {
        Self {
            rules: vec![
                edge("pending", StatusAction::Approve, "approved"),
                reasoned("pending", StatusAction::Reject, "rejected"),
                edge("approved", StatusAction::Process, "processing"),
                edge("processing", StatusAction::Complete, "completed"),
            ],
        }
    }

    /// Build a workflow from an explicit rule set.
    #[must_use]
    pub const fn from_rules(rules: Vec<TransitionRule>) -> Self {
        Self { rules }
    }

    /// The rule for an action from the given status, if the edge exists.
    #[must_use]
    pub fn rule_for(&self, from: &str, action: StatusAction) -> Option<&TransitionRule> {
        self.rules
            .iter()
            .find(|rule| rule.from == from && rule.action == action)
    }

    /// Actions available from the given status, in rule order.
    #[must_use]
    pub fn actions_from(&self, from: &str) -> Vec<StatusAction> {
        self.rules
            .iter()
            .filter(|rule| rule.from == from)
            .map(|rule| rule.action)
            .collect()
    }

    /// Validate a requested transition locally, before any network call.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::TransitionNotAllowed`] when no edge matches
    /// the current status, and [`WorkflowError::ReasonRequired`] when the
    /// edge demands a reason and none (or a blank one) was supplied.
    pub fn validate(
        &self,
        from: &str,
        action: StatusAction,
        reason: Option<&str>,
    ) -> Result<&TransitionRule, WorkflowError> {
        let rule =
            self.rule_for(from, action)
                .ok_or_else(|| WorkflowError::TransitionNotAllowed {
                    from: from.to_string(),
                    action,
                })?;
        if rule.requires_reason && reason.is_none_or(|text| text.trim().is_empty()) {
            return Err(WorkflowError::ReasonRequired { action });
        }
        Ok(rule)
    }
}
