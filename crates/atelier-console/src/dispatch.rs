//! Single-flight action dispatcher for entity mutations.
//!
//! # Design
//! - At most one in-flight action per entity id, enforced structurally: a
//!   second dispatch for the same id fails synchronously with
//!   [`ActionError::AlreadyInProgress`] before any network call, so rapid
//!   or programmatic double-submission cannot race. Disabled buttons are a
//!   courtesy, not the guard.
//! - Workflow validation runs locally first; a reject without a reason
//!   never reaches the transport.
//! - On success the server's canonical entity is returned for merging by
//!   id. On failure nothing was touched, so the displayed status is
//!   untouched too; there is no optimistic flip to roll back.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use atelier_api_models::{Moderated, StatusAction, StatusActionRequest};

use crate::error::{ActionError, ActionResult};
use crate::workflow::WorkflowConfig;

/// Transport seam for entity mutations.
#[async_trait]
pub trait ActionTransport<T>: Send + Sync {
    /// Request a status transition and return the canonical updated entity.
    async fn perform(&self, entity_id: &str, request: &StatusActionRequest) -> ActionResult<T>;

    /// Permanently remove an entity.
    async fn remove(&self, entity_id: &str) -> ActionResult<()>;
}

/// Issues mutations against one collection, one entity at a time.
pub struct ActionDispatcher<T> {
    transport: Arc<dyn ActionTransport<T>>,
    workflow: WorkflowConfig,
    in_flight: Mutex<HashSet<String>>,
}

struct InFlightGuard<'a, T> {
    dispatcher: &'a ActionDispatcher<T>,
    entity_id: String,
}

impl<T> Drop for InFlightGuard<'_, T> {
    fn drop(&mut self) {
        self.dispatcher.in_flight().remove(&self.entity_id);
    }
}

impl<T> ActionDispatcher<T> {
    /// Create a dispatcher over a transport with the given workflow.
    #[must_use]
    pub fn new(transport: Arc<dyn ActionTransport<T>>, workflow: WorkflowConfig) -> Self {
        Self {
            transport,
            workflow,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// The workflow this dispatcher validates against.
    #[must_use]
    pub const fn workflow(&self) -> &WorkflowConfig {
        &self.workflow
    }

    /// Whether an action is currently in flight for the entity.
    #[must_use]
    pub fn is_in_flight(&self, entity_id: &str) -> bool {
        self.in_flight().contains(entity_id)
    }

    fn in_flight(&self) -> MutexGuard<'_, HashSet<String>> {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn claim(&self, entity_id: &str) -> ActionResult<InFlightGuard<'_, T>> {
        let mut in_flight = self.in_flight();
        if !in_flight.insert(entity_id.to_string()) {
            return Err(ActionError::AlreadyInProgress);
        }
        drop(in_flight);
        Ok(InFlightGuard {
            dispatcher: self,
            entity_id: entity_id.to_string(),
        })
    }

    /// Request a status transition for an entity.
    ///
    /// The caller merges the returned canonical entity into its collection
    /// store by id; the locally guessed next state is never trusted.
    ///
    /// # Errors
    ///
    /// Fails before any network call with a `Validation` error when the
    /// workflow forbids the transition or a required reason is missing, and
    /// with `AlreadyInProgress` when the entity already has an action in
    /// flight. Transport failures surface as the remaining
    /// [`ActionError`] variants.
    pub async fn dispatch(
        &self,
        entity: &(impl Moderated + Sync),
        action: StatusAction,
        reason: Option<String>,
    ) -> ActionResult<T> {
        self.workflow
            .validate(entity.status_label(), action, reason.as_deref())?;
        let guard = self.claim(entity.entity_id())?;

        tracing::debug!(
            entity_id = guard.entity_id,
            action = action.as_str(),
            "dispatching status action"
        );
        let request = StatusActionRequest { action, reason };
        let result = self.transport.perform(&guard.entity_id, &request).await;
        if let Err(err) = &result {
            tracing::warn!(
                entity_id = guard.entity_id,
                action = action.as_str(),
                error = %err,
                "status action failed; local state left unchanged"
            );
        }
        result
    }

    /// Permanently remove an entity.
    ///
    /// Deletion is terminal rather than a status transition; the caller
    /// drops the entity from its collection store on success.
    ///
    /// # Errors
    ///
    /// `AlreadyInProgress` when the entity already has an action in flight;
    /// otherwise whatever the transport surfaces.
    pub async fn dispatch_delete(&self, entity_id: &str) -> ActionResult<()> {
        let guard = self.claim(entity_id)?;
        tracing::debug!(entity_id = guard.entity_id, "dispatching delete");
        self.transport.remove(&guard.entity_id).await
    }
}
