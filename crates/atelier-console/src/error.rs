//! Error taxonomies for dispatch, workflow validation and page parsing.

use atelier_api_models::StatusAction;
use thiserror::Error;

/// Failure modes for a dispatched entity action.
///
/// Only [`ActionError::Validation`] is actionable by the operator without a
/// retry; views render it distinctly from the rest.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ActionError {
    /// The payload was rejected locally or by the server.
    #[error("{0}")]
    Validation(String),
    /// The entity no longer exists on the server.
    #[error("entity not found")]
    NotFound,
    /// The entity's status changed between fetch and action.
    #[error("entity changed since it was loaded")]
    Conflict,
    /// Another action for the same entity is already in flight.
    #[error("an action for this entity is already in progress")]
    AlreadyInProgress,
    /// The request exceeded the client-side deadline.
    #[error("request timed out")]
    Timeout,
    /// Transport failure or a non-JSON response.
    #[error("network error: {0}")]
    Network(String),
}

impl ActionError {
    /// Whether the operator can fix the failure without retrying.
    #[must_use]
    pub const fn is_actionable(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Convenience alias for dispatch results.
pub type ActionResult<T> = Result<T, ActionError>;

/// Local workflow validation failures, raised before any network call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WorkflowError {
    /// No configured edge matches the current status and action.
    #[error("cannot {} while {from}", .action.as_str())]
    TransitionNotAllowed {
        /// Status the entity currently holds.
        from: String,
        /// Action that was requested.
        action: StatusAction,
    },
    /// The action requires a non-empty reason.
    #[error("a reason is required to {}", .action.as_str())]
    ReasonRequired {
        /// Action that was requested.
        action: StatusAction,
    },
}

impl From<WorkflowError> for ActionError {
    fn from(err: WorkflowError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Shape violations detected when parsing a page envelope.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum PageShapeError {
    /// The server returned more items than the requested page size.
    #[error("page holds {items} items but the page size is {page_size}")]
    TooManyItems {
        /// Items present in the response.
        items: usize,
        /// Page size the query asked for.
        page_size: u32,
    },
    /// The reported page count disagrees with the total and page size.
    #[error("{pages} pages reported for {total} items at page size {page_size}")]
    PageCountMismatch {
        /// Page count reported by the server.
        pages: u32,
        /// Total items reported by the server.
        total: u64,
        /// Page size the query asked for.
        page_size: u32,
    },
}
