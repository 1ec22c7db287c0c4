#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
//! State core for the Atelier moderation console.
//!
//! Every admin and studio page shares the same skeleton: a paginated,
//! filterable collection fetched from a REST endpoint, a status workflow
//! driving approve/reject/publish transitions, a dispatcher issuing one
//! mutation per entity at a time, and a single contextual menu. This crate
//! holds that skeleton as pure, view-free state so it can be tested without
//! a UI runtime.
//!
//! Layout:
//! - `query.rs`: list query state, patch merging, URL serialization
//! - `store.rs`: collection store with generation-tagged fetches
//! - `workflow.rs`: configured status transition rules
//! - `dispatch.rs`: single-flight action dispatcher
//! - `menu.rs`: singleton contextual-menu controller
//! - `error.rs`: action and workflow error taxonomies

pub mod dispatch;
pub mod error;
pub mod menu;
pub mod query;
pub mod store;
pub mod workflow;

pub use dispatch::{ActionDispatcher, ActionTransport};
pub use error::{ActionError, ActionResult, PageShapeError, WorkflowError};
pub use menu::{AnchorRect, MENU_GAP_PX, MenuAnchor, MenuController, MenuPosition};
pub use query::{FetchPlan, ListQuery, QueryPatch, SEARCH_DEBOUNCE, StatusFilter};
pub use store::{
    CollectionFetcher, CollectionStore, FetchOutcome, FetchTicket, Page, RemoteCollection,
};
pub use workflow::{TransitionRule, WorkflowConfig};
