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
//! REST client for the Atelier admin API.
//!
//! Wraps `reqwest` with the API's uniform surface: every collection exposes
//! the same list/read/write/action endpoints under `/api/admin/{collection}`,
//! and every non-2xx response carries an `{"error": ...}` body. Responses are
//! classified into the console's [`atelier_console::ActionError`] taxonomy so
//! stores and dispatchers never see raw HTTP.
//!
//! Layout:
//! - `client.rs`: configured HTTP client, endpoint building, response
//!   classification, GET retry
//! - `collections.rs`: typed per-collection handle plugging into the
//!   console's fetcher and transport seams

mod client;
mod collections;

pub use client::{
    ApiClient, ApiClientBuilder, ClientError, DEFAULT_TIMEOUT, HEADER_API_KEY, HEADER_REQUEST_ID,
};
pub use collections::{Collection, CollectionApi};
