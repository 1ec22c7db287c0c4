//! Remote collection store: one paginated server collection mirrored into
//! client state.
//!
//! # Design
//! - The store never throws past its boundary: fetch failures keep the last
//!   good page and flip an observable error flag so the view stays
//!   interactive.
//! - Every fetch carries a generation tag; a response whose generation is
//!   not the latest issued is discarded, so a slow early request can never
//!   clobber a newer filter's result.
//! - [`RemoteCollection`] adds the async driving layer: a transport seam,
//!   trailing debounce for search edits, and clamp-triggered refetches.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use atelier_api_models::{Identified, PageEnvelope};
use tokio::time::sleep;

use crate::error::{ActionError, PageShapeError};
use crate::query::{FetchPlan, ListQuery, QueryPatch};

/// One page of a collection, validated against the query that produced it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page<T> {
    /// Items for the current page, in server order.
    pub items: Vec<T>,
    /// Total items across all pages.
    pub total_items: u64,
    /// Total pages at the current page size.
    pub total_pages: u32,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total_items: 0,
            total_pages: 0,
        }
    }
}

fn pages_for(total_items: u64, page_size: u32) -> u32 {
    let pages = total_items.div_ceil(u64::from(page_size.max(1)));
    u32::try_from(pages).unwrap_or(u32::MAX)
}

impl<T> Page<T> {
    /// Validate a wire envelope against the page-size invariants.
    ///
    /// # Errors
    ///
    /// Returns [`PageShapeError`] when the server sent more items than the
    /// page size allows or reported a page count that disagrees with
    /// `ceil(total / page_size)`.
    pub fn try_from_envelope(
        envelope: PageEnvelope<T>,
        page_size: u32,
    ) -> Result<Self, PageShapeError> {
        let page_size = page_size.max(1);
        let limit = usize::try_from(page_size).unwrap_or(usize::MAX);
        if envelope.items.len() > limit {
            return Err(PageShapeError::TooManyItems {
                items: envelope.items.len(),
                page_size,
            });
        }
        let expected = pages_for(envelope.pagination.total, page_size);
        if envelope.pagination.pages != expected {
            return Err(PageShapeError::PageCountMismatch {
                pages: envelope.pagination.pages,
                total: envelope.pagination.total,
                page_size,
            });
        }
        Ok(Self {
            items: envelope.items,
            total_items: envelope.pagination.total,
            total_pages: envelope.pagination.pages,
        })
    }
}

/// Generation tag handed out by [`CollectionStore::begin_fetch`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FetchTicket(u64);

/// What applying a fetch response did to the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Response applied as the new current page.
    Applied,
    /// Response applied, but the requested page was past the end and the
    /// query was clamped; the caller should refetch.
    PageClamped,
    /// Fetch failed; the previous page was kept and the error recorded.
    Failed,
    /// A newer fetch was issued since this one; response discarded.
    Stale,
}

/// Client-side state for one paginated server collection.
#[derive(Debug)]
pub struct CollectionStore<T> {
    query: ListQuery,
    page: Page<T>,
    error: Option<ActionError>,
    loading: bool,
    generation: u64,
}

impl<T> Default for CollectionStore<T> {
    fn default() -> Self {
        Self::new(ListQuery::default())
    }
}

impl<T> CollectionStore<T> {
    /// Create a store with an initial query (e.g. parsed from the URL).
    #[must_use]
    pub const fn new(query: ListQuery) -> Self {
        Self {
            query,
            page: Page {
                items: Vec::new(),
                total_items: 0,
                total_pages: 0,
            },
            error: None,
            loading: false,
            generation: 0,
        }
    }

    /// Current query state.
    #[must_use]
    pub const fn query(&self) -> &ListQuery {
        &self.query
    }

    /// Last good page.
    #[must_use]
    pub const fn page(&self) -> &Page<T> {
        &self.page
    }

    /// Error recorded by the most recent failed fetch, cleared on success.
    #[must_use]
    pub const fn error(&self) -> Option<&ActionError> {
        self.error.as_ref()
    }

    /// Whether the latest issued fetch is still unresolved.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Merge a query patch; see [`ListQuery::apply`] for the page-reset rule.
    pub fn set_filter(&mut self, patch: QueryPatch) -> FetchPlan {
        self.query.apply(patch)
    }

    /// Issue a new fetch generation and mark the store loading.
    pub const fn begin_fetch(&mut self) -> FetchTicket {
        self.generation += 1;
        self.loading = true;
        FetchTicket(self.generation)
    }

    /// Apply a fetch response for the given generation.
    ///
    /// Responses for any generation other than the latest issued are
    /// discarded, which makes the last-issued fetch win regardless of the
    /// order responses arrive in.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Page<T>, ActionError>,
    ) -> FetchOutcome {
        if ticket.0 != self.generation {
            tracing::debug!(
                stale = ticket.0,
                current = self.generation,
                "discarding stale fetch response"
            );
            return FetchOutcome::Stale;
        }
        self.loading = false;
        match result {
            Ok(page) => {
                let total_pages = page.total_pages;
                self.page = page;
                self.error = None;
                if self.query.clamp_page(total_pages) {
                    FetchOutcome::PageClamped
                } else {
                    FetchOutcome::Applied
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "collection fetch failed; keeping last good page");
                self.error = Some(err);
                FetchOutcome::Failed
            }
        }
    }
}

impl<T: Identified> CollectionStore<T> {
    /// Replace the locally held copy of an entity with the server's
    /// canonical version, matched by id.
    ///
    /// The server copy wins over any locally computed next state; derived
    /// fields and timestamps may differ from the optimistic guess.
    pub fn merge_entity(&mut self, entity: T) -> bool {
        let Some(slot) = self
            .page
            .items
            .iter_mut()
            .find(|item| item.entity_id() == entity.entity_id())
        else {
            return false;
        };
        *slot = entity;
        true
    }

    /// Remove an entity after a confirmed delete and fix up the totals.
    pub fn remove_entity(&mut self, entity_id: &str) -> bool {
        let before = self.page.items.len();
        self.page.items.retain(|item| item.entity_id() != entity_id);
        if self.page.items.len() == before {
            return false;
        }
        self.page.total_items = self.page.total_items.saturating_sub(1);
        self.page.total_pages = pages_for(self.page.total_items, self.query.page_size);
        self.query.clamp_page(self.page.total_pages);
        true
    }
}

/// Transport seam for reading one page of a collection.
#[async_trait]
pub trait CollectionFetcher<T>: Send + Sync {
    /// Fetch the page the query describes.
    async fn fetch(&self, query: &ListQuery) -> Result<Page<T>, ActionError>;
}

/// Async driver pairing a [`CollectionStore`] with a transport.
pub struct RemoteCollection<T> {
    store: Mutex<CollectionStore<T>>,
    fetcher: Arc<dyn CollectionFetcher<T>>,
    debounce_epoch: AtomicU64,
}

impl<T: Send> RemoteCollection<T> {
    /// Create a collection over a transport with the default query.
    #[must_use]
    pub fn new(fetcher: Arc<dyn CollectionFetcher<T>>) -> Self {
        Self::with_query(fetcher, ListQuery::default())
    }

    /// Create a collection with an initial query, e.g. parsed from a URL.
    #[must_use]
    pub fn with_query(fetcher: Arc<dyn CollectionFetcher<T>>, query: ListQuery) -> Self {
        Self {
            store: Mutex::new(CollectionStore::new(query)),
            fetcher,
            debounce_epoch: AtomicU64::new(0),
        }
    }

    fn store(&self) -> MutexGuard<'_, CollectionStore<T>> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Read a snapshot of the store under the lock.
    pub fn read<R>(&self, reader: impl FnOnce(&CollectionStore<T>) -> R) -> R {
        reader(&self.store())
    }

    /// Merge the server's canonical copy of an entity into the current page.
    pub fn merge_entity(&self, entity: T) -> bool
    where
        T: Identified,
    {
        self.store().merge_entity(entity)
    }

    /// Drop an entity from the current page after a confirmed delete.
    pub fn remove_entity(&self, entity_id: &str) -> bool
    where
        T: Identified,
    {
        self.store().remove_entity(entity_id)
    }

    /// Apply a filter patch and run the fetch it plans.
    ///
    /// Text-search edits take effect in the query immediately but only hit
    /// the network after [`crate::query::SEARCH_DEBOUNCE`] of quiet; a burst
    /// of keystrokes collapses into one trailing request. Any later patch
    /// cancels a pending debounced fetch.
    pub async fn apply(&self, patch: QueryPatch) {
        let plan = self.store().set_filter(patch);
        match plan {
            FetchPlan::Skip => {}
            FetchPlan::Immediate => {
                self.debounce_epoch.fetch_add(1, Ordering::SeqCst);
                self.refresh().await;
            }
            FetchPlan::Debounced(delay) => {
                let epoch = self.debounce_epoch.fetch_add(1, Ordering::SeqCst) + 1;
                sleep(delay).await;
                if self.debounce_epoch.load(Ordering::SeqCst) == epoch {
                    self.refresh().await;
                }
            }
        }
    }

    /// Fetch the current page, retrying once when the response proves the
    /// requested page was past the end of the collection.
    pub async fn refresh(&self) {
        loop {
            let (ticket, query) = {
                let mut store = self.store();
                (store.begin_fetch(), store.query().clone())
            };
            let result = self.fetcher.fetch(&query).await;
            let outcome = self.store().complete_fetch(ticket, result);
            if outcome != FetchOutcome::PageClamped {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_api_models::PageInfo;
    use std::sync::atomic::AtomicUsize;

    #[derive(Clone, Debug, PartialEq, Eq)]
    struct Row {
        id: String,
        status: String,
    }

    impl Identified for Row {
        fn entity_id(&self) -> &str {
            &self.id
        }
    }

    fn row(id: &str, status: &str) -> Row {
        Row {
            id: id.into(),
            status: status.into(),
        }
    }

    fn page(items: Vec<Row>, total_items: u64, total_pages: u32) -> Page<Row> {
        Page {
            items,
            total_items,
            total_pages,
        }
    }

    #[test]
    fn envelope_validation_enforces_page_invariants() {
        let good = PageEnvelope {
            items: vec![row("a", "pending"), row("b", "pending")],
            pagination: PageInfo { total: 41, pages: 3 },
        };
        let parsed = Page::try_from_envelope(good, 20).expect("valid envelope");
        assert_eq!(parsed.total_pages, 3);

        let overfull = PageEnvelope {
            items: vec![row("a", "pending"), row("b", "pending")],
            pagination: PageInfo { total: 2, pages: 2 },
        };
        assert_eq!(
            Page::try_from_envelope(overfull, 1),
            Err(PageShapeError::TooManyItems {
                items: 2,
                page_size: 1,
            })
        );

        let miscounted = PageEnvelope {
            items: vec![row("a", "pending")],
            pagination: PageInfo { total: 41, pages: 2 },
        };
        assert_eq!(
            Page::try_from_envelope(miscounted, 20),
            Err(PageShapeError::PageCountMismatch {
                pages: 2,
                total: 41,
                page_size: 20,
            })
        );
    }

    #[test]
    fn empty_collection_reports_zero_pages() {
        let empty: PageEnvelope<Row> = PageEnvelope {
            items: Vec::new(),
            pagination: PageInfo { total: 0, pages: 0 },
        };
        let parsed = Page::try_from_envelope(empty, 20).expect("empty envelope");
        assert_eq!(parsed.total_pages, 0);
    }

    #[test]
    fn stale_response_is_discarded_in_favor_of_latest() {
        let mut store = CollectionStore::<Row>::default();
        let first = store.begin_fetch();
        let second = store.begin_fetch();

        // The later-issued fetch resolves first.
        let outcome = store.complete_fetch(second, Ok(page(vec![row("new", "pending")], 1, 1)));
        assert_eq!(outcome, FetchOutcome::Applied);
        assert!(!store.is_loading());

        // The earlier fetch resolves afterwards and must not clobber it.
        let outcome = store.complete_fetch(first, Ok(page(vec![row("old", "draft")], 1, 1)));
        assert_eq!(outcome, FetchOutcome::Stale);
        assert_eq!(store.page().items, vec![row("new", "pending")]);
    }

    #[test]
    fn failed_fetch_keeps_last_good_page() {
        let mut store = CollectionStore::<Row>::default();
        let ticket = store.begin_fetch();
        store.complete_fetch(ticket, Ok(page(vec![row("a", "pending")], 1, 1)));

        let ticket = store.begin_fetch();
        let outcome = store.complete_fetch(ticket, Err(ActionError::Network("boom".into())));
        assert_eq!(outcome, FetchOutcome::Failed);
        assert_eq!(store.page().items.len(), 1);
        assert_eq!(store.error(), Some(&ActionError::Network("boom".into())));

        // The next success clears the error flag.
        let ticket = store.begin_fetch();
        store.complete_fetch(ticket, Ok(page(vec![row("b", "draft")], 1, 1)));
        assert!(store.error().is_none());
    }

    #[test]
    fn overrun_page_is_clamped_and_reported() {
        let mut store = CollectionStore::<Row>::new(ListQuery {
            page: 7,
            ..ListQuery::default()
        });
        let ticket = store.begin_fetch();
        let outcome = store.complete_fetch(ticket, Ok(page(Vec::new(), 42, 3)));
        assert_eq!(outcome, FetchOutcome::PageClamped);
        assert_eq!(store.query().page, 3);
    }

    #[test]
    fn merge_replaces_matching_entity_only() {
        let mut store = CollectionStore::<Row>::default();
        let ticket = store.begin_fetch();
        store.complete_fetch(
            ticket,
            Ok(page(vec![row("a", "pending"), row("b", "pending")], 2, 1)),
        );

        assert!(store.merge_entity(row("b", "rejected")));
        assert_eq!(store.page().items[1], row("b", "rejected"));
        assert_eq!(store.page().items[0], row("a", "pending"));
        assert!(!store.merge_entity(row("zzz", "draft")));
    }

    #[test]
    fn remove_decrements_totals_and_reclamps() {
        let mut store = CollectionStore::<Row>::new(ListQuery {
            page: 2,
            page_size: 1,
            ..ListQuery::default()
        });
        let ticket = store.begin_fetch();
        store.complete_fetch(ticket, Ok(page(vec![row("b", "pending")], 2, 2)));

        assert!(store.remove_entity("b"));
        assert_eq!(store.page().total_items, 1);
        assert_eq!(store.page().total_pages, 1);
        assert_eq!(store.query().page, 1);
        assert!(!store.remove_entity("b"));
    }

    struct ScriptedFetcher {
        calls: AtomicUsize,
        pages: Vec<Page<Row>>,
    }

    impl ScriptedFetcher {
        fn new(pages: Vec<Page<Row>>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                pages,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CollectionFetcher<Row> for ScriptedFetcher {
        async fn fetch(&self, _query: &ListQuery) -> Result<Page<Row>, ActionError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .pages
                .get(call.min(self.pages.len().saturating_sub(1)))
                .cloned()
                .unwrap_or_default())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn search_burst_collapses_into_one_trailing_fetch() {
        let fetcher = ScriptedFetcher::new(vec![page(vec![row("a", "pending")], 1, 1)]);
        let collection = Arc::new(RemoteCollection::new(
            fetcher.clone() as Arc<dyn CollectionFetcher<Row>>
        ));

        let burst = {
            let collection = collection.clone();
            tokio::spawn(async move {
                collection.apply(QueryPatch::search("wat")).await;
            })
        };
        let trailing = {
            let collection = collection.clone();
            tokio::spawn(async move {
                collection.apply(QueryPatch::search("watercolor")).await;
            })
        };
        burst.await.expect("burst task");
        trailing.await.expect("trailing task");

        assert_eq!(fetcher.calls(), 1);
        collection.read(|store| {
            assert_eq!(store.query().search, "watercolor");
            assert_eq!(store.page().items.len(), 1);
        });
    }

    #[tokio::test(start_paused = true)]
    async fn discrete_filter_cancels_pending_search_fetch() {
        let fetcher = ScriptedFetcher::new(vec![page(Vec::new(), 0, 0)]);
        let collection = Arc::new(RemoteCollection::new(
            fetcher.clone() as Arc<dyn CollectionFetcher<Row>>
        ));

        let search = {
            let collection = collection.clone();
            tokio::spawn(async move {
                collection.apply(QueryPatch::search("yarn")).await;
            })
        };
        let filter = {
            let collection = collection.clone();
            tokio::spawn(async move {
                collection
                    .apply(QueryPatch::status(crate::query::StatusFilter::Only(
                        "pending".into(),
                    )))
                    .await;
            })
        };
        search.await.expect("search task");
        filter.await.expect("filter task");

        // The discrete change fetched immediately; the debounced search
        // fetch was cancelled by the newer patch.
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn clamped_page_triggers_a_refetch() {
        let fetcher = ScriptedFetcher::new(vec![
            page(Vec::new(), 42, 3),
            page(vec![row("last", "pending")], 42, 3),
        ]);
        let collection = RemoteCollection::with_query(
            fetcher.clone() as Arc<dyn CollectionFetcher<Row>>,
            ListQuery {
                page: 9,
                ..ListQuery::default()
            },
        );

        collection.refresh().await;

        assert_eq!(fetcher.calls(), 2);
        collection.read(|store| {
            assert_eq!(store.query().page, 3);
            assert_eq!(store.page().items, vec![row("last", "pending")]);
        });
    }
}
