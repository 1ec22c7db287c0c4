//! List query state and its canonical URL serialization.
//!
//! The query string is the persisted "view state": serializing the current
//! [`ListQuery`] and parsing it back must round-trip so filtered views stay
//! shareable and bookmarkable.

use std::time::Duration;

use url::form_urlencoded;

/// Trailing debounce applied to text-search changes.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

const DEFAULT_PAGE_SIZE: u32 = 20;

/// Status filter applied to a collection listing.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum StatusFilter {
    /// No status constraint.
    #[default]
    All,
    /// Only entities whose status label matches.
    Only(String),
}

impl StatusFilter {
    /// Query-string value for the filter, `None` when unconstrained.
    #[must_use]
    pub fn as_param(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::Only(label) => Some(label),
        }
    }
}

/// Filter, search, sort and pagination state for one collection view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListQuery {
    /// Current page, 1-based.
    pub page: u32,
    /// Items per page.
    pub page_size: u32,
    /// Free-text search, empty when unset.
    pub search: String,
    /// Status constraint.
    pub status: StatusFilter,
    /// Sort key understood by the server, when set.
    pub sort: Option<String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            search: String::new(),
            status: StatusFilter::All,
            sort: None,
        }
    }
}

/// Partial update merged into a [`ListQuery`].
///
/// Any patch that does not explicitly set `page` resets it to 1: every
/// filter change starts the reader back at the first page.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct QueryPatch {
    /// Explicit page change.
    pub page: Option<u32>,
    /// Page size change.
    pub page_size: Option<u32>,
    /// Search text change.
    pub search: Option<String>,
    /// Status filter change.
    pub status: Option<StatusFilter>,
    /// Sort change; `Some(None)` clears the sort.
    pub sort: Option<Option<String>>,
}

impl QueryPatch {
    /// Patch that only moves to another page.
    #[must_use]
    pub const fn page(page: u32) -> Self {
        Self {
            page: Some(page),
            page_size: None,
            search: None,
            status: None,
            sort: None,
        }
    }

    /// Patch that only changes the search text.
    #[must_use]
    pub fn search(text: impl Into<String>) -> Self {
        Self {
            search: Some(text.into()),
            ..Self::default()
        }
    }

    /// Patch that only changes the status filter.
    #[must_use]
    pub fn status(filter: StatusFilter) -> Self {
        Self {
            status: Some(filter),
            ..Self::default()
        }
    }
}

/// How a query change should be turned into a fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchPlan {
    /// Nothing changed; no fetch.
    Skip,
    /// Discrete filter change; fetch now.
    Immediate,
    /// Text-search change; fetch after [`SEARCH_DEBOUNCE`] of quiet.
    Debounced(Duration),
}

impl ListQuery {
    /// Merge a patch into the query and plan the resulting fetch.
    ///
    /// Page and page size are floored at 1; a patch without an explicit
    /// `page` resets the page to 1 whenever anything else changed.
    pub fn apply(&mut self, patch: QueryPatch) -> FetchPlan {
        let before = self.clone();

        if let Some(page_size) = patch.page_size {
            self.page_size = page_size.max(1);
        }
        if let Some(search) = patch.search {
            self.search = search;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(sort) = patch.sort {
            self.sort = sort;
        }

        let filters_changed = self.page_size != before.page_size
            || self.search != before.search
            || self.status != before.status
            || self.sort != before.sort;

        if let Some(page) = patch.page {
            self.page = page.max(1);
        } else if filters_changed {
            self.page = 1;
        }

        if *self == before {
            FetchPlan::Skip
        } else if filters_changed
            && self.search != before.search
            && self.page_size == before.page_size
            && self.status == before.status
            && self.sort == before.sort
        {
            FetchPlan::Debounced(SEARCH_DEBOUNCE)
        } else {
            FetchPlan::Immediate
        }
    }

    /// Clamp the page into `[1, total_pages]`; returns whether it moved.
    ///
    /// An empty collection clamps to page 1.
    pub fn clamp_page(&mut self, total_pages: u32) -> bool {
        let clamped = self.page.clamp(1, total_pages.max(1));
        let moved = clamped != self.page;
        self.page = clamped;
        moved
    }

    /// Query pairs in the order the server expects them.
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("limit", self.page_size.to_string()),
        ];
        if !self.search.is_empty() {
            pairs.push(("search", self.search.clone()));
        }
        if let Some(status) = self.status.as_param() {
            pairs.push(("status", status.to_string()));
        }
        if let Some(sort) = &self.sort {
            pairs.push(("sort", sort.clone()));
        }
        pairs
    }

    /// Canonical query-string serialization of the view state.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in self.to_query_pairs() {
            serializer.append_pair(key, &value);
        }
        serializer.finish()
    }

    /// Parse a query string back into view state.
    ///
    /// Unknown keys are ignored; missing keys fall back to defaults so a
    /// hand-edited or truncated URL still yields a usable query.
    #[must_use]
    pub fn parse_query_string(raw: &str) -> Self {
        let mut query = Self::default();
        for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
            match key.as_ref() {
                "page" => {
                    if let Ok(page) = value.parse::<u32>() {
                        query.page = page.max(1);
                    }
                }
                "limit" => {
                    if let Ok(size) = value.parse::<u32>() {
                        query.page_size = size.max(1);
                    }
                }
                "search" => query.search = value.into_owned(),
                "status" => query.status = StatusFilter::Only(value.into_owned()),
                "sort" => query.sort = Some(value.into_owned()),
                _ => {}
            }
        }
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_change_resets_page_to_one() {
        let mut query = ListQuery {
            page: 4,
            ..ListQuery::default()
        };
        let plan = query.apply(QueryPatch::status(StatusFilter::Only("pending".into())));
        assert_eq!(query.page, 1);
        assert_eq!(plan, FetchPlan::Immediate);
    }

    #[test]
    fn explicit_page_survives_combined_patch() {
        let mut query = ListQuery::default();
        let plan = query.apply(QueryPatch {
            page: Some(3),
            status: Some(StatusFilter::Only("rejected".into())),
            ..QueryPatch::default()
        });
        assert_eq!(query.page, 3);
        assert_eq!(plan, FetchPlan::Immediate);
    }

    #[test]
    fn search_change_debounces() {
        let mut query = ListQuery {
            page: 2,
            ..ListQuery::default()
        };
        let plan = query.apply(QueryPatch::search("watercolor"));
        assert_eq!(plan, FetchPlan::Debounced(SEARCH_DEBOUNCE));
        assert_eq!(query.page, 1);
    }

    #[test]
    fn search_combined_with_discrete_filter_is_immediate() {
        let mut query = ListQuery::default();
        let plan = query.apply(QueryPatch {
            search: Some("loom".into()),
            status: Some(StatusFilter::Only("draft".into())),
            ..QueryPatch::default()
        });
        assert_eq!(plan, FetchPlan::Immediate);
    }

    #[test]
    fn noop_patch_skips_fetch() {
        let mut query = ListQuery::default();
        assert_eq!(query.apply(QueryPatch::default()), FetchPlan::Skip);
        assert_eq!(query.apply(QueryPatch::search("")), FetchPlan::Skip);
    }

    #[test]
    fn page_and_size_are_floored_at_one() {
        let mut query = ListQuery::default();
        query.apply(QueryPatch {
            page: Some(0),
            page_size: Some(0),
            ..QueryPatch::default()
        });
        assert_eq!(query.page, 1);
        assert_eq!(query.page_size, 1);
    }

    #[test]
    fn clamp_pulls_overrun_page_back() {
        let mut query = ListQuery {
            page: 9,
            ..ListQuery::default()
        };
        assert!(query.clamp_page(3));
        assert_eq!(query.page, 3);
        assert!(!query.clamp_page(3));
        assert!(query.clamp_page(0));
        assert_eq!(query.page, 1);
    }

    #[test]
    fn query_string_round_trips() {
        let query = ListQuery {
            page: 2,
            page_size: 25,
            search: "watercolor kit".into(),
            status: StatusFilter::Only("pending".into()),
            sort: Some("updated_at".into()),
        };
        let raw = query.to_query_string();
        assert_eq!(ListQuery::parse_query_string(&raw), query);
    }

    #[test]
    fn defaults_omit_empty_parameters() {
        let raw = ListQuery::default().to_query_string();
        assert_eq!(raw, "page=1&limit=20");
    }

    #[test]
    fn parse_ignores_unknown_keys_and_junk() {
        let query = ListQuery::parse_query_string("page=abc&limit=50&theme=dark&search=yarn");
        assert_eq!(query.page, 1);
        assert_eq!(query.page_size, 50);
        assert_eq!(query.search, "yarn");
        assert_eq!(query.status, StatusFilter::All);
    }
}
