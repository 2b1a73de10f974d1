//! Client-side pagination over an already-fetched collection.
//!
//! List pages fetch an entity's full collection, filter it in memory and then
//! show one fixed-size page of the result. The current page number lives in
//! the `page` query parameter so that reloads and shared links land on the
//! same page. Every other query parameter (notably `filter`) is preserved
//! when the page changes.
//!
//! ```
//! use tojumi_core::{Pagination, PaginationOptions};
//!
//! let records: Vec<u32> = (1..=120).collect();
//! let pagination = Pagination::from_query(PaginationOptions::default(), Some("filter=pending&page=3"));
//! let page = pagination.paginate(&records);
//!
//! assert_eq!(page.total_pages, 3);
//! assert_eq!(page.start_index, 100);
//! assert_eq!(page.items.len(), 20);
//! assert_eq!(pagination.page_href(2), "?filter=pending&page=2");
//! ```

use std::num::NonZeroUsize;

use url::form_urlencoded;

/// Query parameter holding the current page number.
pub const PAGE_PARAM: &str = "page";

/// Number of page buttons shown by the pagination control.
pub const MAX_VISIBLE_PAGES: usize = 5;

/// Errors from building [`PaginationOptions`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationError {
    /// A page size of zero would make every page empty.
    #[error("items per page must be at least 1")]
    ZeroItemsPerPage,
}

/// Configuration for a [`Pagination`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationOptions {
    /// Page size.
    pub items_per_page: NonZeroUsize,
    /// Page shown when the query string does not name one.
    pub initial_page: usize,
    /// Read and write the page number through the query string.
    pub sync_to_url: bool,
}

impl PaginationOptions {
    /// Default page size for list pages.
    pub const DEFAULT_ITEMS_PER_PAGE: NonZeroUsize = match NonZeroUsize::new(50) {
        Some(n) => n,
        None => NonZeroUsize::MIN,
    };

    /// Options with a page size taken from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PaginationError::ZeroItemsPerPage`] when `items_per_page` is 0.
    pub fn with_items_per_page(items_per_page: usize) -> Result<Self, PaginationError> {
        let items_per_page =
            NonZeroUsize::new(items_per_page).ok_or(PaginationError::ZeroItemsPerPage)?;
        Ok(Self {
            items_per_page,
            ..Self::default()
        })
    }

    #[must_use]
    pub const fn without_url_sync(mut self) -> Self {
        self.sync_to_url = false;
        self
    }
}

impl Default for PaginationOptions {
    fn default() -> Self {
        Self {
            items_per_page: Self::DEFAULT_ITEMS_PER_PAGE,
            initial_page: 1,
            sync_to_url: true,
        }
    }
}

/// Current page state for one list view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    options: PaginationOptions,
    current_page: usize,
    query: Vec<(String, String)>,
}

impl Pagination {
    /// Start on `initial_page` with an empty query string.
    #[must_use]
    pub fn new(options: PaginationOptions) -> Self {
        Self {
            options,
            current_page: options.initial_page.max(1),
            query: Vec::new(),
        }
    }

    /// Restore state from a raw query string (with or without the leading `?`).
    ///
    /// When syncing, a `page` parameter that is missing, non-numeric or zero
    /// falls back to `initial_page`. Other parameters are kept for links.
    #[must_use]
    pub fn from_query(options: PaginationOptions, raw_query: Option<&str>) -> Self {
        let query = parse_query(raw_query.unwrap_or_default());
        let mut pagination = Self {
            query,
            ..Self::new(options)
        };

        if options.sync_to_url {
            let requested = pagination
                .query
                .iter()
                .find(|(k, _)| k == PAGE_PARAM)
                .and_then(|(_, v)| v.trim().parse::<usize>().ok())
                .filter(|page| *page > 0);
            if let Some(page) = requested {
                pagination.current_page = page;
            }
        }

        pagination
    }

    #[must_use]
    pub const fn current_page(&self) -> usize {
        self.current_page
    }

    #[must_use]
    pub const fn items_per_page(&self) -> usize {
        self.options.items_per_page.get()
    }

    /// Move to `page`.
    ///
    /// Returns the rewritten query string (`?filter=x&page=N`) when syncing to
    /// the URL, `None` otherwise. Out-of-range pages are accepted; they
    /// simply produce an empty slice.
    pub fn set_page(&mut self, page: usize) -> Option<String> {
        self.current_page = page;
        if !self.options.sync_to_url {
            return None;
        }
        self.query = with_param(&self.query, PAGE_PARAM, &page.to_string());
        Some(to_href(&self.query))
    }

    /// Link target for a page control, preserving every other parameter.
    #[must_use]
    pub fn page_href(&self, page: usize) -> String {
        to_href(&with_param(&self.query, PAGE_PARAM, &page.to_string()))
    }

    /// Slice `items` to the current page.
    #[must_use]
    pub fn paginate<'a, T>(&self, items: &'a [T]) -> Page<'a, T> {
        let per_page = self.items_per_page();
        let total_items = items.len();
        let total_pages = total_items.div_ceil(per_page);
        let start_index = self.current_page.saturating_sub(1).saturating_mul(per_page);

        let slice: &[T] = if self.current_page == 0 {
            Default::default()
        } else {
            let end = start_index.saturating_add(per_page).min(total_items);
            items.get(start_index..end).unwrap_or_default()
        };

        Page {
            items: slice,
            total_items,
            total_pages,
            current_page: self.current_page,
            start_index,
            items_per_page: per_page,
        }
    }
}

/// One page of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page<'a, T> {
    /// The records on this page, empty when the page is out of range.
    pub items: &'a [T],
    pub total_items: usize,
    /// `ceil(total_items / items_per_page)`, zero for an empty collection.
    pub total_pages: usize,
    pub current_page: usize,
    pub start_index: usize,
    pub items_per_page: usize,
}

impl<T> Page<'_, T> {
    /// Last page for display; an empty collection still has page 1.
    #[must_use]
    pub fn last_page(&self) -> usize {
        self.total_pages.max(1)
    }

    /// Whether pagination controls should be rendered at all.
    #[must_use]
    pub const fn shows_controls(&self) -> bool {
        self.total_pages > 1
    }

    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.current_page > 1 && self.current_page <= self.total_pages
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    /// 1-based index of the first record shown, 0 when nothing is shown.
    #[must_use]
    pub const fn first_shown(&self) -> usize {
        if self.items.is_empty() {
            0
        } else {
            self.start_index + 1
        }
    }

    /// 1-based index of the last record shown.
    #[must_use]
    pub const fn last_shown(&self) -> usize {
        self.start_index + self.items.len()
    }

    /// Page numbers for the pagination control.
    #[must_use]
    pub fn window(&self) -> Vec<usize> {
        page_window(self.current_page, self.total_pages, MAX_VISIBLE_PAGES)
    }
}

/// Page numbers to render, at most `max_visible`, centred on `current` and
/// shifted when near either end.
#[must_use]
pub fn page_window(current: usize, total_pages: usize, max_visible: usize) -> Vec<usize> {
    if total_pages == 0 || max_visible == 0 {
        return Vec::new();
    }
    if total_pages <= max_visible {
        return (1..=total_pages).collect();
    }

    let current = current.clamp(1, total_pages);
    let mut start = current.saturating_sub(max_visible / 2).max(1);
    let end = (start + max_visible - 1).min(total_pages);
    if end - start + 1 < max_visible {
        start = end + 1 - max_visible;
    }
    (start..=end).collect()
}

pub(crate) fn parse_query(raw: &str) -> Vec<(String, String)> {
    form_urlencoded::parse(raw.trim_start_matches('?').as_bytes())
        .into_owned()
        .collect()
}

/// Replace the first `key` in place (dropping duplicates) or append it.
pub(crate) fn with_param(query: &[(String, String)], key: &str, value: &str) -> Vec<(String, String)> {
    let mut out = Vec::with_capacity(query.len() + 1);
    let mut replaced = false;
    for (k, v) in query {
        if k == key {
            if !replaced {
                out.push((k.clone(), value.to_owned()));
                replaced = true;
            }
        } else {
            out.push((k.clone(), v.clone()));
        }
    }
    if !replaced {
        out.push((key.to_owned(), value.to_owned()));
    }
    out
}

pub(crate) fn to_href(query: &[(String, String)]) -> String {
    if query.is_empty() {
        return "?".to_owned();
    }
    let encoded = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(query)
        .finish();
    format!("?{encoded}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn per_page(n: usize) -> PaginationOptions {
        PaginationOptions::with_items_per_page(n).expect("non-zero")
    }

    #[test]
    fn test_guarantor_scenario_120_records() {
        let records: Vec<usize> = (1..=120).collect();
        let mut pagination = Pagination::new(per_page(50));

        let first = pagination.paginate(&records);
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.start_index, 0);
        assert_eq!(first.items.first(), Some(&1));
        assert_eq!(first.items.last(), Some(&50));

        pagination.set_page(3);
        let third = pagination.paginate(&records);
        assert_eq!(third.start_index, 100);
        assert_eq!(third.items.len(), 20);
        assert_eq!(third.items.first(), Some(&101));
        assert_eq!(third.items.last(), Some(&120));
    }

    #[test]
    fn test_pages_cover_collection_exactly_once() {
        for total in [0_usize, 1, 7, 49, 50, 51, 100, 123] {
            for size in [1_usize, 3, 50] {
                let records: Vec<usize> = (0..total).collect();
                let mut pagination = Pagination::new(per_page(size));
                let pages = pagination.paginate(&records).total_pages;

                let mut seen = Vec::new();
                for k in 1..=pages {
                    pagination.set_page(k);
                    assert_eq!(pagination.current_page(), k);
                    seen.extend_from_slice(pagination.paginate(&records).items);
                }
                assert_eq!(seen, records, "total={total} size={size}");
            }
        }
    }

    #[test]
    fn test_out_of_range_pages_are_empty() {
        let records = [1, 2, 3];
        let mut pagination = Pagination::new(per_page(2));

        pagination.set_page(0);
        let page = pagination.paginate(&records);
        assert!(page.items.is_empty());
        assert_eq!(page.start_index, 0);

        pagination.set_page(9);
        assert!(pagination.paginate(&records).items.is_empty());

        pagination.set_page(usize::MAX);
        assert!(pagination.paginate(&records).items.is_empty());
    }

    #[test]
    fn test_empty_collection_has_display_page() {
        let records: [u8; 0] = [];
        let page = Pagination::new(PaginationOptions::default()).paginate(&records);
        assert_eq!(page.total_pages, 0);
        assert_eq!(page.last_page(), 1);
        assert!(page.items.is_empty());
        assert!(!page.shows_controls());
        assert_eq!(page.first_shown(), 0);
    }

    #[test]
    fn test_zero_items_per_page_rejected() {
        assert_eq!(
            PaginationOptions::with_items_per_page(0),
            Err(PaginationError::ZeroItemsPerPage)
        );
    }

    #[test]
    fn test_from_query_reads_page() {
        let p = Pagination::from_query(PaginationOptions::default(), Some("?filter=approved&page=4"));
        assert_eq!(p.current_page(), 4);
    }

    #[test]
    fn test_from_query_falls_back_to_initial_page() {
        let options = PaginationOptions {
            initial_page: 2,
            ..PaginationOptions::default()
        };
        for raw in [None, Some(""), Some("page=abc"), Some("page=0"), Some("page=-1")] {
            assert_eq!(Pagination::from_query(options, raw).current_page(), 2, "{raw:?}");
        }
    }

    #[test]
    fn test_from_query_ignored_without_sync() {
        let options = PaginationOptions::default().without_url_sync();
        let mut p = Pagination::from_query(options, Some("page=3"));
        assert_eq!(p.current_page(), 1);
        assert_eq!(p.set_page(2), None);
        assert_eq!(p.current_page(), 2);
    }

    #[test]
    fn test_set_page_preserves_other_params() {
        let mut p = Pagination::from_query(
            PaginationOptions::default(),
            Some("filter=pending&page=1&q=ada+lovelace"),
        );
        assert_eq!(
            p.set_page(2).as_deref(),
            Some("?filter=pending&page=2&q=ada+lovelace")
        );

        let mut p = Pagination::from_query(PaginationOptions::default(), Some("filter=rejected"));
        assert_eq!(p.set_page(3).as_deref(), Some("?filter=rejected&page=3"));
    }

    #[test]
    fn test_page_href_collapses_duplicate_page_params() {
        let p = Pagination::from_query(PaginationOptions::default(), Some("page=1&filter=all&page=5"));
        assert_eq!(p.current_page(), 1);
        assert_eq!(p.page_href(2), "?page=2&filter=all");
    }

    #[test]
    fn test_page_window() {
        assert_eq!(page_window(1, 0, 5), Vec::<usize>::new());
        assert_eq!(page_window(2, 3, 5), vec![1, 2, 3]);
        assert_eq!(page_window(1, 10, 5), vec![1, 2, 3, 4, 5]);
        assert_eq!(page_window(6, 10, 5), vec![4, 5, 6, 7, 8]);
        assert_eq!(page_window(10, 10, 5), vec![6, 7, 8, 9, 10]);
        assert_eq!(page_window(9, 10, 5), vec![6, 7, 8, 9, 10]);
        assert_eq!(page_window(42, 10, 5), vec![6, 7, 8, 9, 10]);
    }

    #[test]
    fn test_page_navigation_flags() {
        let records: Vec<usize> = (0..120).collect();
        let mut p = Pagination::new(PaginationOptions::default());
        let page = p.paginate(&records);
        assert!(!page.has_previous());
        assert!(page.has_next());
        assert_eq!((page.first_shown(), page.last_shown()), (1, 50));

        p.set_page(3);
        let page = p.paginate(&records);
        assert!(page.has_previous());
        assert!(!page.has_next());
        assert_eq!((page.first_shown(), page.last_shown()), (101, 120));
    }
}
