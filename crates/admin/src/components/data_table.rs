//! Data table component types.
//!
//! A [`DataTable`] is what every list page renders: the filter tabs, one page
//! of rows, the pagination controls and whichever empty or error state
//! applies. Filtering and paging happen in memory over the full collection.

use tojumi_core::filter::filter_href;
use tojumi_core::{Page, Pagination, StatusFilter, VerificationFilter};

use crate::store::StoreState;

/// One filter button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterTab {
    pub label: &'static str,
    pub href: String,
    pub active: bool,
}

impl FilterTab {
    /// Tabs for the approval tri-state.
    #[must_use]
    pub fn status_tabs(raw_query: Option<&str>, selected: StatusFilter) -> Vec<Self> {
        StatusFilter::ALL
            .iter()
            .map(|filter| Self {
                label: filter.label(),
                href: filter_href(raw_query, filter.as_str()),
                active: *filter == selected,
            })
            .collect()
    }

    /// Tabs for a verified flag.
    #[must_use]
    pub fn verification_tabs(raw_query: Option<&str>, selected: VerificationFilter) -> Vec<Self> {
        VerificationFilter::ALL
            .iter()
            .map(|filter| Self {
                label: filter.label(),
                href: filter_href(raw_query, filter.as_str()),
                active: *filter == selected,
            })
            .collect()
    }
}

/// A numbered page control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink {
    pub number: usize,
    pub href: String,
    pub current: bool,
}

/// Pagination controls under a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationView {
    /// Hidden when everything fits on one page.
    pub shows_controls: bool,
    pub first_shown: usize,
    pub last_shown: usize,
    pub total_items: usize,
    pub previous_href: Option<String>,
    pub next_href: Option<String>,
    pub links: Vec<PageLink>,
}

impl PaginationView {
    #[must_use]
    pub fn new<T>(pagination: &Pagination, page: &Page<'_, T>) -> Self {
        let current = page.current_page;
        Self {
            shows_controls: page.shows_controls(),
            first_shown: page.first_shown(),
            last_shown: page.last_shown(),
            total_items: page.total_items,
            previous_href: page
                .has_previous()
                .then(|| pagination.page_href(current - 1)),
            next_href: page.has_next().then(|| pagination.page_href(current + 1)),
            links: page
                .window()
                .into_iter()
                .map(|number| PageLink {
                    number,
                    href: pagination.page_href(number),
                    current: number == current,
                })
                .collect(),
        }
    }
}

/// Everything a list page shows below its heading.
#[derive(Debug, Clone)]
pub struct DataTable<E> {
    /// Records on the current page.
    pub rows: Vec<E>,
    pub tabs: Vec<FilterTab>,
    pub pagination: PaginationView,
    /// Size of the filtered collection.
    pub shown_count: usize,
    /// Size of the whole collection.
    pub total_count: usize,
    pub error: Option<String>,
    /// Waiting for the first collection to arrive.
    pub loading: bool,
    /// Label of the active filter, for the empty-filter message.
    pub filter_label: &'static str,
}

impl<E: Clone> DataTable<E> {
    /// Filter and page `state.items`.
    ///
    /// `filtered` is the subset of `state.items` that passes the active filter.
    #[must_use]
    pub fn new(
        state: &StoreState<E>,
        filtered: &[&E],
        tabs: Vec<FilterTab>,
        pagination: &Pagination,
        filter_label: &'static str,
    ) -> Self {
        let page = pagination.paginate(filtered);
        Self {
            rows: page.items.iter().map(|item| (*item).clone()).collect(),
            tabs,
            pagination: PaginationView::new(pagination, &page),
            shown_count: filtered.len(),
            total_count: state.items.len(),
            error: state.error.clone(),
            loading: state.is_first_load(),
            filter_label,
        }
    }

    /// Nothing has been registered at all.
    #[must_use]
    pub const fn is_empty_collection(&self) -> bool {
        !self.loading && self.error.is_none() && self.total_count == 0
    }

    /// Records exist, but none pass the active filter.
    #[must_use]
    pub const fn is_empty_filter(&self) -> bool {
        self.error.is_none() && self.total_count > 0 && self.shown_count == 0
    }

    /// Rows to render. A failed fetch shows its error instead of a table,
    /// even when earlier records are still held.
    #[must_use]
    pub const fn has_rows(&self) -> bool {
        self.error.is_none() && !self.rows.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tojumi_core::{ApprovalStatus, PaginationOptions};

    use super::*;

    fn state(statuses: &[ApprovalStatus]) -> StoreState<ApprovalStatus> {
        StoreState {
            items: statuses.to_vec(),
            current: None,
            loading: false,
            error: None,
            initialized: true,
        }
    }

    fn table(
        state: &StoreState<ApprovalStatus>,
        filter: StatusFilter,
        query: Option<&str>,
    ) -> DataTable<ApprovalStatus> {
        let filtered = filter.apply(&state.items, |s| *s);
        let pagination = Pagination::from_query(PaginationOptions::default(), query);
        DataTable::new(
            state,
            &filtered,
            FilterTab::status_tabs(query, filter),
            &pagination,
            filter.label(),
        )
    }

    #[test]
    fn test_count_reflects_filtered_subset() {
        let mut statuses = vec![ApprovalStatus::Approved; 70];
        statuses.extend(vec![ApprovalStatus::Pending; 50]);
        let state = state(&statuses);

        let table = table(&state, StatusFilter::Pending, Some("filter=pending"));
        assert_eq!(table.shown_count, 50);
        assert_eq!(table.total_count, 120);
        assert_eq!(table.rows.len(), 50);
        assert!(!table.pagination.shows_controls);
    }

    #[test]
    fn test_third_page_of_guarantors() {
        let state = state(&[ApprovalStatus::Pending; 120]);
        let table = table(&state, StatusFilter::All, Some("page=3"));
        assert_eq!(table.rows.len(), 20);
        assert_eq!(table.pagination.first_shown, 101);
        assert_eq!(table.pagination.last_shown, 120);
        assert_eq!(table.pagination.next_href, None);
        assert_eq!(table.pagination.previous_href.as_deref(), Some("?page=2"));
        assert!(table.pagination.links.iter().any(|l| l.number == 3 && l.current));
    }

    #[test]
    fn test_filter_tabs_reset_page() {
        let tabs = FilterTab::status_tabs(Some("filter=approved&page=3"), StatusFilter::Approved);
        assert_eq!(tabs.len(), 4);
        assert!(tabs[1].active);
        assert_eq!(tabs[3].href, "?filter=pending");
    }

    #[test]
    fn test_empty_states_are_distinct() {
        let empty = table(&state(&[]), StatusFilter::All, None);
        assert!(empty.is_empty_collection());
        assert!(!empty.is_empty_filter());

        let no_rejected = table(&state(&[ApprovalStatus::Pending]), StatusFilter::Rejected, None);
        assert!(!no_rejected.is_empty_collection());
        assert!(no_rejected.is_empty_filter());
    }

    #[test]
    fn test_failed_fetch_is_not_an_empty_collection() {
        let mut failed = state(&[]);
        failed.error = Some("Care home service unavailable".to_string());
        let table = table(&failed, StatusFilter::All, None);
        assert!(!table.is_empty_collection());
        assert!(!table.has_rows());
    }

    #[test]
    fn test_failed_refetch_hides_earlier_records() {
        let mut stale = state(&[ApprovalStatus::Approved, ApprovalStatus::Pending]);
        stale.error = Some("Failed to fetch care homes".to_string());

        let all = table(&stale, StatusFilter::All, None);
        assert!(!all.has_rows());
        assert_eq!(all.error.as_deref(), Some("Failed to fetch care homes"));

        let filtered = table(&stale, StatusFilter::Rejected, None);
        assert!(!filtered.is_empty_filter());
    }
}
