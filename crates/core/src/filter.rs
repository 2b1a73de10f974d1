//! Status filters for list pages.
//!
//! Filtering is done in memory over the full fetched collection. The selected
//! filter lives in the `filter` query parameter; switching filters always
//! returns to page 1.

use core::fmt;
use std::str::FromStr;

use crate::pagination::{PAGE_PARAM, parse_query, to_href, with_param};
use crate::types::ApprovalStatus;

/// Query parameter holding the selected filter.
pub const FILTER_PARAM: &str = "filter";

/// Filter over the approval tri-state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Approved,
    Rejected,
    Pending,
}

impl StatusFilter {
    /// Filter buttons in display order.
    pub const ALL: [Self; 4] = [Self::All, Self::Approved, Self::Rejected, Self::Pending];

    #[must_use]
    pub const fn matches(self, status: ApprovalStatus) -> bool {
        matches!(
            (self, status),
            (Self::All, _)
                | (Self::Approved, ApprovalStatus::Approved)
                | (Self::Rejected, ApprovalStatus::Rejected)
                | (Self::Pending, ApprovalStatus::Pending)
        )
    }

    /// Query value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Pending => "pending",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
            Self::Pending => "Pending",
        }
    }

    /// Parse the `filter` parameter; anything unknown means `All`.
    #[must_use]
    pub fn from_query(value: Option<&str>) -> Self {
        value.and_then(|v| v.parse().ok()).unwrap_or_default()
    }

    /// Keep the records whose status passes this filter.
    pub fn apply<'a, T>(
        self,
        items: &'a [T],
        status: impl Fn(&T) -> ApprovalStatus,
    ) -> Vec<&'a T> {
        items.iter().filter(|item| self.matches(status(*item))).collect()
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" | "" => Ok(Self::All),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "pending" => Ok(Self::Pending),
            _ => Err(format!("unknown filter: {s}")),
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filter over a boolean verified flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VerificationFilter {
    #[default]
    All,
    Verified,
    NotVerified,
}

impl VerificationFilter {
    pub const ALL: [Self; 3] = [Self::All, Self::Verified, Self::NotVerified];

    #[must_use]
    pub const fn matches(self, verified: bool) -> bool {
        match self {
            Self::All => true,
            Self::Verified => verified,
            Self::NotVerified => !verified,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Verified => "verified",
            Self::NotVerified => "not-verified",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Verified => "Verified",
            Self::NotVerified => "Not verified",
        }
    }

    #[must_use]
    pub fn from_query(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("verified") => Self::Verified,
            Some("not-verified" | "not_verified" | "unverified") => Self::NotVerified,
            _ => Self::All,
        }
    }

    pub fn apply<'a, T>(self, items: &'a [T], verified: impl Fn(&T) -> bool) -> Vec<&'a T> {
        items.iter().filter(|item| self.matches(verified(*item))).collect()
    }
}

impl fmt::Display for VerificationFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Link for a filter button: sets `filter`, drops `page`, keeps the rest.
#[must_use]
pub fn filter_href(raw_query: Option<&str>, value: &str) -> String {
    let query: Vec<_> = parse_query(raw_query.unwrap_or_default())
        .into_iter()
        .filter(|(k, _)| k != PAGE_PARAM)
        .collect();
    to_href(&with_param(&query, FILTER_PARAM, value))
}

/// Read the `filter` parameter from a raw query string.
#[must_use]
pub fn filter_param(raw_query: Option<&str>) -> Option<String> {
    parse_query(raw_query.unwrap_or_default())
        .into_iter()
        .find(|(k, _)| k == FILTER_PARAM)
        .map(|(_, v)| v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::{Pagination, PaginationOptions};

    #[test]
    fn test_status_filter_parsing() {
        assert_eq!(StatusFilter::from_query(Some("Pending")), StatusFilter::Pending);
        assert_eq!(StatusFilter::from_query(Some("approved")), StatusFilter::Approved);
        assert_eq!(StatusFilter::from_query(Some("bogus")), StatusFilter::All);
        assert_eq!(StatusFilter::from_query(None), StatusFilter::All);
    }

    #[test]
    fn test_status_filter_matches() {
        let statuses = [
            ApprovalStatus::Pending,
            ApprovalStatus::Approved,
            ApprovalStatus::Rejected,
            ApprovalStatus::Pending,
        ];
        let pending = StatusFilter::Pending.apply(&statuses, |s| *s);
        assert_eq!(pending.len(), 2);
        assert_eq!(StatusFilter::All.apply(&statuses, |s| *s).len(), 4);
        assert_eq!(StatusFilter::Rejected.apply(&statuses, |s| *s).len(), 1);
    }

    #[test]
    fn test_verification_filter() {
        let flags = [true, false, false];
        assert_eq!(VerificationFilter::Verified.apply(&flags, |v| *v).len(), 1);
        assert_eq!(VerificationFilter::NotVerified.apply(&flags, |v| *v).len(), 2);
        assert_eq!(
            VerificationFilter::from_query(Some("not-verified")),
            VerificationFilter::NotVerified
        );
    }

    #[test]
    fn test_filter_href_resets_page() {
        assert_eq!(
            filter_href(Some("page=3&filter=approved&q=x"), "pending"),
            "?filter=pending&q=x"
        );
        assert_eq!(filter_href(None, "rejected"), "?filter=rejected");
    }

    #[test]
    fn test_changing_filter_lands_on_first_page_with_filtered_count() {
        let statuses: Vec<ApprovalStatus> = (0..120)
            .map(|i| {
                if i % 4 == 0 {
                    ApprovalStatus::Pending
                } else {
                    ApprovalStatus::Approved
                }
            })
            .collect();

        let href = filter_href(Some("filter=all&page=3"), "pending");
        let query = href.trim_start_matches('?');
        let filter = StatusFilter::from_query(filter_param(Some(query)).as_deref());
        let filtered = filter.apply(&statuses, |s| *s);

        let page = Pagination::from_query(PaginationOptions::default(), Some(query)).paginate(&filtered);
        assert_eq!(page.current_page, 1);
        assert_eq!(page.total_items, 30);
        assert_eq!(page.items.len(), 30);
    }
}
