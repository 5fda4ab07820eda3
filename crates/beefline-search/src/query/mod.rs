//! Search query model.
//!
//! A [`SearchQuery`] is the reconciled state of one search view: free text,
//! structured filters, sort order and the pagination cursor.

mod filter;
mod page;
mod sort;

pub use filter::FilterSet;
pub use page::{PageCursor, DEFAULT_PAGE_SIZE};
pub use sort::{SortDirection, SortField, SortSpec};

use serde::{Deserialize, Serialize};

/// The authoritative search state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Free-text term. Empty means no text filter.
    pub text: String,
    /// Structured predicates.
    pub filters: FilterSet,
    /// Sort order.
    pub sort: SortSpec,
    /// Pagination cursor.
    pub page: PageCursor,
}

impl SearchQuery {
    /// Create an empty query on page 1.
    pub fn new(page_size: u32) -> Self {
        Self {
            text: String::new(),
            filters: FilterSet::default(),
            sort: SortSpec::default(),
            page: PageCursor::new(page_size),
        }
    }

    /// Set the text query.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set the filters.
    pub fn with_filters(mut self, filters: FilterSet) -> Self {
        self.filters = filters;
        self
    }

    /// Set the sort order.
    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = sort;
        self
    }

    /// Set the current page. Pages below 1 are clamped to 1.
    pub fn with_page(mut self, page: u32) -> Self {
        self.page.current_page = page.max(1);
        self
    }
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

/// Caller-supplied fallbacks used when hydrating from a URL that omits a
/// parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchDefaults {
    pub text: String,
    pub filters: FilterSet,
    pub sort: SortSpec,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_builder() {
        let query = SearchQuery::new(24)
            .with_text("zebu")
            .with_filters(FilterSet::new().with_region("Volta"))
            .with_sort(SortSpec::ascending(SortField::Price))
            .with_page(3);

        assert_eq!(query.text, "zebu");
        assert_eq!(query.filters.region.as_deref(), Some("Volta"));
        assert_eq!(query.sort.field, SortField::Price);
        assert_eq!(query.page.current_page, 3);
        assert_eq!(query.page.page_size, 24);
    }

    #[test]
    fn test_page_clamped() {
        let query = SearchQuery::default().with_page(0);
        assert_eq!(query.page.current_page, 1);
    }
}
