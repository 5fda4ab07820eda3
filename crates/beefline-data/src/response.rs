//! Listing API response envelopes.

use beefline_search::{Listing, ListingPage};
use serde::{Deserialize, Serialize};

/// One page of a paginated collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub total_pages: u32,
}

impl<T> PaginatedResponse<T> {
    /// Page count, derived from `total` and `limit` when the server omits it.
    pub fn page_count(&self) -> u32 {
        if self.total_pages > 0 || self.limit == 0 {
            return self.total_pages;
        }
        u32::try_from(self.total.div_ceil(u64::from(self.limit))).unwrap_or(u32::MAX)
    }
}

impl From<PaginatedResponse<Listing>> for ListingPage {
    fn from(response: PaginatedResponse<Listing>) -> Self {
        let total_pages = response.page_count();
        ListingPage {
            items: response.data,
            total_count: response.total,
            total_pages,
        }
    }
}
