//! Pagination cursor.

use serde::{Deserialize, Serialize};

/// Default number of listings per page.
pub const DEFAULT_PAGE_SIZE: u32 = 12;

/// Pagination cursor for a search session.
///
/// `total_pages` and `total_count` only change when a fetch succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageCursor {
    /// Current page (1-indexed).
    pub current_page: u32,
    /// Items per page, fixed for the session.
    pub page_size: u32,
    /// Total number of pages reported by the last successful fetch.
    pub total_pages: u32,
    /// Total number of listings reported by the last successful fetch.
    pub total_count: u64,
}

impl PageCursor {
    /// Create a cursor on page 1 with no known totals.
    pub fn new(page_size: u32) -> Self {
        Self {
            current_page: 1,
            page_size: page_size.max(1),
            total_pages: 0,
            total_count: 0,
        }
    }

    /// Whether there's a next page.
    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    /// Whether there's a previous page.
    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }

    /// Get page numbers for display (e.g., [3, 4, 5, 6, 7]).
    pub fn page_numbers(&self, max_visible: usize) -> Vec<u32> {
        let total = self.total_pages as usize;
        if total <= max_visible {
            return (1..=self.total_pages).collect();
        }
        if max_visible == 0 {
            return Vec::new();
        }

        let max_visible = max_visible as i64;
        let total = total as i64;
        let half = max_visible / 2;
        let start = (self.current_page as i64 - half).max(1);
        let end = (start + max_visible - 1).min(total);
        let start = (end - max_visible + 1).max(1);

        (start as u32..=end as u32).collect()
    }

    /// Get start item number (1-indexed), 0 when there are no results.
    pub fn start_item(&self) -> u64 {
        if self.total_count == 0 {
            0
        } else {
            (self.current_page as u64 - 1) * self.page_size as u64 + 1
        }
    }

    /// Get end item number.
    pub fn end_item(&self) -> u64 {
        (self.current_page as u64 * self.page_size as u64).min(self.total_count)
    }
}

impl Default for PageCursor {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}
