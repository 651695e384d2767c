//! Page-number pagination for list endpoints.

use serde::{Deserialize, Serialize};

/// Hard cap on page sizes.
pub const MAX_PAGE_SIZE: u64 = 100;

/// Pagination query parameters.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    /// 1-based page number.
    #[serde(default = "default_page")]
    pub page: u64,
    /// Results per page (endpoint-specific default, capped at
    /// [`MAX_PAGE_SIZE`]).
    pub page_size: Option<u64>,
}

const fn default_page() -> u64 {
    1
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: None,
        }
    }
}

impl PageQuery {
    /// Effective page number (zero is treated as the first page).
    #[must_use]
    pub const fn page(&self) -> u64 {
        if self.page == 0 { 1 } else { self.page }
    }

    /// Effective page size.
    #[must_use]
    pub fn size(&self, default: u64) -> u64 {
        self.page_size.unwrap_or(default).clamp(1, MAX_PAGE_SIZE)
    }

    /// Row offset for the effective page.
    #[must_use]
    pub fn offset(&self, default_size: u64) -> u64 {
        (self.page() - 1) * self.size(default_size)
    }
}

/// Page envelope returned by list endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T: Serialize> {
    /// Total number of results across all pages.
    pub count: u64,
    /// Next page number, if any.
    pub next: Option<u64>,
    /// Previous page number, if any.
    pub previous: Option<u64>,
    /// Results for this page.
    pub results: Vec<T>,
}

impl<T: Serialize> Page<T> {
    /// Build a page envelope from a total count and the current window.
    #[must_use]
    pub fn new(count: u64, page: u64, page_size: u64, results: Vec<T>) -> Self {
        let next = if page.saturating_mul(page_size) < count {
            Some(page + 1)
        } else {
            None
        };
        let previous = if page > 1 { Some(page - 1) } else { None };

        Self {
            count,
            next,
            previous,
            results,
        }
    }
}
