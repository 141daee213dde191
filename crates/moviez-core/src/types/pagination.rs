//! Pagination types for list endpoints.

use serde::{Deserialize, Serialize};

/// Default page size.
const DEFAULT_PAGE_SIZE: u64 = 20;
/// Maximum page size.
const MAX_PAGE_SIZE: u64 = 100;

/// Query parameters for paginated listings (`?page=2&page_size=20`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number (1-based).
    #[serde(default = "default_page")]
    pub page: u64,
    /// Number of items per page.
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

impl PageRequest {
    /// Create a page request, clamping out-of-range values.
    pub fn new(page: u64, page_size: u64) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Normalize values that arrived unclamped from a query string.
    pub fn normalized(self) -> Self {
        Self::new(self.page, self.page_size)
    }

    /// SQL `OFFSET` value.
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1) * self.page_size
    }

    /// SQL `LIMIT` value.
    pub fn limit(&self) -> u64 {
        self.page_size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of results plus totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    /// The items on this page.
    pub items: Vec<T>,
    /// Current page number (1-based).
    pub page: u64,
    /// Number of items per page.
    pub page_size: u64,
    /// Total number of items across all pages.
    pub total_items: u64,
    /// Total number of pages.
    pub total_pages: u64,
}

impl<T> PageResponse<T> {
    /// Build a page from already-sliced items and the overall count.
    pub fn new(items: Vec<T>, request: &PageRequest, total_items: u64) -> Self {
        let total_pages = total_items.div_ceil(request.page_size.max(1)).max(1);
        Self {
            items,
            page: request.page,
            page_size: request.page_size,
            total_items,
            total_pages,
        }
    }

    /// Slice a fully materialized list (used by the in-memory stores).
    pub fn from_all(all: Vec<T>, request: &PageRequest) -> Self {
        let total = all.len() as u64;
        let items = all
            .into_iter()
            .skip(request.offset() as usize)
            .take(request.limit() as usize)
            .collect();
        Self::new(items, request, total)
    }

    /// Convert each item, keeping the paging metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResponse<U> {
        PageResponse {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total_items: self.total_items,
            total_pages: self.total_pages,
        }
    }
}

fn default_page() -> u64 {
    1
}

fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamps_bad_values() {
        let req = PageRequest::new(0, 10_000);
        assert_eq!(req.page, 1);
        assert_eq!(req.page_size, MAX_PAGE_SIZE);
    }

    #[test]
    fn test_from_all_slices_second_page() {
        let req = PageRequest::new(2, 3);
        let page = PageResponse::from_all((1..=7).collect::<Vec<_>>(), &req);
        assert_eq!(page.items, vec![4, 5, 6]);
        assert_eq!(page.total_items, 7);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn test_empty_has_one_page() {
        let page: PageResponse<u8> = PageResponse::from_all(Vec::new(), &PageRequest::default());
        assert_eq!(page.total_pages, 1);
        assert!(page.items.is_empty());
    }
}
