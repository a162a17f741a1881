//! Pagination value types shared by the admin listing endpoints.
//!
//! Listings are filtered/sorted in full and then sliced, so the summary can
//! report exact totals.

use serde::{Deserialize, Serialize};

/// 1-based page request. Out-of-range values are clamped rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, limit: 20 }
    }
}

/// Pagination summary returned alongside a sliced result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    pub current: u32,
    pub total: u32,
    pub count: usize,
    pub total_items: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Page {
    /// Slice `items` for the requested page and describe the result.
    pub fn slice<T>(items: Vec<T>, request: PageRequest) -> (Vec<T>, Page) {
        let request = PageRequest::new(request.page, request.limit);
        let total_items = items.len();
        let limit = request.limit as usize;
        let total = total_items.div_ceil(limit) as u32;
        let start = (request.page as usize - 1) * limit;

        let page_items: Vec<T> = items.into_iter().skip(start).take(limit).collect();
        let page = Page {
            current: request.page,
            total,
            count: page_items.len(),
            total_items,
            has_next: request.page < total,
            has_prev: request.page > 1 && total_items > 0,
        };
        (page_items, page)
    }
}
