//! Pagination for list endpoints.
//!
//! Out-of-range parameters are normalized, never rejected: a page number
//! below 1 becomes 1, a page size below 1 becomes 1 and a page size above
//! [`MAX_PAGE_SIZE`] becomes [`MAX_PAGE_SIZE`]. A page past the end is served
//! as an empty page whose metadata still reports the requested page.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::config::{DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, PAGE_WINDOW};

/// Pagination query parameters (reusable across all list endpoints)
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// 1-indexed page number
    #[serde(default = "default_page")]
    pub page: i64,
    /// Items per page
    #[serde(default = "default_per_page")]
    pub per_page: i64,
}

fn default_page() -> i64 {
    DEFAULT_PAGE_NUMBER as i64
}

fn default_per_page() -> i64 {
    DEFAULT_PAGE_SIZE as i64
}

impl PaginationParams {
    pub fn new(page: i64, per_page: i64) -> Self {
        Self { page, per_page }
    }

    /// Page number clamped to at least 1
    pub fn page(&self) -> u64 {
        normalize_page(self.page)
    }

    /// Page size clamped to `1..=MAX_PAGE_SIZE`
    pub fn limit(&self) -> u64 {
        normalize_page_size(self.per_page)
    }

    /// Calculate offset for database query
    pub fn offset(&self) -> u64 {
        (self.page() - 1).saturating_mul(self.limit())
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

fn normalize_page(page: i64) -> u64 {
    page.max(1) as u64
}

fn normalize_page_size(page_size: i64) -> u64 {
    (page_size.max(1) as u64).min(MAX_PAGE_SIZE)
}

/// Paginated response wrapper
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PaginationMeta {
    /// Requested page, never clamped to `total_pages`
    pub current_page: u64,
    pub page_size: u64,
    pub total_items: u64,
    /// At least 1, even for an empty sequence
    pub total_pages: u64,
    pub has_prev: bool,
    pub has_next: bool,
    /// 1-based index of the first item on this page (0 when the page is empty)
    pub first_item: u64,
    /// 1-based index of the last item on this page (0 when the page is empty)
    pub last_item: u64,
    /// Page links to render around the current page
    pub pages: Vec<u64>,
}

impl PaginationMeta {
    pub fn new(page: u64, page_size: u64, total_items: u64) -> Self {
        let total_pages = total_items.div_ceil(page_size).max(1);
        let start = (page - 1).saturating_mul(page_size);
        let end = start.saturating_add(page_size).min(total_items);
        let (first_item, last_item) = if start < total_items {
            (start + 1, end)
        } else {
            (0, 0)
        };

        Self {
            current_page: page,
            page_size,
            total_items,
            total_pages,
            has_prev: page > 1,
            has_next: page < total_pages,
            first_item,
            last_item,
            pages: page_window(page, total_pages),
        }
    }
}

impl<T> Paginated<T> {
    /// Wrap an already-sliced page.
    pub fn new(data: Vec<T>, page: u64, page_size: u64, total_items: u64) -> Self {
        Self {
            data,
            meta: PaginationMeta::new(page.max(1), page_size.max(1), total_items),
        }
    }

    /// Transform every item of the page, keeping the metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            data: self.data.into_iter().map(f).collect(),
            meta: self.meta,
        }
    }
}

/// Slice an ordered sequence into one page.
pub fn paginate<T>(items: Vec<T>, page: i64, page_size: i64) -> Paginated<T> {
    let page = normalize_page(page);
    let page_size = normalize_page_size(page_size);
    let total_items = items.len() as u64;

    let start = (page - 1).saturating_mul(page_size);
    let data: Vec<T> = if start >= total_items {
        Vec::new()
    } else {
        items
            .into_iter()
            .skip(start as usize)
            .take(page_size as usize)
            .collect()
    };

    Paginated::new(data, page, page_size, total_items)
}

/// Page numbers to show in a pager: a window of [`PAGE_WINDOW`] pages
/// centred on `current` where possible, clipped to `[1, total_pages]`.
/// `current` beyond the last page is treated as the last page.
pub fn page_window(current: u64, total_pages: u64) -> Vec<u64> {
    let total_pages = total_pages.max(1);
    if total_pages <= PAGE_WINDOW {
        return (1..=total_pages).collect();
    }

    // A page past the end shows the last window.
    let current = current.clamp(1, total_pages);
    let mut start = current.saturating_sub(PAGE_WINDOW / 2).max(1);
    let end = (start + PAGE_WINDOW - 1).min(total_pages);
    if end - start < PAGE_WINDOW - 1 {
        start = end.saturating_sub(PAGE_WINDOW - 1).max(1);
    }

    (start..=end).collect()
}
