use serde::Serialize;

/// Page size used by list endpoints when the client does not ask for one.
pub const DEFAULT_ITEMS_PER_PAGE: usize = 20;

/// Upper bound for a client supplied page size.
pub const MAX_ITEMS_PER_PAGE: usize = 100;

/// Page selection passed down to repository list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

impl Pagination {
    /// Build a pagination request, clamping both values into their valid range.
    pub fn new(page: Option<usize>, per_page: Option<usize>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page
                .unwrap_or(DEFAULT_ITEMS_PER_PAGE)
                .clamp(1, MAX_ITEMS_PER_PAGE),
        }
    }

    /// Row offset of the first item on the page.
    pub fn offset(&self) -> i64 {
        ((self.page.max(1) - 1) * self.per_page) as i64
    }

    /// Maximum number of rows returned for the page.
    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }
}

/// A single page of items together with the numbers needed to render a pager.
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub total_pages: usize,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, pagination: Pagination, total: usize) -> Self {
        Self {
            items,
            page: pagination.page,
            per_page: pagination.per_page,
            total,
            total_pages: total.div_ceil(pagination.per_page),
        }
    }
}
