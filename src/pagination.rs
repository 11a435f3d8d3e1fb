//! Page arithmetic for paginated tables. Pages are 1-indexed.

use serde::Serialize;
use std::ops::Range;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: usize,
    pub page_count: usize,
    pub rows_per_page: usize,
}

impl Pagination {
    /// `rows_per_page` of 0 is treated as 1.
    pub fn new(total_count: usize, rows_per_page: usize, page: usize) -> Self {
        let rows_per_page = rows_per_page.max(1);
        let page_count = page_count(total_count, rows_per_page);
        Self {
            page: validate_page(page, page_count),
            page_count,
            rows_per_page,
        }
    }

    /// `false` when the requested page was out of range (page `0`).
    pub fn is_valid(&self) -> bool {
        self.page != 0
    }

    /// Row index range of the current page, clipped to `total_count`.
    pub fn row_range(&self, total_count: usize) -> Range<usize> {
        if !self.is_valid() {
            return 0..0;
        }
        let start = (self.page - 1) * self.rows_per_page;
        let end = (start + self.rows_per_page).min(total_count);
        start.min(end)..end
    }

    pub fn slice<'a, T>(&self, rows: &'a [T]) -> &'a [T] {
        &rows[self.row_range(rows.len())]
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.is_valid() && self.page < self.page_count
    }
}

pub fn page_count(total_count: usize, rows_per_page: usize) -> usize {
    total_count.div_ceil(rows_per_page.max(1))
}

/// `page` itself when `1 <= page <= max(1, page_count)`, otherwise `0`
/// (hidden). Page 1 of an empty list is valid and simply has no rows.
pub fn validate_page(page: usize, page_count: usize) -> usize {
    if (1..=page_count.max(1)).contains(&page) {
        page
    } else {
        0
    }
}

/// Parse a page number from the URL; anything unparsable is page 1.
pub fn page_from_param(raw: Option<&str>) -> usize {
    raw.and_then(|s| s.trim().parse::<usize>().ok()).unwrap_or(1)
}
