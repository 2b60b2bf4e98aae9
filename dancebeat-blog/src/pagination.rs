//! Pagination utilities for list endpoints

/// Default page size for post listings
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Upper bound on client-requested page sizes
pub const MAX_PAGE_SIZE: i64 = 100;

/// Pagination metadata calculated from total results
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct Pagination {
    /// Current page number (1-indexed)
    pub page: i64,
    /// Rows per page after clamping
    pub page_size: i64,
    /// Total number of rows in the result set
    pub total: i64,
    /// Total number of pages
    pub total_pages: i64,
    /// Offset for SQL LIMIT/OFFSET query
    #[serde(skip)]
    pub offset: i64,
}

/// Calculate pagination metadata from total results and the request.
///
/// Page is clamped into [1, total_pages]; page size into
/// [1, MAX_PAGE_SIZE].
pub fn calculate_pagination(total: i64, requested_page: i64, requested_page_size: i64) -> Pagination {
    let page_size = requested_page_size.clamp(1, MAX_PAGE_SIZE);
    let total_pages = (total + page_size - 1) / page_size;
    let page = requested_page.max(1).min(total_pages.max(1));
    let offset = (page - 1) * page_size;

    Pagination {
        page,
        page_size,
        total,
        total_pages,
        offset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_normal() {
        let p = calculate_pagination(45, 2, 20);
        assert_eq!(p.page, 2);
        assert_eq!(p.total_pages, 3);
        assert_eq!(p.offset, 20);
    }

    #[test]
    fn test_pagination_out_of_bounds_clamps() {
        let p = calculate_pagination(45, 99, 20);
        assert_eq!(p.page, 3);
        assert_eq!(p.offset, 40);

        let p = calculate_pagination(45, 0, 20);
        assert_eq!(p.page, 1);
        assert_eq!(p.offset, 0);
    }

    #[test]
    fn test_page_size_clamps() {
        let p = calculate_pagination(1000, 1, 100000);
        assert_eq!(p.page_size, MAX_PAGE_SIZE);

        let p = calculate_pagination(1000, 1, 0);
        assert_eq!(p.page_size, 1);
    }

    #[test]
    fn test_pagination_empty() {
        let p = calculate_pagination(0, 1, 20);
        assert_eq!(p.page, 1);
        assert_eq!(p.total_pages, 0);
        assert_eq!(p.offset, 0);
    }
}
