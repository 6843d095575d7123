//! Device search pagination and filter helpers.

/// Page size used when the caller passes no positive `perpage`.
pub const DEFAULT_PER_PAGE: i64 = 1000;

/// First page number; pages are 1-based.
pub const FIRST_PAGE: i64 = 1;

/// Normalised page/page-size pair for a device search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
}

impl Pagination {
    /// Apply the search defaults: `per_page <= 0` becomes
    /// [`DEFAULT_PER_PAGE`], `page < 1` becomes [`FIRST_PAGE`].
    pub fn from_params(page: Option<i64>, per_page: Option<i64>) -> Self {
        let per_page = match per_page {
            Some(n) if n > 0 => n,
            _ => DEFAULT_PER_PAGE,
        };
        let page = match page {
            Some(n) if n >= FIRST_PAGE => n,
            _ => FIRST_PAGE,
        };
        Self { page, per_page }
    }

    /// Row offset of the first result on this page.
    pub fn offset(&self) -> i64 {
        self.per_page.saturating_mul(self.page - 1)
    }
}

/// Wrap a free-text search term in `%` wildcards for a `LIKE` match.
///
/// `%` and `_` inside the term keep their `LIKE` meaning.
pub fn contains_pattern(term: &str) -> String {
    format!("%{term}%")
}
