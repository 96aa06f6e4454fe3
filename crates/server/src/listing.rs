//! Listing query parameters: pagination and filter normalization.
//!
//! Every admin listing endpoint shares the same grammar: a `page` string
//! (tolerant of garbage), an optional free-text search, and zero or more
//! equality filters that are skipped when empty or the literal `"all"`.

use serde::{Deserialize, Serialize};

/// Default records per page for admin listings.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Page size for the template listing, capped at this value.
pub const TEMPLATE_PAGE_SIZE: i64 = 100;

/// A page number plus limit, with the derived offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

impl Pagination {
    /// Build a pagination descriptor from a raw `page` query value.
    ///
    /// Missing, non-numeric, zero, or negative values default to page 1.
    #[must_use]
    pub fn from_query(page: Option<&str>, limit: i64) -> Self {
        Self {
            page: parse_page(page),
            limit,
        }
    }

    /// Number of records to skip: `(page - 1) * limit`, saturating so an
    /// absurd page number skips everything instead of overflowing.
    #[must_use]
    pub const fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// Parse a raw page parameter, clamping to a minimum of 1.
#[must_use]
pub fn parse_page(raw: Option<&str>) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|&p| p >= 1)
        .unwrap_or(1)
}

/// Normalize a free-text search parameter.
///
/// Returns `None` for missing, empty, or whitespace-only input so callers
/// add no text clause at all.
#[must_use]
pub fn search_term(raw: Option<&str>) -> Option<String> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

/// Normalize an equality filter parameter.
///
/// `None`, `""`, and the literal `"all"` mean "no filter".
#[must_use]
pub fn equality_filter(raw: Option<&str>) -> Option<String> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

/// Cap a requested limit at the template listing maximum.
#[must_use]
pub fn capped_template_limit(raw: Option<&str>) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|&l| l >= 1)
        .map_or(TEMPLATE_PAGE_SIZE, |l| l.min(TEMPLATE_PAGE_SIZE))
}

/// Raw listing query parameters shared by most admin endpoints.
///
/// All fields arrive as strings so a malformed `page=abc` degrades to page 1
/// instead of a 400 rejection.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    /// Free-text search (`search` or `q` accepted).
    pub search: Option<String>,
    pub q: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub role: Option<String>,
    pub category: Option<String>,
    pub published: Option<String>,
    pub active: Option<String>,
    #[serde(rename = "projectId")]
    pub project_id: Option<String>,
    #[serde(rename = "assignedTo")]
    pub assigned_to: Option<String>,
    #[serde(rename = "searchEngine")]
    pub search_engine: Option<String>,
    #[serde(rename = "type")]
    pub report_type: Option<String>,
    #[serde(rename = "from")]
    pub date_from: Option<String>,
    #[serde(rename = "to")]
    pub date_to: Option<String>,
    pub limit: Option<String>,
}

impl ListQuery {
    /// Pagination with the default admin page size.
    #[must_use]
    pub fn pagination(&self) -> Pagination {
        Pagination::from_query(self.page.as_deref(), DEFAULT_PAGE_SIZE)
    }

    /// The effective search term (`search` wins over `q`).
    #[must_use]
    pub fn term(&self) -> Option<String> {
        search_term(self.search.as_deref()).or_else(|| search_term(self.q.as_deref()))
    }
}

/// Listing envelope returned by every collection endpoint.
#[derive(Debug, Serialize)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub limit: i64,
    pub total: i64,
}

impl<T> Listing<T> {
    /// Wrap a page of records with its pagination descriptor.
    #[must_use]
    pub fn new(items: Vec<T>, pagination: Pagination, total: i64) -> Self {
        Self {
            items,
            page: pagination.page,
            limit: pagination.limit,
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_page_missing_defaults_to_one() {
        assert_eq!(parse_page(None), 1);
    }

    #[test]
    fn test_parse_page_non_numeric_defaults_to_one() {
        assert_eq!(parse_page(Some("abc")), 1);
        assert_eq!(parse_page(Some("")), 1);
        assert_eq!(parse_page(Some("1.5")), 1);
    }

    #[test]
    fn test_parse_page_clamps_to_minimum_one() {
        assert_eq!(parse_page(Some("0")), 1);
        assert_eq!(parse_page(Some("-3")), 1);
    }

    #[test]
    fn test_parse_page_valid() {
        assert_eq!(parse_page(Some("7")), 7);
        assert_eq!(parse_page(Some(" 2 ")), 2);
    }

    #[test]
    fn test_offset_math() {
        let p = Pagination::from_query(Some("3"), DEFAULT_PAGE_SIZE);
        assert_eq!(p.offset(), 20);

        let p = Pagination::from_query(None, DEFAULT_PAGE_SIZE);
        assert_eq!(p.offset(), 0);

        let p = Pagination::from_query(Some("-1"), 25);
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn test_offset_saturates_on_huge_page() {
        let p = Pagination::from_query(Some(&i64::MAX.to_string()), DEFAULT_PAGE_SIZE);
        assert_eq!(p.offset(), i64::MAX);
    }

    #[test]
    fn test_search_term_whitespace_is_none() {
        assert_eq!(search_term(None), None);
        assert_eq!(search_term(Some("")), None);
        assert_eq!(search_term(Some("   ")), None);
        assert_eq!(search_term(Some(" web design ")), Some("web design".to_owned()));
    }

    #[test]
    fn test_equality_filter_all_is_none() {
        assert_eq!(equality_filter(Some("all")), None);
        assert_eq!(equality_filter(Some("ALL")), None);
        assert_eq!(equality_filter(Some("")), None);
        assert_eq!(equality_filter(None), None);
        assert_eq!(equality_filter(Some("NEW")), Some("NEW".to_owned()));
    }

    #[test]
    fn test_capped_template_limit() {
        assert_eq!(capped_template_limit(None), 100);
        assert_eq!(capped_template_limit(Some("250")), 100);
        assert_eq!(capped_template_limit(Some("50")), 50);
        assert_eq!(capped_template_limit(Some("junk")), 100);
        assert_eq!(capped_template_limit(Some("0")), 100);
    }

    #[test]
    fn test_list_query_term_prefers_search() {
        let query = ListQuery {
            search: Some("alpha".to_owned()),
            q: Some("beta".to_owned()),
            ..ListQuery::default()
        };
        assert_eq!(query.term(), Some("alpha".to_owned()));

        let query = ListQuery {
            q: Some("beta".to_owned()),
            ..ListQuery::default()
        };
        assert_eq!(query.term(), Some("beta".to_owned()));
    }
}
