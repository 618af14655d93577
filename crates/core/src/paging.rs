//! Pagination and sorting primitives shared by list endpoints.
//!
//! Repositories return a [`Page`] so callers always get the unpaginated
//! total alongside the rows, which is what table widgets need to render
//! page controls.

use serde::{Deserialize, Serialize};

/// Rows per page when the client does not ask for a limit.
pub const DEFAULT_PAGE_LIMIT: i64 = 20;

/// Hard cap on rows per page.
pub const MAX_PAGE_LIMIT: i64 = 100;

/// One page of rows plus the total row count before pagination.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub rows: Vec<T>,
    pub total: i64,
}

impl<T> Page<T> {
    pub fn new(rows: Vec<T>, total: i64) -> Self {
        Self { rows, total }
    }

    /// Map the rows while keeping the total, e.g. entity to response DTO.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            rows: self.rows.into_iter().map(f).collect(),
            total: self.total,
        }
    }
}

/// Sort direction parsed from a query-string value.
///
/// Anything other than a case-insensitive `desc` sorts ascending, so an
/// absent or garbled parameter still produces a usable query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            Some(value) if value.eq_ignore_ascii_case("desc") => SortOrder::Desc,
            _ => SortOrder::Asc,
        }
    }

    /// SQL keyword for interpolation into a vetted ORDER BY clause.
    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Clamp a requested page size to `1..=max`, falling back to `default`.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).clamp(1, max)
}

/// Clamp a requested offset to zero or above.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}
