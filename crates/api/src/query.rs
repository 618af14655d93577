//! Shared query parameter types for API handlers.
//!
//! Common query structs that appear across multiple handler modules are
//! extracted here to avoid duplication.

use serde::Deserialize;

/// Generic list parameters (`?sort=&order=&limit=&offset=`).
///
/// `sort` names a whitelisted column (the repository falls back to `id`),
/// `order` is `asc`/`desc`. Limits and offsets are clamped via
/// `clamp_limit` / `clamp_offset` before reaching SQL.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub sort: Option<String>,
    pub order: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Optional redirect target accepted by the login route (`?return_to=`).
#[derive(Debug, Default, Deserialize)]
pub struct ReturnTo {
    pub return_to: Option<String>,
}
