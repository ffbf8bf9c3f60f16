//! Query-string pagination and sorting normalization.
//!
//! Raw `page` / `limit` / `sortBy` / `sortOrder` values arrive as untyped
//! strings; anything unusable collapses onto the documented defaults
//! instead of failing the request.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// Raw pagination input as it appears on the query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    #[serde(rename = "sortOrder")]
    pub sort_order: Option<String>,
}

/// Sort fields callers may request on video listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    Views,
    Duration,
}

impl SortField {
    pub fn as_column(self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::Views => "views",
            SortField::Duration => "duration",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "createdAt" | "created_at" => Some(SortField::CreatedAt),
            "views" => Some(SortField::Views),
            "duration" => Some(SortField::Duration),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Sanitized pagination parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub page: i64,
    pub limit: i64,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

impl PageParams {
    /// Saturates instead of overflowing; an absurd page number yields an
    /// offset past the end of any result set, which reads as an empty
    /// page rather than a failed request.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl PageQuery {
    /// Collapse raw inputs onto sane values: page >= 1 (default 1),
    /// limit in 1..=100 (default 10), whitelisted sort column (default
    /// created_at), ascending unless a numeric sortOrder below 1 is given.
    pub fn normalize(&self) -> PageParams {
        let page = parse_positive(self.page.as_deref()).unwrap_or(DEFAULT_PAGE);
        let limit = parse_positive(self.limit.as_deref())
            .unwrap_or(DEFAULT_LIMIT)
            .min(MAX_LIMIT);

        let sort_by = self
            .sort_by
            .as_deref()
            .and_then(SortField::parse)
            .unwrap_or(SortField::CreatedAt);

        let sort_order = match self.sort_order.as_deref().and_then(|s| s.parse::<i64>().ok()) {
            Some(n) if n >= 1 => SortOrder::Asc,
            Some(0) | None => SortOrder::Asc,
            Some(_) => SortOrder::Desc,
        };

        PageParams {
            page,
            limit,
            sort_by,
            sort_order,
        }
    }
}

fn parse_positive(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|n| *n >= 1)
}

/// Pagination envelope: one page of results plus enough metadata to
/// compute total pages.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T: Serialize> {
    pub items: Vec<T>,
    pub page: i64,
    pub limit: i64,
    pub total_count: i64,
    pub total_pages: i64,
}

impl<T: Serialize> Page<T> {
    pub fn new(items: Vec<T>, params: &PageParams, total_count: i64) -> Self {
        let total_pages = if total_count == 0 {
            0
        } else {
            (total_count + params.limit - 1) / params.limit
        };
        Self {
            items,
            page: params.page,
            limit: params.limit,
            total_count,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: Option<&str>, limit: Option<&str>) -> PageQuery {
        PageQuery {
            page: page.map(String::from),
            limit: limit.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn non_positive_inputs_map_to_defaults() {
        let params = query(Some("0"), Some("-5")).normalize();
        assert_eq!(params.page, 1);
        assert_eq!(params.limit, 10);
    }

    #[test]
    fn valid_inputs_pass_through() {
        let params = query(Some("3"), Some("5")).normalize();
        assert_eq!(params.page, 3);
        assert_eq!(params.limit, 5);
        assert_eq!(params.offset(), 10);
    }

    #[test]
    fn garbage_inputs_map_to_defaults() {
        let params = query(Some("abc"), Some("")).normalize();
        assert_eq!(params.page, 1);
        assert_eq!(params.limit, 10);
    }

    #[test]
    fn missing_inputs_map_to_defaults() {
        let params = PageQuery::default().normalize();
        assert_eq!(params.page, 1);
        assert_eq!(params.limit, 10);
        assert_eq!(params.sort_by, SortField::CreatedAt);
        assert_eq!(params.sort_order, SortOrder::Asc);
    }

    #[test]
    fn sort_field_is_whitelisted() {
        let q = PageQuery {
            sort_by: Some("owner_id; DROP TABLE videos".into()),
            ..Default::default()
        };
        assert_eq!(q.normalize().sort_by, SortField::CreatedAt);

        let q = PageQuery {
            sort_by: Some("views".into()),
            ..Default::default()
        };
        assert_eq!(q.normalize().sort_by, SortField::Views);
    }

    #[test]
    fn sort_order_parses_numeric_direction() {
        let order = |raw: &str| PageQuery {
            sort_order: Some(raw.into()),
            ..Default::default()
        }
        .normalize()
        .sort_order;

        assert_eq!(order("1"), SortOrder::Asc);
        assert_eq!(order("5"), SortOrder::Asc);
        assert_eq!(order("-1"), SortOrder::Desc);
        assert_eq!(order("0"), SortOrder::Asc);
        assert_eq!(order("latest"), SortOrder::Asc);
    }

    #[test]
    fn extreme_page_saturates_instead_of_overflowing() {
        let params = query(Some(&i64::MAX.to_string()), Some("10")).normalize();
        assert_eq!(params.page, i64::MAX);
        assert_eq!(params.offset(), i64::MAX);
    }

    #[test]
    fn oversized_limit_is_clamped() {
        let params = query(None, Some(&i64::MAX.to_string())).normalize();
        assert_eq!(params.limit, MAX_LIMIT);

        let params = query(None, Some("100")).normalize();
        assert_eq!(params.limit, 100);
    }

    #[test]
    fn page_envelope_computes_total_pages() {
        let params = query(Some("2"), Some("10")).normalize();
        let page = Page::new(vec![1, 2, 3], &params, 23);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total_count, 23);

        let empty: Page<i32> = Page::new(vec![], &params, 0);
        assert_eq!(empty.total_pages, 0);
    }
}
