//! Search specification: the complete query/filter/sort/page request for one search.
//!
//! Parsing is lenient: numbers are read as their leading integer (trailing
//! junk ignored) and any value that cannot be read falls back to the
//! parameter default. A parsed specification always satisfies its invariants.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_LIMIT: usize = 10;
pub const DEFAULT_MIN_PRICE: u64 = 0;
pub const DEFAULT_MAX_PRICE: u64 = 100_000;
pub const DEFAULT_MAX_LIMIT: usize = 100;

/// Sortable record attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Name,
    Price,
    Rating,
    Date,
}

impl SortKey {
    /// Unrecognized keys fall back to `name`.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "price" => Self::Price,
            "rating" => Self::Rating,
            "date" => Self::Date,
            _ => Self::Name,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Price => "price",
            Self::Rating => "rating",
            Self::Date => "date",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Anything other than `desc` is ascending.
    pub fn parse_lenient(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("desc") {
            Self::Desc
        } else {
            Self::Asc
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSpecification {
    /// Free-text query; empty matches everything.
    pub query: String,
    /// 1-indexed page number.
    pub page: usize,
    /// Page size, at least 1.
    pub limit: usize,
    /// Exact category filter; empty means no filter.
    pub category: String,
    /// Exact brand filter; empty means no filter.
    pub brand: String,
    pub min_price: u64,
    pub max_price: u64,
    pub sort_by: SortKey,
    pub sort_order: SortOrder,
}

impl Default for SearchSpecification {
    fn default() -> Self {
        Self {
            query: String::new(),
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            category: String::new(),
            brand: String::new(),
            min_price: DEFAULT_MIN_PRICE,
            max_price: DEFAULT_MAX_PRICE,
            sort_by: SortKey::Name,
            sort_order: SortOrder::Asc,
        }
    }
}

impl SearchSpecification {
    /// Parse query-string parameters (`query`, `page`, `limit`, `category`,
    /// `brand`, `minPrice`, `maxPrice`, `sortBy`, `sortOrder`).
    pub fn from_params(params: &HashMap<String, String>, max_limit: usize) -> Self {
        let get = |key: &str| params.get(key).map(String::as_str).unwrap_or("");

        let page = parse_leading_int(get("page"))
            .filter(|p| *p >= 1)
            .map(|p| p as usize)
            .unwrap_or(DEFAULT_PAGE);
        let limit = parse_leading_int(get("limit"))
            .filter(|l| *l >= 1)
            .map(|l| l as usize)
            .unwrap_or(DEFAULT_LIMIT);
        let min_price = parse_leading_int(get("minPrice"))
            .map(|v| v.max(0) as u64)
            .unwrap_or(DEFAULT_MIN_PRICE);
        let max_price = parse_leading_int(get("maxPrice"))
            .map(|v| v.max(0) as u64)
            .unwrap_or(DEFAULT_MAX_PRICE);

        Self {
            query: get("query").to_string(),
            page,
            limit,
            category: get("category").to_string(),
            brand: get("brand").to_string(),
            min_price,
            max_price,
            sort_by: SortKey::parse_lenient(get("sortBy")),
            sort_order: SortOrder::parse_lenient(get("sortOrder")),
        }
        .normalized(max_limit)
    }

    /// Enforce `page >= 1`, `1 <= limit <= max_limit`, `min_price <= max_price`.
    pub fn normalized(mut self, max_limit: usize) -> Self {
        self.page = self.page.max(1);
        self.limit = self.limit.clamp(1, max_limit.max(1));
        if self.min_price > self.max_price {
            std::mem::swap(&mut self.min_price, &mut self.max_price);
        }
        self
    }

    /// Query-string pairs understood by [`SearchSpecification::from_params`].
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("query", self.query.clone()),
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
            ("category", self.category.clone()),
            ("brand", self.brand.clone()),
            ("minPrice", self.min_price.to_string()),
            ("maxPrice", self.max_price.to_string()),
            ("sortBy", self.sort_by.as_str().to_string()),
            ("sortOrder", self.sort_order.as_str().to_string()),
        ]
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub fn with_page(mut self, page: usize) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = brand.into();
        self
    }

    pub fn with_price_range(mut self, min: u64, max: u64) -> Self {
        self.min_price = min.min(max);
        self.max_price = max.max(min);
        self
    }

    pub fn with_sort(mut self, key: SortKey, order: SortOrder) -> Self {
        self.sort_by = key;
        self.sort_order = order;
        self
    }
}

/// Leading base-10 integer of `raw`, ignoring leading whitespace and any trailing text.
pub fn parse_leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let value: i64 = digits[..end].parse().ok()?;
    Some(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn empty_params_yield_defaults() {
        let spec = SearchSpecification::from_params(&HashMap::new(), DEFAULT_MAX_LIMIT);
        assert_eq!(spec, SearchSpecification::default());
    }

    #[test]
    fn parses_all_recognized_params() {
        let spec = SearchSpecification::from_params(
            &params(&[
                ("query", "Laptop"),
                ("page", "3"),
                ("limit", "12"),
                ("category", "Electronics"),
                ("brand", "TechMaster"),
                ("minPrice", "100"),
                ("maxPrice", "500"),
                ("sortBy", "rating"),
                ("sortOrder", "desc"),
            ]),
            DEFAULT_MAX_LIMIT,
        );
        assert_eq!(spec.query, "Laptop");
        assert_eq!(spec.page, 3);
        assert_eq!(spec.limit, 12);
        assert_eq!(spec.category, "Electronics");
        assert_eq!(spec.brand, "TechMaster");
        assert_eq!((spec.min_price, spec.max_price), (100, 500));
        assert_eq!(spec.sort_by, SortKey::Rating);
        assert_eq!(spec.sort_order, SortOrder::Desc);
    }

    #[test]
    fn malformed_numbers_fall_back_to_defaults() {
        let spec = SearchSpecification::from_params(
            &params(&[
                ("page", "abc"),
                ("limit", "0"),
                ("minPrice", "-5"),
                ("maxPrice", "12.75"),
            ]),
            DEFAULT_MAX_LIMIT,
        );
        assert_eq!(spec.page, 1);
        assert_eq!(spec.limit, DEFAULT_LIMIT);
        assert_eq!(spec.min_price, 0);
        assert_eq!(spec.max_price, 12);
    }

    #[test]
    fn inverted_price_range_is_swapped_and_limit_capped() {
        let spec = SearchSpecification::from_params(
            &params(&[("minPrice", "900"), ("maxPrice", "100"), ("limit", "5000")]),
            50,
        );
        assert_eq!((spec.min_price, spec.max_price), (100, 900));
        assert_eq!(spec.limit, 50);
    }

    #[test]
    fn unknown_sort_values_fall_back() {
        assert_eq!(SortKey::parse_lenient("popularity"), SortKey::Name);
        assert_eq!(SortOrder::parse_lenient("DESC"), SortOrder::Desc);
        assert_eq!(SortOrder::parse_lenient("sideways"), SortOrder::Asc);
    }

    #[test]
    fn leading_int_ignores_trailing_text() {
        assert_eq!(parse_leading_int("42"), Some(42));
        assert_eq!(parse_leading_int("  7px"), Some(7));
        assert_eq!(parse_leading_int("-3"), Some(-3));
        assert_eq!(parse_leading_int(""), None);
        assert_eq!(parse_leading_int("x1"), None);
        assert_eq!(parse_leading_int("-"), None);
    }

    #[test]
    fn query_pairs_parse_back_to_same_spec() {
        let spec = SearchSpecification::default()
            .with_query("smart")
            .with_page(2)
            .with_limit(12)
            .with_price_range(150, 600)
            .with_sort(SortKey::Date, SortOrder::Desc);
        let map: HashMap<String, String> = spec
            .to_query_pairs()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        assert_eq!(
            SearchSpecification::from_params(&map, DEFAULT_MAX_LIMIT),
            spec
        );
    }
}
