//! Query-string parameters and the helpers that produce or consume them.

use serde::{Deserialize, Serialize};

use crate::http::header_value;
use crate::types::PostFilter;

pub const TOTAL_HEADER: &str = "X-WP-Total";
pub const TOTAL_PAGES_HEADER: &str = "X-WP-TotalPages";

/// A single query-string value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Text(String),
    Int(i64),
    /// Serialized as a comma-joined list.
    List(Vec<String>),
    /// Never serialized.
    Null,
}

impl QueryValue {
    /// The serialized form, `None` for `Null`.
    pub fn render(&self) -> Option<String> {
        match self {
            QueryValue::Text(text) => Some(text.clone()),
            QueryValue::Int(n) => Some(n.to_string()),
            QueryValue::List(items) => Some(items.join(",")),
            QueryValue::Null => None,
        }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Text(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::Text(value)
    }
}

impl From<u32> for QueryValue {
    fn from(value: u32) -> Self {
        QueryValue::Int(i64::from(value))
    }
}

impl From<i64> for QueryValue {
    fn from(value: i64) -> Self {
        QueryValue::Int(value)
    }
}

impl From<u64> for QueryValue {
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(n) => QueryValue::Int(n),
            Err(_) => QueryValue::Text(value.to_string()),
        }
    }
}

impl From<Vec<u64>> for QueryValue {
    fn from(values: Vec<u64>) -> Self {
        QueryValue::List(values.iter().map(u64::to_string).collect())
    }
}

impl From<&[u64]> for QueryValue {
    fn from(values: &[u64]) -> Self {
        QueryValue::List(values.iter().map(u64::to_string).collect())
    }
}

impl<T: Into<QueryValue>> From<Option<T>> for QueryValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(QueryValue::Null, Into::into)
    }
}

/// Ordered query parameters. Inserting an existing key replaces its value in
/// place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, QueryValue)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<QueryValue>) {
        let key = key.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.pairs.push((key, value)),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &QueryValue)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Serialized `(key, value)` pairs with `Null` values dropped.
    pub fn to_pairs(&self) -> Vec<(&str, String)> {
        self.iter()
            .filter_map(|(key, value)| value.render().map(|value| (key, value)))
            .collect()
    }
}

/// Build `/posts` query parameters from a filter.
///
/// Only truthy values are copied: `page: Some(0)`, an empty search string and
/// an empty category list are all treated as unset, exactly like an absent
/// field. Callers that need to send a literal zero must insert it themselves.
pub fn build_post_query(filter: &PostFilter) -> QueryParams {
    let mut query = QueryParams::new();

    for (key, value) in [
        ("page", filter.page),
        ("per_page", filter.per_page),
        ("offset", filter.offset),
    ] {
        if let Some(n) = value.filter(|n| *n != 0) {
            query.insert(key, n);
        }
    }

    if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
        query.insert("search", search);
    }
    if let Some(author) = filter.author.filter(|a| *a != 0) {
        query.insert("author", author);
    }
    if let Some(categories) = filter.categories.as_deref().filter(|c| !c.is_empty()) {
        query.insert("categories", categories);
    }
    if let Some(tags) = filter.tags.as_deref().filter(|t| !t.is_empty()) {
        query.insert("tags", tags);
    }
    if let Some(status) = filter.status.as_deref().filter(|s| !s.is_empty()) {
        query.insert("status", status);
    }

    if let Some(order) = filter.order {
        query.insert("order", order.as_str());
    }
    if let Some(orderby) = filter.orderby {
        query.insert("orderby", orderby.as_str());
    }

    query
}

/// Pagination totals read from collection response headers.
///
/// `current_page` cannot be derived from headers and is always 1; callers
/// substitute the page they requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderPagination {
    pub total: u64,
    pub total_pages: u32,
    pub current_page: u32,
}

pub fn extract_pagination_info(headers: &[(String, String)]) -> HeaderPagination {
    HeaderPagination {
        total: parse_header(headers, TOTAL_HEADER),
        total_pages: u32::try_from(parse_header(headers, TOTAL_PAGES_HEADER)).unwrap_or(u32::MAX),
        current_page: 1,
    }
}

/// Leading base-10 digits of the header, saturating on overflow. 0 when
/// missing or when the value does not start with a digit.
fn parse_header(headers: &[(String, String)], name: &str) -> u64 {
    let Some(raw) = header_value(headers, name) else {
        return 0;
    };
    let raw = raw.trim();
    let end = raw
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(raw.len(), |(i, _)| i);
    let digits = &raw[..end];
    if digits.is_empty() {
        return 0;
    }
    digits.parse().unwrap_or(u64::MAX)
}

/// Filter for page `current_page` of `per_page` posts, including the
/// equivalent `offset`. Page numbers below 1 are treated as 1.
pub fn create_pagination_params(current_page: u32, per_page: u32) -> PostFilter {
    let current_page = current_page.max(1);
    PostFilter {
        page: Some(current_page),
        per_page: Some(per_page),
        offset: Some((current_page - 1).saturating_mul(per_page)),
        ..PostFilter::default()
    }
}
