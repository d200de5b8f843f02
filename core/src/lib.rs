//! Client core for headless WordPress blogs.
//!
//! # Overview
//! Fetches posts, taxonomies and media from the WordPress REST API and
//! reshapes them for display: plain-text excerpts, formatted dates, reading
//! time and pager math.
//!
//! # Design
//! - `WordPressClient` is stateless: a base URL, fixed JSON headers and an
//!   injected `Transport`. Requests and responses are plain data
//!   (`HttpRequest` / `HttpResponse`), so tests swap the transport and the
//!   JSON test vectors replay responses without a network.
//! - Every client failure is an `ApiError` produced by `normalize_error`.
//! - `BlogRepository` layers blog operations on the client. Collection reads
//!   propagate errors; single-item reads degrade to `None` and log.
//! - `query`, `pagination`, `content` and `transform` are pure functions.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod content;
pub mod error;
pub mod http;
pub mod pagination;
pub mod query;
pub mod repository;
pub mod transform;
pub mod transport;
pub mod types;

#[cfg(test)]
mod test_support;

pub use client::{WithHeaders, WordPressClient};
pub use config::{validate_api_url, BlogConfig, ConfigError};
pub use content::{create_excerpt, extract_plain_text, format_wordpress_date, reading_time};
pub use error::{normalize_error, validate_http_response, ApiError, Failure};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use pagination::{
    build_pagination_url, calculate_pagination_info, generate_page_numbers, PaginationInfo,
};
pub use query::{
    build_post_query, create_pagination_params, extract_pagination_info, HeaderPagination,
    QueryParams, QueryValue,
};
pub use repository::BlogRepository;
pub use transform::{
    filter_published_posts, group_posts_by_category, is_valid_post, sort_posts_by_date,
    transform_post_for_display, transform_to_simplified_post, SortOrder,
};
pub use transport::{Transport, TransportError, UreqTransport};
pub use types::{
    Category, DisplayPost, Media, MediaDetails, MediaSize, Order, OrderBy, Post, PostFilter,
    PostPage, Rendered, SimplifiedPost, Tag,
};
