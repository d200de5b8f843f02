//! Blog-level read operations composed from the HTTP client, the query
//! helpers and the post transforms.
//!
//! # Design
//! Two failure contracts live side by side:
//! - collection reads (`list_posts`, `search`, `list_by_category`,
//!   `list_by_tag`, `get_recent_posts`) propagate `ApiError`, so callers can
//!   tell "no results" from "fetch failed";
//! - single-item and taxonomy reads (`get_post_by_slug`, `get_post_by_id`,
//!   `list_categories`, `list_tags`, `get_featured_media`) are best effort:
//!   a failure is logged and degrades to `None` or an empty list.
//!
//! Collections are decoded entry by entry. Raw post payloads also pass
//! through `is_valid_post`; malformed posts, categories and tags are skipped
//! with a warning.

use rayon::prelude::*;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::client::{WithHeaders, WordPressClient};
use crate::error::ApiError;
use crate::query::{build_post_query, extract_pagination_info, QueryParams};
use crate::transform::{is_valid_post, transform_to_simplified_post};
use crate::transport::{Transport, UreqTransport};
use crate::types::{Category, Media, Order, OrderBy, Post, PostFilter, PostPage, SimplifiedPost, Tag};

pub const DEFAULT_RECENT_COUNT: u32 = 5;

#[derive(Debug, Clone)]
pub struct BlogRepository<T = UreqTransport> {
    client: WordPressClient<T>,
}

impl BlogRepository<UreqTransport> {
    pub fn from_api_url(api_url: &str) -> Self {
        Self::new(WordPressClient::with_default_transport(api_url))
    }
}

impl<T: Transport> BlogRepository<T> {
    pub fn new(client: WordPressClient<T>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &WordPressClient<T> {
        &self.client
    }

    /// One page of posts matching `filter`, with the totals from the
    /// pagination headers. `current_page` echoes the requested page.
    pub fn list_posts(&self, filter: &PostFilter) -> Result<PostPage<Post>, ApiError> {
        let query = build_post_query(filter);
        let response: WithHeaders<Vec<Value>> = self.client.get_with_headers("/posts", &query)?;
        let totals = extract_pagination_info(&response.headers);

        Ok(PostPage {
            data: decode_posts(response.data),
            total: totals.total,
            total_pages: totals.total_pages,
            current_page: filter.page.filter(|p| *p != 0).unwrap_or(1),
        })
    }

    pub fn get_post_by_slug(&self, slug: &str) -> Option<Post> {
        let params = QueryParams::new().with("slug", slug);
        match self.client.get::<Vec<Value>>("/posts", &params) {
            Ok(posts) => posts.into_iter().next().and_then(decode_post),
            Err(err) => {
                tracing::warn!(
                    slug,
                    code = %err.code,
                    status = err.status,
                    message = %err.message,
                    "error fetching post by slug"
                );
                None
            }
        }
    }

    pub fn get_post_by_id(&self, id: u64) -> Option<Post> {
        match self.client.get::<Value>(&format!("/posts/{id}"), &QueryParams::new()) {
            Ok(post) => decode_post(post),
            Err(err) => {
                tracing::warn!(
                    id,
                    code = %err.code,
                    status = err.status,
                    message = %err.message,
                    "error fetching post by id"
                );
                None
            }
        }
    }

    pub fn list_by_category(
        &self,
        category_id: u64,
        filter: &PostFilter,
    ) -> Result<PostPage<Post>, ApiError> {
        let filter = PostFilter {
            categories: Some(vec![category_id]),
            ..filter.clone()
        };
        self.list_posts(&filter)
    }

    pub fn list_by_tag(&self, tag_id: u64, filter: &PostFilter) -> Result<PostPage<Post>, ApiError> {
        let filter = PostFilter {
            tags: Some(vec![tag_id]),
            ..filter.clone()
        };
        self.list_posts(&filter)
    }

    pub fn search(&self, term: &str, filter: &PostFilter) -> Result<PostPage<Post>, ApiError> {
        let filter = PostFilter {
            search: Some(term.to_string()),
            ..filter.clone()
        };
        self.list_posts(&filter)
    }

    /// All categories. Entries that fail to decode are skipped.
    pub fn list_categories(&self) -> Vec<Category> {
        self.list_terms("/categories", "categories")
    }

    /// All tags. Entries that fail to decode are skipped.
    pub fn list_tags(&self) -> Vec<Tag> {
        self.list_terms("/tags", "tags")
    }

    fn list_terms<R: DeserializeOwned>(&self, path: &str, kind: &str) -> Vec<R> {
        match self.client.get::<Vec<Value>>(path, &QueryParams::new()) {
            Ok(values) => values
                .into_iter()
                .filter_map(|value| decode_entry(value, kind))
                .collect(),
            Err(err) => {
                tracing::warn!(
                    code = %err.code,
                    status = err.status,
                    message = %err.message,
                    "error fetching {kind}"
                );
                Vec::new()
            }
        }
    }

    /// The attachment `media_id`. Id 0 means "no media" and returns `None`
    /// without a request.
    pub fn get_featured_media(&self, media_id: u64) -> Option<Media> {
        if media_id == 0 {
            return None;
        }
        match self.client.get(&format!("/media/{media_id}"), &QueryParams::new()) {
            Ok(media) => Some(media),
            Err(err) => {
                tracing::warn!(
                    media_id,
                    code = %err.code,
                    status = err.status,
                    message = %err.message,
                    "error fetching featured media"
                );
                None
            }
        }
    }

    /// `list_posts` projected to `SimplifiedPost`, with each featured image
    /// URL resolved.
    ///
    /// Media lookups run in parallel and are all awaited before returning.
    /// A failed lookup leaves that post's `featured_image_url` empty; it never
    /// fails the page or drops the post.
    pub fn list_posts_with_featured_images(
        &self,
        filter: &PostFilter,
    ) -> Result<PostPage<SimplifiedPost>, ApiError> {
        let page = self.list_posts(filter)?;

        let data = page
            .data
            .par_iter()
            .map(|post| {
                let mut simplified = transform_to_simplified_post(post);
                if post.has_featured_media() {
                    simplified.featured_image_url = self
                        .get_featured_media(post.featured_media)
                        .map(|media| media.source_url);
                }
                simplified
            })
            .collect();

        Ok(PostPage {
            data,
            total: page.total,
            total_pages: page.total_pages,
            current_page: page.current_page,
        })
    }

    /// The `count` newest posts.
    pub fn get_recent_posts(&self, count: u32) -> Result<Vec<SimplifiedPost>, ApiError> {
        let filter = PostFilter {
            per_page: Some(count),
            orderby: Some(OrderBy::Date),
            order: Some(Order::Desc),
            ..PostFilter::default()
        };
        let page = self.list_posts(&filter)?;
        Ok(page.data.iter().map(transform_to_simplified_post).collect())
    }

    pub fn health_check(&self) -> bool {
        self.client.health_check()
    }
}

fn decode_posts(values: Vec<Value>) -> Vec<Post> {
    values.into_iter().filter_map(decode_post).collect()
}

fn decode_entry<R: DeserializeOwned>(value: Value, kind: &str) -> Option<R> {
    let id = value.get("id").cloned();
    match serde_json::from_value(value) {
        Ok(entry) => Some(entry),
        Err(e) => {
            tracing::warn!(id = ?id, error = %e, "skipping malformed entry in {kind}");
            None
        }
    }
}

fn decode_post(value: Value) -> Option<Post> {
    if !is_valid_post(&value) {
        tracing::warn!(id = ?value.get("id"), "skipping malformed post payload");
        return None;
    }
    match serde_json::from_value(value) {
        Ok(post) => Some(post),
        Err(e) => {
            tracing::warn!(error = %e, "skipping undecodable post payload");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::NETWORK_ERROR;
    use crate::test_support::ScriptedTransport;

    const BASE: &str = "http://wp.test/wp-json/wp/v2";

    fn repo(transport: ScriptedTransport) -> BlogRepository<ScriptedTransport> {
        BlogRepository::new(WordPressClient::new(BASE, transport))
    }

    fn post_json(id: u64, featured_media: u64) -> Value {
        json!({
            "id": id,
            "date": "2024-01-15T10:30:00",
            "slug": format!("post-{id}"),
            "status": "publish",
            "title": { "rendered": format!("Post {id}") },
            "content": { "rendered": "<p>Body</p>", "protected": false },
            "excerpt": { "rendered": "<p>Excerpt</p>", "protected": false },
            "author": 1,
            "featured_media": featured_media,
            "categories": [1],
            "tags": [],
            "meta": [],
        })
    }

    fn media_json(id: u64) -> String {
        json!({
            "id": id,
            "source_url": format!("http://wp.test/uploads/{id}.jpg"),
            "media_details": { "width": 800, "height": 600, "file": format!("{id}.jpg"), "sizes": {} },
        })
        .to_string()
    }

    fn posts_body(posts: &[Value]) -> String {
        Value::Array(posts.to_vec()).to_string()
    }

    #[test]
    fn list_posts_reads_pagination_headers() {
        let transport = ScriptedTransport::new().respond_with_headers(
            "/posts",
            200,
            &posts_body(&[post_json(1, 0), post_json(2, 0)]),
            &[("X-WP-Total", "12"), ("X-WP-TotalPages", "6")],
        );
        let repo = repo(transport);
        let page = repo
            .list_posts(&PostFilter {
                page: Some(3),
                per_page: Some(2),
                ..PostFilter::default()
            })
            .unwrap();
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.total, 12);
        assert_eq!(page.total_pages, 6);
        assert_eq!(page.current_page, 3);
        assert_eq!(
            repo.client().transport().requests()[0].url,
            format!("{BASE}/posts?page=3&per_page=2")
        );
    }

    #[test]
    fn list_posts_defaults_current_page_to_one() {
        let transport = ScriptedTransport::new().respond("/posts", 200, "[]");
        let page = repo(transport).list_posts(&PostFilter::default()).unwrap();
        assert_eq!(page.current_page, 1);
        assert_eq!(page.total, 0);
        assert_eq!(page.total_pages, 0);
    }

    #[test]
    #[tracing_test::traced_test]
    fn list_posts_skips_invalid_entries() {
        let transport = ScriptedTransport::new().respond(
            "/posts",
            200,
            &posts_body(&[post_json(1, 0), json!({ "id": "x" }), post_json(3, 0)]),
        );
        let page = repo(transport).list_posts(&PostFilter::default()).unwrap();
        let ids: Vec<u64> = page.data.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert!(logs_contain("skipping malformed post payload"));
    }

    #[test]
    fn list_posts_propagates_failures() {
        let err = repo(ScriptedTransport::new().fail("/posts"))
            .list_posts(&PostFilter::default())
            .unwrap_err();
        assert_eq!(err.code, NETWORK_ERROR);
    }

    #[test]
    fn filtered_listings_set_their_parameter() {
        let transport = ScriptedTransport::new().respond("/posts", 200, "[]");
        let repo = repo(transport);
        let base = PostFilter {
            per_page: Some(4),
            ..PostFilter::default()
        };
        repo.list_by_category(7, &base).unwrap();
        repo.list_by_tag(9, &base).unwrap();
        repo.search("hello world", &base).unwrap();

        let urls: Vec<String> = repo
            .client()
            .transport()
            .requests()
            .into_iter()
            .map(|r| r.url)
            .collect();
        assert_eq!(
            urls,
            vec![
                format!("{BASE}/posts?per_page=4&categories=7"),
                format!("{BASE}/posts?per_page=4&tags=9"),
                format!("{BASE}/posts?per_page=4&search=hello+world"),
            ]
        );
    }

    #[test]
    fn get_post_by_slug_returns_first_match() {
        let transport = ScriptedTransport::new().respond(
            "/posts",
            200,
            &posts_body(&[post_json(5, 0), post_json(6, 0)]),
        );
        let repo = repo(transport);
        let post = repo.get_post_by_slug("post-5").unwrap();
        assert_eq!(post.id, 5);
        assert_eq!(
            repo.client().transport().requests()[0].url,
            format!("{BASE}/posts?slug=post-5")
        );
    }

    #[test]
    fn get_post_by_slug_without_match_is_none() {
        let transport = ScriptedTransport::new().respond("/posts", 200, "[]");
        assert!(repo(transport).get_post_by_slug("missing").is_none());
    }

    #[test]
    #[tracing_test::traced_test]
    fn get_post_by_slug_degrades_failure() {
        let transport = ScriptedTransport::new().respond("/posts", 500, "");
        assert!(repo(transport).get_post_by_slug("boom").is_none());
        assert!(logs_contain("error fetching post by slug"));
    }

    #[test]
    fn get_post_by_id_decodes_post() {
        let transport =
            ScriptedTransport::new().respond("/posts/8", 200, &post_json(8, 0).to_string());
        assert_eq!(repo(transport).get_post_by_id(8).unwrap().slug, "post-8");
    }

    #[test]
    #[tracing_test::traced_test]
    fn get_post_by_id_degrades_not_found() {
        let transport = ScriptedTransport::new().respond(
            "/posts/404",
            404,
            r#"{"code":"rest_post_invalid_id","message":"Invalid post ID.","data":{"status":404}}"#,
        );
        assert!(repo(transport).get_post_by_id(404).is_none());
        assert!(logs_contain("rest_post_invalid_id"));
    }

    #[test]
    fn get_post_by_id_rejects_invalid_shape() {
        let transport = ScriptedTransport::new().respond("/posts/8", 200, r#"{"id":8}"#);
        assert!(repo(transport).get_post_by_id(8).is_none());
    }

    #[test]
    fn taxonomies_decode() {
        let transport = ScriptedTransport::new()
            .respond(
                "/categories",
                200,
                r#"[{"id":1,"count":3,"name":"News","slug":"news","parent":0}]"#,
            )
            .respond("/tags", 200, r#"[{"id":4,"count":1,"name":"Rust","slug":"rust"}]"#);
        let repo = repo(transport);
        assert_eq!(repo.list_categories()[0].name, "News");
        assert_eq!(repo.list_tags()[0].slug, "rust");
    }

    #[test]
    #[tracing_test::traced_test]
    fn taxonomies_skip_malformed_entries() {
        let transport = ScriptedTransport::new()
            .respond(
                "/categories",
                200,
                r#"[{"id":1,"name":"News","slug":"news"},{"id":2,"slug":"no-name"}]"#,
            )
            .respond(
                "/tags",
                200,
                r#"[{"id":"x","name":"Bad","slug":"bad"},{"id":4,"name":"Rust","slug":"rust"}]"#,
            );
        let repo = repo(transport);

        let categories = repo.list_categories();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].slug, "news");

        let tags = repo.list_tags();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].id, 4);

        assert!(logs_contain("skipping malformed entry in categories"));
        assert!(logs_contain("skipping malformed entry in tags"));
    }

    #[test]
    #[tracing_test::traced_test]
    fn taxonomies_degrade_to_empty() {
        let repo = repo(ScriptedTransport::new().fail("/categories").fail("/tags"));
        assert!(repo.list_categories().is_empty());
        assert!(repo.list_tags().is_empty());
        assert!(logs_contain("error fetching categories"));
        assert!(logs_contain("error fetching tags"));
    }

    #[test]
    fn featured_media_zero_makes_no_request() {
        let repo = repo(ScriptedTransport::new());
        assert!(repo.get_featured_media(0).is_none());
        assert!(repo.client().transport().requests().is_empty());
    }

    #[test]
    fn featured_media_is_fetched_by_id() {
        let repo = repo(ScriptedTransport::new().respond("/media/12", 200, &media_json(12)));
        let media = repo.get_featured_media(12).unwrap();
        assert_eq!(media.source_url, "http://wp.test/uploads/12.jpg");
        assert_eq!(media.media_details.width, 800);
    }

    #[test]
    fn featured_images_survive_individual_failures() {
        let transport = ScriptedTransport::new()
            .respond(
                "/posts",
                200,
                &posts_body(&[post_json(1, 11), post_json(2, 22), post_json(3, 0), post_json(4, 44)]),
            )
            .respond("/media/11", 200, &media_json(11))
            .respond("/media/22", 500, "<h1>fatal</h1>")
            .fail("/media/44");
        let repo = repo(transport);

        let page = repo.list_posts_with_featured_images(&PostFilter::default()).unwrap();
        let urls: Vec<Option<&str>> = page
            .data
            .iter()
            .map(|p| p.featured_image_url.as_deref())
            .collect();
        assert_eq!(page.data.len(), 4);
        assert_eq!(
            urls,
            vec![Some("http://wp.test/uploads/11.jpg"), None, None, None]
        );
        let ids: Vec<u64> = page.data.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);

        let media_requests = repo
            .client()
            .transport()
            .requests()
            .iter()
            .filter(|r| r.url.contains("/media/"))
            .count();
        assert_eq!(media_requests, 3, "post without media is not looked up");
    }

    #[test]
    fn featured_images_propagate_listing_failure() {
        let err = repo(ScriptedTransport::new().respond("/posts", 503, ""))
            .list_posts_with_featured_images(&PostFilter::default())
            .unwrap_err();
        assert_eq!(err.status, 503);
    }

    #[test]
    fn recent_posts_orders_by_date_desc() {
        let transport = ScriptedTransport::new().respond(
            "/posts",
            200,
            &posts_body(&[post_json(9, 3), post_json(8, 0)]),
        );
        let repo = repo(transport);
        let recent = repo.get_recent_posts(DEFAULT_RECENT_COUNT).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].title, "Post 9");
        assert_eq!(recent[0].featured_image_url, None);
        assert_eq!(
            repo.client().transport().requests()[0].url,
            format!("{BASE}/posts?per_page=5&order=desc&orderby=date")
        );
    }
}
