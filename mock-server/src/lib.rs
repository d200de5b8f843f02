//! In-memory stand-in for the WordPress REST API (`/wp-json/wp/v2`).
//!
//! Serves a fixed, seeded blog: posts with pagination headers, categories,
//! tags and media. Errors use the WordPress body shape
//! `{"code", "message", "data": {"status"}}`, except `BROKEN_MEDIA_ID`, which
//! answers 500 with a plain-text body.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::net::TcpListener;

pub const API_PREFIX: &str = "/wp-json/wp/v2";
pub const DEFAULT_PER_PAGE: u32 = 10;
pub const MAX_PER_PAGE: u32 = 100;
/// Media id whose lookup fails with a non-JSON 500.
pub const BROKEN_MEDIA_ID: u64 = 999;
/// Featured media id referenced by a post but absent from the media library.
pub const MISSING_MEDIA_ID: u64 = 555;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Rendered {
    pub rendered: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub protected: Option<bool>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    pub date: String,
    pub date_gmt: String,
    pub modified: String,
    pub modified_gmt: String,
    pub slug: String,
    pub status: String,
    pub link: String,
    pub title: Rendered,
    pub content: Rendered,
    pub excerpt: Rendered,
    pub author: u64,
    pub featured_media: u64,
    pub sticky: bool,
    pub format: String,
    pub meta: Vec<serde_json::Value>,
    pub categories: Vec<u64>,
    pub tags: Vec<u64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    pub count: u64,
    pub description: String,
    pub link: String,
    pub name: String,
    pub slug: String,
    pub taxonomy: String,
    pub parent: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tag {
    pub id: u64,
    pub count: u64,
    pub description: String,
    pub link: String,
    pub name: String,
    pub slug: String,
    pub taxonomy: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MediaSize {
    pub file: String,
    pub width: u32,
    pub height: u32,
    pub mime_type: String,
    pub source_url: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MediaDetails {
    pub width: u32,
    pub height: u32,
    pub file: String,
    pub sizes: std::collections::BTreeMap<String, MediaSize>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Media {
    pub id: u64,
    pub date: String,
    pub slug: String,
    pub media_type: String,
    pub mime_type: String,
    pub source_url: String,
    pub media_details: MediaDetails,
}

/// The seeded blog. Read-only once built.
#[derive(Debug)]
pub struct Store {
    pub posts: Vec<Post>,
    pub categories: Vec<Category>,
    pub tags: Vec<Tag>,
    pub media: Vec<Media>,
}

pub type Db = Arc<Store>;

#[derive(Debug, Default, Deserialize)]
pub struct PostsQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub offset: Option<u32>,
    pub search: Option<String>,
    pub slug: Option<String>,
    pub author: Option<u64>,
    pub categories: Option<String>,
    pub tags: Option<String>,
    pub status: Option<String>,
    pub order: Option<String>,
    pub orderby: Option<String>,
}

pub fn app() -> Router {
    let db: Db = Arc::new(Store::seeded());
    let api = Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route("/posts/{id}", get(get_post))
        .route("/categories", get(list_categories))
        .route("/tags", get(list_tags))
        .route("/media/{id}", get(get_media))
        .with_state(db);
    Router::new().nest(API_PREFIX, api)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn wp_error(status: StatusCode, code: &str, message: &str) -> Response {
    let body = json!({
        "code": code,
        "message": message,
        "data": { "status": status.as_u16() },
    });
    (status, Json(body)).into_response()
}

fn parse_id_list(raw: Option<&str>) -> Result<Vec<u64>, Response> {
    let Some(raw) = raw.filter(|r| !r.is_empty()) else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .map(|part| part.trim().parse::<u64>())
        .collect::<Result<_, _>>()
        .map_err(|_| {
            wp_error(
                StatusCode::BAD_REQUEST,
                "rest_invalid_param",
                "Invalid parameter(s): categories, tags",
            )
        })
}

async fn list_posts(State(db): State<Db>, Query(query): Query<PostsQuery>) -> Response {
    let categories = match parse_id_list(query.categories.as_deref()) {
        Ok(ids) => ids,
        Err(resp) => return resp,
    };
    let tags = match parse_id_list(query.tags.as_deref()) {
        Ok(ids) => ids,
        Err(resp) => return resp,
    };
    let per_page = query.per_page.unwrap_or(DEFAULT_PER_PAGE);
    if per_page == 0 || per_page > MAX_PER_PAGE {
        return wp_error(
            StatusCode::BAD_REQUEST,
            "rest_invalid_param",
            "Invalid parameter(s): per_page",
        );
    }

    let status = query.status.as_deref().unwrap_or("publish");
    let search = query.search.as_deref().map(str::to_lowercase);
    let mut matches: Vec<&Post> = db
        .posts
        .iter()
        .filter(|p| p.status == status)
        .filter(|p| {
            query
                .slug
                .as_deref()
                .map_or(true, |slug| slug.split(',').any(|s| s == p.slug))
        })
        .filter(|p| query.author.map_or(true, |a| p.author == a))
        .filter(|p| categories.is_empty() || p.categories.iter().any(|c| categories.contains(c)))
        .filter(|p| tags.is_empty() || p.tags.iter().any(|t| tags.contains(t)))
        .filter(|p| {
            search.as_deref().map_or(true, |needle| {
                p.title.rendered.to_lowercase().contains(needle)
                    || p.content.rendered.to_lowercase().contains(needle)
            })
        })
        .collect();

    match query.orderby.as_deref().unwrap_or("date") {
        "id" => matches.sort_by_key(|p| p.id),
        "title" => matches.sort_by(|a, b| a.title.rendered.cmp(&b.title.rendered)),
        "slug" => matches.sort_by(|a, b| a.slug.cmp(&b.slug)),
        _ => matches.sort_by(|a, b| a.date.cmp(&b.date)),
    }
    if query.order.as_deref().unwrap_or("desc") == "desc" {
        matches.reverse();
    }

    let total = matches.len() as u32;
    let total_pages = total.div_ceil(per_page);
    let page = query.page.unwrap_or(1).max(1);
    if total > 0 && query.offset.is_none() && page > total_pages {
        return wp_error(
            StatusCode::BAD_REQUEST,
            "rest_post_invalid_page_number",
            "The page number requested is larger than the number of pages available.",
        );
    }

    let skip = query
        .offset
        .unwrap_or_else(|| (page - 1).saturating_mul(per_page)) as usize;
    let data: Vec<Post> = matches
        .into_iter()
        .skip(skip)
        .take(per_page as usize)
        .cloned()
        .collect();

    (
        [
            ("X-WP-Total", total.to_string()),
            ("X-WP-TotalPages", total_pages.to_string()),
        ],
        Json(data),
    )
        .into_response()
}

async fn get_post(State(db): State<Db>, Path(id): Path<u64>) -> Response {
    match db.posts.iter().find(|p| p.id == id) {
        Some(post) => Json(post.clone()).into_response(),
        None => wp_error(StatusCode::NOT_FOUND, "rest_post_invalid_id", "Invalid post ID."),
    }
}

async fn create_post() -> Response {
    wp_error(
        StatusCode::UNAUTHORIZED,
        "rest_cannot_create",
        "Sorry, you are not allowed to create posts as this user.",
    )
}

async fn list_categories(State(db): State<Db>) -> Json<Vec<Category>> {
    Json(db.categories.clone())
}

async fn list_tags(State(db): State<Db>) -> Json<Vec<Tag>> {
    Json(db.tags.clone())
}

async fn get_media(State(db): State<Db>, Path(id): Path<u64>) -> Response {
    if id == BROKEN_MEDIA_ID {
        return (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response();
    }
    match db.media.iter().find(|m| m.id == id) {
        Some(media) => Json(media.clone()).into_response(),
        None => wp_error(StatusCode::NOT_FOUND, "rest_post_invalid_id", "Invalid post ID."),
    }
}

impl Store {
    /// Eleven published posts and one draft, dated one day apart from
    /// 2024-01-01. Post 3 points at `BROKEN_MEDIA_ID`, post 5 at
    /// `MISSING_MEDIA_ID`, and even-numbered posts have working media.
    pub fn seeded() -> Self {
        let categories = vec![
            category(1, "News", 0),
            category(2, "Guides", 0),
            category(3, "Releases", 1),
        ];
        let tags = vec![tag(10, "Rust"), tag(11, "HTTP")];

        let posts: Vec<Post> = (1..=12).map(seed_post).collect();
        let media = posts
            .iter()
            .filter(|p| p.featured_media > 100 && p.featured_media < 200)
            .map(|p| media(p.featured_media))
            .collect();

        let mut store = Store {
            posts,
            categories,
            tags,
            media,
        };
        store.recount();
        store
    }

    fn recount(&mut self) {
        let published: Vec<&Post> = self.posts.iter().filter(|p| p.status == "publish").collect();
        for cat in &mut self.categories {
            cat.count = published.iter().filter(|p| p.categories.contains(&cat.id)).count() as u64;
        }
        for tag in &mut self.tags {
            tag.count = published.iter().filter(|p| p.tags.contains(&tag.id)).count() as u64;
        }
    }
}

fn seed_post(id: u64) -> Post {
    let date = format!("2024-01-{id:02}T09:00:00");
    let featured_media = match id {
        3 => BROKEN_MEDIA_ID,
        5 => MISSING_MEDIA_ID,
        n if n % 2 == 0 => 100 + n,
        _ => 0,
    };
    let categories = match id % 3 {
        0 => vec![1, 3],
        1 => vec![1],
        _ => vec![2],
    };
    let tags = if id % 2 == 0 { vec![10] } else { vec![10, 11] };
    let words = "lorem ipsum dolor sit amet ".repeat(id as usize * 20);

    Post {
        id,
        date: date.clone(),
        date_gmt: date.clone(),
        modified: date.clone(),
        modified_gmt: date,
        slug: format!("post-{id}"),
        status: if id == 12 { "draft" } else { "publish" }.to_string(),
        link: format!("https://blog.example.com/post-{id}/"),
        title: Rendered {
            rendered: format!("Post number {id} &amp; friends"),
            protected: None,
        },
        content: Rendered {
            rendered: format!("<p>{}</p>", words.trim_end()),
            protected: Some(false),
        },
        excerpt: Rendered {
            rendered: format!("<p>Summary of post {id} &#039;quoted&#039;</p>\n"),
            protected: Some(false),
        },
        author: if id % 4 == 0 { 2 } else { 1 },
        featured_media,
        sticky: false,
        format: "standard".to_string(),
        meta: Vec::new(),
        categories,
        tags,
    }
}

fn category(id: u64, name: &str, parent: u64) -> Category {
    Category {
        id,
        count: 0,
        description: String::new(),
        link: format!("https://blog.example.com/category/{}/", name.to_lowercase()),
        name: name.to_string(),
        slug: name.to_lowercase(),
        taxonomy: "category".to_string(),
        parent,
    }
}

fn tag(id: u64, name: &str) -> Tag {
    Tag {
        id,
        count: 0,
        description: String::new(),
        link: format!("https://blog.example.com/tag/{}/", name.to_lowercase()),
        name: name.to_string(),
        slug: name.to_lowercase(),
        taxonomy: "post_tag".to_string(),
    }
}

fn media(id: u64) -> Media {
    let file = format!("2024/01/image-{id}.jpg");
    let thumbnail = MediaSize {
        file: format!("image-{id}-150x150.jpg"),
        width: 150,
        height: 150,
        mime_type: "image/jpeg".to_string(),
        source_url: format!("https://blog.example.com/wp-content/uploads/2024/01/image-{id}-150x150.jpg"),
    };
    Media {
        id,
        date: "2024-01-01T08:00:00".to_string(),
        slug: format!("image-{id}"),
        media_type: "image".to_string(),
        mime_type: "image/jpeg".to_string(),
        source_url: format!("https://blog.example.com/wp-content/uploads/{file}"),
        media_details: MediaDetails {
            width: 1200,
            height: 800,
            file,
            sizes: [("thumbnail".to_string(), thumbnail)].into_iter().collect(),
        },
    }
}
