//! Domain DTOs for the WordPress REST API (`/wp-json/wp/v2`).
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently;
//! integration tests catch any schema drift between the two crates. Field
//! names follow the wire format (`featured_media`, `date_gmt`), and fields the
//! display layer does not need default when absent so older installs still
//! deserialize.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A pre-rendered markup field such as `title` or `content`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rendered {
    pub rendered: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protected: Option<bool>,
}

/// A single post returned by `/posts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub date_gmt: String,
    #[serde(default)]
    pub modified: String,
    #[serde(default)]
    pub modified_gmt: String,
    pub slug: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub link: String,
    pub title: Rendered,
    pub content: Rendered,
    #[serde(default)]
    pub excerpt: Rendered,
    #[serde(default)]
    pub author: u64,
    /// Attachment id of the featured image, 0 when the post has none.
    #[serde(default)]
    pub featured_media: u64,
    #[serde(default)]
    pub sticky: bool,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub categories: Vec<u64>,
    #[serde(default)]
    pub tags: Vec<u64>,
    #[serde(default)]
    pub meta: Value,
}

impl Post {
    pub fn is_published(&self) -> bool {
        self.status == "publish"
    }

    pub fn has_featured_media(&self) -> bool {
        self.featured_media != 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub link: String,
    pub name: String,
    pub slug: String,
    /// Parent category id; WordPress reports 0 for top-level categories.
    #[serde(default)]
    pub parent: Option<u64>,
    #[serde(default)]
    pub meta: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: u64,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub link: String,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub meta: Value,
}

/// An attachment returned by `/media/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Media {
    pub id: u64,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub media_type: String,
    #[serde(default)]
    pub mime_type: String,
    pub source_url: String,
    #[serde(default)]
    pub media_details: MediaDetails,
}

impl Media {
    /// URL of a named size variant (`thumbnail`, `medium`, ...), falling back
    /// to the full-size asset.
    pub fn url_for_size(&self, size: &str) -> &str {
        self.media_details
            .sizes
            .get(size)
            .map(|variant| variant.source_url.as_str())
            .unwrap_or(&self.source_url)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaDetails {
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub sizes: BTreeMap<String, MediaSize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaSize {
    #[serde(default)]
    pub file: String,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub mime_type: String,
    pub source_url: String,
}

/// Display-oriented projection of a `Post`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimplifiedPost {
    pub id: u64,
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub slug: String,
    pub date: String,
    pub author: u64,
    pub categories: Vec<u64>,
    pub tags: Vec<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured_image_url: Option<String>,
}

/// A `SimplifiedPost` with every derived field a post page renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayPost {
    #[serde(flatten)]
    pub post: SimplifiedPost,
    /// `"January 15, 2024"`; the raw date when it cannot be parsed.
    pub formatted_date: String,
    pub plain_text_excerpt: String,
    /// Estimated minutes to read the content.
    pub reading_time: u32,
    pub category_names: Vec<String>,
    pub tag_names: Vec<String>,
}

/// One page of a collection plus the pagination headers that came with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostPage<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub total_pages: u32,
    pub current_page: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    pub fn as_str(self) -> &'static str {
        match self {
            Order::Asc => "asc",
            Order::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderBy {
    Date,
    Id,
    Title,
    Slug,
}

impl OrderBy {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderBy::Date => "date",
            OrderBy::Id => "id",
            OrderBy::Title => "title",
            OrderBy::Slug => "slug",
        }
    }
}

/// Filters accepted by `/posts`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<u64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<u64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<Order>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orderby: Option<OrderBy>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn post_deserializes_minimal_payload() {
        let post: Post = serde_json::from_value(json!({
            "id": 7,
            "slug": "hello-world",
            "title": { "rendered": "Hello" },
            "content": { "rendered": "<p>Hi</p>", "protected": false },
        }))
        .unwrap();
        assert_eq!(post.id, 7);
        assert_eq!(post.excerpt.rendered, "");
        assert_eq!(post.content.protected, Some(false));
        assert!(!post.has_featured_media());
        assert!(post.categories.is_empty());
        assert!(post.meta.is_null());
    }

    #[test]
    fn post_accepts_empty_array_meta() {
        let post: Post = serde_json::from_value(json!({
            "id": 1,
            "slug": "s",
            "status": "publish",
            "title": { "rendered": "" },
            "content": { "rendered": "" },
            "featured_media": 12,
            "meta": [],
        }))
        .unwrap();
        assert!(post.is_published());
        assert!(post.has_featured_media());
        assert_eq!(post.meta, json!([]));
    }

    #[test]
    fn media_size_lookup_falls_back_to_source() {
        let media: Media = serde_json::from_value(json!({
            "id": 3,
            "source_url": "https://example.com/full.jpg",
            "media_details": {
                "width": 1200,
                "height": 800,
                "file": "full.jpg",
                "sizes": {
                    "thumbnail": {
                        "file": "thumb.jpg",
                        "width": 150,
                        "height": 150,
                        "mime_type": "image/jpeg",
                        "source_url": "https://example.com/thumb.jpg"
                    }
                }
            }
        }))
        .unwrap();
        assert_eq!(media.url_for_size("thumbnail"), "https://example.com/thumb.jpg");
        assert_eq!(media.url_for_size("large"), "https://example.com/full.jpg");
        assert_eq!(media.media_details.width, 1200);
    }

    #[test]
    fn filter_skips_unset_fields_when_serialized() {
        let filter = PostFilter {
            per_page: Some(3),
            order: Some(Order::Desc),
            ..PostFilter::default()
        };
        let value = serde_json::to_value(&filter).unwrap();
        assert_eq!(value, json!({ "per_page": 3, "order": "desc" }));
    }
}
