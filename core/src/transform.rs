//! Validation gate and display projections for posts.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde_json::Value;

use crate::content::{
    extract_plain_text, format_wordpress_date, parse_wordpress_date, reading_time,
    DEFAULT_EXCERPT_LENGTH,
};
use crate::types::{Category, DisplayPost, Post, SimplifiedPost, Tag};

/// Sort direction for `sort_posts_by_date`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Whether a raw JSON value has the shape every transform relies on: a
/// numeric `id`, a non-empty string `slug`, and string `title.rendered` and
/// `content.rendered`.
pub fn is_valid_post(value: &Value) -> bool {
    let rendered_is_string = |field: &str| {
        value
            .get(field)
            .and_then(|f| f.get("rendered"))
            .is_some_and(Value::is_string)
    };

    value.get("id").is_some_and(Value::is_u64)
        && value
            .get("slug")
            .and_then(Value::as_str)
            .is_some_and(|slug| !slug.is_empty())
        && rendered_is_string("title")
        && rendered_is_string("content")
}

/// Project a post onto its display fields.
///
/// `featured_image_url` is always `None` here; only
/// `BlogRepository::list_posts_with_featured_images` resolves images.
pub fn transform_to_simplified_post(post: &Post) -> SimplifiedPost {
    SimplifiedPost {
        id: post.id,
        title: post.title.rendered.clone(),
        content: post.content.rendered.clone(),
        excerpt: post.excerpt.rendered.clone(),
        slug: post.slug.clone(),
        date: post.date.clone(),
        author: post.author,
        categories: post.categories.clone(),
        tags: post.tags.clone(),
        featured_image_url: None,
    }
}

/// Everything a post page renders, with term ids resolved to names from the
/// supplied lists. Terms missing from the lists are skipped.
pub fn transform_post_for_display(
    post: &Post,
    categories: &[Category],
    tags: &[Tag],
) -> DisplayPost {
    let category_names = categories
        .iter()
        .filter(|cat| post.categories.contains(&cat.id))
        .map(|cat| cat.name.clone())
        .collect();
    let tag_names = tags
        .iter()
        .filter(|tag| post.tags.contains(&tag.id))
        .map(|tag| tag.name.clone())
        .collect();

    DisplayPost {
        post: transform_to_simplified_post(post),
        formatted_date: format_wordpress_date(&post.date).unwrap_or_else(|| post.date.clone()),
        plain_text_excerpt: extract_plain_text(&post.excerpt.rendered, Some(DEFAULT_EXCERPT_LENGTH)),
        reading_time: reading_time(&post.content.rendered),
        category_names,
        tag_names,
    }
}

pub fn filter_published_posts(posts: &[Post]) -> Vec<Post> {
    posts.iter().filter(|p| p.is_published()).cloned().collect()
}

/// Stable sort by `date`. Posts with unparsable dates sort as the oldest.
pub fn sort_posts_by_date(posts: &[Post], order: SortOrder) -> Vec<Post> {
    let mut keyed: Vec<_> = posts
        .iter()
        .map(|p| (parse_wordpress_date(&p.date), p))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| {
        let ord: Ordering = a.cmp(b);
        match order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
    keyed.into_iter().map(|(_, p)| p.clone()).collect()
}

/// Posts grouped under each category name. Every category gets an entry,
/// possibly empty; a later category with a duplicate name replaces the
/// earlier group.
pub fn group_posts_by_category(
    posts: &[Post],
    categories: &[Category],
) -> BTreeMap<String, Vec<Post>> {
    categories
        .iter()
        .map(|cat| {
            let members = posts
                .iter()
                .filter(|p| p.categories.contains(&cat.id))
                .cloned()
                .collect();
            (cat.name.clone(), members)
        })
        .collect()
}
