//! Pager math for the UI layer.
//!
//! Everything here is pure: the same inputs always produce the same window,
//! and nothing is cached between calls.

use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_MAX_VISIBLE: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationInfo {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_posts: u64,
    pub posts_per_page: u32,
    pub has_next_page: bool,
    pub has_prev_page: bool,
    pub next_page: Option<u32>,
    pub prev_page: Option<u32>,
}

pub fn calculate_pagination_info(
    current_page: u32,
    total_pages: u32,
    total_posts: u64,
    posts_per_page: u32,
) -> PaginationInfo {
    let has_next_page = current_page < total_pages;
    let has_prev_page = current_page > 1;
    PaginationInfo {
        current_page,
        total_pages,
        total_posts,
        posts_per_page,
        has_next_page,
        has_prev_page,
        next_page: has_next_page.then(|| current_page + 1),
        prev_page: has_prev_page.then(|| current_page - 1),
    }
}

/// Page numbers to show in a pager, at most `max_visible` of them.
///
/// The window is centred on `current_page` and clamped to
/// `[1, total_pages]`. When clamping at the upper edge shrinks it, the start
/// is pulled back so the window keeps exactly `max_visible` entries.
pub fn generate_page_numbers(current_page: u32, total_pages: u32, max_visible: u32) -> Vec<u32> {
    if total_pages <= max_visible {
        return (1..=total_pages).collect();
    }

    // u64 keeps the window arithmetic clear of overflow near u32::MAX
    let (current, total, max) = (
        u64::from(current_page),
        u64::from(total_pages),
        u64::from(max_visible),
    );
    let mut start = current.saturating_sub(max / 2).max(1);
    let end = total.min((start + max).saturating_sub(1));

    if (end + 1).saturating_sub(start) < max {
        start = (end + 1).saturating_sub(max).max(1);
    }

    (start..=end).filter_map(|page| u32::try_from(page).ok()).collect()
}

/// Link to `page` of a listing, with `extra` query parameters.
///
/// `base_url` may be relative; it is resolved against `origin` (typically the
/// site URL). `page` and every extra key replace any value already present
/// in the query string.
pub fn build_pagination_url(
    origin: &str,
    base_url: &str,
    page: u32,
    extra: &[(&str, &str)],
) -> Result<String, url::ParseError> {
    let mut url = Url::parse(origin)?.join(base_url)?;
    set_query_param(&mut url, "page", &page.to_string());
    for (key, value) in extra {
        set_query_param(&mut url, key, value);
    }
    Ok(url.to_string())
}

/// Replace the first `key` pair and drop later duplicates, or append when the
/// key is absent.
fn set_query_param(url: &mut Url, key: &str, value: &str) {
    let mut replaced = false;
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter_map(|(k, v)| {
            if k != key {
                return Some((k.into_owned(), v.into_owned()));
            }
            if replaced {
                return None;
            }
            replaced = true;
            Some((k.into_owned(), value.to_string()))
        })
        .collect();

    let mut serializer = url.query_pairs_mut();
    serializer.clear();
    for (k, v) in &pairs {
        serializer.append_pair(k, v);
    }
    if !replaced {
        serializer.append_pair(key, value);
    }
}
