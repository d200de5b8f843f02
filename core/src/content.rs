//! Plain-text extraction, excerpts, dates and reading time for rendered
//! WordPress markup.
//!
//! Lengths are counted in `char`s, never bytes, so truncation can not split a
//! multi-byte character.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

pub const DEFAULT_EXCERPT_LENGTH: usize = 160;
pub const WORDS_PER_MINUTE: usize = 200;

const ELLIPSIS: &str = "...";

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));

/// Order matters: `&amp;` goes first, so `&amp;lt;` ends up as `<`.
const ENTITIES: [(&str, &str); 5] = [
    ("&amp;", "&"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#039;", "'"),
];

/// Strip tags, decode the basic entities and trim.
///
/// With `max_length`, text longer than that is cut to `max_length` chars
/// (not word aware), trimmed again and suffixed with `...`. A `max_length`
/// of 0 means no limit.
pub fn extract_plain_text(html: &str, max_length: Option<usize>) -> String {
    let mut text = TAG.replace_all(html, "").into_owned();
    for (entity, replacement) in ENTITIES {
        text = text.replace(entity, replacement);
    }

    if let Some(max) = max_length.filter(|max| *max > 0) {
        if text.chars().count() > max {
            let cut: String = text.chars().take(max).collect();
            return format!("{}{ELLIPSIS}", cut.trim());
        }
    }

    text.trim().to_string()
}

/// Word-aware excerpt of rendered content.
///
/// The text is cut at `max_length` chars, then backed up to the last space
/// when that space lies past 80% of `max_length`; otherwise the hard cut is
/// kept. `...` is appended only when something was removed.
pub fn create_excerpt(content: &str, max_length: usize) -> String {
    let plain = extract_plain_text(content, None);
    let chars: Vec<char> = plain.chars().collect();
    if chars.len() <= max_length {
        return plain;
    }

    let truncated = &chars[..max_length];
    let cut = match truncated.iter().rposition(|c| *c == ' ') {
        // last_space > 0.8 * max_length
        Some(last_space) if last_space * 5 > max_length * 4 => &truncated[..last_space],
        _ => truncated,
    };

    let mut excerpt: String = cut.iter().collect();
    excerpt.push_str(ELLIPSIS);
    excerpt
}

/// Parse the timestamp shapes WordPress emits: RFC 3339, the offset-less
/// `2024-01-15T10:30:00` of `date`/`modified`, or a bare date.
pub(crate) fn parse_wordpress_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// `"January 15, 2024"`, or `None` when the input is not a timestamp.
pub fn format_wordpress_date(raw: &str) -> Option<String> {
    parse_wordpress_date(raw).map(|dt| dt.format("%B %-d, %Y").to_string())
}

/// Minutes to read rendered content at 200 words per minute, at least 1.
pub fn reading_time(html: &str) -> u32 {
    let words = extract_plain_text(html, None).split_whitespace().count();
    let minutes = words.div_ceil(WORDS_PER_MINUTE).max(1);
    u32::try_from(minutes).unwrap_or(u32::MAX)
}
