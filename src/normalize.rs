//! Conversion of extracted fields into published post records.

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use thiserror::Error;

use crate::constants::{DATE_PLACEHOLDER, DEFAULT_VIEWS, ELLIPSIS};
use crate::feed::RawPost;
use crate::models::{CanonicalPost, ContentType, EngagementStats};

/// English month names and their Russian genitive forms, as used in
/// "5 января".
const MONTHS: [(&str, &str); 12] = [
    ("January", "января"),
    ("February", "февраля"),
    ("March", "марта"),
    ("April", "апреля"),
    ("May", "мая"),
    ("June", "июня"),
    ("July", "июля"),
    ("August", "августа"),
    ("September", "сентября"),
    ("October", "октября"),
    ("November", "ноября"),
    ("December", "декабря"),
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PostError {
    #[error("post has no permalink")]
    MissingLink,
    #[error("cannot parse post id from link: {link}")]
    InvalidId { link: String },
    #[error("cannot parse post timestamp: {timestamp}")]
    InvalidTimestamp { timestamp: String },
}

#[must_use]
pub const fn classify_type(image: Option<&str>, video: Option<&str>) -> ContentType {
    if video.is_some() {
        ContentType::Video
    } else if image.is_some() {
        ContentType::Photo
    } else {
        ContentType::Text
    }
}

/// Cut `text` to `limit` characters, marking the cut with an ellipsis.
#[must_use]
pub fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        None => text.to_string(),
        Some((cut, _)) => format!("{}{ELLIPSIS}", &text[..cut]),
    }
}

/// Render a post timestamp as "05 января".
///
/// The date is shown in the timestamp's own offset. Posts without a
/// timestamp get a "recently" placeholder.
///
/// # Errors
///
/// Returns [`PostError::InvalidTimestamp`] when a timestamp is present but is
/// not ISO-8601.
pub fn format_date(timestamp: Option<&str>) -> Result<String, PostError> {
    let Some(raw) = timestamp else {
        return Ok(DATE_PLACEHOLDER.to_string());
    };

    parse_timestamp(raw)
        .map(|dt| translate_month(&dt.format("%d %B").to_string()))
        .ok_or_else(|| PostError::InvalidTimestamp {
            timestamp: raw.to_string(),
        })
}

fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt);
    }
    // Timestamps without an offset are taken as UTC.
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc().fixed_offset())
}

fn translate_month(day_month: &str) -> String {
    MONTHS
        .iter()
        .find(|&&(english, _)| day_month.contains(english))
        .map_or_else(
            || day_month.to_string(),
            |&(english, russian)| day_month.replace(english, russian),
        )
}

/// Pick the view counter to publish: stats page first, then preview, then "0".
#[must_use]
pub fn resolve_views(preview: Option<&str>, authoritative: Option<&str>) -> String {
    authoritative
        .filter(|v| !v.trim().is_empty())
        .or_else(|| preview.filter(|v| !v.trim().is_empty()))
        .unwrap_or(DEFAULT_VIEWS)
        .to_string()
}

/// Numeric id from the last path segment of a permalink.
///
/// # Errors
///
/// Returns [`PostError::InvalidId`] when the segment is not an integer.
pub fn parse_post_id(link: &str) -> Result<i64, PostError> {
    let path = link.split(['?', '#']).next().unwrap_or_default();
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .and_then(|segment| segment.parse().ok())
        .ok_or_else(|| PostError::InvalidId {
            link: link.to_string(),
        })
}

/// Assemble the published record for an admitted post.
///
/// # Errors
///
/// Fails when the post has no link, its id cannot be parsed, or its
/// timestamp is malformed; the caller skips such posts.
pub fn build_post(
    raw: &RawPost,
    stats: Option<&EngagementStats>,
    text_limit: usize,
) -> Result<CanonicalPost, PostError> {
    let link = raw.link.clone().ok_or(PostError::MissingLink)?;
    let id = parse_post_id(&link)?;

    Ok(CanonicalPost {
        id,
        text: truncate(&raw.text, text_limit),
        date: format_date(raw.timestamp.as_deref())?,
        views: resolve_views(
            raw.preview_views.as_deref(),
            stats.and_then(|s| s.views.as_deref()),
        ),
        reactions: stats.map(|s| s.reactions.clone()).unwrap_or_default(),
        link,
        image: raw.image.clone(),
        video: raw.video.clone(),
        content_type: classify_type(raw.image.as_deref(), raw.video.as_deref()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Reaction;

    #[test]
    fn test_classify_type() {
        assert_eq!(classify_type(Some("i"), Some("v")), ContentType::Video);
        assert_eq!(classify_type(None, Some("v")), ContentType::Video);
        assert_eq!(classify_type(Some("i"), None), ContentType::Photo);
        assert_eq!(classify_type(None, None), ContentType::Text);
    }

    #[test]
    fn test_truncate_short_text_unchanged() {
        assert_eq!(truncate("hello", 200), "hello");
        assert_eq!(truncate("", 200), "");
        let exact = "a".repeat(200);
        assert_eq!(truncate(&exact, 200), exact);
    }

    #[test]
    fn test_truncate_long_text() {
        let text = "б".repeat(250);
        let result = truncate(&text, 200);
        assert_eq!(result.chars().count(), 203);
        assert!(result.ends_with("..."));
        assert!(result.starts_with(&"б".repeat(200)));
    }

    #[test]
    fn test_truncate_is_idempotent() {
        let text = format!("{}\n{}", "x".repeat(150), "y".repeat(150));
        let once = truncate(&text, 200);
        let twice = truncate(&once, 200);
        assert_eq!(once, twice);
        assert!(once.contains('\n'));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let text = "🔥".repeat(5);
        assert_eq!(truncate(&text, 2), "🔥🔥...");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(Some("2024-01-05T10:00:00+00:00")).unwrap(), "05 января");
        assert_eq!(format_date(Some("2024-03-21T08:15:00Z")).unwrap(), "21 марта");
        assert_eq!(format_date(Some("2023-12-31T23:30:00")).unwrap(), "31 декабря");
    }

    #[test]
    fn test_format_date_uses_timestamp_offset() {
        // 23:30 in UTC-02:00 is already the next day in UTC; the local day wins.
        assert_eq!(format_date(Some("2024-05-31T23:30:00-02:00")).unwrap(), "31 мая");
    }

    #[test]
    fn test_format_date_placeholder() {
        assert_eq!(format_date(None).unwrap(), "Недавно");
    }

    #[test]
    fn test_format_date_rejects_malformed_timestamp() {
        assert_eq!(
            format_date(Some("yesterday")),
            Err(PostError::InvalidTimestamp {
                timestamp: "yesterday".to_string()
            })
        );
        assert!(format_date(Some("2024-13-01T00:00:00Z")).is_err());
    }

    #[test]
    fn test_resolve_views() {
        assert_eq!(resolve_views(Some("5"), Some("1.2K")), "1.2K");
        assert_eq!(resolve_views(Some("5"), None), "5");
        assert_eq!(resolve_views(Some("5"), Some("")), "5");
        assert_eq!(resolve_views(None, None), "0");
        assert_eq!(resolve_views(Some(" "), None), "0");
    }

    #[test]
    fn test_parse_post_id() {
        assert_eq!(parse_post_id("https://t.me/chan/123"), Ok(123));
        assert_eq!(parse_post_id("https://t.me/chan/123/"), Ok(123));
        assert_eq!(parse_post_id("https://t.me/chan/123?single"), Ok(123));
        assert!(matches!(
            parse_post_id("https://t.me/chan/about"),
            Err(PostError::InvalidId { .. })
        ));
        assert!(parse_post_id("").is_err());
    }

    fn raw_post() -> RawPost {
        RawPost {
            link: Some("https://t.me/chan/77".to_string()),
            text: "t".repeat(300),
            timestamp: Some("2024-02-10T12:00:00+00:00".to_string()),
            image: Some("https://cdn.example.com/77.jpg".to_string()),
            video: None,
            preview_views: Some("900".to_string()),
        }
    }

    #[test]
    fn test_build_post_with_stats() {
        let stats = EngagementStats {
            views: Some("1.2K".to_string()),
            reactions: vec![Reaction {
                emoji: "👍".to_string(),
                count: "3".to_string(),
            }],
        };
        let post = build_post(&raw_post(), Some(&stats), 200).unwrap();

        assert_eq!(post.id, 77);
        assert_eq!(post.text.chars().count(), 203);
        assert_eq!(post.date, "10 февраля");
        assert_eq!(post.views, "1.2K");
        assert_eq!(post.reactions, stats.reactions);
        assert_eq!(post.link, "https://t.me/chan/77");
        assert_eq!(post.content_type, ContentType::Photo);
    }

    #[test]
    fn test_build_post_without_stats() {
        let post = build_post(&raw_post(), None, 200).unwrap();
        assert_eq!(post.views, "900");
        assert!(post.reactions.is_empty());
    }

    #[test]
    fn test_build_post_failures() {
        let mut raw = raw_post();
        raw.link = None;
        assert_eq!(build_post(&raw, None, 200), Err(PostError::MissingLink));

        raw.link = Some("https://t.me/chan/pinned".to_string());
        assert!(matches!(
            build_post(&raw, None, 200),
            Err(PostError::InvalidId { .. })
        ));

        let mut raw = raw_post();
        raw.timestamp = Some("not-a-date".to_string());
        assert!(matches!(
            build_post(&raw, None, 200),
            Err(PostError::InvalidTimestamp { .. })
        ));
    }
}
