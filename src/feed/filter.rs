//! Inclusion policy for extracted posts.

use crate::config::Config;
use crate::feed::extractor::RawPost;

/// Why a post was left out of the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    NoImage,
    TooShort { length: usize, minimum: usize },
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoImage => f.write_str("no image"),
            Self::TooShort { length, minimum } => {
                write!(f, "too short ({length} < {minimum} chars)")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Admit,
    Reject(RejectReason),
}

/// Decides which posts make it into the snapshot.
///
/// With filtering enabled a post needs a photo and at least
/// `min_post_length` characters of text. With filtering disabled every post
/// with a usable link is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostFilter {
    pub enabled: bool,
    pub min_post_length: usize,
}

impl PostFilter {
    #[must_use]
    pub const fn new(enabled: bool, min_post_length: usize) -> Self {
        Self {
            enabled,
            min_post_length,
        }
    }

    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.filtering_enabled, config.min_post_length)
    }

    #[must_use]
    pub fn evaluate(&self, raw: &RawPost) -> Verdict {
        if !self.enabled {
            return Verdict::Admit;
        }
        if raw.image.is_none() {
            return Verdict::Reject(RejectReason::NoImage);
        }
        let length = raw.text.chars().count();
        if length < self.min_post_length {
            return Verdict::Reject(RejectReason::TooShort {
                length,
                minimum: self.min_post_length,
            });
        }
        Verdict::Admit
    }

    #[must_use]
    pub fn admit(&self, raw: &RawPost) -> bool {
        self.evaluate(raw) == Verdict::Admit
    }
}

/// Whether collection is complete. Checked before each fragment.
#[must_use]
pub const fn should_stop(collected: usize, target: usize) -> bool {
    collected >= target
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(text_len: usize, image: bool) -> RawPost {
        RawPost {
            link: Some("https://t.me/c/1".to_string()),
            text: "я".repeat(text_len),
            image: image.then(|| "https://cdn.example.com/1.jpg".to_string()),
            ..RawPost::default()
        }
    }

    #[test]
    fn test_requires_image_regardless_of_length() {
        let filter = PostFilter::new(true, 100);
        assert_eq!(filter.evaluate(&raw(5000, false)), Verdict::Reject(RejectReason::NoImage));
        assert!(!filter.admit(&raw(100, false)));
    }

    #[test]
    fn test_requires_min_length_regardless_of_media() {
        let filter = PostFilter::new(true, 100);
        assert_eq!(
            filter.evaluate(&raw(99, true)),
            Verdict::Reject(RejectReason::TooShort {
                length: 99,
                minimum: 100
            })
        );

        let mut with_video = raw(10, true);
        with_video.video = Some("https://cdn.example.com/v.mp4".to_string());
        assert!(!filter.admit(&with_video));
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // 100 Cyrillic letters are 200 bytes but exactly the minimum.
        let filter = PostFilter::new(true, 100);
        assert!(filter.admit(&raw(100, true)));
    }

    #[test]
    fn test_disabled_admits_everything() {
        let filter = PostFilter::new(false, 100);
        assert!(filter.admit(&raw(0, false)));
        assert!(filter.admit(&RawPost::default()));
    }

    #[test]
    fn test_should_stop() {
        assert!(!should_stop(0, 3));
        assert!(!should_stop(2, 3));
        assert!(should_stop(3, 3));
        assert!(should_stop(4, 3));
    }

    #[test]
    fn test_reason_display() {
        assert_eq!(RejectReason::NoImage.to_string(), "no image");
        assert_eq!(
            RejectReason::TooShort {
                length: 12,
                minimum: 100
            }
            .to_string(),
            "too short (12 < 100 chars)"
        );
    }
}
