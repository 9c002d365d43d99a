//! Records produced by a snapshot run.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Kind of media attached to a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Text,
    Photo,
    Video,
}

impl ContentType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Photo => "photo",
            Self::Video => "video",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single reaction and how many times it was used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    pub emoji: String,
    /// Rendered count, e.g. "12" or "1.3K".
    pub count: String,
}

/// Statistics scraped from the embed rendering of a single post.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngagementStats {
    /// Rendered view counter ("1.2K"); kept as text since the platform
    /// abbreviates large numbers.
    pub views: Option<String>,
    pub reactions: Vec<Reaction>,
}

impl EngagementStats {
    /// True when the page carried neither a view counter nor reactions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.views.is_none() && self.reactions.is_empty()
    }
}

/// A post as published in the snapshot file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalPost {
    pub id: i64,
    pub text: String,
    pub date: String,
    pub views: String,
    pub reactions: Vec<Reaction>,
    pub link: String,
    pub image: Option<String>,
    pub video: Option<String>,
    #[serde(rename = "type")]
    pub content_type: ContentType,
}

/// The document written to the output file on every run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub channel: String,
    pub updated_at: DateTime<Local>,
    /// Newest first.
    pub posts: Vec<CanonicalPost>,
}

impl Snapshot {
    /// Create a snapshot stamped with the current local time.
    #[must_use]
    pub fn new(channel: impl Into<String>, posts: Vec<CanonicalPost>) -> Self {
        Self {
            channel: channel.into(),
            updated_at: Local::now(),
            posts,
        }
    }
}
