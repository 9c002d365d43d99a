//! Channel snapshot library.
//!
//! Scrapes the public web preview of a channel, keeps the newest posts that
//! pass the quality filter, enriches them with view and reaction counts from
//! each post's embed page, and produces a JSON snapshot for a static site.

pub mod config;
pub mod constants;
pub mod feed;
pub mod models;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod stats;

pub use config::Config;
pub use models::{CanonicalPost, ContentType, EngagementStats, Reaction, Snapshot};
pub use pipeline::{FeedPipeline, RunSummary};
