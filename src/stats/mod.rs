//! Authoritative view and reaction counts for individual posts.
//!
//! The preview feed renders view counters that lag behind the real values and
//! omits reactions entirely. Each admitted post is therefore fetched a second
//! time through its embed rendering, which carries both. The lookup is best
//! effort: any failure yields `None` and the caller falls back to the preview
//! counters.

mod pacer;
mod parser;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

pub use pacer::Pacer;
pub use parser::parse_stats;

use crate::config::Config;
use crate::constants::BROWSER_USER_AGENT;
use crate::models::EngagementStats;

/// Source of per-post engagement statistics.
#[async_trait]
pub trait StatsFetcher: Send + Sync {
    /// Fetch stats for the post at `post_link`.
    ///
    /// Returns `None` when no authoritative data could be obtained, including
    /// a page that loads but carries no counters.
    async fn fetch_stats(&self, post_link: &str) -> Option<EngagementStats>;
}

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("invalid post link: {0}")]
    InvalidLink(#[from] url::ParseError),
    #[error("stats request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("stats request returned status {0}")]
    Status(StatusCode),
    #[error("stats page has no views or reactions")]
    Empty,
}

/// Fetches the embed rendering of a post over HTTP.
pub struct HttpStatsFetcher {
    client: Client,
    referer: String,
    mode: String,
}

impl HttpStatsFetcher {
    /// Build a fetcher using the stats timeout from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.stats_timeout)
            .user_agent(BROWSER_USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            referer: config.channel_url(),
            mode: config.stats_mode.clone(),
        })
    }

    /// `<post_link>?embed=1&mode=<mode>`
    ///
    /// # Errors
    ///
    /// Returns an error if `post_link` is not an absolute URL.
    pub fn stats_url(&self, post_link: &str) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(post_link)?;
        url.query_pairs_mut()
            .append_pair("embed", "1")
            .append_pair("mode", &self.mode);
        Ok(url)
    }

    async fn try_fetch(&self, post_link: &str) -> Result<EngagementStats, StatsError> {
        let url = self.stats_url(post_link)?;

        let response = self
            .client
            .get(url)
            .header(reqwest::header::REFERER, &self.referer)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StatsError::Status(status));
        }

        let body = response.text().await?;
        let stats = parse_stats(&body);
        if stats.is_empty() {
            return Err(StatsError::Empty);
        }
        Ok(stats)
    }
}

#[async_trait]
impl StatsFetcher for HttpStatsFetcher {
    async fn fetch_stats(&self, post_link: &str) -> Option<EngagementStats> {
        match self.try_fetch(post_link).await {
            Ok(stats) => {
                debug!(
                    link = %post_link,
                    views = ?stats.views,
                    reactions = stats.reactions.len(),
                    "Fetched post stats"
                );
                Some(stats)
            }
            Err(e) => {
                warn!(link = %post_link, "Could not fetch post stats: {e}");
                None
            }
        }
    }
}
