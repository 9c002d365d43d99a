//! One snapshot run: fetch the preview feed, pick posts, enrich and normalize.

use std::sync::Arc;

use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::constants::BROWSER_USER_AGENT;
use crate::feed::{extract_posts_newest_first, should_stop, PostFilter, Verdict};
use crate::models::CanonicalPost;
use crate::normalize::{build_post, format_date, parse_post_id};
use crate::stats::{HttpStatsFetcher, Pacer, StatsFetcher};

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("feed request returned status {0}")]
    Status(StatusCode),
}

/// Outcome of a run.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Collected posts, newest first.
    pub posts: Vec<CanonicalPost>,
    /// Fragments found on the page.
    pub fragments_total: usize,
    /// Fragments looked at before the target was reached.
    pub fragments_seen: usize,
    /// Fragments left out by the filter.
    pub rejected: usize,
    /// Fragments skipped because a required field was missing or invalid.
    pub failed: usize,
    /// Admitted posts published with preview counters only.
    pub stats_unavailable: usize,
    /// Set when the feed itself could not be fetched.
    pub feed_error: Option<String>,
}

/// Collects the newest qualifying posts of a channel.
pub struct FeedPipeline {
    config: Config,
    client: Client,
    filter: PostFilter,
    fetcher: Arc<dyn StatsFetcher>,
}

impl FeedPipeline {
    #[must_use]
    pub fn new(config: Config, client: Client, fetcher: Arc<dyn StatsFetcher>) -> Self {
        let filter = PostFilter::from_config(&config);
        Self {
            config,
            client,
            filter,
            fetcher,
        }
    }

    /// Build a pipeline talking to the real endpoints described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be constructed.
    pub fn from_config(config: Config) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.feed_timeout)
            .user_agent(BROWSER_USER_AGENT)
            .build()?;
        let fetcher = Arc::new(HttpStatsFetcher::new(&config)?);
        Ok(Self::new(config, client, fetcher))
    }

    /// Fetch the preview page. Not retried.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, timeout or a non-success status.
    pub async fn fetch_feed(&self) -> Result<String, FeedError> {
        let response = self
            .client
            .get(self.config.feed_url())
            .header(reqwest::header::CACHE_CONTROL, "no-cache")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status));
        }

        Ok(response.text().await?)
    }

    /// Run once. A feed that cannot be fetched yields an empty summary with
    /// `feed_error` set.
    pub async fn run(&self) -> RunSummary {
        let url = self.config.feed_url();
        info!(url = %url, target = self.config.target_count, "Fetching channel feed");

        match self.fetch_feed().await {
            Ok(html) => self.process_document(&html).await,
            Err(e) => {
                error!(url = %url, "Feed fetch failed: {e}");
                RunSummary {
                    feed_error: Some(e.to_string()),
                    ..RunSummary::default()
                }
            }
        }
    }

    /// Select, enrich and normalize posts from an already fetched page.
    pub async fn process_document(&self, html: &str) -> RunSummary {
        let candidates = extract_posts_newest_first(html);
        let mut summary = RunSummary {
            fragments_total: candidates.len(),
            ..RunSummary::default()
        };

        if candidates.is_empty() {
            info!("Feed page has no posts");
            return summary;
        }

        let mut pacer = Pacer::new(self.config.stats_delay);

        for raw in candidates {
            if should_stop(summary.posts.len(), self.config.target_count) {
                debug!(collected = summary.posts.len(), "Target post count reached");
                break;
            }
            summary.fragments_seen += 1;

            let Some(link) = raw.link.as_deref() else {
                warn!("Skipping fragment without permalink");
                summary.failed += 1;
                continue;
            };

            if let Verdict::Reject(reason) = self.filter.evaluate(&raw) {
                debug!(link = %link, %reason, "Post rejected");
                summary.rejected += 1;
                continue;
            }

            // Invalid ids and timestamps would be dropped later; skip before spending a request.
            let checked = parse_post_id(link).and_then(|_| format_date(raw.timestamp.as_deref()));
            if let Err(e) = checked {
                warn!(link = %link, "Skipping post: {e}");
                summary.failed += 1;
                continue;
            }

            pacer.wait().await;
            let stats = self.fetcher.fetch_stats(link).await;
            if stats.is_none() {
                summary.stats_unavailable += 1;
            }

            match build_post(&raw, stats.as_ref(), self.config.text_preview_limit) {
                Ok(post) => {
                    info!(
                        post_id = post.id,
                        chars = raw.text.chars().count(),
                        content_type = %post.content_type,
                        "Added post"
                    );
                    summary.posts.push(post);
                }
                Err(e) => {
                    warn!(link = %link, "Skipping post: {e}");
                    summary.failed += 1;
                }
            }
        }

        summary
    }
}
