use anyhow::{Context, Result};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use channel_snapshot::config::Config;
use channel_snapshot::output::write_snapshot;
use channel_snapshot::{FeedPipeline, Snapshot};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    init_tracing()?;

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    info!(
        channel = %config.channel,
        target = config.target_count,
        filtering = config.filtering_enabled,
        min_length = config.min_post_length,
        "Configuration loaded"
    );

    let output_path = config.output_path.clone();
    let channel = config.channel.clone();

    let pipeline = FeedPipeline::from_config(config).context("Failed to build HTTP clients")?;
    let summary = pipeline.run().await;

    if let Some(feed_error) = &summary.feed_error {
        warn!(error = %feed_error, "Feed unavailable, writing empty snapshot");
    } else if summary.posts.is_empty() {
        warn!(
            fragments = summary.fragments_total,
            rejected = summary.rejected,
            "No qualifying posts found"
        );
    } else {
        info!(
            posts = summary.posts.len(),
            fragments = summary.fragments_total,
            scanned = summary.fragments_seen,
            rejected = summary.rejected,
            failed = summary.failed,
            stats_unavailable = summary.stats_unavailable,
            "Posts selected"
        );
    }

    let snapshot = Snapshot::new(channel, summary.posts);
    write_snapshot(&output_path, &snapshot)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    info!(path = %output_path.display(), posts = snapshot.posts.len(), "Snapshot updated");

    Ok(())
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,channel_snapshot=debug"));

    // Check if JSON logging is requested
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| matches!(v.to_lowercase().as_str(), "json" | "structured"))
        .unwrap_or(false);

    if use_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    }

    Ok(())
}
