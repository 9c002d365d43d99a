//! Shared constants used across the application.

/// User agent string sent with feed and stats requests.
///
/// The preview pages serve reduced markup to clients that do not look like a
/// desktop browser, so requests present a realistic browser user agent.
pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Channel scraped when `CHANNEL_USERNAME` is not set.
pub const DEFAULT_CHANNEL: &str = "itmaksimkoya";

/// Host serving the public channel preview and post pages.
pub const DEFAULT_BASE_URL: &str = "https://t.me";

/// Display string used for posts without a timestamp ("recently").
pub const DATE_PLACEHOLDER: &str = "Недавно";

/// Suffix appended to truncated post text.
pub const ELLIPSIS: &str = "...";

/// Views value used when neither the preview nor the stats page has one.
pub const DEFAULT_VIEWS: &str = "0";

/// Reaction count used when a reaction entry has no count element.
pub const DEFAULT_REACTION_COUNT: &str = "0";
