//! Parsing of the embed rendering of a single post.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use crate::constants::DEFAULT_REACTION_COUNT;
use crate::feed::extractor::{selector, stripped_text};
use crate::models::{EngagementStats, Reaction};

static VIEWS: LazyLock<Selector> = LazyLock::new(|| selector("span.tgme_widget_message_views"));

/// Reaction containers, in the order they are probed. Older embeds use the
/// first shape, newer ones the second.
static REACTION_CONTAINERS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    vec![
        selector("div.tgme_widget_message_reactions"),
        selector("div.mw-reactions-container"),
    ]
});

static REACTION: LazyLock<Selector> = LazyLock::new(|| selector(".tgme_widget_message_reaction"));
static REACTION_EMOJI: LazyLock<Selector> =
    LazyLock::new(|| selector(".tgme_widget_message_reaction_emoji"));
static REACTION_COUNT: LazyLock<Selector> =
    LazyLock::new(|| selector(".tgme_widget_message_reaction_count"));

/// Extract views and reactions from an embed page.
#[must_use]
pub fn parse_stats(html: &str) -> EngagementStats {
    let document = Html::parse_document(html);

    let views = document
        .select(&VIEWS)
        .map(|el| stripped_text(el, ""))
        .find(|v| !v.is_empty());

    EngagementStats {
        views,
        reactions: parse_reactions(&document),
    }
}

fn parse_reactions(document: &Html) -> Vec<Reaction> {
    REACTION_CONTAINERS
        .iter()
        .flat_map(|sel| document.select(sel))
        .map(container_reactions)
        .find(|reactions| !reactions.is_empty())
        .unwrap_or_default()
}

fn container_reactions(container: ElementRef<'_>) -> Vec<Reaction> {
    container
        .select(&REACTION)
        .filter_map(|item| {
            let emoji = item
                .select(&REACTION_EMOJI)
                .next()
                .map(|el| stripped_text(el, ""))
                .filter(|e| !e.is_empty())?;
            let count = item
                .select(&REACTION_COUNT)
                .next()
                .map(|el| stripped_text(el, ""))
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| DEFAULT_REACTION_COUNT.to_string());
            Some(Reaction { emoji, count })
        })
        .collect()
}
