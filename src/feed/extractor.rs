//! Field extraction from the channel preview page.
//!
//! The preview page renders every post as a `div.tgme_widget_message` subtree,
//! oldest first. Each field is located through a short ordered list of
//! candidate selectors so that markup changes between layout versions stay
//! contained in this module.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

static FRAGMENT: LazyLock<Selector> = LazyLock::new(|| selector("div.tgme_widget_message"));

static LINK: LazyLock<Vec<Selector>> =
    LazyLock::new(|| vec![selector("a.tgme_widget_message_date[href]")]);

static TEXT: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    vec![
        selector("div.tgme_widget_message_text"),
        selector(".js-message_text"),
    ]
});

static TIMESTAMP: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    vec![
        selector("a.tgme_widget_message_date time[datetime]"),
        selector("time[datetime]"),
    ]
});

static IMAGE: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    vec![
        selector("a.tgme_widget_message_photo_wrap[style]"),
        selector(".tgme_widget_message_photo_wrap[style]"),
    ]
});

static VIDEO: LazyLock<Vec<Selector>> = LazyLock::new(|| vec![selector("video[src]")]);

static PREVIEW_VIEWS: LazyLock<Vec<Selector>> =
    LazyLock::new(|| vec![selector("span.tgme_widget_message_views")]);

/// `background-image: url(...)` with single, double or no quotes.
static BACKGROUND_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)background-image\s*:\s*url\(\s*(?:'([^']*)'|"([^"]*)"|([^'"\s)]+))\s*\)"#,
    )
    .unwrap()
});

pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("Invalid selector")
}

/// A parsed preview page.
pub struct FeedDocument {
    html: Html,
}

impl FeedDocument {
    /// Parse a preview page.
    ///
    /// The HTML parser recovers from any malformed input, so this never fails;
    /// a page that is not a feed simply has no fragments.
    #[must_use]
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }
}

/// One post's markup subtree, borrowed from its [`FeedDocument`].
#[derive(Debug, Clone, Copy)]
pub struct RawFragment<'a> {
    element: ElementRef<'a>,
}

/// All fields of one fragment, extracted into owned values.
///
/// Fields the markup does not carry stay `None`; defaults are applied during
/// normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPost {
    pub link: Option<String>,
    pub text: String,
    pub timestamp: Option<String>,
    pub image: Option<String>,
    pub video: Option<String>,
    pub preview_views: Option<String>,
}

/// All post fragments in document order (oldest first).
#[must_use]
pub fn list_fragments(document: &FeedDocument) -> Vec<RawFragment<'_>> {
    document
        .html
        .select(&FRAGMENT)
        .map(|element| RawFragment { element })
        .collect()
}

/// Permalink of the post, e.g. `https://t.me/channel/123`.
#[must_use]
pub fn extract_link(fragment: &RawFragment<'_>) -> Option<String> {
    first_match(fragment, &LINK, |el| non_empty(el.value().attr("href")))
}

/// Post text as rendered: inline markup flattened, `<br>` and block
/// boundaries kept as line breaks. Empty for media-only posts.
#[must_use]
pub fn extract_text(fragment: &RawFragment<'_>) -> String {
    first_match(fragment, &TEXT, |el| {
        let text = rendered_text(el);
        (!text.is_empty()).then_some(text)
    })
    .unwrap_or_default()
}

#[must_use]
pub fn extract_timestamp(fragment: &RawFragment<'_>) -> Option<String> {
    first_match(fragment, &TIMESTAMP, |el| non_empty(el.value().attr("datetime")))
}

/// URL of the first photo, read from its inline `background-image` style.
#[must_use]
pub fn extract_image(fragment: &RawFragment<'_>) -> Option<String> {
    first_match(fragment, &IMAGE, |el| {
        el.value().attr("style").and_then(background_image_url)
    })
}

#[must_use]
pub fn extract_video(fragment: &RawFragment<'_>) -> Option<String> {
    first_match(fragment, &VIDEO, |el| non_empty(el.value().attr("src")))
}

/// View counter as rendered on the preview page, if any.
#[must_use]
pub fn extract_preview_views(fragment: &RawFragment<'_>) -> Option<String> {
    first_match(fragment, &PREVIEW_VIEWS, |el| {
        let views = stripped_text(el, "");
        (!views.is_empty()).then_some(views)
    })
}

#[must_use]
pub fn extract_raw_post(fragment: &RawFragment<'_>) -> RawPost {
    RawPost {
        link: extract_link(fragment),
        text: extract_text(fragment),
        timestamp: extract_timestamp(fragment),
        image: extract_image(fragment),
        video: extract_video(fragment),
        preview_views: extract_preview_views(fragment),
    }
}

/// Parse a preview page and extract every post, newest first.
///
/// The parsed document is dropped before returning so that callers can hold
/// the result across await points.
#[must_use]
pub fn extract_posts_newest_first(html: &str) -> Vec<RawPost> {
    let document = FeedDocument::parse(html);
    let mut posts: Vec<RawPost> = list_fragments(&document)
        .iter()
        .map(extract_raw_post)
        .collect();
    posts.reverse();
    posts
}

/// Pull the URL out of a `background-image:url(...)` declaration.
#[must_use]
pub fn background_image_url(style: &str) -> Option<String> {
    let caps = BACKGROUND_IMAGE.captures(style)?;
    let url = caps
        .get(1)
        .or_else(|| caps.get(2))
        .or_else(|| caps.get(3))?
        .as_str()
        .trim();
    (!url.is_empty()).then(|| url.to_string())
}

/// Try each selector in order and return the first element value `extract`
/// accepts.
fn first_match<F>(fragment: &RawFragment<'_>, selectors: &[Selector], extract: F) -> Option<String>
where
    F: Fn(ElementRef<'_>) -> Option<String>,
{
    selectors
        .iter()
        .flat_map(|sel| fragment.element.select(sel))
        .find_map(extract)
}

/// Elements that start a new line when rendered.
const BLOCK_TAGS: &[&str] = &[
    "blockquote", "div", "h1", "h2", "h3", "h4", "h5", "h6", "li", "ol", "p", "pre", "ul",
];

/// Whitespace inside a line is collapsed, and at most one blank line is kept
/// between paragraphs.
fn rendered_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    push_rendered(element, &mut raw);

    let mut lines: Vec<String> = Vec::new();
    for line in raw.split('\n') {
        let line = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if line.is_empty() && lines.last().map_or(true, String::is_empty) {
            continue;
        }
        lines.push(line);
    }
    while lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }
    lines.join("\n")
}

fn push_rendered(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            // Source newlines are layout, not content.
            out.push_str(&text.replace('\n', " "));
        } else if let Some(child) = ElementRef::wrap(child) {
            let name = child.value().name();
            if name == "br" {
                out.push('\n');
                continue;
            }
            let block = BLOCK_TAGS.contains(&name);
            if block {
                out.push('\n');
            }
            push_rendered(child, out);
            if block {
                out.push('\n');
            }
        }
    }
}

/// Descendant text nodes, each trimmed, empty ones dropped, joined by `sep`.
pub(crate) fn stripped_text(element: ElementRef<'_>, sep: &str) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(sep)
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}
