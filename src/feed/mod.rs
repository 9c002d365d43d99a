//! Preview feed parsing and post selection.

pub mod extractor;
pub mod filter;

pub use extractor::{
    extract_posts_newest_first, list_fragments, FeedDocument, RawFragment, RawPost,
};
pub use filter::{should_stop, PostFilter, RejectReason, Verdict};
