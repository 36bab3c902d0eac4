//! # featherfeed
//!
//! Parses saved timeline pages from twitter.com into structured posts and
//! turns them into syndication feeds.
//!
//! The parser understands two markup generations: the legacy table-based
//! pages served to basic browsers and static snapshots of the modern
//! script-rendered pages. Post bodies are rewritten into clean, self-contained
//! HTML (absolute links, real emoji characters, no presentational cruft), and
//! the results can be written out as Atom, RSS 2.0, or JSON Feed.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use featherfeed::{parse_timeline, NullFetcher, Options};
//!
//! let html = std::fs::read_to_string("timeline.html")?;
//! let timeline = parse_timeline(&html, &NullFetcher, Options { embeds: false, ..Options::default() })?;
//! for post in &timeline.posts {
//!     println!("{}: {}", post.timestamp, post.text);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod embed;
mod error;
mod options;
mod parser;
mod patterns;
mod result;

/// Predicate-based search helpers over parsed HTML trees.
pub mod query;

/// Free-text timestamp parsing ("23m", "Jul 9", "25 Jun 19").
pub mod timestamp;

/// Post content rewriting into clean, self-contained fragments.
pub mod rewrite;

/// URL helpers for the canonical site hosts.
pub mod url_utils;

/// Page fetching with an on-disk cache, behind a trait seam.
pub mod fetch;

/// Character encoding detection and transcoding for fetched pages.
pub mod encoding;

/// Syndication feed output (Atom, RSS 2.0, JSON Feed).
pub mod feed;

/// Multi-page timeline aggregation.
pub mod pagination;

// Public API - re-exports
pub use error::{Error, Result};
pub use feed::{read_latest_id, write_feed, FeedFormat};
pub use fetch::{DirFetcher, Fetcher, HttpFetcher, NullFetcher};
pub use options::Options;
pub use pagination::{collect_timeline, TimelineUpdate, Update};
pub use result::{Author, Post, Profile, Timeline};
pub use rewrite::{rewrite_fragment, Rewritten};

use chrono::{DateTime, Utc};
use dom_query::Document;

/// Parses a timeline document into posts.
///
/// `fetcher` is consulted only when `options.embeds` is set, to inline quoted
/// posts and photos; pass [`NullFetcher`] otherwise. Free-text timestamps are
/// resolved against the current time.
#[allow(clippy::missing_errors_doc)]
pub fn parse_timeline(html: &str, fetcher: &dyn Fetcher, options: Options) -> Result<Timeline> {
    parse_timeline_at(html, fetcher, options, Utc::now())
}

/// Like [`parse_timeline`], but resolves relative timestamps against a
/// caller-supplied instant. This is the deterministic entry point for tests
/// and replays.
#[allow(clippy::missing_errors_doc)]
pub fn parse_timeline_at(
    html: &str,
    fetcher: &dyn Fetcher,
    options: Options,
    now: DateTime<Utc>,
) -> Result<Timeline> {
    let doc = Document::from(html);
    parser::parse(&doc, fetcher, options, now)
}

/// Parses raw page bytes, transcoding to UTF-8 first.
#[allow(clippy::missing_errors_doc)]
pub fn parse_timeline_bytes(
    bytes: &[u8],
    fetcher: &dyn Fetcher,
    options: Options,
) -> Result<Timeline> {
    parse_timeline(&encoding::transcode_to_utf8(bytes), fetcher, options)
}
