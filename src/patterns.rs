//! Compiled regex patterns used across the parser.
//!
//! All patterns are compiled once at startup using `LazyLock`.

#![allow(clippy::expect_used)]

use std::sync::LazyLock;

use regex::Regex;

/// Matches runs of whitespace for text normalization.
pub static WHITESPACE_NORMALIZE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("WHITESPACE_NORMALIZE regex"));

/// Matches relative post ages like "23m", "2h", "5d".
///
/// Anchored on both ends: a two-character token like "9h" must never be
/// half-matched by the date forms tried afterwards.
pub static RELATIVE_AGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)([smhd])$").expect("RELATIVE_AGE regex"));

/// Extracts the numeric post id from a canonical post URL path.
pub static STATUS_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/status(?:es)?/(\d+)").expect("STATUS_ID regex"));

/// Extracts the code-point stem from an emoji image URL,
/// e.g. ".../72x72/1f602.png" or ".../svg/1f1e6-1f1e8.svg".
pub static EMOJI_CODEPOINT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/([0-9a-fA-F][0-9a-fA-F-]*)\.(?:svg|png)$").expect("EMOJI_CODEPOINT regex"));

/// Matches an @-mention handle.
pub static MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@(\w+)").expect("MENTION regex"));

/// Matches the latest-id trailer comment appended to Atom/RSS feeds.
pub static XML_LATEST_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<!--\s+latest\s+id\s+(\d+)\s+-->\s*$").expect("XML_LATEST_ID regex"));

/// Matches the latest-id note embedded in a JSON feed's user comment.
pub static JSON_LATEST_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^latest id (\d+)$").expect("JSON_LATEST_ID regex"));

/// Extracts the charset from an HTML meta declaration.
pub static META_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?\s*([a-zA-Z0-9_-]+)"#).expect("META_CHARSET regex")
});
