//! Timeline structural parsing.
//!
//! Two markup generations are supported: the legacy table-based pages served
//! to basic browsers, and the modern script-rendered pages captured as static
//! snapshots. A cheap probe picks the strategy; both produce the same
//! [`Timeline`] model.
//!
//! Parsing is all-or-nothing. A single malformed post aborts the whole parse,
//! because a partial timeline is indistinguishable from upstream markup drift
//! and would silently drop posts from feeds.

pub(crate) mod legacy;
pub(crate) mod spa;

use chrono::{DateTime, Utc};
use dom_query::Document;

use crate::error::{Error, Result};
use crate::fetch::Fetcher;
use crate::options::Options;
use crate::result::{Author, Post, Timeline};
use crate::url_utils::user_url;

/// Parses a timeline document with whichever strategy its markup calls for.
pub(crate) fn parse(
    doc: &Document,
    fetcher: &dyn Fetcher,
    opts: Options,
    now: DateTime<Utc>,
) -> Result<Timeline> {
    let mut timeline = if doc.select("div.timeline").exists() {
        legacy::parse(doc, fetcher, opts, now)?
    } else if doc.select(r#"[data-testid="primaryColumn"]"#).exists() {
        spa::parse(doc, fetcher, opts)?
    } else {
        return Err(Error::structure(
            "neither a legacy timeline nor a primary column is present",
        ));
    };
    suppress_self_replies(&mut timeline.posts);
    Ok(timeline)
}

/// A post that opens a thread names only its own author in the reply
/// context. That is threading, not a reply to somebody, so the list is
/// cleared. When other handles are present the author stays: the post really
/// does reply into that set of people.
fn suppress_self_replies(posts: &mut [Post]) {
    for post in posts {
        if post.reply_to.iter().all(|handle| *handle == post.author.user) {
            post.reply_to.clear();
        }
    }
}

/// Attribution line prepended to a re-shared post's content, so feed readers
/// see whose post it originally was.
pub(crate) fn attribution_banner(author: &Author) -> String {
    format!(
        r#"<strong><a href="{}">{}</a></strong>"#,
        html_escape::encode_double_quoted_attribute(&user_url(&author.user)),
        html_escape::encode_text(&author.display_name())
    )
}
