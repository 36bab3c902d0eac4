//! Parser for the legacy table-based timeline markup.
//!
//! This markup is served to basic browsers and is refreshingly stable: posts
//! are `table.tweet` elements with class-labeled cells, and the profile block
//! sits in its own `div.profile`. Everything here is matched by class
//! membership, scoped to the relevant container.

use chrono::{DateTime, Utc};
use dom_query::{Document, NodeRef, Selection};

use crate::error::{Error, Result};
use crate::fetch::Fetcher;
use crate::options::Options;
use crate::query::{clean_text, find_all, find_first, get_attr, is_element, matcher, node_text};
use crate::result::{Author, Post, Profile, Timeline};
use crate::rewrite::render_content;
use crate::timestamp::parse_timestamp;
use crate::url_utils::{absolute_url, bare_user, user_url};

pub(crate) fn parse(
    doc: &Document,
    fetcher: &dyn Fetcher,
    opts: Options,
    now: DateTime<Utc>,
) -> Result<Timeline> {
    let profile = parse_profile(doc)?;

    // Posts are collected from inside the timeline container only; the page
    // can carry unrelated post tables (sidebars, footers) elsewhere.
    let timeline_root = doc
        .select("div.timeline")
        .nodes()
        .first()
        .cloned()
        .ok_or_else(|| Error::structure("no timeline container"))?;

    let mut posts = Vec::new();
    for (index, table) in find_all(&timeline_root, &matcher("table", "tweet"))
        .iter()
        .enumerate()
    {
        posts.push(parse_post(table, fetcher, opts, now, index)?);
    }

    let next_page = doc
        .select("div.w-button-more a")
        .nodes()
        .first()
        .and_then(|a| get_attr(a, "href"))
        .and_then(|href| absolute_url(&href));

    Ok(Timeline {
        profile,
        posts,
        next_page,
    })
}

fn parse_profile(doc: &Document) -> Result<Profile> {
    let container = doc
        .select("div.profile")
        .nodes()
        .first()
        .cloned()
        .ok_or_else(|| Error::structure("no profile block"))?;

    let avatar = find_first(&container, &matcher("td", "avatar"))
        .and_then(|td| find_first(&td, &|n: &NodeRef| is_element(n, "img")))
        .and_then(|img| get_attr(&img, "src"))
        .ok_or_else(|| Error::structure("profile block has no avatar image"))?;

    let name = find_first(&container, &matcher("div", "fullname"))
        .map(|n| clean_text(&node_text(&n, false)))
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::structure("profile block has no full name"))?;

    let user = find_first(&container, &matcher("span", "screen-name"))
        .map(|n| bare_user(clean_text(&node_text(&n, false)).as_str()).to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::structure("profile block has no screen name"))?;

    let mut profile = Profile {
        user,
        name,
        ..Profile::default()
    };
    profile.set_avatar(&avatar);
    Ok(profile)
}

fn parse_post(
    table: &NodeRef,
    fetcher: &dyn Fetcher,
    opts: Options,
    now: DateTime<Utc>,
    index: usize,
) -> Result<Post> {
    // The text container carries the post id, so it is located first and
    // used to attribute every later failure.
    let text_div = find_first(table, &matcher("div", "tweet-text"))
        .ok_or_else(|| Error::field(format!("#{index}"), "no text container"))?;
    let id: i64 = get_attr(&text_div, "data-id")
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| Error::field(format!("#{index}"), "text container has no numeric id"))?;
    let label = id.to_string();

    let name = find_first(table, &matcher("strong", "fullname"))
        .map(|n| clean_text(&node_text(&n, false)))
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::field(&label, "no author full name"))?;
    let user = find_first(table, &matcher("div", "username"))
        .map(|n| bare_user(clean_text(&node_text(&n, false)).as_str()).to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::field(&label, "no author username"))?;
    let author = Author { user, name };

    let stamp_text = find_first(table, &matcher("td", "timestamp"))
        .map(|n| clean_text(&node_text(&n, false)))
        .ok_or_else(|| Error::field(&label, "no timestamp cell"))?;
    let timestamp = parse_timestamp(&stamp_text, now)
        .map_err(|e| Error::field(&label, e.to_string()))?;

    let reply_to = find_first(table, &matcher("div", "tweet-reply-context"))
        .map(|ctx| reply_handles(&ctx))
        .unwrap_or_default();

    let fragment = Selection::from(text_div).inner_html().to_string();
    let rendered = render_content(&fragment, fetcher, opts)?;

    Ok(Post {
        id,
        href: format!("{}/status/{id}", user_url(&author.user)),
        author,
        timestamp,
        content: rendered.html,
        text: rendered.text,
        reply_to,
    })
}

/// Handles linked from a reply-context block, in document order.
fn reply_handles(context: &NodeRef) -> Vec<String> {
    find_all(context, &|n: &NodeRef| is_element(n, "a"))
        .iter()
        .map(|a| bare_user(clean_text(&node_text(a, false)).as_str()).to_string())
        .filter(|h| !h.is_empty())
        .collect()
}
