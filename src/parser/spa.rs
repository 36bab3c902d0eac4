//! Parser for the modern script-rendered timeline markup.
//!
//! Snapshots of the modern pages carry almost no stable classes, so this
//! strategy leans on `data-testid` attributes and on position: the profile
//! handle is the first text node starting with `@`, the display name sits a
//! fixed number of ancestors up and one sibling back, and a post body is a
//! run of three or four sibling blocks whose meaning depends on the count.

use chrono::{DateTime, Utc};
use dom_query::{Document, NodeRef, Selection};

use crate::error::{Error, Result};
use crate::fetch::Fetcher;
use crate::options::Options;
use crate::query::{
    attr_equals, clean_text, element_children, find_all, find_first, get_attr, has_attr,
    is_element, node_text,
};
use crate::result::{Author, Post, Profile, Timeline};
use crate::rewrite::render_content;
use crate::url_utils::{absolute_url, bare_user, status_id};

use super::attribution_banner;

/// Ancestor steps from the profile handle's text node up to the block whose
/// previous sibling holds the display name.
const NAME_ANCESTOR_STEPS: usize = 3;

pub(crate) fn parse(doc: &Document, fetcher: &dyn Fetcher, opts: Options) -> Result<Timeline> {
    let column = doc
        .select(r#"[data-testid="primaryColumn"]"#)
        .nodes()
        .first()
        .cloned()
        .ok_or_else(|| Error::structure("no primary column"))?;

    let profile = parse_profile(&column)?;

    let mut posts = Vec::new();
    let containers = find_all(&column, &|n: &NodeRef| attr_equals(n, "data-testid", "tweet"));
    for (index, container) in containers.iter().enumerate() {
        posts.push(parse_post(container, &profile, fetcher, opts, index)?);
    }

    Ok(Timeline {
        profile,
        posts,
        next_page: None,
    })
}

fn parse_profile(column: &NodeRef) -> Result<Profile> {
    let handle_node = find_first(column, &|n: &NodeRef| {
        n.is_text() && n.text().trim().starts_with('@')
    })
    .ok_or_else(|| Error::structure("no profile handle text"))?;
    let user = bare_user(handle_node.text().trim()).to_string();

    // The display name lives in the block just before the handle's block.
    let mut block = handle_node.clone();
    for _ in 0..NAME_ANCESTOR_STEPS {
        block = block
            .parent()
            .ok_or_else(|| Error::structure("profile handle is too shallow in the tree"))?;
    }
    let name_block = previous_element(&block)
        .ok_or_else(|| Error::structure("no display name block before the handle"))?;
    let name = clean_text(&node_text(&name_block, true));
    if name.is_empty() {
        return Err(Error::structure("display name block is empty"));
    }

    let mut profile = Profile {
        user,
        name,
        ..Profile::default()
    };
    if let Some(src) = find_first(column, &|n: &NodeRef| {
        is_element(n, "img")
            && get_attr(n, "src").is_some_and(|s| s.contains("profile_images"))
    })
    .and_then(|img| get_attr(&img, "src"))
    {
        profile.set_avatar(&src);
    }
    Ok(profile)
}

fn parse_post(
    container: &NodeRef,
    owner: &Profile,
    fetcher: &dyn Fetcher,
    opts: Options,
    index: usize,
) -> Result<Post> {
    let time = find_first(container, &|n: &NodeRef| {
        is_element(n, "time") && has_attr(n, "datetime")
    })
    .ok_or_else(|| Error::field(format!("#{index}"), "no machine-readable time"))?;

    let href = canonical_link(&time)
        .ok_or_else(|| Error::field(format!("#{index}"), "time is not wrapped in a post link"))?;
    let id = status_id(&href)
        .ok_or_else(|| Error::field(format!("#{index}"), format!("no post id in {href}")))?;
    let label = id.to_string();

    let datetime = get_attr(&time, "datetime")
        .ok_or_else(|| Error::field(&label, "time lost its datetime attribute"))?;
    let timestamp = DateTime::parse_from_rfc3339(&datetime)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| Error::field(&label, format!("bad datetime {datetime:?}: {e}")))?;

    let author = post_author(container, &label)?;

    // Layout: two columns, avatar on the left. The right column's first
    // block is the header; what follows is the body.
    let columns = element_children(container);
    let body_parent = columns
        .last()
        .ok_or_else(|| Error::field(&label, "post container has no columns"))?;
    let blocks = element_children(body_parent);
    if blocks.is_empty() {
        return Err(Error::field(&label, "post has no header block"));
    }
    let body = &blocks[1..];

    let (reply_block, text_block, embed_block) = match body.len() {
        3 => (None, &body[0], &body[1]),
        4 => (Some(&body[0]), &body[1], &body[2]),
        n => {
            return Err(Error::structure(format!(
                "post {label}: unexpected body layout with {n} blocks"
            )))
        }
    };

    let reply_to = reply_block.map(|b| reply_handles(b)).unwrap_or_default();

    let mut fragment = Selection::from(text_block.clone()).inner_html().to_string();
    if region_has_content(embed_block) {
        fragment.push_str(&Selection::from(embed_block.clone()).inner_html());
    }
    if author.user != owner.user {
        fragment = format!("{}{fragment}", attribution_banner(&author));
    }
    let rendered = render_content(&fragment, fetcher, opts)?;

    Ok(Post {
        id,
        href,
        author,
        timestamp,
        content: rendered.html,
        text: rendered.text,
        reply_to,
    })
}

/// Nearest preceding element sibling, skipping inter-tag whitespace.
fn previous_element<'a>(node: &NodeRef<'a>) -> Option<NodeRef<'a>> {
    let mut prev = node.prev_sibling();
    while let Some(n) = prev {
        if n.is_element() {
            return Some(n);
        }
        if n.is_text() && !n.text().trim().is_empty() {
            return None;
        }
        prev = n.prev_sibling();
    }
    None
}

/// Walks from the timestamp up to the `<a>` that links the post header to
/// the canonical post URL.
fn canonical_link(time: &NodeRef) -> Option<String> {
    let mut node = time.parent();
    while let Some(n) = node {
        if is_element(&n, "a") {
            return get_attr(&n, "href").and_then(|h| absolute_url(&h));
        }
        node = n.parent();
    }
    None
}

/// Author of a single post, read from its header. Differs from the timeline
/// owner on re-shares.
fn post_author(container: &NodeRef, label: &str) -> Result<Author> {
    let handle = find_first(container, &|n: &NodeRef| {
        n.is_text() && n.text().trim().starts_with('@')
    })
    .map(|n| bare_user(n.text().trim()).to_string())
    .ok_or_else(|| Error::field(label, "no author handle"))?;

    let name = find_first(container, &|n: &NodeRef| {
        n.is_text() && {
            let t = n.text();
            let t = t.trim();
            !t.is_empty() && !t.starts_with('@') && t != "·"
        }
    })
    .map(|n| clean_text(&n.text()))
    .ok_or_else(|| Error::field(label, "no author display name"))?;

    Ok(Author { user: handle, name })
}

/// Mention handles in a reply-context block, in document order.
fn reply_handles(block: &NodeRef) -> Vec<String> {
    crate::patterns::MENTION
        .captures_iter(&node_text(block, true))
        .map(|c| c[1].to_string())
        .collect()
}

/// True when an embed region actually carries something: an element child or
/// non-whitespace text. Empty regions contribute nothing to the content.
fn region_has_content(region: &NodeRef) -> bool {
    !element_children(region).is_empty() || !node_text(region, false).trim().is_empty()
}
