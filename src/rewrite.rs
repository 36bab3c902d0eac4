//! Content rewriting: turns a raw post fragment into clean, self-contained
//! HTML plus a plain-text rendering.
//!
//! The passes run in a fixed order over a throwaway document built around the
//! fragment. Each pass is shaped so that running the whole pipeline again on
//! its own output changes nothing: emoji images are gone after the first run,
//! links are already absolute, text nodes no longer contain newlines.

use dom_query::{Document, NodeRef, Selection};
use log::warn;

use crate::embed;
use crate::error::{Error, Result};
use crate::fetch::{Fetcher, NullFetcher};
use crate::options::Options;
use crate::patterns::EMOJI_CODEPOINT;
use crate::query::{
    self, element_children, find_all, find_first, get_attr, is_element, node_text,
    remove_attr_recursive,
};
use crate::url_utils::absolute_url;

/// Wrapper id for the throwaway fragment document.
const ROOT_ID: &str = "fragment-root";

/// Inline style marker the modern markup puts on emoji images.
const EMOJI_STYLE_MARKER: &str = "height: 1.2em";

/// Boilerplate captions stripped from collapsed quote previews.
const PREVIEW_NOISE: &[&str] = &["Quote Tweet", "Show this poll", "Show this thread"];

/// Attributes stripped by the simplify pass.
const PRESENTATIONAL_ATTRS: &[&str] =
    &["class", "style", "aria-hidden", "data-testid", "draggable", "role"];

/// A rewritten post body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rewritten {
    /// Sanitized HTML fragment with absolute links.
    pub html: String,
    /// Plain-text rendering, whitespace-collapsed.
    pub text: String,
}

/// Rewrites a standalone HTML fragment without resolving embeds.
pub fn rewrite_fragment(html: &str, opts: Options) -> Result<Rewritten> {
    let opts = Options {
        embeds: false,
        ..opts
    };
    render_content(html, &NullFetcher, opts)
}

/// Full rendering used by the parsers: resolves embedded resources first,
/// then runs the rewrite passes.
pub(crate) fn render_content(
    html: &str,
    fetcher: &dyn Fetcher,
    opts: Options,
) -> Result<Rewritten> {
    let doc = Document::from(format!(r#"<div id="{ROOT_ID}">{html}</div>"#));

    if opts.embeds {
        embed::resolve(&doc, fetcher);
    }

    rewrite_emoji(&doc);
    collapse_quote_previews(&doc);
    decorate_link_cards(&doc);
    fix_videos(&doc);
    absolutize_links(&doc);
    flatten_mention_divs(&doc);
    materialize_line_breaks(&doc);
    if opts.simplify {
        simplify(&doc);
    }

    let root = doc.select(&format!("#{ROOT_ID}"));
    let node = root
        .nodes()
        .first()
        .cloned()
        .ok_or_else(|| Error::Structure("rewritten fragment lost its root".to_string()))?;
    Ok(Rewritten {
        html: root.inner_html().trim().to_string(),
        text: query::clean_text(&node_text(&node, true)),
    })
}

/// Replaces emoji images with the characters they depict.
///
/// The markup renders each emoji as an `<img>` sized to the text line, with
/// the code points encoded in the image file name. Images whose file name
/// doesn't decode are left alone.
fn rewrite_emoji(doc: &Document) {
    for img in doc.select("img").nodes().iter() {
        let style = get_attr(img, "style").unwrap_or_default();
        let label = get_attr(img, "aria-label").unwrap_or_default();
        if !style.contains(EMOJI_STYLE_MARKER) || label.is_empty() {
            continue;
        }
        let src = get_attr(img, "src").unwrap_or_default();
        match decode_emoji(&src) {
            Some(chars) => {
                Selection::from(img.clone())
                    .replace_with_html(html_escape::encode_text(&chars).to_string());
            }
            None => warn!("leaving undecodable emoji image {src}"),
        }
    }
}

fn decode_emoji(src: &str) -> Option<String> {
    let stem = EMOJI_CODEPOINT.captures(src)?.get(1)?.as_str();
    let mut out = String::new();
    for part in stem.split('-') {
        let cp = u32::from_str_radix(part, 16).ok()?;
        out.push(char::from_u32(cp)?);
    }
    Some(out)
}

/// Collapses the interactive preview of a quoted post down to its first image
/// and a bold one-line summary. The preview markup is deeply nested and full
/// of controls that make no sense in a static fragment.
fn collapse_quote_previews(doc: &Document) {
    for div in doc.select(r#"div[role="link"]"#).nodes().iter() {
        if find_first(div, &|n: &NodeRef| is_element(n, "time")).is_none() {
            continue;
        }
        let img_html = find_first(div, &|n: &NodeRef| is_element(n, "img"))
            .and_then(|img| get_attr(&img, "src"))
            .map(|src| {
                format!(
                    r#"<img src="{}">"#,
                    html_escape::encode_double_quoted_attribute(&src)
                )
            })
            .unwrap_or_default();

        let mut text = query::clean_text(&node_text(div, true));
        for noise in PREVIEW_NOISE {
            text = text.replace(noise, "");
        }
        let text = query::clean_text(&text);

        Selection::from(div.clone()).replace_with_html(format!(
            "{img_html}<b>{}</b>",
            html_escape::encode_text(&text)
        ));
    }
}

/// Emphasizes the parts of an external link card: bold title, italic domain.
fn decorate_link_cards(doc: &Document) {
    let Some(root) = fragment_root(doc) else {
        return;
    };
    let cards = find_all(&root, &|n: &NodeRef| {
        get_attr(n, "data-testid")
            .is_some_and(|v| v.starts_with("card.") && v.ends_with(".detail"))
    });
    for card in cards {
        let children = element_children(&card);
        if children.len() != 3 {
            continue;
        }
        let title = Selection::from(children[0].clone());
        title.set_html(format!("<b>{}</b>", title.inner_html()));
        let domain = Selection::from(children[2].clone());
        domain.set_html(format!("<i>{}</i>", domain.inner_html()));
    }
}

/// Makes videos playable in a static page: adds controls to videos with a
/// real source and drops the now-redundant poster image.
fn fix_videos(doc: &Document) {
    let Some(root) = fragment_root(doc) else {
        return;
    };
    for video in doc.select("video").nodes().iter() {
        let Some(src) = get_attr(video, "src") else {
            continue;
        };
        if src.starts_with("blob:") {
            continue;
        }
        Selection::from(video.clone()).set_attr("controls", "");
        if let Some(poster) = get_attr(video, "poster") {
            let dup = find_first(&root, &|n: &NodeRef| {
                is_element(n, "img") && query::attr_equals(n, "src", &poster)
            });
            if let Some(img) = dup {
                Selection::from(img).remove();
            }
        }
    }
}

/// Rewrites relative link and image targets to absolute URLs on the
/// canonical host, so the fragment survives being served from anywhere.
fn absolutize_links(doc: &Document) {
    for (sel, attr) in [("a[href]", "href"), ("img[src]", "src")] {
        for node in doc.select(sel).nodes().iter() {
            let Some(value) = get_attr(node, attr) else {
                continue;
            };
            if let Some(abs) = absolute_url(&value) {
                if abs != value {
                    Selection::from(node.clone()).set_attr(attr, &abs);
                }
            }
        }
    }
}

/// Renames mention-only wrapper divs to spans so handles flow inline with
/// the surrounding text instead of forcing a line break each.
fn flatten_mention_divs(doc: &Document) {
    for div in doc.select("div").nodes().iter() {
        let children = element_children(div);
        if children.len() != 1 || !is_element(&children[0], "a") {
            continue;
        }
        let link_text = query::clean_text(&node_text(&children[0], false));
        let div_text = query::clean_text(&node_text(div, false));
        if link_text.starts_with('@') && link_text == div_text {
            Selection::from(div.clone()).rename("span");
        }
    }
}

/// Converts literal newlines in text nodes to `<br>` elements. The source
/// relies on `white-space: pre-wrap` styling that is stripped away here.
fn materialize_line_breaks(doc: &Document) {
    let Some(root) = fragment_root(doc) else {
        return;
    };
    let breaky = find_all(&root, &|n: &NodeRef| {
        n.is_text() && {
            let t = n.text();
            t.contains('\n') && !t.trim().is_empty()
        }
    });
    for node in breaky {
        let text = node.text();
        let html = text
            .split('\n')
            .map(|part| html_escape::encode_text(part).into_owned())
            .collect::<Vec<_>>()
            .join("<br>");
        Selection::from(node).replace_with_html(html);
    }
}

/// Strips presentational attributes and inline SVG, leaving minimal markup.
fn simplify(doc: &Document) {
    let Some(root) = fragment_root(doc) else {
        return;
    };
    doc.select("svg").remove();
    for attr in PRESENTATIONAL_ATTRS {
        remove_attr_recursive(&root, attr);
    }
}

fn fragment_root(doc: &Document) -> Option<NodeRef<'_>> {
    doc.select(&format!("#{ROOT_ID}")).nodes().first().cloned()
}
