//! Inlining of embedded resources: quoted posts and photo pages.
//!
//! Every failure here is non-fatal. A post body must survive a dead link or
//! an unreachable page, so errors are logged and the original anchor is left
//! in place untouched.

use dom_query::{Document, Selection};
use log::warn;
use url::Url;

use crate::encoding::transcode_to_utf8;
use crate::fetch::Fetcher;
use crate::query::get_attr;
use crate::url_utils::{absolute_url, mobile_url};

/// Selector for the text container of a post on the basic-HTML pages.
const POST_TEXT: &str = ".tweet-text";

/// Selector for the full-size image on a photo page.
const PHOTO_IMG: &str = "div.media img";

/// Resolves embedded resources in a fragment document in place.
pub(crate) fn resolve(doc: &Document, fetcher: &dyn Fetcher) {
    inline_quoted_posts(doc, fetcher);
    inline_photos(doc, fetcher);
}

/// Replaces links to other posts with a rule, the link itself, and the quoted
/// post's text. A page that loads but carries no post text means the post is
/// gone; the link is struck through so readers know not to bother.
fn inline_quoted_posts(doc: &Document, fetcher: &dyn Fetcher) {
    for a in doc.select("a[data-expanded-url]").nodes().iter() {
        let Some(target) = get_attr(a, "data-url").or_else(|| get_attr(a, "data-expanded-url"))
        else {
            continue;
        };
        let Some(page_url) = mobile_url(&target) else {
            continue;
        };
        if !page_url.contains("/status/") {
            continue;
        }

        let anchor = Selection::from(a.clone());
        let anchor_html = anchor.html().to_string();
        let page = match fetcher.fetch(&page_url, true) {
            Ok(bytes) => Document::from(transcode_to_utf8(&bytes)),
            Err(e) => {
                warn!("leaving quoted post link as-is: {e}");
                continue;
            }
        };

        let content = page.select(POST_TEXT);
        if content.exists() {
            anchor.replace_with_html(format!(
                "<hr><strong>{anchor_html}</strong>{}",
                content.html()
            ));
        } else {
            anchor.replace_with_html(format!("<s>{anchor_html}</s>"));
        }
    }
}

/// Replaces photo-page links with the full-size image they lead to.
fn inline_photos(doc: &Document, fetcher: &dyn Fetcher) {
    for a in doc.select(r#"a[data-pre-embedded="true"]"#).nodes().iter() {
        let Some(href) = get_attr(a, "href") else {
            continue;
        };
        if !href.contains("/photo/") {
            continue;
        }
        let Some(page_url) = absolute_url(&href).as_deref().and_then(mobile_url) else {
            continue;
        };

        let page = match fetch_photo_page(fetcher, &page_url) {
            Ok(page) => page,
            Err(e) => {
                warn!("leaving photo link as-is: {e}");
                continue;
            }
        };

        let Some(src) = page
            .select(PHOTO_IMG)
            .nodes()
            .first()
            .and_then(|img| get_attr(img, "src"))
        else {
            warn!("no image found on photo page {page_url}");
            continue;
        };
        Selection::from(a.clone()).set_html(format!(
            r#"<img src="{}">"#,
            html_escape::encode_double_quoted_attribute(&src)
        ));
    }
}

/// Fetches a photo page, passing the sensitive-media interstitial when one
/// appears. The interstitial is a form whose token can be replayed as a query
/// parameter; one extra uncached request gets the real page.
fn fetch_photo_page(fetcher: &dyn Fetcher, page_url: &str) -> crate::error::Result<Document> {
    let page = Document::from(transcode_to_utf8(&fetcher.fetch(page_url, true)?));

    let token_input = page.select(r#"form input[name="authenticity_token"]"#);
    let Some(token) = token_input.nodes().first().and_then(|n| get_attr(n, "value")) else {
        return Ok(page);
    };
    let Some(action) = page
        .select("form")
        .nodes()
        .first()
        .and_then(|f| get_attr(f, "action"))
        .and_then(|a| absolute_url(&a))
    else {
        return Ok(page);
    };

    let Ok(mut gate_url) = Url::parse(&action) else {
        return Ok(page);
    };
    gate_url
        .query_pairs_mut()
        .append_pair("authenticity_token", &token);
    let bytes = fetcher.fetch(gate_url.as_str(), false)?;
    Ok(Document::from(transcode_to_utf8(&bytes)))
}
