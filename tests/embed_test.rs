use std::collections::HashMap;

use featherfeed::{parse_timeline, Error, Fetcher, Options};

struct MapFetcher(HashMap<String, String>);

impl MapFetcher {
    fn new(pages: &[(&str, &str)]) -> Self {
        Self(
            pages
                .iter()
                .map(|(url, body)| (url.to_string(), body.to_string()))
                .collect(),
        )
    }
}

impl Fetcher for MapFetcher {
    fn fetch(&self, url: &str, _use_cache: bool) -> featherfeed::Result<Vec<u8>> {
        self.0
            .get(url)
            .map(|body| body.as_bytes().to_vec())
            .ok_or_else(|| Error::Fetch(format!("no page for {url}")))
    }
}

/// A minimal legacy timeline with one post whose text is `body_html`.
fn timeline_page(body_html: &str) -> String {
    format!(
        r#"<html><body><div class="timeline">
  <div class="profile">
    <table><tr>
      <td class="avatar"><img src="https://pbs.example.com/profile_images/9/biff_normal.jpg"></td>
      <td><div class="fullname">Biff Tannen</div><span class="screen-name">@biff</span></td>
    </tr></table>
  </div>
  <table class="tweet"><tr>
    <td><strong class="fullname">Biff Tannen</strong><div class="username">@biff</div></td>
    <td class="timestamp">1h</td>
  </tr><tr><td colspan="2">
    <div class="tweet-text" data-id="100">{body_html}</div>
  </td></tr></table>
</div></body></html>"#
    )
}

const QUOTE_LINK: &str = r#"look <a data-expanded-url="https://twitter.com/doc/status/42" data-url="https://twitter.com/doc/status/42" href="https://t.co/xyz">t.co/xyz</a>"#;

#[test]
fn quoted_posts_are_spliced_in_behind_a_rule() {
    let fetcher = MapFetcher::new(&[(
        "https://mobile.twitter.com/doc/status/42",
        r#"<html><body><div class="tweet-text">quoted words</div></body></html>"#,
    )]);
    let timeline =
        parse_timeline(&timeline_page(QUOTE_LINK), &fetcher, Options::default()).expect("expected Ok(_)");

    let content = &timeline.posts[0].content;
    assert!(content.contains("<hr>"));
    assert!(content.contains("<strong>"));
    assert!(content.contains("quoted words"));
    assert!(content.contains("t.co/xyz"));
}

#[test]
fn deleted_quoted_posts_are_struck_through() {
    let fetcher = MapFetcher::new(&[(
        "https://mobile.twitter.com/doc/status/42",
        "<html><body><p>This post is unavailable.</p></body></html>",
    )]);
    let timeline =
        parse_timeline(&timeline_page(QUOTE_LINK), &fetcher, Options::default()).expect("expected Ok(_)");

    let content = &timeline.posts[0].content;
    assert!(content.contains("<s>"));
    assert!(content.contains("t.co/xyz"));
    assert!(!content.contains("<hr>"));
}

#[test]
fn unreachable_quoted_posts_leave_the_link_untouched() {
    let fetcher = MapFetcher::new(&[]);
    let timeline =
        parse_timeline(&timeline_page(QUOTE_LINK), &fetcher, Options::default()).expect("expected Ok(_)");

    let content = &timeline.posts[0].content;
    assert!(!content.contains("<hr>"));
    assert!(!content.contains("<s>"));
    assert!(content.contains("t.co/xyz"));
}

#[test]
fn photo_links_inline_the_full_size_image() {
    let fetcher = MapFetcher::new(&[(
        "https://mobile.twitter.com/doc/status/42/photo/1",
        r#"<html><body><div class="media"><img src="https://pbs.example.com/media/full.jpg"></div></body></html>"#,
    )]);
    let body = r#"<a data-pre-embedded="true" href="/doc/status/42/photo/1">pic.twitter.com/abc</a>"#;
    let timeline =
        parse_timeline(&timeline_page(body), &fetcher, Options::default()).expect("expected Ok(_)");

    let content = &timeline.posts[0].content;
    assert!(content.contains(r#"<img src="https://pbs.example.com/media/full.jpg">"#));
    assert!(!content.contains("pic.twitter.com/abc"));
}

#[test]
fn sensitive_media_interstitial_is_resubmitted_once() {
    let fetcher = MapFetcher::new(&[
        (
            "https://mobile.twitter.com/doc/status/42/photo/1",
            r#"<html><body><form action="/i/sensitive"><input name="authenticity_token" value="tok"></form></body></html>"#,
        ),
        (
            "https://twitter.com/i/sensitive?authenticity_token=tok",
            r#"<html><body><div class="media"><img src="https://pbs.example.com/media/full.jpg"></div></body></html>"#,
        ),
    ]);
    let body = r#"<a data-pre-embedded="true" href="/doc/status/42/photo/1">pic.twitter.com/abc</a>"#;
    let timeline =
        parse_timeline(&timeline_page(body), &fetcher, Options::default()).expect("expected Ok(_)");

    let content = &timeline.posts[0].content;
    assert!(content.contains(r#"<img src="https://pbs.example.com/media/full.jpg">"#));
}

#[test]
fn embeds_can_be_disabled_entirely() {
    // No fetcher pages: with embeds off nothing is ever requested.
    let fetcher = MapFetcher::new(&[]);
    let opts = Options {
        embeds: false,
        ..Options::default()
    };
    let timeline = parse_timeline(&timeline_page(QUOTE_LINK), &fetcher, opts).expect("expected Ok(_)");
    assert!(timeline.posts[0].content.contains("t.co/xyz"));
}
