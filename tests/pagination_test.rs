use std::collections::HashMap;

use featherfeed::{collect_timeline, Error, Fetcher, Options, Update};

struct MapFetcher(HashMap<String, String>);

impl MapFetcher {
    fn new(pages: &[(&str, String)]) -> Self {
        Self(
            pages
                .iter()
                .map(|(url, body)| (url.to_string(), body.clone()))
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

fn opts() -> Options {
    Options {
        embeds: false,
        ..Options::default()
    }
}

/// A legacy timeline page for @biff containing the given posts.
/// Each post is (id, user, name).
fn page(posts: &[(i64, &str, &str)]) -> String {
    let mut tweets = String::new();
    for (id, user, name) in posts {
        tweets.push_str(&format!(
            r#"<table class="tweet"><tr>
  <td><strong class="fullname">{name}</strong><div class="username">@{user}</div></td>
  <td class="timestamp">1h</td>
</tr><tr><td colspan="2"><div class="tweet-text" data-id="{id}">post {id}</div></td></tr></table>"#
        ));
    }
    format!(
        r#"<html><body><div class="timeline">
  <div class="profile">
    <table><tr>
      <td class="avatar"><img src="https://pbs.example.com/profile_images/9/biff_normal.jpg"></td>
      <td><div class="fullname">Biff Tannen</div><span class="screen-name">@biff</span></td>
    </tr></table>
  </div>
  {tweets}
</div></body></html>"#
    )
}

#[test]
fn pages_on_the_oldest_own_id_despite_interleaved_reshares() {
    // Re-shared post 900 is numerically newer than everything around it and
    // must not drive pagination.
    let fetcher = MapFetcher::new(&[
        (
            "https://mobile.twitter.com/biff",
            page(&[(100, "biff", "Biff Tannen"), (900, "doc", "Doc Brown"), (90, "biff", "Biff Tannen")]),
        ),
        (
            "https://mobile.twitter.com/biff?max_id=90",
            page(&[(90, "biff", "Biff Tannen"), (80, "biff", "Biff Tannen")]),
        ),
    ]);

    let update = collect_timeline(&fetcher, "biff", 0, 2, opts()).expect("expected Ok(_)");
    let Update::New(update) = update else {
        panic!("expected new content");
    };

    let ids: Vec<i64> = update.posts.iter().map(|p| p.id).collect();
    // Post 90 appears on both pages but only once in the result.
    assert_eq!(ids, vec![100, 900, 90, 80]);
    assert_eq!(update.latest_id, 100);
    assert_eq!(update.profile.user, "biff");
}

#[test]
fn unchanged_timeline_short_circuits() {
    let fetcher = MapFetcher::new(&[(
        "https://mobile.twitter.com/biff",
        page(&[(100, "biff", "Biff Tannen"), (90, "biff", "Biff Tannen")]),
    )]);

    let update = collect_timeline(&fetcher, "biff", 100, 3, opts()).expect("expected Ok(_)");
    assert!(matches!(update, Update::Unchanged));
}

#[test]
fn a_page_without_own_posts_stops_pagination() {
    // Page two is all re-shares; there is no own id to page on, so the run
    // stops there rather than guessing.
    let fetcher = MapFetcher::new(&[
        (
            "https://mobile.twitter.com/biff",
            page(&[(100, "biff", "Biff Tannen")]),
        ),
        (
            "https://mobile.twitter.com/biff?max_id=100",
            page(&[(900, "doc", "Doc Brown")]),
        ),
    ]);

    let update = collect_timeline(&fetcher, "biff", 0, 5, opts()).expect("expected Ok(_)");
    let Update::New(update) = update else {
        panic!("expected new content");
    };
    let ids: Vec<i64> = update.posts.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![100, 900]);
    assert_eq!(update.latest_id, 100);
}

#[test]
fn the_leading_at_sign_is_accepted() {
    let fetcher = MapFetcher::new(&[(
        "https://mobile.twitter.com/biff",
        page(&[(100, "biff", "Biff Tannen")]),
    )]);
    let update = collect_timeline(&fetcher, "@biff", 0, 1, opts()).expect("expected Ok(_)");
    assert!(matches!(update, Update::New(_)));
}

#[test]
fn fetch_failures_bubble_up() {
    let fetcher = MapFetcher::new(&[]);
    let err = collect_timeline(&fetcher, "biff", 0, 1, opts()).unwrap_err();
    assert!(matches!(err, Error::Fetch(_)));
}
